pub mod dashboard;
pub mod health;
pub mod intake;
pub mod status;

pub use health::health_check;
