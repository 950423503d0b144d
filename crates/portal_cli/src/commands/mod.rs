pub mod add_department;
pub mod lookup;
pub mod rebuild;
pub mod validate;
