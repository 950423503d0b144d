use serde::Serialize;

/// A municipal department that submissions can be routed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    pub name: String,
    pub description: Option<String>,
}
