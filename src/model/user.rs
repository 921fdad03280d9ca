use serde::Serialize;

use crate::model::role::Role;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub department: Option<String>,
    pub role_id: u8,
}

/// The slice of a user the attendance reports label their rows with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub department: Option<String>,
    pub role: Role,
}

impl User {
    /// Rows with an unknown role id are labelled as employees.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            department: self.department.clone(),
            role: Role::from_id(self.role_id).unwrap_or(Role::Employee),
        }
    }
}
