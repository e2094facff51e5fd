//! User model and management payloads.

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// A user account.
///
/// `role` is immutable after creation and `username` immutable on edit;
/// the update payload deliberately has neither field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub department: Option<String>,
    #[serde(deserialize_with = "crate::api::envelope::lenient_bool")]
    pub is_active: bool,
    pub created_at: String,
}

impl User {
    pub fn is_technician(&self) -> bool {
        self.role == Role::Technician
    }
}

/// Payload for `POST /users`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Sparse payload for `PUT /users/:id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active_tolerates_numeric_booleans() {
        // The backend stores is_active as 0/1.
        let json = serde_json::json!({
            "id": 3,
            "username": "somsri",
            "email": "somsri@example.com",
            "full_name": "Somsri P.",
            "phone": null,
            "role": "technician",
            "department": "Facilities",
            "is_active": 1,
            "created_at": "2025-01-15T08:00:00Z"
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.is_active);
        assert!(user.is_technician());
    }

    #[test]
    fn test_update_has_no_role_or_username_field() {
        let update = UpdateUser {
            full_name: Some("Somsri Prasert".to_string()),
            is_active: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "full_name": "Somsri Prasert", "is_active": false })
        );
    }
}
