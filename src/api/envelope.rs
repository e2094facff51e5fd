//! The backend's `{success, data?, message?}` response envelope.
//!
//! The backend is not strict about its own contract: `success` arrives as a
//! JSON bool or as the string `"true"`, and `is_active` on users as 0/1.
//! The lenient deserializers here absorb that instead of failing the call.

use serde::{Deserialize, Deserializer};

use crate::api::ApiError;
use crate::domain::User;

/// Generic response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into a backend error.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Backend(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        self.data.ok_or(ApiError::MissingData)
    }

    /// For mutations whose payload we do not care about: just check success.
    pub fn into_ack(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Backend(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }
}

/// `POST /auth/login` carries the token and user at the top level, outside
/// `data`.
#[derive(Debug, Deserialize)]
pub struct LoginEnvelope {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    pub token: Option<String>,
    pub user: Option<User>,
    pub message: Option<String>,
}

impl LoginEnvelope {
    pub fn into_session(self) -> Result<(String, User), ApiError> {
        if !self.success {
            return Err(ApiError::Backend(
                self.message
                    .unwrap_or_else(|| "login failed".to_string()),
            ));
        }
        match (self.token, self.user) {
            (Some(token), Some(user)) => Ok((token, user)),
            _ => Err(ApiError::MissingData),
        }
    }
}

/// Accept booleans spelled as bool, integer (0/1) or string ("true"/"1").
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Bool(b) => b,
        Lenient::Int(n) => n != 0,
        Lenient::Str(s) => matches!(s.as_str(), "true" | "True" | "1"),
    })
}
