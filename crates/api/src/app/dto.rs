//! Request/response DTOs and JSON mapping helpers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tillpoint_auth::{Role, RoleFlags, User};
use tillpoint_core::validation::{NOT_A_BOOLEAN, NOT_A_NUMBER};
use tillpoint_core::{FieldErrors, NON_FIELD_ERRORS};

use crate::app::errors::ApiError;

/// Decode a JSON request body. An empty body reads as `{}`.
///
/// A value of the wrong type is reported against its own field, and every
/// such field is reported, not only the first.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(body)
            .map_err(|e| ApiError::non_field(format!("JSON parse error - {e}")))?
    };
    let Value::Object(map) = value else {
        return Err(ApiError::non_field(format!(
            "Invalid data. Expected a dictionary, but got {}.",
            json_kind(&value)
        )));
    };

    match serde_json::from_value(Value::Object(map.clone())) {
        Ok(parsed) => Ok(parsed),
        Err(whole) => {
            let mut errors = FieldErrors::new();
            for (key, value) in map {
                let single = Map::from_iter([(key.clone(), value)]);
                if let Err(e) = serde_json::from_value::<T>(Value::Object(single)) {
                    errors.add(key, field_message(&e));
                }
            }
            if errors.is_empty() {
                errors.add(NON_FIELD_ERRORS, format!("JSON parse error - {whole}"));
            }
            Err(errors.into())
        }
    }
}

fn field_message(err: &serde_json::Error) -> String {
    let text = err.to_string();
    if text.contains("expected f64") || text.contains("expected a Decimal") {
        NOT_A_NUMBER.to_string()
    } else if text.contains("expected a boolean") {
        NOT_A_BOOLEAN.to_string()
    } else {
        text
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Body for creating or editing an account through user management.
#[derive(Debug, Default, Deserialize)]
pub struct UserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

impl UserRequest {
    /// Parse `role`, reporting an unknown value against the field.
    pub fn role(&self, errors: &mut FieldErrors) -> Option<Role> {
        let raw = self.role.as_deref()?;
        match raw.parse() {
            Ok(role) => Some(role),
            Err(_) => {
                errors.add("role", format!("\"{raw}\" is not a valid choice."));
                None
            }
        }
    }
}

/// A user as shown to clients: the record plus its derived role flags.
#[derive(Debug, Serialize)]
pub struct UserView<'a> {
    #[serde(flatten)]
    pub user: &'a User,
    #[serde(flatten)]
    pub flags: RoleFlags,
}

impl<'a> From<&'a User> for UserView<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            user,
            flags: user.flags(),
        }
    }
}

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::to_value(UserView::from(user)).unwrap_or(serde_json::Value::Null)
}
