//! Response encoding
//!
//! Every operation answers with the same envelope: an application code, a
//! message and, on success, the payload under `result`. Transports map the
//! envelope to a status with [`Envelope::http_status`].

use crate::error::SenzError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application code for a successful request
pub const CODE_SUCCESS: i32 = 0;

/// Application code for a computation failure
pub const CODE_INTERNAL_ERROR: i32 = 1;

/// Application code for a malformed or invalid request
pub const CODE_CLIENT_ERROR: i32 = 103;

pub const SUCCESS_MESSAGE: &str = "success";
pub const INTERNAL_ERROR_MESSAGE: &str = "500 Internal Error";

/// `{code, message, result?}` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl Envelope {
    pub fn success(result: Value) -> Self {
        Self {
            code: CODE_SUCCESS,
            message: SUCCESS_MESSAGE.to_string(),
            result: Some(result),
        }
    }

    /// Serialize `payload` into a success envelope
    pub fn encode<T: Serialize>(payload: &T) -> Result<Self, SenzError> {
        Ok(Self::success(serde_json::to_value(payload)?))
    }

    /// Client errors carry their own message; computation errors a generic one
    pub fn from_error(err: &SenzError) -> Self {
        if err.is_client_error() {
            Self {
                code: CODE_CLIENT_ERROR,
                message: err.to_string(),
                result: None,
            }
        } else {
            Self {
                code: CODE_INTERNAL_ERROR,
                message: INTERNAL_ERROR_MESSAGE.to_string(),
                result: None,
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }

    /// HTTP status a transport should answer with
    pub fn http_status(&self) -> u16 {
        match self.code {
            CODE_SUCCESS => 200,
            CODE_CLIENT_ERROR => 400,
            _ => 500,
        }
    }

    pub fn to_json(&self) -> Result<String, SenzError> {
        serde_json::to_string(self).map_err(SenzError::JsonError)
    }

    pub fn to_json_pretty(&self) -> Result<String, SenzError> {
        serde_json::to_string_pretty(self).map_err(SenzError::JsonError)
    }
}
