use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::profile::UserProfile;

#[derive(Debug, Serialize)]
pub struct List<T> {
    list: Vec<T>,
    total: i64,
}

impl<T> List<T> {
    pub fn new(list: Vec<T>, total: i64) -> Self {
        List { list, total }
    }
}

/// JSONB payload returned by the backend's stored procedures. A procedure can
/// fail logically while the call itself succeeds, so `success` must be checked
/// separately from transport-level success.
#[derive(Debug, Deserialize)]
pub struct RpcOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    // create_missing_user_profile returns the repaired row alongside the flag
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl RpcOutcome {
    pub fn ensure(self) -> Result<Self, Error> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::RpcFailure(self.error.unwrap_or_else(|| "unknown error".into())))
        }
    }
}
