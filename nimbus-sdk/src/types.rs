//! Wire types shared by all services.

use serde::{Deserialize, Serialize};

/// Code/name pair used throughout the API for enumerated values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonCode {
    pub code: Option<String>,
    pub code_name: Option<String>,
}

impl CommonCode {
    pub fn code_str(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Envelope fields present in every success body beside the payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonResponse {
    pub request_id: Option<String>,
    pub return_code: Option<String>,
    pub return_message: Option<String>,
}

/// Error body shape: `{"responseError": {"returnCode", "returnMessage"}}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseError {
    pub return_code: String,
    pub return_message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    pub response_error: ResponseError,
}

/// Id/name pair returned by metadata listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdName {
    pub id: Option<i64>,
    pub name: Option<String>,
}
