use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::RevalidateType;
use crate::overrides::FlagOverrides;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverridesResponse {
    pub overrides: FlagOverrides,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        SuccessResponse { success: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
}

/// Body of `POST /api/revalidate/path`. Fields are kept loose so that
/// normalization, not deserialization, decides what is usable.
#[derive(Debug, Default, Deserialize)]
pub struct RevalidatePathRequest {
    #[serde(default)]
    pub path: Option<Value>,
    #[serde(default)]
    pub paths: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevalidateTagRequest {
    #[serde(default)]
    pub tag: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevalidatePathResponse {
    pub success: bool,
    pub revalidated: bool,
    pub paths: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<RevalidateType>,
    pub now: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevalidateTagResponse {
    pub success: bool,
    pub revalidated: bool,
    pub tags: Vec<String>,
    pub now: String,
}
