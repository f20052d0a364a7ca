use super::{null_as_default, opt_string_or_number};
use serde::{Deserialize, Serialize};

/// Net holding of one security for an account, computed by the trade service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub security: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i64,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<String>,
}
