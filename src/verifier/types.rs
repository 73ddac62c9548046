//! Identity directory wire types

use serde::Deserialize;

/// Query response from the directory's user search
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryResponse {
    #[serde(rename = "totalResults")]
    pub total_results: i64,
    #[serde(rename = "Resources", default)]
    pub resources: Vec<DirectoryUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub user_name: String,
    pub active: bool,
}

/// What the directory said about a correlation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryVerdict {
    /// First match is active
    Active,
    /// First match is explicitly inactive
    Inactive,
    /// Well-formed response without matches
    NoMatch,
    /// Request or response could not be trusted
    Unverifiable,
}

impl DirectoryVerdict {
    /// Collapse to the verification contract: only an explicit inactive
    /// match counts as "not active".
    pub fn treat_as_active(self) -> bool {
        !matches!(self, DirectoryVerdict::Inactive)
    }
}
