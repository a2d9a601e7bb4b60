use serde::{Deserialize, Serialize};

/// Ranked text passage returned by the search endpoint
///
/// Field names follow the search wire format, both on the wire and in the
/// `search_<id>` cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "md_hash")]
    pub hash: String,
    pub title: String,
    pub text: String,
    /// Opaque timestamp string as the search service formats it
    pub created_at: String,
    pub url: String,
}
