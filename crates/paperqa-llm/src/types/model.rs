use serde::{Deserialize, Serialize};

/// A model the server can answer with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

impl ModelInfo {
    /// Pick the server-flagged default, falling back to the first entry
    pub fn default_of(models: &[ModelInfo]) -> Option<&ModelInfo> {
        models.iter().find(|m| m.is_default).or_else(|| models.first())
    }
}
