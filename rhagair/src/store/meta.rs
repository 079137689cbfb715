use serde::{Deserialize, Serialize};

/// Optional description shipped next to a store.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct StoreMetadata {
    pub locale: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl std::str::FromStr for StoreMetadata {
    type Err = serde_json::Error;

    fn from_str(string: &str) -> Result<StoreMetadata, Self::Err> {
        serde_json::from_str(string)
    }
}
