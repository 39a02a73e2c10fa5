//! Sport catalog
//!
//! Static list of supported sports with their artwork, loaded once at startup.

use std::collections::HashMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;
use crate::utils::errors::{KickaboutError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportDetail {
    pub sport_index: i32,
    pub sport: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportCatalogFile {
    pub sports: Vec<SportDetail>,
}

#[derive(Debug, Clone, Default)]
pub struct SportCatalog {
    sports: Vec<SportDetail>,
    by_name: HashMap<String, usize>,
}

impl SportCatalog {
    pub fn from_sports(sports: Vec<SportDetail>) -> Self {
        let by_name = sports
            .iter()
            .enumerate()
            .map(|(i, s)| (s.sport.to_lowercase(), i))
            .collect();

        Self { sports, by_name }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: SportCatalogFile = serde_json::from_str(content)?;
        Ok(Self::from_sports(file.sports))
    }

    /// Load the catalog file; a missing file is a configuration error
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            KickaboutError::Config(format!("Failed to read sport catalog {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_json(&content)?;
        info!(sports = catalog.sports.len(), "Sport catalog loaded");
        Ok(catalog)
    }

    pub fn sports(&self) -> &[SportDetail] {
        &self.sports
    }

    /// Artwork for `sport`, matched case-insensitively
    pub fn image_url_for(&self, sport: &str) -> Option<&str> {
        self.by_name
            .get(&sport.to_lowercase())
            .map(|&i| self.sports[i].image_url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{"sports":[
        {"sportIndex":0,"sport":"badminton","imageUrl":"https://img/badminton.png"},
        {"sportIndex":1,"sport":"Futsal","imageUrl":"https://img/futsal.png"}
    ]}"#;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = SportCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.image_url_for("futsal"), Some("https://img/futsal.png"));
        assert_eq!(catalog.image_url_for("BADMINTON"), Some("https://img/badminton.png"));
        assert_eq!(catalog.image_url_for("curling"), None);
    }

    #[tokio::test]
    async fn test_load_bundled_catalog() {
        let catalog = SportCatalog::load("data/available_sports_detail.json").await.unwrap();
        assert!(catalog.image_url_for("tennis").is_some());
        assert_eq!(catalog.sports()[0].sport_index, 0);
    }

    #[tokio::test]
    async fn test_missing_catalog_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SportCatalog::load(dir.path().join("none.json")).await;
        assert!(matches!(result, Err(KickaboutError::Config(_))));
    }
}
