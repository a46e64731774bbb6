use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::catalog::{AssetAvailability, WordEntry};
use crate::utils::{GameError, GameResult};

/// What to do when the asset list cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetListFallback {
    AssumeAllAvailable,
    Fail,
}

impl Default for AssetListFallback {
    fn default() -> Self {
        AssetListFallback::AssumeAllAvailable
    }
}

/// Everything startup needs to build levels.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub entries: Vec<WordEntry>,
    pub availability: AssetAvailability,
}

pub struct CatalogLoader {
    catalog_path: PathBuf,
    asset_list_path: PathBuf,
    fallback: AssetListFallback,
}

impl CatalogLoader {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        catalog_path: P,
        asset_list_path: Q,
        fallback: AssetListFallback,
    ) -> Self {
        Self {
            catalog_path: catalog_path.as_ref().to_path_buf(),
            asset_list_path: asset_list_path.as_ref().to_path_buf(),
            fallback,
        }
    }

    pub async fn load(&self) -> GameResult<Catalog> {
        let entries = self.load_entries().await?;
        let availability = self.load_availability().await?;

        info!(
            "Catalog ready: {} entries, asset list {}",
            entries.len(),
            match &availability {
                AssetAvailability::Listed(names) => format!("with {} names", names.len()),
                AssetAvailability::AssumeAllAvailable => "assumed complete".to_string(),
            }
        );

        Ok(Catalog {
            entries,
            availability,
        })
    }

    pub async fn load_entries(&self) -> GameResult<Vec<WordEntry>> {
        info!("Loading word catalog from: {:?}", self.catalog_path);

        let content = fs::read_to_string(&self.catalog_path)
            .await
            .map_err(|e| GameError::load(format!("Failed to read word catalog {:?}: {}", self.catalog_path, e)))?;

        let entries: Vec<WordEntry> = serde_json::from_str(&content)
            .map_err(|e| GameError::load(format!("Failed to parse word catalog: {}", e)))?;

        Ok(entries)
    }

    pub async fn load_availability(&self) -> GameResult<AssetAvailability> {
        match self.read_asset_list().await {
            Ok(names) => Ok(AssetAvailability::listed(names)),
            Err(e) => match self.fallback {
                AssetListFallback::AssumeAllAvailable => {
                    warn!("Asset list unavailable, assuming every image exists: {}", e);
                    Ok(AssetAvailability::AssumeAllAvailable)
                }
                AssetListFallback::Fail => Err(e),
            },
        }
    }

    async fn read_asset_list(&self) -> GameResult<Vec<String>> {
        let content = fs::read_to_string(&self.asset_list_path)
            .await
            .map_err(|e| GameError::load(format!("Failed to read asset list {:?}: {}", self.asset_list_path, e)))?;

        serde_json::from_str(&content)
            .map_err(|e| GameError::load(format!("Failed to parse asset list: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const WORDS: &str = r#"[
        {"id": 1, "word": "cat", "translation": "猫", "phonetic": "/kæt/", "level": "Animals"},
        {"id": 2, "word": "dog", "translation": "狗", "phonetic": "/dɒɡ/", "level": "Animals"}
    ]"#;

    #[tokio::test]
    async fn test_load_catalog_with_asset_list() {
        let temp_dir = tempdir().unwrap();
        let words = temp_dir.path().join("words.json");
        let assets = temp_dir.path().join("available-images.json");
        std::fs::write(&words, WORDS).unwrap();
        std::fs::write(&assets, r#"["cat.jpeg"]"#).unwrap();

        let loader = CatalogLoader::new(&words, &assets, AssetListFallback::Fail);
        let catalog = loader.load().await.unwrap();

        assert_eq!(catalog.entries.len(), 2);
        assert!(catalog.availability.contains("cat.jpeg"));
        assert!(!catalog.availability.contains("dog.jpeg"));
    }

    #[tokio::test]
    async fn test_missing_asset_list_uses_fallback() {
        let temp_dir = tempdir().unwrap();
        let words = temp_dir.path().join("words.json");
        std::fs::write(&words, WORDS).unwrap();
        let assets = temp_dir.path().join("missing.json");

        let lenient = CatalogLoader::new(&words, &assets, AssetListFallback::AssumeAllAvailable);
        let catalog = lenient.load().await.unwrap();
        assert_eq!(catalog.availability, AssetAvailability::AssumeAllAvailable);

        let strict = CatalogLoader::new(&words, &assets, AssetListFallback::Fail);
        assert!(matches!(strict.load().await.unwrap_err(), GameError::Load { .. }));
    }

    #[tokio::test]
    async fn test_missing_catalog_is_load_error() {
        let temp_dir = tempdir().unwrap();
        let loader = CatalogLoader::new(
            temp_dir.path().join("words.json"),
            temp_dir.path().join("available-images.json"),
            AssetListFallback::AssumeAllAvailable,
        );

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, GameError::Load { .. }));
    }

    #[tokio::test]
    async fn test_malformed_catalog_is_load_error() {
        let temp_dir = tempdir().unwrap();
        let words = temp_dir.path().join("words.json");
        std::fs::write(&words, "{not json").unwrap();

        let loader = CatalogLoader::new(&words, temp_dir.path().join("a.json"), AssetListFallback::AssumeAllAvailable);
        assert!(matches!(loader.load_entries().await.unwrap_err(), GameError::Load { .. }));
    }
}
