use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Extensions tried, in order, when matching an entry against the asset list.
pub const IMAGE_EXTENSIONS: [&str; 3] = [".jpeg", ".jpg", ".png"];

/// Identifier or grouping key that catalogs write either as a number or a
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogKey {
    Number(i64),
    Text(String),
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKey::Number(n) => write!(f, "{}", n),
            CatalogKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CatalogKey {
    fn from(value: i64) -> Self {
        CatalogKey::Number(value)
    }
}

impl From<i32> for CatalogKey {
    fn from(value: i32) -> Self {
        CatalogKey::Number(i64::from(value))
    }
}

impl From<String> for CatalogKey {
    fn from(value: String) -> Self {
        CatalogKey::Text(value)
    }
}

impl From<&str> for CatalogKey {
    fn from(value: &str) -> Self {
        CatalogKey::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub id: CatalogKey,
    pub word: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub phonetic: String,
    #[serde(default)]
    pub image: Option<String>,
    pub level: CatalogKey,
}

impl WordEntry {
    pub fn new<K, L>(id: K, word: &str, translation: &str, level: L) -> Self
    where
        K: Into<CatalogKey>,
        L: Into<CatalogKey>,
    {
        Self {
            id: id.into(),
            word: word.to_string(),
            translation: translation.to_string(),
            phonetic: String::new(),
            image: None,
            level: level.into(),
        }
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.image = Some(image.to_string());
        self
    }

    pub fn with_phonetic(mut self, phonetic: &str) -> Self {
        self.phonetic = phonetic.to_string();
        self
    }

    /// The explicit image name, or one derived from the word itself:
    /// `"Ice Cream"` becomes `"ice-cream.jpeg"`. Every whitespace run turns
    /// into one dash, at the edges too, so `" cat"` maps to `"-cat.jpeg"`.
    pub fn preferred_image_name(&self) -> String {
        match self.image.as_deref() {
            Some(image) if !image.is_empty() => image.to_string(),
            _ => format!("{}{}", image_slug(&self.word), IMAGE_EXTENSIONS[0]),
        }
    }

    /// Candidate asset names in lookup order.
    pub fn image_candidates(&self) -> Vec<String> {
        let preferred = self.preferred_image_name();
        let mut candidates = Vec::with_capacity(IMAGE_EXTENSIONS.len());
        for ext in IMAGE_EXTENSIONS {
            let candidate = preferred.replacen(IMAGE_EXTENSIONS[0], ext, 1);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }
}

fn image_slug(word: &str) -> String {
    let mut slug = String::with_capacity(word.len());
    let mut in_space = false;
    for c in word.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    slug
}

/// Which image assets can be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetAvailability {
    Listed(HashSet<String>),
    /// No asset list could be read and the configuration asked to treat every
    /// entry's image as present.
    AssumeAllAvailable,
}

impl AssetAvailability {
    pub fn listed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AssetAvailability::Listed(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            AssetAvailability::Listed(names) => names.contains(name),
            AssetAvailability::AssumeAllAvailable => true,
        }
    }

    /// First available candidate image for `entry`.
    pub fn resolve(&self, entry: &WordEntry) -> Option<String> {
        entry
            .image_candidates()
            .into_iter()
            .find(|candidate| self.contains(candidate))
    }
}

impl Default for AssetAvailability {
    fn default() -> Self {
        AssetAvailability::AssumeAllAvailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_derived_image_name() {
        let entry = WordEntry::new(1, "Ice  Cream", "冰淇淋", "Food");
        assert_eq!(entry.preferred_image_name(), "ice-cream.jpeg");
        assert_eq!(
            entry.image_candidates(),
            vec!["ice-cream.jpeg", "ice-cream.jpg", "ice-cream.png"]
        );
    }

    #[test]
    fn test_edge_whitespace_becomes_dashes() {
        assert_eq!(WordEntry::new(1, " cat", "猫", 1).preferred_image_name(), "-cat.jpeg");
        assert_eq!(WordEntry::new(2, "hot dog\t", "热狗", 1).preferred_image_name(), "hot-dog-.jpeg");
        assert_eq!(WordEntry::new(3, "  ", "", 1).preferred_image_name(), "-.jpeg");
    }

    #[test]
    fn test_explicit_image_wins() {
        let entry = WordEntry::new(1, "cat", "猫", 1).with_image("kitty.png");
        assert_eq!(entry.preferred_image_name(), "kitty.png");
        assert_eq!(entry.image_candidates(), vec!["kitty.png"]);

        let blank = WordEntry::new(2, "dog", "狗", 1).with_image("");
        assert_eq!(blank.preferred_image_name(), "dog.jpeg");
    }

    #[test]
    fn test_resolution_follows_extension_order() {
        let entry = WordEntry::new(1, "apple", "苹果", 1);

        let both = AssetAvailability::listed(["apple.png", "apple.jpg"]);
        assert_eq!(both.resolve(&entry).as_deref(), Some("apple.jpg"));

        let png_only = AssetAvailability::listed(["apple.png"]);
        assert_eq!(png_only.resolve(&entry).as_deref(), Some("apple.png"));

        let none = AssetAvailability::listed(["pear.jpeg"]);
        assert_eq!(none.resolve(&entry), None);

        assert_eq!(
            AssetAvailability::AssumeAllAvailable.resolve(&entry).as_deref(),
            Some("apple.jpeg")
        );
    }

    #[test]
    fn test_catalog_json_accepts_mixed_keys() {
        let json = r#"[
            {"id": 1, "word": "cat", "translation": "猫", "phonetic": "/kæt/", "image": "cat.jpeg", "level": "Animals"},
            {"id": "w2", "word": "one", "level": 2}
        ]"#;
        let entries: Vec<WordEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(entries[0].id, CatalogKey::Number(1));
        assert_eq!(entries[0].level.to_string(), "Animals");
        assert_eq!(entries[1].id, CatalogKey::Text("w2".to_string()));
        assert_eq!(entries[1].level, CatalogKey::Number(2));
        assert_eq!(entries[1].image, None);
        assert_eq!(entries[1].translation, "");
    }
}
