//! Class label tables.
//!
//! A table's position `i` is the class name for model output index `i`.
//! Lookups are always bounds-checked; see [`ClassLabelTable::label_for`].

use std::path::Path;

use leaf_models::{LabelSet, UNKNOWN_LABEL};

use crate::error::{InferenceError, InferenceResult};

/// Classes of the single-model HTTP service (80).
pub const SERVER_CLASSES: &[&str] = &[
    "Aloevera", "Amla", "Amruthaballi", "Arali", "Astma_weed", "Badipala", "Balloon_Vine",
    "Bamboo", "Beans", "Betel", "Bhrami", "Bringaraja", "Caricature", "Castor",
    "Catharanthus", "Chakte", "Chilly", "Citron lime (herelikai)", "Coffee",
    "Common rue(naagdalli)", "Coriender", "Curry", "Doddpathre", "Drumstick", "Ekka",
    "Eucalyptus", "Ganigale", "Ganike", "Gasagase", "Ginger", "Globe Amarnath", "Guava",
    "Henna", "Hibiscus", "Honge", "Insulin", "Jackfruit", "Jasmine", "Kambajala",
    "Kasambruga", "Kohlrabi", "Lantana", "Lemon", "Lemongrass", "Malabar_Nut",
    "Malabar_Spinach", "Mango", "Marigold", "Mint", "Neem", "Nelavembu", "Nerale",
    "Nooni", "Onion", "Padri", "Palak(Spinach)", "Papaya", "Parijatha", "Pea", "Pepper",
    "Pomoegranate", "Pumpkin", "Raddish", "Rose", "Sampige", "Sapota", "Seethaashoka",
    "Seethapala", "Spinach1", "Tamarind", "Taro", "Tecoma", "Thumbe", "Tomato", "Tulsi",
    "Turmeric", "ashoka", "camphor", "kamakasturi", "kepala",
];

/// Classes of the Swin transformer ensemble (97).
pub const ENSEMBLE_CLASSES: &[&str] = &[
    "Aloevera", "Amla", "Amruthaballi", "Arali", "Arive-Dantu", "Astma_weed", "Badipala",
    "Balloon_Vine", "Bamboo", "Basale", "Beans", "Betel", "Bhrami", "Bringaraja",
    "Caricature", "Castor", "Catharanthus", "Chakte", "Chilly", "Citron lime (herelikai)",
    "Coffee", "Common rue(naagdalli)", "Coriender", "Crape_Jasmine", "Curry",
    "Doddpathre", "Drumstick", "Ekka", "Eucalyptus", "Fenugreek", "Ganigale", "Ganike",
    "Gasagase", "Ginger", "Globe Amarnath", "Guava", "Henna", "Hibiscus", "Honge",
    "Indian_Beech", "Indian_Mustard", "Insulin", "Jackfruit", "Jamaica_Cherry-Gasagase",
    "Jamun", "Jasmine", "Kambajala", "Karanda", "Kasambruga", "Kohlrabi", "Lantana",
    "Lemon", "Lemongrass", "Malabar_Nut", "Malabar_Spinach", "Mango", "Marigold",
    "Mexican_Mint", "Mint", "Neem", "Nelavembu", "Nerale", "Nooni", "Oleander", "Onion",
    "Padri", "Palak(Spinach)", "Papaya", "Parijata", "Parijatha", "Pea", "Peepal",
    "Pepper", "Pomoegranate", "Pumpkin", "Raddish", "Rasna", "Rose", "Rose_apple",
    "Roxburgh_fig", "Sampige", "Sandalwood", "Sapota", "Seethaashoka", "Seethapala",
    "Spinach1", "Tamarind", "Taro", "Tecoma", "Thumbe", "Tomato", "Tulsi", "Turmeric",
    "ashoka", "camphor", "kamakasturi", "kepala",
];

/// Ordered, fixed-size list of class names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabelTable {
    labels: Vec<String>,
}

impl ClassLabelTable {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// One of the built-in tables.
    pub fn builtin(set: LabelSet) -> Self {
        match set {
            LabelSet::Server => Self::new(SERVER_CLASSES.iter().copied()),
            LabelSet::Ensemble => Self::new(ENSEMBLE_CLASSES.iter().copied()),
        }
    }

    /// Load a table from a file.
    ///
    /// Accepts a JSON array of strings, or plain text with one label per line
    /// (blank lines skipped).
    pub fn from_file(path: &Path) -> InferenceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> InferenceResult<Self> {
        let trimmed = content.trim_start();
        let table = if trimmed.starts_with('[') {
            let labels: Vec<String> = serde_json::from_str(trimmed)?;
            Self { labels }
        } else {
            Self::new(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty()),
            )
        };

        if table.is_empty() {
            return Err(InferenceError::Labels("label table is empty".to_string()));
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Label for `index`, or `"Unknown"` when the index is out of range.
    pub fn label_for(&self, index: usize) -> &str {
        self.get(index).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_sizes() {
        assert_eq!(ClassLabelTable::builtin(LabelSet::Server).len(), 80);
        assert_eq!(ClassLabelTable::builtin(LabelSet::Ensemble).len(), 97);
    }

    #[test]
    fn test_builtin_positions() {
        let server = ClassLabelTable::builtin(LabelSet::Server);
        assert_eq!(server.get(0), Some("Aloevera"));
        assert_eq!(server.get(49), Some("Neem"));
        assert_eq!(server.get(79), Some("kepala"));

        let ensemble = ClassLabelTable::builtin(LabelSet::Ensemble);
        assert_eq!(ensemble.get(4), Some("Arive-Dantu"));
        assert_eq!(ensemble.get(59), Some("Neem"));
        assert_eq!(ensemble.get(96), Some("kepala"));
    }

    #[test]
    fn test_out_of_range_is_unknown() {
        let table = ClassLabelTable::new(["a", "b"]);
        assert_eq!(table.label_for(1), "b");
        assert_eq!(table.label_for(2), UNKNOWN_LABEL);
        assert_eq!(table.label_for(usize::MAX), UNKNOWN_LABEL);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["Mint", "Neem", "Tulsi"]"#).unwrap();

        let table = ClassLabelTable::from_file(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2), Some("Tulsi"));
    }

    #[test]
    fn test_from_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Mint\n\n  Neem  \nTulsi").unwrap();

        let table = ClassLabelTable::from_file(file.path()).unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["Mint", "Neem", "Tulsi"]);
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ClassLabelTable::from_file(file.path()).unwrap_err();
        assert!(matches!(err, InferenceError::Labels(_)));
    }
}
