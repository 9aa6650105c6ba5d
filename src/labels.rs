//! Entity label mapping.
//!
//! Maps fine-grained entity types (as produced by the annotation backend) to the
//! coarse tags written in the output. Entity types missing from the table are not
//! merged, and their tokens fall back to their part-of-speech tag.
//!
//! The table is built once at startup and shared read-only between workers.
use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use log::debug;

use crate::error::Error;

/// Default mapping: named entities collapse to `ENT`,
/// numeric/temporal entities keep their own tag.
const DEFAULT_LABELS: [(&str, &str); 19] = [
    ("ENT", "ENT"),
    ("PERSON", "ENT"),
    ("NORP", "ENT"),
    ("FAC", "ENT"),
    ("ORG", "ENT"),
    ("GPE", "ENT"),
    ("LOC", "ENT"),
    ("LAW", "ENT"),
    ("PRODUCT", "ENT"),
    ("EVENT", "ENT"),
    ("WORK_OF_ART", "ENT"),
    ("LANGUAGE", "ENT"),
    ("DATE", "DATE"),
    ("TIME", "TIME"),
    ("PERCENT", "PERCENT"),
    ("MONEY", "MONEY"),
    ("QUANTITY", "QUANTITY"),
    ("ORDINAL", "ORDINAL"),
    ("CARDINAL", "CARDINAL"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels(HashMap<String, String>);

impl Labels {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self(table)
    }

    /// Load a table from a JSON object (`{"PERSON": "ENT", ...}`).
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let f = File::open(path)?;
        let table: HashMap<String, String> = serde_json::from_reader(BufReader::new(f))?;
        debug!("loaded {} labels from {:?}", table.len(), path);
        Ok(Self(table))
    }

    /// Get the output tag of an entity type.
    /// Empty entity types never match.
    pub fn get(&self, ent_type: &str) -> Option<&str> {
        if ent_type.is_empty() {
            return None;
        }
        self.0.get(ent_type).map(String::as_str)
    }

    pub fn contains(&self, ent_type: &str) -> bool {
        self.get(ent_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self(
            DEFAULT_LABELS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_table() {
        let labels = Labels::default();
        assert_eq!(labels.len(), 19);
        assert_eq!(labels.get("PERSON"), Some("ENT"));
        assert_eq!(labels.get("GPE"), Some("ENT"));
        assert_eq!(labels.get("MONEY"), Some("MONEY"));
        assert_eq!(labels.get("MISC"), None);
        assert_eq!(labels.get(""), None);
    }

    #[test]
    fn from_path() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"PER": "ENT", "LOC": "PLACE"}}"#).unwrap();
        let labels = Labels::from_path(f.path()).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("LOC"), Some("PLACE"));
        assert!(!labels.contains("PERSON"));
    }

    #[test]
    fn from_path_invalid() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"["not", "a", "map"]"#).unwrap();
        assert!(matches!(Labels::from_path(f.path()), Err(Error::Serde(_))));
    }
}
