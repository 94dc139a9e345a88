use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Ordered list of the field names the classifier was trained on.
///
/// Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty lists, blank names and duplicates.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            bail!("feature schema is empty");
        }

        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                bail!("feature schema entry {} is blank", i);
            }
            if index.insert(name.clone(), i).is_some() {
                bail!("feature schema lists '{}' more than once", name);
            }
        }

        Ok(Self { names, index })
    }

    /// Load the schema from a JSON list file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read feature list at {}", path.display()))?;
        let names: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse feature list in {}", path.display()))?;
        Self::new(names).with_context(|| format!("Invalid feature list in {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a field, exact-case.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positions_follow_order() {
        let schema = FeatureSchema::new(names(&["LIMIT_BAL", "AGE", "avg_pay_amt"])).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.position("LIMIT_BAL"), Some(0));
        assert_eq!(schema.position("avg_pay_amt"), Some(2));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let schema = FeatureSchema::new(names(&["AGE"])).unwrap();
        assert!(schema.contains("AGE"));
        assert!(!schema.contains("age"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = FeatureSchema::new(names(&["AGE", "LIMIT_BAL", "AGE"])).unwrap_err();
        assert!(err.to_string().contains("'AGE'"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(FeatureSchema::new(vec![]).is_err());
        assert!(FeatureSchema::new(names(&["AGE", " "])).is_err());
    }

    #[test]
    fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        fs::write(&path, r#"["LIMIT_BAL", "EDUCATION", "MARRIAGE", "AGE"]"#).unwrap();

        let schema = FeatureSchema::load(&path).unwrap();
        assert_eq!(schema.names(), &names(&["LIMIT_BAL", "EDUCATION", "MARRIAGE", "AGE"])[..]);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FeatureSchema::load(&path).is_err());
        assert!(FeatureSchema::load(&dir.path().join("missing.json")).is_err());
    }
}
