// Search vocabulary - the versioned asset the translation prompt is built from
//
// The default vocabulary is compiled in from assets/search_vocabulary.json and
// can be replaced at runtime with a file of the same shape.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const EMBEDDED_VOCABULARY: &str = include_str!("../../assets/search_vocabulary.json");

/// A backend field the model may reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldEntry {
    /// Exact backend field name (case-sensitive)
    pub name: String,
    /// Reminder about the exact spelling, e.g. "exact spacing"
    #[serde(default)]
    pub note: Option<String>,
    pub description: String,
    #[serde(default)]
    pub numeric: bool,
}

/// A two-letter product type code embedded in the design string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductType {
    /// Canonical (lowercase) code as stored in the data
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionEntry {
    pub name: String,
    pub usage: String,
}

/// Domain synonyms grouped by concept (shapes, metals, settings)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynonymGroup {
    pub title: String,
    #[serde(default)]
    pub intro: String,
    pub rules: Vec<String>,
}

/// A worked query → formula example
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkedExample {
    pub query: String,
    pub formula: String,
}

/// Static field vocabulary and prompt material
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldVocabulary {
    pub version: String,
    pub role: String,
    pub fields: Vec<FieldEntry>,
    /// Field holding the design string the type codes live in
    pub type_code_field: String,
    pub product_types: Vec<ProductType>,
    pub allowed_functions: Vec<FunctionEntry>,
    #[serde(default)]
    pub comparison_operators: Vec<String>,
    #[serde(default)]
    pub forbidden_functions: Vec<String>,
    #[serde(default)]
    pub synonym_groups: Vec<SynonymGroup>,
    #[serde(default)]
    pub generation_rules: Vec<String>,
    #[serde(default)]
    pub examples: Vec<WorkedExample>,
}

impl FieldVocabulary {
    /// The vocabulary shipped with the binary
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_VOCABULARY).context("Embedded search vocabulary is invalid")
    }

    /// Load a replacement vocabulary from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search vocabulary {:?}", path))?;
        let vocabulary = Self::from_json_str(&raw)
            .with_context(|| format!("Invalid search vocabulary {:?}", path))?;
        log::info!(
            "Loaded search vocabulary {} from {:?} ({} fields, {} examples)",
            vocabulary.version,
            path,
            vocabulary.fields.len(),
            vocabulary.examples.len()
        );
        Ok(vocabulary)
    }

    /// Embedded vocabulary unless a path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let vocabulary: Self = serde_json::from_str(raw).context("Failed to parse vocabulary JSON")?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            bail!("vocabulary declares no fields");
        }
        if !self.fields.iter().any(|f| f.name == self.type_code_field) {
            bail!(
                "type code field '{}' is not among the declared fields",
                self.type_code_field
            );
        }
        for product in &self.product_types {
            let code = &product.code;
            if code.chars().count() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()) {
                bail!(
                    "product type code '{}' must be two lowercase ASCII letters",
                    code
                );
            }
        }
        if self.allowed_functions.is_empty() {
            bail!("vocabulary declares no allowed functions");
        }
        Ok(())
    }

    /// Canonical product type codes, e.g. `["rn", "er", "nt"]`
    pub fn type_codes(&self) -> Vec<&str> {
        self.product_types.iter().map(|p| p.code.as_str()).collect()
    }
}
