use crate::core::Result;
use crate::utils::error::RvcError;
use serde::Deserialize;

const GLOSSARY_TOML: &str = include_str!("../../assets/glossary.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Glossary {
    #[serde(rename = "category", default)]
    pub categories: Vec<GlossaryCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlossaryCategory {
    pub name: String,
    #[serde(rename = "term", default)]
    pub terms: Vec<GlossaryTerm>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GlossaryTerm {
    pub name: String,
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
}

impl GlossaryTerm {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.definition.to_lowercase().contains(needle)
    }
}

impl Glossary {
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(GLOSSARY_TOML)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RvcError::Config {
            field: "glossary".to_string(),
            message: format!("Failed to parse glossary: {}", e),
        })
    }

    /// Terms whose name or definition contains `filter`, case-insensitively.
    /// Categories keep their order; empty ones are dropped.
    pub fn search(&self, filter: &str) -> Vec<GlossaryCategory> {
        let needle = filter.trim().to_lowercase();
        self.categories
            .iter()
            .filter_map(|category| {
                let terms: Vec<GlossaryTerm> = category
                    .terms
                    .iter()
                    .filter(|t| needle.is_empty() || t.matches(&needle))
                    .cloned()
                    .collect();
                (!terms.is_empty()).then(|| GlossaryCategory {
                    name: category.name.clone(),
                    terms,
                })
            })
            .collect()
    }
}
