//! Rule catalog
//!
//! Rule tables are embedded YAML documents, one per category, compiled once
//! per process. Any invalid pattern or template in any table fails the whole
//! load, so a broken catalog is caught before a single file is read.

use rebrand_core::{ConfigError, RuleDef, RuleSet};
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::category::Category;

/// Errors that can occur when loading or querying the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown rule category '{name}' (known: {known}, all)")]
    UnknownCategory { name: String, known: String },

    #[error("failed to parse {category} rule table: {source}")]
    Yaml {
        category: Category,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Rule(#[from] ConfigError),
}

#[derive(Debug, Deserialize)]
struct RuleTable {
    description: String,
    rules: Vec<RuleDef>,
}

/// Compiled rules of one category
#[derive(Debug, Clone)]
pub struct CategoryRules {
    pub category: Category,
    pub description: String,
    pub rules: RuleSet,
}

/// All categories with their compiled rules, in catalog order
#[derive(Debug)]
pub struct Catalog {
    categories: Vec<CategoryRules>,
}

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// The embedded catalog, compiled on first use
    pub fn builtin() -> Result<&'static Catalog, CatalogError> {
        if let Some(catalog) = BUILTIN.get() {
            return Ok(catalog);
        }
        let catalog = Self::from_sources(Category::ALL.iter().map(|c| (*c, c.source())))?;
        Ok(BUILTIN.get_or_init(|| catalog))
    }

    /// Compile a catalog from YAML rule tables
    pub fn from_sources<'a, I>(sources: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (Category, &'a str)>,
    {
        let mut categories = Vec::new();
        for (category, yaml) in sources {
            let table: RuleTable = serde_yaml::from_str(yaml)
                .map_err(|source| CatalogError::Yaml { category, source })?;
            let rules = RuleSet::compile([(category.name(), table.rules)])?;
            categories.push(CategoryRules {
                category,
                description: table.description,
                rules,
            });
        }
        Ok(Self { categories })
    }

    /// Concatenate the rules of `categories` in the order given
    pub fn rules_for(&self, categories: &[Category]) -> RuleSet {
        let mut set = RuleSet::default();
        let mut seen: Vec<Category> = Vec::new();
        for category in categories {
            if seen.contains(category) {
                continue;
            }
            seen.push(*category);
            if let Some(entry) = self.get(*category) {
                set.extend(entry.rules.clone());
            }
        }
        set
    }

    /// Like [`Catalog::rules_for`], resolving names first (`all` allowed)
    pub fn rules_for_names<S: AsRef<str>>(&self, names: &[S]) -> Result<RuleSet, CatalogError> {
        let categories = Category::resolve(names)?;
        Ok(self.rules_for(&categories))
    }

    pub fn get(&self, category: Category) -> Option<&CategoryRules> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Categories with description and rule count (for --list-rules)
    pub fn list(&self) -> Vec<(Category, &str, usize)> {
        self.categories
            .iter()
            .map(|c| (c.category, c.description.as_str(), c.rules.len()))
            .collect()
    }
}
