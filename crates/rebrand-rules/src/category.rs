//! The closed set of rule categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogError;

/// A named, ordered group of related rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Css,
    Component,
    Action,
    Service,
    Types,
    Function,
    Import,
    String,
    React,
    Fixups,
}

impl Category {
    /// Every category, in catalog order (the order `all` expands to)
    pub const ALL: [Category; 10] = [
        Category::Css,
        Category::Component,
        Category::Action,
        Category::Service,
        Category::Types,
        Category::Function,
        Category::Import,
        Category::String,
        Category::React,
        Category::Fixups,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Css => "css",
            Category::Component => "component",
            Category::Action => "action",
            Category::Service => "service",
            Category::Types => "types",
            Category::Function => "function",
            Category::Import => "import",
            Category::String => "string",
            Category::React => "react",
            Category::Fixups => "fixups",
        }
    }

    /// Embedded YAML rule table for this category
    pub(crate) fn source(self) -> &'static str {
        match self {
            Category::Css => include_str!("../catalog/css.yaml"),
            Category::Component => include_str!("../catalog/component.yaml"),
            Category::Action => include_str!("../catalog/action.yaml"),
            Category::Service => include_str!("../catalog/service.yaml"),
            Category::Types => include_str!("../catalog/types.yaml"),
            Category::Function => include_str!("../catalog/function.yaml"),
            Category::Import => include_str!("../catalog/import.yaml"),
            Category::String => include_str!("../catalog/string.yaml"),
            Category::React => include_str!("../catalog/react.yaml"),
            Category::Fixups => include_str!("../catalog/fixups.yaml"),
        }
    }

    /// Resolve category names in the order given. `all` expands to every
    /// category in catalog order; repeated categories keep their first
    /// position.
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Vec<Category>, CatalogError> {
        let mut resolved: Vec<Category> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            let expanded: Vec<Category> = if name == "all" {
                Category::ALL.to_vec()
            } else {
                vec![name.parse()?]
            };
            for category in expanded {
                if !resolved.contains(&category) {
                    resolved.push(category);
                }
            }
        }
        Ok(resolved)
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| CatalogError::UnknownCategory {
                name: s.to_string(),
                known: Category::ALL.map(Category::name).join(", "),
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
