use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Top-level item grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Second-level grouping, owned by exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: String,
    pub name: String,
    pub category_id: String,
}

/// Fixed category/subcategory configuration. Built once at startup and shared
/// by reference; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    let cat = |id: &str, name: &str| Category {
        id: id.to_string(),
        name: name.to_string(),
    };
    let sub = |id: &str, name: &str, category_id: &str| Subcategory {
        id: id.to_string(),
        name: name.to_string(),
        category_id: category_id.to_string(),
    };

    Catalog {
        categories: vec![
            cat("cat-1", "Računarske komponente"),
            cat("cat-2", "Periferija"),
            cat("cat-3", "Mreža"),
            cat("cat-4", "Ostalo"),
        ],
        subcategories: vec![
            sub("sub-1", "CPU", "cat-1"),
            sub("sub-2", "MBO", "cat-1"),
            sub("sub-3", "RAM", "cat-1"),
            sub("sub-4", "PSU", "cat-1"),
            sub("sub-5", "GPU", "cat-1"),
            sub("sub-6", "SSD", "cat-1"),
            sub("sub-7", "HDD", "cat-1"),
            sub("sub-8", "Miševi", "cat-2"),
            sub("sub-9", "Monitori", "cat-2"),
            sub("sub-10", "Tastature", "cat-2"),
            sub("sub-11", "Slušalice", "cat-2"),
            sub("sub-12", "Ruteri", "cat-3"),
            sub("sub-13", "Switchevi", "cat-3"),
            sub("sub-14", "Kamere", "cat-4"),
        ],
    }
});

impl Catalog {
    /// The bundled stock-room configuration.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn new(categories: Vec<Category>, subcategories: Vec<Subcategory>) -> Self {
        Self {
            categories,
            subcategories,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn subcategories(&self) -> &[Subcategory] {
        &self.subcategories
    }

    /// Subcategories belonging to the given category, in configuration order.
    pub fn subcategories_of(&self, category_id: &str) -> Vec<Subcategory> {
        self.subcategories
            .iter()
            .filter(|sub| sub.category_id == category_id)
            .cloned()
            .collect()
    }

    /// Display name for a category id; unknown ids resolve to an empty string.
    pub fn category_name(&self, category_id: &str) -> &str {
        self.categories
            .iter()
            .find(|cat| cat.id == category_id)
            .map(|cat| cat.name.as_str())
            .unwrap_or("")
    }

    /// Display name for a subcategory id; unknown ids resolve to an empty string.
    pub fn subcategory_name(&self, subcategory_id: &str) -> &str {
        self.subcategories
            .iter()
            .find(|sub| sub.id == subcategory_id)
            .map(|sub| sub.name.as_str())
            .unwrap_or("")
    }

    pub fn has_category(&self, category_id: &str) -> bool {
        self.categories.iter().any(|cat| cat.id == category_id)
    }

    /// True when the subcategory exists and is parented to the given category.
    pub fn subcategory_belongs_to(&self, subcategory_id: &str, category_id: &str) -> bool {
        self.subcategories
            .iter()
            .any(|sub| sub.id == subcategory_id && sub.category_id == category_id)
    }
}
