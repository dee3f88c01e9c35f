use serde::{Deserialize, Serialize};

/// Category every item falls into when no keyword entry claims its title.
pub const GENERAL_CATEGORY: &str = "general";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct TaxonomyEntry {
    category: String,
    keywords: Vec<String>,
}

/// Keyword-to-category table used by category conditions.
///
/// Injected into the engine as an immutable value so merchants can swap their
/// own taxonomy without touching evaluation code. Entries are checked in
/// order; the first keyword found in the item title wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTaxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl CategoryTaxonomy {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<K>)>,
        K: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(category, keywords)| TaxonomyEntry {
                    category: category.into(),
                    keywords: keywords
                        .into_iter()
                        .map(|keyword| keyword.into().to_lowercase())
                        .collect(),
                })
                .collect(),
        }
    }

    /// Map an item title to its category, falling back to `general`.
    pub fn categorize(&self, title: &str) -> &str {
        let normalized = title.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.keywords.iter().any(|keyword| normalized.contains(keyword)))
            .map(|entry| entry.category.as_str())
            .unwrap_or(GENERAL_CATEGORY)
    }

    pub fn is_known_category(&self, category: &str) -> bool {
        category == GENERAL_CATEGORY
            || self.entries.iter().any(|entry| entry.category == category)
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self::new([
            ("coffee", vec!["coffee", "espresso", "latte", "cappuccino", "cold brew"]),
            ("tea", vec!["tea", "matcha", "chai", "oolong"]),
            ("drinkware", vec!["mug", "cup", "tumbler", "bottle", "flask"]),
            ("apparel", vec!["shirt", "hoodie", "tee", "jacket", "cap", "sock"]),
            ("electronics", vec!["charger", "cable", "headphone", "speaker", "adapter"]),
            ("fitness", vec!["yoga", "dumbbell", "kettlebell", "protein", "resistance"]),
            ("beauty", vec!["serum", "lotion", "shampoo", "balm", "cleanser"]),
        ])
    }
}
