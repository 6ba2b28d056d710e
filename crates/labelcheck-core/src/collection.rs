//! Collection resolution: which indexed collection a session targets.
//!
//! Primary documents are product labels. The product name in the filename
//! picks the collection; anything unrecognised lands in the default one.

use crate::defaults::{DEFAULT_COLLECTION, DEFAULT_END_PAGE};
use crate::models::CollectionBinding;

/// One row of the keyword table: any keyword hit maps to `collection_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub collection_id: String,
    pub end_page: u32,
}

impl KeywordRule {
    pub fn new(keywords: &[&str], collection_id: impl Into<String>, end_page: u32) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            collection_id: collection_id.into(),
            end_page,
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Ordered keyword table with a default fallback. First match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionResolver {
    rules: Vec<KeywordRule>,
    fallback: CollectionBinding,
}

impl Default for CollectionResolver {
    fn default() -> Self {
        Self::new(
            vec![
                KeywordRule::new(&["braftovi", "mektovi"], "label_poc_1", 1),
                KeywordRule::new(&["cibinqo", "abrocitinib"], "label_poc_2", 1),
                KeywordRule::new(&["prolia"], "label_poc_3", 1),
                KeywordRule::new(&["imlygic"], "label_poc_4", 1),
            ],
            CollectionBinding::new(DEFAULT_COLLECTION, DEFAULT_END_PAGE),
        )
    }
}

impl CollectionResolver {
    pub fn new(rules: Vec<KeywordRule>, fallback: CollectionBinding) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Map a filename to its collection. Total over all strings.
    pub fn resolve(&self, filename: &str) -> CollectionBinding {
        let lowered = filename.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| CollectionBinding::new(rule.collection_id.clone(), rule.end_page))
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// How a session picks its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionStrategy {
    /// Derived from the first primary document's filename.
    Keyword(CollectionResolver),
    /// Chosen up front by the user.
    Fixed(CollectionBinding),
}

impl Default for CollectionStrategy {
    fn default() -> Self {
        Self::Keyword(CollectionResolver::default())
    }
}

impl CollectionStrategy {
    /// Binding for a batch whose first primary document is `first_filename`.
    pub fn binding_for(&self, first_filename: &str) -> CollectionBinding {
        match self {
            Self::Keyword(resolver) => resolver.resolve(first_filename),
            Self::Fixed(binding) => binding.clone(),
        }
    }

    /// Binding known without seeing any document.
    pub fn preselected(&self) -> Option<&CollectionBinding> {
        match self {
            Self::Keyword(_) => None,
            Self::Fixed(binding) => Some(binding),
        }
    }
}
