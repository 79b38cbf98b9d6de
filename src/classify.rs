//! Marks exported functions as required, optional or removed.

use crate::model::{Classification, FunctionDef};

/// Names matched exactly plus keywords matched as substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    pub names: Vec<String>,
    pub keywords: Vec<String>,
}

impl KeywordSet {
    /// Build from comma-separated lists. Empty entries are ignored.
    pub fn from_lists(keywords: &str, names: &str) -> Self {
        KeywordSet {
            names: split_list(names),
            keywords: split_list(keywords),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name) || self.keywords.iter().any(|k| name.contains(k.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.keywords.is_empty()
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Removal is checked first, so a name matching both sets is `Removed`.
pub fn classification_for(name: &str, optional: &KeywordSet, remove: &KeywordSet) -> Classification {
    if remove.matches(name) {
        Classification::Removed
    } else if optional.matches(name) {
        Classification::Optional
    } else {
        Classification::Required
    }
}

pub fn classify(functions: &mut [FunctionDef], optional: &KeywordSet, remove: &KeywordSet) {
    for func in functions.iter_mut() {
        func.classification = classification_for(&func.name, optional, remove);
    }
}
