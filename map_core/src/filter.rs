use std::collections::BTreeSet;

use map_runtime::{category_keys, LocationRecord, DEFAULT_DIMENSION};

/// Active dimension plus the set of enabled category keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    current_dimension: String,
    active_categories: BTreeSet<String>,
}

impl Default for FilterPredicate {
    /// Overworld with every registry category enabled.
    fn default() -> Self {
        Self {
            current_dimension: DEFAULT_DIMENSION.to_string(),
            active_categories: category_keys().map(str::to_string).collect(),
        }
    }
}

impl FilterPredicate {
    pub fn new<I, S>(dimension: &str, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            current_dimension: normalize(dimension),
            active_categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn current_dimension(&self) -> &str {
        &self.current_dimension
    }

    pub fn set_dimension(&mut self, dimension: &str) {
        self.current_dimension = normalize(dimension);
    }

    /// Flip one category. Returns whether it is active afterwards.
    pub fn toggle_category(&mut self, key: &str) -> bool {
        if self.active_categories.remove(key) {
            false
        } else {
            self.active_categories.insert(key.to_string());
            true
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active_categories.contains(key)
    }

    pub fn active_categories(&self) -> impl Iterator<Item = &str> {
        self.active_categories.iter().map(String::as_str)
    }

    pub fn matches(&self, record: &LocationRecord) -> bool {
        record.dimension == self.current_dimension && self.is_active(&record.category)
    }
}

fn normalize(dimension: &str) -> String {
    dimension.trim().to_lowercase()
}

/// Records matching `predicate`, in their original order.
pub fn visible<'a>(
    records: &'a [LocationRecord],
    predicate: &FilterPredicate,
) -> Vec<&'a LocationRecord> {
    records
        .iter()
        .filter(|record| predicate.matches(record))
        .collect()
}
