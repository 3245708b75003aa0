use serde::{Deserialize, Serialize};

use crate::builder::{CategoryId, SortOrder, build_query, parse_limit};
use crate::error::QueryError;
use crate::sparql::Suggestion;

/// State of the search form: free text, the category picked from the
/// suggestions, and the sort/limit options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub term: String,
    /// Set only by picking a suggestion.
    pub category: Option<CategoryId>,
    pub sort: SortOrder,
    pub limit: Option<u32>,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picking a suggestion fills the input with its label.
    pub fn choose(&mut self, suggestion: &Suggestion) {
        self.term = suggestion.label.clone();
        self.category = Some(suggestion.id.clone());
    }

    pub fn set_options(&mut self, sort: &str, limit: &str) -> Result<(), QueryError> {
        self.sort = sort.parse()?;
        self.limit = parse_limit(limit)?;
        Ok(())
    }

    /// The query for the current form. Nothing is sent without a category.
    pub fn submit(&self) -> Result<String, QueryError> {
        let category = self.category.as_ref().ok_or(QueryError::MissingCategory)?;
        Ok(build_query(category, self.sort, self.limit))
    }
}
