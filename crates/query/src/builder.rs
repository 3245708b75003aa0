use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Suggestions returned per lookup.
pub const SUGGESTION_LIMIT: usize = 10;

/// Origin properties: country of origin, place of creation, location of
/// discovery.
pub const ORIGIN_PROPERTIES: [&str; 3] = ["wdt:P495", "wdt:P1071", "wdt:P189"];

/// A Wikidata item id such as `Q3305213`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl CategoryId {
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let text = text.trim();
        let digits = text.strip_prefix('Q').unwrap_or("");
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QueryError::InvalidCategory(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    /// Last path segment of an entity IRI, e.g.
    /// `http://www.wikidata.org/entity/Q3305213`.
    pub fn from_iri(iri: &str) -> Result<Self, QueryError> {
        Self::parse(iri.rsplit('/').next().unwrap_or(iri))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CategoryId {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CategoryId> for String {
    fn from(id: CategoryId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortOrder {
    fn clause(self) -> Option<&'static str> {
        match self {
            SortOrder::None => None,
            SortOrder::Ascending => Some("ORDER BY ?itemLabel"),
            SortOrder::Descending => Some("ORDER BY DESC(?itemLabel)"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    /// Form values: empty for no ordering.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(SortOrder::None),
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            other => Err(QueryError::InvalidSort(other.to_string())),
        }
    }
}

/// Parses the limit field; empty means no limit.
pub fn parse_limit(text: &str) -> Result<Option<u32>, QueryError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<u32>() {
        Ok(0) | Err(_) => Err(QueryError::InvalidLimit(text.to_string())),
        Ok(n) => Ok(Some(n)),
    }
}

/// Entities of `category` with a current location and an origin, both with
/// coordinates.
pub fn build_query(category: &CategoryId, sort: SortOrder, limit: Option<u32>) -> String {
    let mut query = format!(
        "SELECT ?item ?itemLabel \
?currentLocation ?currentLocationLabel ?currentLocationCoordinates \
?origin ?originLabel ?originCoordinates
WHERE {{
  ?item wdt:P31 wd:{category};
        wdt:P276 ?currentLocation;
        ?originProp ?origin.
  FILTER(?originProp IN ({origin_props}))

  ?currentLocation wdt:P625 ?currentLocationCoordinates.
  ?origin wdt:P625 ?originCoordinates.

  SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"en\". }}
}}",
        origin_props = ORIGIN_PROPERTIES.join(", "),
    );
    if let Some(clause) = sort.clause() {
        query.push('\n');
        query.push_str(clause);
    }
    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {limit}"));
    }
    query
}

/// Classes that have at least one entity with a location and an origin and
/// whose English label contains `term`, case-insensitively.
pub fn suggestion_query(term: &str) -> String {
    let needle = escape_literal(&term.trim().to_lowercase());
    format!(
        "SELECT DISTINCT ?class ?classLabel WHERE {{
  ?item wdt:P31 ?class;
        wdt:P276 ?location;
        ?originProp ?origin.
  FILTER(?originProp IN ({origin_props}))

  ?class rdfs:label ?classLabel.
  FILTER(CONTAINS(LCASE(?classLabel), \"{needle}\")).
  FILTER(LANG(?classLabel) = \"en\")
}}
LIMIT {SUGGESTION_LIMIT}",
        origin_props = ORIGIN_PROPERTIES.join(", "),
    )
}

/// Escapes a value for a double-quoted SPARQL string literal.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
