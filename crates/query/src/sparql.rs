use results::row::{DecodedRows, decode_bindings};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::CategoryId;
use crate::error::QueryError;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// The parts of a SPARQL JSON results document this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlResponse {
    pub results: SparqlResults,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub bindings: Vec<Value>,
}

impl SparqlResponse {
    pub fn from_json(text: &str) -> Result<Self, QueryError> {
        serde_json::from_str(text).map_err(|e| QueryError::Decode(e.to_string()))
    }
}

/// Decodes bindings into result rows. Bindings are kept verbatim by the
/// server, so this is also how browser code reads a `/query` response.
/// A binding that does not fit the row shape is skipped, not fatal.
pub fn rows_from_bindings(bindings: Vec<Value>) -> DecodedRows {
    decode_bindings(bindings)
}

/// One entry of the category autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: CategoryId,
    pub label: String,
}

/// Reads `?class ?classLabel` bindings. Classes whose IRI does not end in an
/// item id are dropped.
pub fn suggestions_from_bindings(bindings: &[Value]) -> Vec<Suggestion> {
    bindings
        .iter()
        .filter_map(|b| {
            let iri = b.get("class")?.get("value")?.as_str()?;
            let label = b.get("classLabel")?.get("value")?.as_str()?;
            let id = CategoryId::from_iri(iri).ok()?;
            Some(Suggestion {
                id,
                label: label.to_string(),
            })
        })
        .collect()
}

/// Input shorter than this clears the suggestions instead of fetching.
pub const MIN_SUGGESTION_CHARS: usize = 3;

/// Quiet period after the last keystroke before suggestions are fetched.
pub const SUGGESTION_DEBOUNCE_S: f64 = 0.4;

/// The trimmed term worth looking up, if any.
pub fn suggestion_term(input: &str) -> Option<&str> {
    let term = input.trim();
    (term.chars().count() >= MIN_SUGGESTION_CHARS).then_some(term)
}

#[cfg(test)]
mod tests {
    use super::{SparqlResponse, rows_from_bindings, suggestion_term, suggestions_from_bindings};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn suggestions_take_the_iri_tail_as_id() {
        let bindings = vec![
            json!({
                "class": {"type": "uri", "value": "http://www.wikidata.org/entity/Q3305213"},
                "classLabel": {"type": "literal", "value": "painting", "xml:lang": "en"}
            }),
            json!({
                "class": {"type": "uri", "value": "http://example.org/not-an-item"},
                "classLabel": {"type": "literal", "value": "odd"}
            }),
            json!({"classLabel": {"type": "literal", "value": "no class"}}),
        ];
        let found = suggestions_from_bindings(&bindings);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "Q3305213");
        assert_eq!(found[0].label, "painting");
    }

    #[test]
    fn terms_need_three_characters() {
        assert_eq!(suggestion_term("  pa "), None);
        assert_eq!(suggestion_term(" pai "), Some("pai"));
        assert_eq!(suggestion_term("äöü"), Some("äöü"));
    }

    #[test]
    fn decodes_results_document() {
        let doc = json!({
            "head": {"vars": ["item"]},
            "results": {"bindings": [{
                "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q1"},
                "originCoordinates": {"type": "literal", "value": "Point(1.5 2.5)"},
                "currentLocationCoordinates": {"type": "literal", "value": "Point(3 4)"}
            }]}
        });
        let response = SparqlResponse::from_json(&doc.to_string()).expect("decode");
        let decoded = rows_from_bindings(response.results.bindings);
        let rows = decoded.rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_uri(), "http://www.wikidata.org/entity/Q1");
        assert_eq!(rows[0].origin_point().map(|p| (p.lat, p.lon)), Some((2.5, 1.5)));

        assert!(SparqlResponse::from_json("{").is_err());
    }

    #[test]
    fn malformed_binding_does_not_sink_the_response() {
        let doc = json!({
            "results": {"bindings": [
                {
                    "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q1"},
                    "originCoordinates": {"type": "literal", "value": "Point(1.5 2.5)"}
                },
                {
                    "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q2"},
                    "originCoordinates": {"type": "literal"}
                },
                {"item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q3"}}
            ]}
        });
        let response = SparqlResponse::from_json(&doc.to_string()).expect("decode");
        let decoded = rows_from_bindings(response.results.bindings);
        let uris: Vec<&str> = decoded.rows.iter().map(|r| r.item_uri()).collect();
        assert_eq!(
            uris,
            vec![
                "http://www.wikidata.org/entity/Q1",
                "http://www.wikidata.org/entity/Q3"
            ]
        );
        assert_eq!(decoded.rejected, vec![1]);
    }
}
