use foundation::geo::GeoPoint;
use foundation::ids::RouteKey;
use foundation::literal::parse_point_literal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_ORIGIN_LABEL: &str = "Origin";
pub const DEFAULT_DESTINATION_LABEL: &str = "Destination";

/// One SPARQL JSON result binding (`{"type": "uri", "value": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Binding {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: Some("uri".to_string()),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: Some("literal".to_string()),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

/// One query result: an entity, where it came from and where it is now.
///
/// Every binding is optional; the query service omits unbound variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_label: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_label: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_coordinates: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location_label: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location_coordinates: Option<Binding>,
}

impl ResultRow {
    pub fn with_item(mut self, uri: impl Into<String>) -> Self {
        self.item = Some(Binding::uri(uri));
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.item_label = Some(Binding::literal(label));
        self
    }

    pub fn with_origin(mut self, label: impl Into<String>, point_literal: impl Into<String>) -> Self {
        self.origin_label = Some(Binding::literal(label));
        self.origin_coordinates = Some(Binding::literal(point_literal));
        self
    }

    pub fn with_destination(
        mut self,
        label: impl Into<String>,
        point_literal: impl Into<String>,
    ) -> Self {
        self.current_location_label = Some(Binding::literal(label));
        self.current_location_coordinates = Some(Binding::literal(point_literal));
        self
    }

    pub fn item_uri(&self) -> &str {
        binding_text(&self.item)
    }

    pub fn item_label(&self) -> Option<&str> {
        self.item_label.as_ref().map(|b| b.value.as_str())
    }

    pub fn origin_label(&self) -> &str {
        label_or(&self.origin_label, DEFAULT_ORIGIN_LABEL)
    }

    pub fn destination_label(&self) -> &str {
        label_or(&self.current_location_label, DEFAULT_DESTINATION_LABEL)
    }

    pub fn origin_point(&self) -> Option<GeoPoint> {
        parse_point_literal(&self.origin_coordinates.as_ref()?.value)
    }

    pub fn destination_point(&self) -> Option<GeoPoint> {
        parse_point_literal(&self.current_location_coordinates.as_ref()?.value)
    }

    /// Both endpoints, or `None` if either literal does not parse.
    pub fn endpoints(&self) -> Option<(GeoPoint, GeoPoint)> {
        Some((self.origin_point()?, self.destination_point()?))
    }

    pub fn route_key(&self) -> Option<RouteKey> {
        self.endpoints()
            .map(|(origin, destination)| RouteKey::between(origin, destination))
    }
}

fn binding_text(b: &Option<Binding>) -> &str {
    b.as_ref().map(|b| b.value.trim()).unwrap_or("")
}

fn label_or<'a>(b: &'a Option<Binding>, fallback: &'a str) -> &'a str {
    match b {
        Some(b) if !b.value.is_empty() => b.value.as_str(),
        _ => fallback,
    }
}

/// A deduplicated row with its position in the displayed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedRow {
    #[serde(rename = "fixedIndex")]
    pub fixed_index: usize,
    #[serde(flatten)]
    pub row: ResultRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowsError {
    Json(String),
    /// Valid JSON that is neither a bindings array nor a results document.
    Shape(&'static str),
}

impl std::fmt::Display for RowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowsError::Json(msg) => write!(f, "invalid result rows: {msg}"),
            RowsError::Shape(found) => write!(
                f,
                "expected a bindings array or a SPARQL results document, found {found}"
            ),
        }
    }
}

impl std::error::Error for RowsError {}

/// Rows decoded one binding at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRows {
    pub rows: Vec<ResultRow>,
    /// Input positions of bindings that did not fit the row shape.
    pub rejected: Vec<usize>,
}

/// Decodes each binding on its own; a malformed one is logged and left out
/// without affecting the rest.
pub fn decode_bindings(bindings: impl IntoIterator<Item = Value>) -> DecodedRows {
    let mut out = DecodedRows::default();
    for (pos, binding) in bindings.into_iter().enumerate() {
        match serde_json::from_value::<ResultRow>(binding) {
            Ok(row) => out.rows.push(row),
            Err(err) => {
                debug!(position = pos, error = %err, "dropping unreadable binding");
                out.rejected.push(pos);
            }
        }
    }
    out
}

/// Reads result rows from either a bare bindings array (what the proxy
/// returns) or a full SPARQL JSON results document.
pub fn rows_from_json(text: &str) -> Result<DecodedRows, RowsError> {
    let doc: Value = serde_json::from_str(text).map_err(|e| RowsError::Json(e.to_string()))?;
    let bindings = match doc {
        Value::Array(items) => items,
        Value::Object(mut map) => match map
            .get_mut("results")
            .and_then(|r| r.get_mut("bindings"))
            .map(Value::take)
        {
            Some(Value::Array(items)) => items,
            _ => return Err(RowsError::Shape("an object without results.bindings")),
        },
        Value::Null => return Err(RowsError::Shape("null")),
        Value::Bool(_) => return Err(RowsError::Shape("a boolean")),
        Value::Number(_) => return Err(RowsError::Shape("a number")),
        Value::String(_) => return Err(RowsError::Shape("a string")),
    };
    Ok(decode_bindings(bindings))
}

#[cfg(test)]
mod tests {
    use super::{IndexedRow, ResultRow, RowsError, rows_from_json};
    use foundation::geo::GeoPoint;
    use pretty_assertions::assert_eq;

    const BINDING: &str = r#"{
        "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q12418"},
        "itemLabel": {"xml:lang": "en", "type": "literal", "value": "Mona Lisa"},
        "originLabel": {"xml:lang": "en", "type": "literal", "value": "Italy"},
        "originCoordinates": {
            "datatype": "http://www.opengis.net/ont/geosparql#wktLiteral",
            "type": "literal",
            "value": "Point(12.5 42.5)"
        },
        "currentLocationLabel": {"type": "literal", "value": "Louvre"},
        "currentLocationCoordinates": {"type": "literal", "value": "Point(2.3375 48.861111111)"}
    }"#;

    #[test]
    fn reads_bare_bindings_array() {
        let decoded = rows_from_json(&format!("[{BINDING}]")).expect("rows");
        assert!(decoded.rejected.is_empty());
        let row = &decoded.rows[0];
        assert_eq!(row.item_uri(), "http://www.wikidata.org/entity/Q12418");
        assert_eq!(row.item_label(), Some("Mona Lisa"));
        assert_eq!(row.origin_point(), Some(GeoPoint::new(42.5, 12.5)));
        assert_eq!(
            row.destination_point(),
            Some(GeoPoint::new(48.861111111, 2.3375))
        );
        assert_eq!(row.origin.as_ref(), None);
    }

    #[test]
    fn reads_full_results_document() {
        let doc = format!(r#"{{"head": {{"vars": []}}, "results": {{"bindings": [{BINDING}]}}}}"#);
        let decoded = rows_from_json(&doc).expect("rows");
        assert_eq!(decoded.rows.len(), 1);
    }

    #[test]
    fn one_bad_binding_leaves_the_others() {
        let broken = r#"{
            "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q2"},
            "originCoordinates": {"type": "literal"}
        }"#;
        let decoded = rows_from_json(&format!("[{BINDING}, {broken}, {BINDING}]")).expect("rows");
        assert_eq!(decoded.rows.len(), 2);
        assert_eq!(decoded.rejected, vec![1]);
        assert_eq!(decoded.rows[0].item_label(), Some("Mona Lisa"));

        let doc = format!(r#"{{"results": {{"bindings": [{broken}, {BINDING}]}}}}"#);
        let decoded = rows_from_json(&doc).expect("rows");
        assert_eq!(decoded.rows.len(), 1);
        assert_eq!(decoded.rejected, vec![0]);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            rows_from_json("{\"nope\": 1}"),
            Err(RowsError::Shape("an object without results.bindings"))
        );
        assert_eq!(rows_from_json("42"), Err(RowsError::Shape("a number")));
        assert!(matches!(rows_from_json("not json"), Err(RowsError::Json(_))));
    }

    #[test]
    fn labels_fall_back_to_defaults() {
        let row = ResultRow::default();
        assert_eq!(row.origin_label(), "Origin");
        assert_eq!(row.destination_label(), "Destination");
        assert_eq!(row.item_uri(), "");
        assert_eq!(row.route_key(), None);
    }

    #[test]
    fn route_key_requires_both_endpoints() {
        let row = ResultRow::default()
            .with_origin("X", "Point(0 0)")
            .with_destination("Y", "not a point");
        assert_eq!(row.endpoints(), None);

        let row = row.with_destination("Y", "Point(1 1)");
        assert_eq!(row.route_key().map(|k| k.to_string()), Some("0,0→1,1".to_string()));
    }

    #[test]
    fn indexed_row_serializes_flat() {
        let row = IndexedRow {
            fixed_index: 3,
            row: ResultRow::default().with_item("urn:a"),
        };
        let json = serde_json::to_value(&row).expect("json");
        assert_eq!(json["fixedIndex"], 3);
        assert_eq!(json["item"]["value"], "urn:a");
    }
}
