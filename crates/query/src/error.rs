#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Submitted without picking a category from the suggestions.
    MissingCategory,
    InvalidCategory(String),
    InvalidLimit(String),
    InvalidSort(String),
    Http(String),
    Status { status: u16, body: String },
    Decode(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::MissingCategory => {
                write!(f, "please select an option from the suggestions")
            }
            QueryError::InvalidCategory(id) => write!(f, "not a Wikidata item id: {id:?}"),
            QueryError::InvalidLimit(v) => write!(f, "invalid result limit: {v:?}"),
            QueryError::InvalidSort(v) => write!(f, "unknown sort option: {v:?}"),
            QueryError::Http(msg) => write!(f, "sparql request failed: {msg}"),
            QueryError::Status { status, body } => {
                write!(f, "sparql endpoint answered {status}: {body}")
            }
            QueryError::Decode(msg) => write!(f, "unreadable sparql response: {msg}"),
        }
    }
}

impl std::error::Error for QueryError {}
