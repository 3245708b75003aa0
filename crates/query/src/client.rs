use reqwest::header::{ACCEPT, USER_AGENT};
use results::row::DecodedRows;
use serde_json::Value;
use tracing::{debug, warn};

use crate::builder::suggestion_query;
use crate::error::QueryError;
use crate::sparql::{
    SPARQL_RESULTS_JSON, SparqlResponse, Suggestion, rows_from_bindings,
    suggestions_from_bindings,
};

pub const DEFAULT_ENDPOINT: &str = "https://query.wikidata.org/sparql";

pub fn default_user_agent() -> String {
    format!("wikidata-routes/{}", env!("CARGO_PKG_VERSION"))
}

/// Async client for a SPARQL endpoint speaking the JSON results format.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: String,
    user_agent: String,
}

impl SparqlClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            user_agent: default_user_agent(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs `query` and returns the bindings untouched.
    pub async fn run_raw(&self, query: &str) -> Result<Vec<Value>, QueryError> {
        debug!(endpoint = %self.endpoint, bytes = query.len(), "sparql request");
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query)])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| QueryError::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| QueryError::Http(e.to_string()))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "sparql endpoint returned an error");
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(SparqlResponse::from_json(&body)?.results.bindings)
    }

    pub async fn fetch_rows(&self, query: &str) -> Result<DecodedRows, QueryError> {
        let decoded = rows_from_bindings(self.run_raw(query).await?);
        if !decoded.rejected.is_empty() {
            warn!(
                rejected = decoded.rejected.len(),
                kept = decoded.rows.len(),
                "skipped unreadable bindings"
            );
        }
        Ok(decoded)
    }

    /// Category suggestions for `term`; the caller decides whether the term
    /// is long enough.
    pub async fn suggest(&self, term: &str) -> Result<Vec<Suggestion>, QueryError> {
        let bindings = self.run_raw(&suggestion_query(term)).await?;
        Ok(suggestions_from_bindings(&bindings))
    }
}
