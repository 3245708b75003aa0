//! SPARQL side of the provenance map: query text, search-form state,
//! suggestion handling and the endpoint client.

pub mod builder;
#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod search;
pub mod sparql;

pub use builder::*;
#[cfg(feature = "client")]
pub use client::*;
pub use error::*;
pub use search::*;
pub use sparql::*;
