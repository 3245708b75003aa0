//! Route/marker reconciliation for the provenance map.
//!
//! [`RouteMap`] owns every piece of map state: origin markers, drawn routes,
//! the route → result-row mapping and pending highlight reverts. The map
//! itself sits behind [`MapSurface`] and the result list behind
//! [`ResultSelection`], both injected at construction.

pub mod config;
pub mod highlight;
pub mod memory;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod surface;

#[cfg(test)]
mod testing;

pub use config::*;
pub use highlight::*;
pub use memory::*;
pub use pipeline::*;
pub use registry::*;
pub use render::*;
pub use surface::*;
