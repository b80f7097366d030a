//! Variable annuity income rider projection library
//!
//! This crate models a guaranteed lifetime withdrawal benefit (GLWB) rider on a
//! variable annuity contract. It supports:
//! - Extracting rider rate schedules from a carrier data payload
//! - Resolving a rider and income option to concrete parameters, with a
//!   built-in fallback product when no data is available
//! - Simulating account value and benefit base growth before activation
//! - Evaluating every candidate activation age and picking the one with the
//!   most lifetime income
//! - LIFO tax allocation of the resulting income stream
//!
//! ```ignore
//! use vaplan_core::{Assumptions, PolicyFacts, extract_catalog, resolve_parameters};
//! use vaplan_core::{run_projection, taxes::allocate_selected};
//!
//! let catalog = extract_catalog(&payload);
//! let params = resolve_parameters(catalog.as_ref(), Some("Polaris Income Max"), None);
//! let projection = run_projection(&params, &Assumptions::default(), &PolicyFacts::default());
//! let lifo = allocate_selected(&projection, None);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod catalog;
pub mod error;
pub mod optimization;
pub mod projection;
pub mod resolve;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use catalog::{extract_catalog, extract_catalog_str, extract_catalog_with};
pub use model::{Assumptions, PolicyFacts, Projection, ResolvedParameters, RiderCatalog, Scenario};
pub use projection::{ProjectionOptions, run_projection, run_projection_with};
pub use resolve::resolve_parameters;
pub use taxes::allocate_lifo_tax;
