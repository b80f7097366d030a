//! Integration tests for the vaplan projection engine
//!
//! Tests are organized by topic:
//! - `pipeline` - Payload extraction through resolution and projection
//! - `fallback_scenario` - The built-in product with default policy facts
//! - `properties` - Property tests over randomized inputs

mod fallback_scenario;
mod properties;
