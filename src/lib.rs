//! keel: composable runtime schemas.
//!
//! The schema engine lives in `keel-schema`; this crate re-exports it and
//! adds the process-level tracing setup used by embedders and tools.
//!
//! ```ignore
//! use serde_json::json;
//!
//! keel::tracing_config::init_tracing();
//! let even = keel::schema(json!({"basis": "number", "divisor": 2}))?;
//! assert!(even.allows(&keel::Value::from(4)));
//! ```

pub use keel_schema::*;

pub mod tracing_config;
