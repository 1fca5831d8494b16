//! Twin Schema: formal structural checks for device resources
//!
//! A [`SchemaRegistry`] maps each resource type to a compiled JSON Schema.
//! [`evaluate`] runs a candidate through its schema and reports every
//! violation as a `schema-violation` finding with a dotted field path.
pub mod checker;
pub mod registry;

pub use checker::{evaluate, missing_schema, pointer_to_path};
pub use registry::{CompiledSchema, SchemaRegistry};
