//! Widget payload validation against the schema registered with each widget type.

pub mod validate;

pub use validate::{JsonSchemaValidator, SchemaError, SchemaPathElem, SchemaValidator};
