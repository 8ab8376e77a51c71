//! The Schema IR of the Sia schema language and the type resolution rules
//! every backend relies on to interpret it.
//!
//! ```
//! use sia_schema::*;
//!
//! let defs = vec![Definition::Schema(SchemaDefinition {
//!     name:   "Person".to_owned(),
//!     fields: vec![FieldDefinition::new("name", "string")],
//! })];
//!
//! let index = SchemaIndex::new(&defs);
//! let field = &index.get("Person").unwrap().fields[0];
//! assert_eq!(resolve_string_type(field), Some(SiaType::String8));
//! assert_eq!(index.default_value(field), Ok(DefaultValue::EmptyString));
//! ```

pub mod error;
pub mod ir;
pub mod resolve;
pub mod types;

pub use error::*;
pub use ir::*;
pub use resolve::*;
pub use types::*;
