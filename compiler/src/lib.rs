//! sia-compiler
//!
//! Front end of the Sia schema language:
//!  1) a tokenizer with contextual keywords and a recursive-descent parser,
//!  2) a visitor turning the syntax tree into the Schema IR (`sia_schema`),
//!  3) a verifier rejecting duplicate definition names,
//!  4) the `Backend` contract and a Rust code generator (`RustBackend`),
//!  5) error types (`SiaError`).

pub mod error;
pub mod utils;
pub mod tokenizer;
pub mod cst;
pub mod parser;
pub mod visitor;
pub mod verifier;
pub mod compiler;
pub mod backend;
pub mod gen_rust;

pub use backend::Backend;
pub use compiler::{compile, compile_to_json};
pub use error::SiaError;
pub use gen_rust::{RustBackend, RustOptions};
