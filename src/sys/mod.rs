//! Raw IXML binding layer
//!
//! The ABI contract with `libixml.so` (types, status codes, symbol
//! names) and the dynamic loader that binds it at runtime.

pub mod dl;
pub mod types;

pub use dl::{LibIxml, SymbolTable};
pub use types::*;
