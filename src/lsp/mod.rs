//! LSP Protocol Implementation
//!
//! Language server front end over the line processor and reprocessor.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod server;

pub use backend::Backend;
