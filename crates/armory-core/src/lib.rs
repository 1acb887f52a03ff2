//! # armory-core
//!
//! Core library for the Armory CLI providing:
//! - Error types shared across the workspace
//! - The extension request model (`NAME[@VERSION]` parsing)
//! - Byte-source adapters for request documents (stdin, file, URL)

pub mod error;
pub mod input;
pub mod request;

pub use error::{Error, Result};
pub use request::{parse_request_document, ExtensionSpec, Requested};
