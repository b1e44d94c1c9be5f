//! # edkconst-core
//!
//! A library for extracting named integer constants from C SDK headers.
//!
//! This crate provides the core functionality for:
//! - Parsing `#define` constants together with their `//!` documentation comments
//! - Numbering `typedef enum` members, including explicit values and bitwise-OR composites
//! - Looking constants up by name, and describing a numeric code by every name that carries it
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`literal`]: Integer literal parsing
//! - [`parser`]: The line-oriented header state machine
//! - [`table`]: The insertion-ordered constant table and describe query
//! - [`diagnostic`]: Rendering native status codes for logs and errors
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use edkconst_core::ConstantTable;
//!
//! // Ingest the SDK headers in their conventional order
//! let constants = ConstantTable::from_include_dir("/usr/local/include")?;
//!
//! let ok = constants.get("EDK_OK")?;
//! let code = 0x0300;
//! if code != ok {
//!     eprintln!("{}", constants.describe(code, None).unwrap_or_default());
//! }
//! # Ok::<(), edkconst_core::Error>(())
//! ```
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod diagnostic;
pub mod error;
pub mod literal;
pub mod parser;
pub mod table;

// Re-export primary types for convenience
pub use diagnostic::StatusError;
pub use error::{Error, Result};
pub use literal::parse_literal;
pub use parser::{HeaderParser, ParserConfig};
pub use table::{Constant, ConstantTable, Origin, DEFAULT_SOURCES};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
