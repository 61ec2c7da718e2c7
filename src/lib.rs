// SPDX-License-Identifier: MIT OR Apache-2.0

//! askdocs - Local passage retrieval library
//!
//! Shared modules for the askdocs CLI tool.

pub mod config;
pub mod documents;
pub mod errors;
pub mod output;
pub mod retrieval;

pub use errors::{Result, RetrievalError};
