//! Backtracking parse engine and parse-result ownership for Strand.
//!
//! This crate provides:
//! - [`parse`] and [`Parser`] - Run a [`Grammar`] against a byte buffer
//! - [`ParserConfig`] - End-of-input strictness, recursion limit, memoization
//! - [`ParseObserver`] - Hook for tracing every node invocation
//! - [`ResultHandle`] - Shared, release-once ownership of a parse outcome
//!
//! [`Grammar`]: strand_grammar::Grammar

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
mod engine;
pub mod handle;
pub mod observer;
pub mod outcome;
pub mod parser;

pub use config::ParserConfig;
pub use handle::{Allocation, Allocator, CountingAllocator, ResultHandle, SystemAllocator};
pub use observer::{NoopObserver, ParseObserver};
pub use outcome::Parsed;
pub use parser::{Parser, parse};
