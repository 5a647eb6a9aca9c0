//! Core types for Strand.
//!
//! This crate provides:
//! - [`Token`] - The tagged value produced by every successful match
//! - [`TokenSeq`] - Persistent sequence of tokens with O(1) clones
//! - [`TokenType`] - Tags for token variants
//! - [`Error`] - Error kinds shared by every layer, with input positions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod token;

pub use collections::TokenSeq;
pub use error::{Error, ErrorKind, Result};
pub use token::{Token, TokenType};
