//! JSON and `MessagePack` encoding.
//!
//! Token trees and bencode values render to JSON for display. Token trees
//! also round-trip through `MessagePack` so parse results can be stored and
//! compared later.

use serde::Serialize;
use strand_foundation::{Error, Result, Token};

/// Serializes a value as compact JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::serialization(e.to_string()))
}

/// Serializes a value as indented JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::serialization(e.to_string()))
}

/// Serializes a token tree using `MessagePack`.
///
/// Uses named serialization so the variant tags survive.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_msgpack(token: &Token) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(token).map_err(|e| Error::serialization(e.to_string()))
}

/// Deserializes a token tree from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a serialized token.
pub fn from_msgpack(bytes: &[u8]) -> Result<Token> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::serialization(e.to_string()))
}
