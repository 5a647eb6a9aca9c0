//! Bencode as a Strand grammar.
//!
//! ```text
//! string := length_value(left(uint, ':'), byte)
//! integer := 'i' int 'e'
//! list := 'l' value* 'e'
//! dictionary := 'd' (string value)* 'e'
//! value := integer | string | list | dictionary
//! ```
//!
//! A parse produces a token tree that keeps the delimiter bytes, so an empty
//! list and an empty dictionary stay distinguishable. [`Bencode::from_token`]
//! turns that tree into a value.

use std::fmt;
use std::sync::OnceLock;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use strand_engine::{Parser, ParserConfig};
use strand_foundation::{Error, ErrorKind, Result, Token};
use strand_grammar::common::{decimal_sint, decimal_uint};
use strand_grammar::{Element, Grammar, GrammarBuilder, NodeId};

// =============================================================================
// Grammar
// =============================================================================

/// The bencode grammar and handles to its interesting nodes.
#[derive(Clone, Debug)]
pub struct BencodeGrammar {
    grammar: Grammar,
    integer: NodeId,
    string: NodeId,
    list: NodeId,
    dictionary: NodeId,
}

impl BencodeGrammar {
    /// Builds the grammar, rooted at `value`.
    ///
    /// # Errors
    ///
    /// Only fails if the grammar itself is malformed.
    pub fn new() -> Result<Self> {
        let mut g = GrammarBuilder::new();
        let value = g.indirect();

        let length = decimal_uint(&mut g);
        let colon = g.literal(b':');
        let prefix = g.left(length, colon);
        let string = g.length_value(prefix, Element::Byte);
        let string = g.name(string, "string");

        let i = g.literal(b'i');
        let number = decimal_sint(&mut g);
        let e = g.literal(b'e');
        let integer = g.sequence([i, number, e]);
        let integer = g.name(integer, "integer");

        let l = g.literal(b'l');
        let items = g.many(value);
        let list = g.sequence([l, items, e]);
        let list = g.name(list, "list");

        let d = g.literal(b'd');
        let pair = g.sequence([string, value]);
        let pairs = g.many(pair);
        let dictionary = g.sequence([d, pairs, e]);
        let dictionary = g.name(dictionary, "dictionary");

        let any = g.choice([integer, string, list, dictionary]);
        let any = g.name(any, "value");
        g.bind_indirect(value, any)?;

        Ok(Self {
            grammar: g.build(any)?,
            integer,
            string,
            list,
            dictionary,
        })
    }

    /// Returns the grammar.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Returns the root node, any bencode value.
    #[must_use]
    pub fn value(&self) -> NodeId {
        self.grammar.root()
    }

    /// Returns the `i...e` node.
    #[must_use]
    pub fn integer(&self) -> NodeId {
        self.integer
    }

    /// Returns the length-prefixed string node.
    #[must_use]
    pub fn string(&self) -> NodeId {
        self.string
    }

    /// Returns the `l...e` node.
    #[must_use]
    pub fn list(&self) -> NodeId {
        self.list
    }

    /// Returns the `d...e` node.
    #[must_use]
    pub fn dictionary(&self) -> NodeId {
        self.dictionary
    }

    /// Returns a parser that requires the whole input to be one value.
    #[must_use]
    pub fn parser(&self) -> Parser {
        Parser::new(&self.grammar).with_config(ParserConfig::strict())
    }

    /// Parses one complete document into its token tree.
    ///
    /// # Errors
    ///
    /// Returns the furthest parse failure, or `TrailingInput` if bytes
    /// follow the value.
    pub fn parse_token(&self, input: &[u8]) -> Result<Token> {
        self.parser().parse(input)
    }

    /// Parses one complete document into a value.
    ///
    /// # Errors
    ///
    /// As [`parse_token`](Self::parse_token).
    pub fn decode(&self, input: &[u8]) -> Result<Bencode> {
        Bencode::from_token(&self.parse_token(input)?)
    }
}

/// Decodes one complete bencode document with a shared grammar.
///
/// # Errors
///
/// Returns the furthest parse failure.
pub fn decode(input: &[u8]) -> Result<Bencode> {
    static GRAMMAR: OnceLock<Result<BencodeGrammar>> = OnceLock::new();
    GRAMMAR
        .get_or_init(BencodeGrammar::new)
        .as_ref()
        .map_err(Clone::clone)?
        .decode(input)
}

// =============================================================================
// Values
// =============================================================================

/// A decoded bencode value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bencode {
    /// `i<n>e`
    Int(i64),
    /// `<len>:<bytes>`
    Bytes(Vec<u8>),
    /// `l...e`
    List(Vec<Bencode>),
    /// `d...e`, in document order.
    Dict(Vec<(Vec<u8>, Bencode)>),
}

impl Bencode {
    /// Converts the token tree of a bencode parse into a value.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedToken` if the tree was not produced by
    /// [`BencodeGrammar`].
    pub fn from_token(token: &Token) -> Result<Self> {
        if let Some(bytes) = token.as_bytes() {
            return Ok(Self::Bytes(bytes.to_vec()));
        }

        let parts = token.as_seq().ok_or_else(|| unexpected("bencode value", token))?;
        let body = match (parts.len(), parts.first().and_then(Token::as_byte)) {
            (3, Some(tag)) => parts.get(1).map(|body| (tag, body)),
            _ => None,
        };

        match body {
            Some((b'i', body)) => body
                .as_sint()
                .map(Self::Int)
                .ok_or_else(|| unexpected("integer", body)),
            Some((b'l', body)) => {
                let items = body.as_seq().ok_or_else(|| unexpected("list items", body))?;
                items.iter().map(Self::from_token).collect::<Result<_>>().map(Self::List)
            }
            Some((b'd', body)) => {
                let pairs = body
                    .as_seq()
                    .ok_or_else(|| unexpected("dictionary entries", body))?;
                pairs.iter().map(entry).collect::<Result<_>>().map(Self::Dict)
            }
            _ => Err(unexpected("bencode value", token)),
        }
    }

    /// Writes the value as bencode. Dictionary entries keep their order.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Self::Int(n) => out.extend_from_slice(format!("i{n}e").as_bytes()),
            Self::Bytes(bytes) => encode_bytes(bytes, out),
            Self::List(items) => {
                out.push(b'l');
                for item in items {
                    item.encode_into(out);
                }
                out.push(b'e');
            }
            Self::Dict(entries) => {
                out.push(b'd');
                for (key, value) in entries {
                    encode_bytes(key, out);
                    value.encode_into(out);
                }
                out.push(b'e');
            }
        }
    }

    /// Returns the value as bencode.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    /// Looks up a dictionary key. The first entry wins.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&Bencode> {
        match self {
            Self::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

fn entry(pair: &Token) -> Result<(Vec<u8>, Bencode)> {
    let parts = pair.as_seq().ok_or_else(|| unexpected("key-value pair", pair))?;
    match (parts.first(), parts.get(1), parts.len()) {
        (Some(key), Some(value), 2) => {
            let key = key.as_bytes().ok_or_else(|| unexpected("string key", key))?;
            Ok((key.to_vec(), Bencode::from_token(value)?))
        }
        _ => Err(unexpected("key-value pair", pair)),
    }
}

fn unexpected(expected: &str, token: &Token) -> Error {
    Error::new(ErrorKind::UnexpectedToken {
        expected: expected.to_string(),
        found: token.token_type(),
    })
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}

impl fmt::Display for Bencode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode().escape_ascii())
    }
}

/// Strings that are valid UTF-8 serialize as strings, others as byte arrays.
/// Dictionaries become maps with lossily decoded keys.
impl Serialize for Bencode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serializer.serialize_str(text),
                Err(_) => serializer.serialize_bytes(bytes),
            },
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(&String::from_utf8_lossy(key), value)?;
                }
                map.end()
            }
        }
    }
}
