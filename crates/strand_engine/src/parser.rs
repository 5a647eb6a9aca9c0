//! Public entry points.

use strand_foundation::{Result, Token};
use strand_grammar::{Grammar, NodeId};

use crate::config::ParserConfig;
use crate::engine::Walker;
use crate::handle::ResultHandle;
use crate::observer::{NoopObserver, ParseObserver};
use crate::outcome::Parsed;

/// Parses `input` with the grammar's root under the default configuration.
///
/// # Errors
///
/// Returns the furthest failure on a failed match, or a fatal error on
/// grammar misuse.
pub fn parse(grammar: &Grammar, input: &[u8]) -> Result<Token> {
    Parser::new(grammar).parse(input)
}

/// A grammar paired with a configuration.
///
/// A `Parser` holds no per-parse state; one parser may run any number of
/// parses, from any number of threads.
#[derive(Clone, Debug)]
pub struct Parser {
    grammar: Grammar,
    config: ParserConfig,
}

impl Parser {
    /// Creates a parser with the default configuration.
    #[must_use]
    pub fn new(grammar: &Grammar) -> Self {
        Self {
            grammar: grammar.clone(),
            config: ParserConfig::default(),
        }
    }

    /// Builder method to set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the grammar.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Returns the configuration for modification.
    pub fn config_mut(&mut self) -> &mut ParserConfig {
        &mut self.config
    }

    /// Parses `input` from the root, returning the root token.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse(&self, input: &[u8]) -> Result<Token> {
        self.parse_outcome(input).map(Parsed::into_token)
    }

    /// Parses `input` starting from `node` instead of the root.
    ///
    /// # Errors
    ///
    /// Returns `foreign-node` if `node` is not part of this grammar,
    /// otherwise as [`parse`].
    pub fn parse_node(&self, node: NodeId, input: &[u8]) -> Result<Token> {
        self.parse_node_with_observer(node, input, &mut NoopObserver)
            .map(Parsed::into_token)
    }

    /// Parses `input` from the root, returning the token and bytes consumed.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse_outcome(&self, input: &[u8]) -> Result<Parsed> {
        self.parse_with_observer(input, &mut NoopObserver)
    }

    /// Parses `input` from the root, reporting every node invocation.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse_with_observer<O: ParseObserver + ?Sized>(
        &self,
        input: &[u8],
        observer: &mut O,
    ) -> Result<Parsed> {
        self.parse_node_with_observer(self.grammar.root(), input, observer)
    }

    /// Parses `input` from `node`, reporting every node invocation.
    ///
    /// # Errors
    ///
    /// See [`parse_node`](Self::parse_node).
    pub fn parse_node_with_observer<O: ParseObserver + ?Sized>(
        &self,
        node: NodeId,
        input: &[u8],
        observer: &mut O,
    ) -> Result<Parsed> {
        self.grammar.node(node)?;
        Walker::new(&self.grammar, input, &self.config, observer).run(node)
    }

    /// Parses `input` and wraps the outcome, success or failure, in a
    /// [`ResultHandle`] backed by the configured allocator.
    #[must_use]
    pub fn parse_raw(&self, input: &[u8]) -> ResultHandle {
        let outcome = self.parse_outcome(input);
        ResultHandle::new(outcome, self.config.allocator.clone())
    }
}
