//! The backtracking walker.
//!
//! Every node invocation returns a [`Step`]: either a token and the position
//! after it, or a failure. The cursor is a plain `usize` passed by value, so
//! a failed node cannot move it and rollback is simply reusing the start
//! position. Fatal misuse travels separately as `Err` through `?`.

use std::collections::HashMap;
use std::sync::Arc;

use strand_foundation::{Error, ErrorKind, Result, Token, TokenSeq};
use strand_grammar::{Element, Grammar, Node, NodeId};

use crate::config::ParserConfig;
use crate::observer::ParseObserver;
use crate::outcome::Parsed;

/// Why a node failed, and where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Failure {
    pub kind: ErrorKind,
    pub position: usize,
}

/// Result of invoking one node.
#[derive(Clone, Debug)]
pub(crate) enum Step {
    Matched(Token, usize),
    Failed(Failure),
}

/// Per-parse state. Nothing here outlives one call.
pub(crate) struct Walker<'a, O: ParseObserver + ?Sized> {
    grammar: &'a Grammar,
    input: &'a [u8],
    config: &'a ParserConfig,
    observer: &'a mut O,
    depth: usize,
    furthest: Option<Failure>,
    memo: HashMap<(usize, usize), (Step, Option<Failure>)>,
}

impl<'a, O: ParseObserver + ?Sized> Walker<'a, O> {
    pub(crate) fn new(
        grammar: &'a Grammar,
        input: &'a [u8],
        config: &'a ParserConfig,
        observer: &'a mut O,
    ) -> Self {
        Self {
            grammar,
            input,
            config,
            observer,
            depth: 0,
            furthest: None,
            memo: HashMap::new(),
        }
    }

    /// Runs `root` at position 0 and applies end-of-input strictness.
    pub(crate) fn run(mut self, root: NodeId) -> Result<Parsed> {
        self.observer.parse_start(self.grammar, root, self.input);
        let result = self.run_root(root);
        match &result {
            Err(error) if error.is_fatal() => self.observer.aborted(error),
            _ => {}
        }
        self.observer.parse_end(&result);
        result
    }

    fn run_root(&mut self, root: NodeId) -> Result<Parsed> {
        match self.invoke(root, 0)? {
            Step::Matched(token, end) => {
                if self.config.require_full_consumption && end < self.input.len() {
                    let kind = ErrorKind::TrailingInput {
                        remaining: self.input.len() - end,
                    };
                    return Err(Error::at(kind, end));
                }
                Ok(Parsed::new(token, end))
            }
            Step::Failed(own) => {
                let Failure { kind, position } = self.furthest.take().unwrap_or(own);
                Err(Error::at(kind, position))
            }
        }
    }

    // =========================================================================
    // Invocation
    // =========================================================================

    /// Invokes a node with depth accounting, memoization, and observation.
    fn invoke(&mut self, id: NodeId, pos: usize) -> Result<Step> {
        if self.depth >= self.config.max_depth {
            return Err(Error::at(
                ErrorKind::RecursionLimit {
                    limit: self.config.max_depth,
                },
                pos,
            ));
        }
        self.depth += 1;
        self.observer.enter(id, pos, self.depth);

        let step = if self.config.memoize {
            self.invoke_memoized(id, pos)
        } else {
            self.eval(id, pos)
        };

        match &step {
            Ok(Step::Matched(_, end)) => self.observer.matched(id, pos, *end, self.depth),
            Ok(Step::Failed(f)) => {
                self.observer
                    .failed(id, pos, &f.kind, f.position, self.depth);
            }
            Err(_) => {}
        }
        self.depth -= 1;
        step
    }

    /// Looks up or fills the memo table.
    ///
    /// Alongside the step, each entry keeps the furthest failure seen while
    /// evaluating the node, so replaying an entry updates the furthest
    /// failure exactly as re-running the node would.
    fn invoke_memoized(&mut self, id: NodeId, pos: usize) -> Result<Step> {
        let key = (id.index(), pos);
        if let Some((step, local)) = self.memo.get(&key) {
            let (step, local) = (step.clone(), local.clone());
            self.observer.memo_hit(id, pos, self.depth);
            if let Some(failure) = local {
                self.offer(failure);
            }
            return Ok(step);
        }

        let outer = self.furthest.take();
        let step = self.eval(id, pos);
        let local = std::mem::replace(&mut self.furthest, outer);
        let step = step?;
        if let Some(failure) = &local {
            self.offer(failure.clone());
        }
        self.memo.insert(key, (step.clone(), local));
        Ok(step)
    }

    /// Records a failure under the furthest-failure rule: a record replaces
    /// the current one when its position is at or beyond it.
    fn offer(&mut self, failure: Failure) {
        let replace = self
            .furthest
            .as_ref()
            .is_none_or(|current| failure.position >= current.position);
        if replace {
            self.furthest = Some(failure);
        }
    }

    /// Records and returns a fresh failure.
    fn fail(&mut self, kind: ErrorKind, position: usize) -> Step {
        let failure = Failure { kind, position };
        self.offer(failure.clone());
        Step::Failed(failure)
    }

    // =========================================================================
    // Node semantics
    // =========================================================================

    fn eval(&mut self, id: NodeId, pos: usize) -> Result<Step> {
        let grammar = self.grammar;
        let node = grammar.node(id)?;
        match node {
            Node::Literal(expected) => Ok(self.byte(pos, |found| {
                (found == *expected).then_some(()).ok_or(ErrorKind::LiteralMismatch {
                    expected: *expected,
                    found,
                })
            })),
            Node::Range { low, high } => Ok(self.byte(pos, |found| {
                (*low..=*high)
                    .contains(&found)
                    .then_some(())
                    .ok_or(ErrorKind::RangeMismatch {
                        low: *low,
                        high: *high,
                        found,
                    })
            })),
            Node::Set(set) => Ok(self.byte(pos, |found| {
                set.contains(found)
                    .then_some(())
                    .ok_or(ErrorKind::SetMismatch { found })
            })),
            Node::AnyByte => Ok(self.byte(pos, |_| Ok(()))),
            Node::Bytes(literal) => Ok(self.bytes(literal, pos)),
            Node::Unsigned { width } => Ok(self.integer(*width, pos, false)),
            Node::Signed { width } => Ok(self.integer(*width, pos, true)),
            Node::Sequence(members) => self.sequence(members, pos, None),
            Node::Pick { members, keep } => self.sequence(members, pos, Some(*keep)),
            Node::Choice(alternatives) => self.choice(alternatives, pos),
            Node::Optional(inner) => Ok(match self.invoke(*inner, pos)? {
                Step::Failed(_) => Step::Matched(Token::None, pos),
                matched @ Step::Matched(..) => matched,
            }),
            Node::Repeat { node, min, max } => self.repeat(*node, *min, *max, pos),
            Node::SepBy {
                node,
                separator,
                min,
            } => self.sep_by(*node, *separator, *min, pos),
            Node::Action { node, action } => match self.invoke(*node, pos)? {
                Step::Matched(token, end) => Ok(match action.apply(token) {
                    Some(token) => Step::Matched(token, end),
                    None => self.fail(
                        ErrorKind::ActionRejected {
                            action: action.name().to_string(),
                        },
                        end,
                    ),
                }),
                failed @ Step::Failed(_) => Ok(failed),
            },
            Node::LengthValue { length, element } => self.length_value(*length, *element, pos),
            Node::Lookahead { node, positive } => {
                let held = matches!(self.invoke(*node, pos)?, Step::Matched(..));
                Ok(if held == *positive {
                    Step::Matched(Token::None, pos)
                } else {
                    self.fail(ErrorKind::LookaheadFailed, pos)
                })
            }
            Node::Whitespace(inner) => {
                let skipped = self.input[pos..]
                    .iter()
                    .take_while(|b| b.is_ascii_whitespace())
                    .count();
                self.invoke(*inner, pos + skipped)
            }
            Node::End => Ok(if pos == self.input.len() {
                Step::Matched(Token::None, pos)
            } else {
                self.fail(
                    ErrorKind::TrailingInput {
                        remaining: self.input.len() - pos,
                    },
                    pos,
                )
            }),
            Node::Epsilon => Ok(Step::Matched(Token::None, pos)),
            Node::Nothing => Ok(self.fail(ErrorKind::NoMatch, pos)),
            Node::Indirect(Some(target)) => self.invoke(*target, pos),
            Node::Indirect(None) => Err(Error::unbound_indirection(id.index()).with_position(pos)),
        }
    }

    /// Matches a single byte accepted by `check`.
    fn byte(
        &mut self,
        pos: usize,
        check: impl FnOnce(u8) -> std::result::Result<(), ErrorKind>,
    ) -> Step {
        match self.input.get(pos) {
            None => self.fail(ErrorKind::InputExhausted, pos),
            Some(&found) => match check(found) {
                Ok(()) => Step::Matched(Token::Byte(found), pos + 1),
                Err(kind) => self.fail(kind, pos),
            },
        }
    }

    fn bytes(&mut self, literal: &Arc<[u8]>, pos: usize) -> Step {
        for (offset, &expected) in literal.iter().enumerate() {
            match self.input.get(pos + offset) {
                None => return self.fail(ErrorKind::InputExhausted, pos + offset),
                Some(&found) if found != expected => {
                    return self.fail(ErrorKind::BytesMismatch { offset }, pos + offset);
                }
                Some(_) => {}
            }
        }
        Step::Matched(Token::Bytes(Arc::clone(literal)), pos + literal.len())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn integer(&mut self, width: u8, pos: usize, signed: bool) -> Step {
        let width = usize::from(width);
        let Some(raw) = self.input.get(pos..pos + width) else {
            return self.fail(ErrorKind::InputExhausted, self.input.len());
        };
        let value = raw.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        let token = if signed {
            let shift = 64 - 8 * width;
            Token::SInt(((value << shift) as i64) >> shift)
        } else {
            Token::UInt(value)
        };
        Step::Matched(token, pos + width)
    }

    /// Matches members in order. With `keep`, only that member's token is
    /// produced; otherwise the sequence of all of them.
    fn sequence(&mut self, members: &[NodeId], pos: usize, keep: Option<usize>) -> Result<Step> {
        let mut tokens = TokenSeq::new();
        let mut kept = Token::None;
        let mut cursor = pos;
        for (index, member) in members.iter().enumerate() {
            match self.invoke(*member, cursor)? {
                Step::Matched(token, end) => {
                    match keep {
                        Some(k) if k == index => kept = token,
                        Some(_) => {}
                        None => tokens.push(token),
                    }
                    cursor = end;
                }
                failed @ Step::Failed(_) => return Ok(failed),
            }
        }
        let token = if keep.is_some() {
            kept
        } else {
            Token::Seq(tokens)
        };
        Ok(Step::Matched(token, cursor))
    }

    fn choice(&mut self, alternatives: &[NodeId], pos: usize) -> Result<Step> {
        for alternative in alternatives {
            if let matched @ Step::Matched(..) = self.invoke(*alternative, pos)? {
                return Ok(matched);
            }
        }
        Ok(self.fail(ErrorKind::AllAlternativesFailed, pos))
    }

    /// Repeats `node` between `min` and `max` times.
    ///
    /// Once `min` is satisfied, an element that matches without consuming
    /// input is kept and ends the repetition.
    fn repeat(&mut self, node: NodeId, min: usize, max: Option<usize>, pos: usize) -> Result<Step> {
        let mut tokens = TokenSeq::new();
        let mut cursor = pos;
        while max.is_none_or(|max| tokens.len() < max) {
            match self.invoke(node, cursor)? {
                Step::Matched(token, end) => {
                    tokens.push(token);
                    let stalled = end == cursor;
                    cursor = end;
                    if stalled && tokens.len() >= min {
                        break;
                    }
                }
                Step::Failed(_) => break,
            }
        }
        if tokens.len() < min {
            let kind = ErrorKind::RepetitionUnsatisfied {
                min,
                matched: tokens.len(),
            };
            return Ok(self.fail(kind, cursor));
        }
        Ok(Step::Matched(Token::Seq(tokens), cursor))
    }

    /// Separated repetition. A separator not followed by an element is not
    /// consumed.
    fn sep_by(&mut self, node: NodeId, separator: NodeId, min: usize, pos: usize) -> Result<Step> {
        let mut tokens = TokenSeq::new();
        let mut cursor = match self.invoke(node, pos)? {
            Step::Matched(token, end) => {
                tokens.push(token);
                end
            }
            Step::Failed(_) if min == 0 => return Ok(Step::Matched(Token::Seq(tokens), pos)),
            Step::Failed(_) => {
                return Ok(self.fail(ErrorKind::RepetitionUnsatisfied { min, matched: 0 }, pos));
            }
        };
        loop {
            let Step::Matched(_, after_separator) = self.invoke(separator, cursor)? else {
                break;
            };
            let Step::Matched(token, end) = self.invoke(node, after_separator)? else {
                break;
            };
            tokens.push(token);
            if end == cursor {
                break;
            }
            cursor = end;
        }
        Ok(Step::Matched(Token::Seq(tokens), cursor))
    }

    /// Runs `length` for a count, then consumes that many elements.
    ///
    /// Only byte payloads are checked against the remaining input up front;
    /// node elements may be zero-width, so each reports its own failure.
    fn length_value(&mut self, length: NodeId, element: Element, pos: usize) -> Result<Step> {
        let (count_token, start) = match self.invoke(length, pos)? {
            Step::Matched(token, end) => (token, end),
            failed @ Step::Failed(_) => return Ok(failed),
        };
        let Some(declared) = count_token.as_count() else {
            let kind = ErrorKind::InvalidLength {
                actual: count_token.token_type(),
            };
            return Err(Error::at(kind, start));
        };

        match element {
            Element::Byte => {
                let remaining = self.input.len() - start;
                let count = match usize::try_from(declared) {
                    Ok(count) if count <= remaining => count,
                    _ => {
                        let kind = ErrorKind::DeclaredLengthExceedsInput {
                            declared,
                            remaining,
                        };
                        return Ok(self.fail(kind, start));
                    }
                };
                let payload = &self.input[start..start + count];
                Ok(Step::Matched(Token::bytes(payload), start + count))
            }
            Element::Node(node) => {
                let mut tokens = TokenSeq::new();
                let mut cursor = start;
                for _ in 0..declared {
                    match self.invoke(node, cursor)? {
                        Step::Matched(token, end) => {
                            tokens.push(token);
                            cursor = end;
                        }
                        failed @ Step::Failed(_) => return Ok(failed),
                    }
                }
                Ok(Step::Matched(Token::Seq(tokens), cursor))
            }
        }
    }
}
