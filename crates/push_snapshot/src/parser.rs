//! Parse a state document into a `MachineImage`.
//!
//! Two passes: tokens to a generic s-expression tree, then the tree to an
//! image. Bare atoms are classified in order: `TRUE`/`FALSE`, integer, real,
//! registered instruction, name. Quoted atoms are always names.

use push_vm::{ensure_sufficient_stack, MachineImage, StackKind, ValueTree};

use crate::errors::SnapshotError;
use crate::lexer::{lex, Token, TokenKind};

/// Generic s-expression with the byte offset of its first token.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Sexp<'src> {
    Atom { text: &'src str, offset: usize },
    Quoted { text: String, offset: usize },
    List { items: Vec<Sexp<'src>>, offset: usize },
}

impl Sexp<'_> {
    fn offset(&self) -> usize {
        match self {
            Sexp::Atom { offset, .. } | Sexp::Quoted { offset, .. } | Sexp::List { offset, .. } => {
                *offset
            }
        }
    }

    /// Text of an atom, bare or quoted.
    fn symbol(&self) -> Option<&str> {
        match self {
            Sexp::Atom { text, .. } => Some(*text),
            Sexp::Quoted { text, .. } => Some(text.as_str()),
            Sexp::List { .. } => None,
        }
    }
}

struct SexpParser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    end: usize,
}

impl<'src> SexpParser<'src> {
    fn new(source: &'src str) -> Self {
        SexpParser {
            tokens: lex(source),
            pos: 0,
            end: source.len(),
        }
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.end, |token| token.span.start)
    }

    fn parse_one(&mut self) -> Result<Sexp<'src>, SnapshotError> {
        let offset = self.offset();
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(SnapshotError::parse(offset, "unexpected end of input"));
        };
        self.pos += 1;
        match token.kind {
            TokenKind::Atom(text) => Ok(Sexp::Atom { text, offset }),
            TokenKind::Quoted(text) => Ok(Sexp::Quoted { text, offset }),
            TokenKind::LParen => ensure_sufficient_stack(|| self.parse_list(offset)),
            TokenKind::RParen => Err(SnapshotError::parse(offset, "unbalanced `)`")),
            TokenKind::Error => Err(SnapshotError::parse(offset, "unrecognized input")),
        }
    }

    fn parse_list(&mut self, offset: usize) -> Result<Sexp<'src>, SnapshotError> {
        let mut items = Vec::new();
        loop {
            match self.peek().map(|token| &token.kind) {
                Some(TokenKind::RParen) => {
                    self.pos += 1;
                    return Ok(Sexp::List { items, offset });
                }
                Some(_) => items.push(self.parse_one()?),
                None => return Err(SnapshotError::parse(offset, "unclosed `(`")),
            }
        }
    }

    /// Exactly one top-level expression.
    fn parse_document(mut self) -> Result<Sexp<'src>, SnapshotError> {
        let root = self.parse_one()?;
        if self.pos < self.tokens.len() {
            return Err(SnapshotError::parse(
                self.offset(),
                "trailing input after document",
            ));
        }
        Ok(root)
    }
}

/// Parse a whole document. `is_instruction` decides whether a bare atom
/// names a registered instruction.
pub fn parse_image(
    source: &str,
    is_instruction: impl Fn(&str) -> bool,
) -> Result<MachineImage, SnapshotError> {
    let root = SexpParser::new(source).parse_document()?;
    ImageReader { is_instruction }.read_document(&root)
}

struct ImageReader<F> {
    is_instruction: F,
}

impl<F: Fn(&str) -> bool> ImageReader<F> {
    fn read_document(&self, root: &Sexp<'_>) -> Result<MachineImage, SnapshotError> {
        let (head, sections) = split_head(root, "a `(push-state ...)` form")?;
        if head != "push-state" {
            return Err(SnapshotError::parse(
                root.offset(),
                format!("expected `push-state`, found `{head}`"),
            ));
        }

        let mut image = MachineImage::new();
        for section in sections {
            let (name, entries) = split_head(section, "a section")?;
            match name {
                "config" => {
                    for entry in entries {
                        let (key, value) = self.read_pair(entry)?;
                        image.config.insert(key, value);
                    }
                }
                "bindings" => {
                    for entry in entries {
                        let (name, value) = self.read_pair(entry)?;
                        image.bindings.insert(name, value);
                    }
                }
                "stacks" => {
                    for entry in entries {
                        let (kind, items) = split_head(entry, "a stack")?;
                        let kind = StackKind::from_str_opt(kind).ok_or_else(|| {
                            SnapshotError::parse(entry.offset(), format!("unknown stack `{kind}`"))
                        })?;
                        *image.stack_mut(kind) = items
                            .iter()
                            .map(|item| self.read_value(item))
                            .collect::<Result<_, _>>()?;
                    }
                }
                other => {
                    return Err(SnapshotError::parse(
                        section.offset(),
                        format!("unknown section `{other}`"),
                    ));
                }
            }
        }
        Ok(image)
    }

    /// `(key value)`
    fn read_pair(&self, entry: &Sexp<'_>) -> Result<(String, ValueTree), SnapshotError> {
        match entry {
            Sexp::List { items, .. } if items.len() == 2 => {
                let key = items[0].symbol().ok_or_else(|| {
                    SnapshotError::parse(items[0].offset(), "entry key must be an atom")
                })?;
                Ok((key.to_owned(), self.read_value(&items[1])?))
            }
            _ => Err(SnapshotError::parse(
                entry.offset(),
                "expected `(key value)` entry",
            )),
        }
    }

    fn read_value(&self, sexp: &Sexp<'_>) -> Result<ValueTree, SnapshotError> {
        Ok(match sexp {
            Sexp::Atom { text, .. } => classify(text, &self.is_instruction),
            Sexp::Quoted { text, .. } => ValueTree::Name(text.clone()),
            Sexp::List { items, .. } => ValueTree::Code(ensure_sufficient_stack(|| {
                items
                    .iter()
                    .map(|item| self.read_value(item))
                    .collect::<Result<Vec<_>, _>>()
            })?),
        })
    }
}

/// Meaning of a bare atom.
pub(crate) fn classify(text: &str, is_instruction: impl Fn(&str) -> bool) -> ValueTree {
    match text {
        "TRUE" => return ValueTree::Bool(true),
        "FALSE" => return ValueTree::Bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        ValueTree::Int(n)
    } else if let Ok(x) = text.parse::<f64>() {
        ValueTree::Real(x)
    } else if is_instruction(text) {
        ValueTree::Instruction(text.to_owned())
    } else {
        ValueTree::Name(text.to_owned())
    }
}

/// Split `(head rest...)` where `head` is a bare atom.
fn split_head<'a, 'src>(
    sexp: &'a Sexp<'src>,
    what: &str,
) -> Result<(&'a str, &'a [Sexp<'src>]), SnapshotError> {
    if let Sexp::List { items, .. } = sexp {
        if let Some((Sexp::Atom { text, .. }, rest)) = items.split_first() {
            return Ok((*text, rest));
        }
    }
    Err(SnapshotError::parse(sexp.offset(), format!("expected {what}")))
}
