//! Tokenizer for state documents.

use std::ops::Range;

use logos::Logos;

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r";[^\n]*")]
    Comment,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    // Quoted name; may span lines
    #[regex(r#""([^"\\]|\\.)*""#)]
    Quoted,

    #[regex(r#"[^ \t\r\n\f()";]+"#)]
    Atom,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind<'src> {
    LParen,
    RParen,
    /// Bare atom, classified later.
    Atom(&'src str),
    /// Quoted atom with escapes resolved. Always a name.
    Quoted(String),
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token<'src> {
    pub kind: TokenKind<'src>,
    pub span: Range<usize>,
}

/// Tokenize a whole document. Comments are dropped; unrecognized input
/// becomes `TokenKind::Error`.
pub(crate) fn lex(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = logos.span();
        let slice = logos.slice();
        let kind = match result {
            Ok(RawToken::Comment) => continue,
            Ok(RawToken::LParen) => TokenKind::LParen,
            Ok(RawToken::RParen) => TokenKind::RParen,
            Ok(RawToken::Quoted) => TokenKind::Quoted(unescape(&slice[1..slice.len() - 1])),
            Ok(RawToken::Atom) => TokenKind::Atom(slice),
            Err(()) => TokenKind::Error,
        };
        tokens.push(Token { kind, span });
    }
    tokens
}

/// Resolve backslash escapes: `\x` stands for `x`.
fn unescape(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Quote `text` so that `lex` reads it back as a single `Quoted` token.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Whether `text` lexes as exactly one bare atom.
pub(crate) fn is_bare_atom(text: &str) -> bool {
    !text.is_empty()
        && !text
            .chars()
            .any(|c| matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{c}' | '(' | ')' | '"' | ';'))
}
