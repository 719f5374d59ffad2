//! Script tokenizer.
//!
//! Lexing is total: every input produces a token sequence and structural
//! problems are left for the parser to report.  A single left-to-right scan
//! keeps one pending token and switches between three exclusive modes
//! (normal, inside-comment, inside-string):
//!
//! - `#` outside a string opens a comment that runs to end of line; its
//!   content is discarded and never tokenized.
//! - `"` or `'` outside a string opens a string of the same quote kind.
//!   Until the matching close quote, everything (the other quote kind, `#`,
//!   whitespace, operator characters) is accumulated verbatim.
//! - Operator characters conclude the pending token and are emitted as
//!   one-character Operator tokens.
//! - Adjacent characters of mixed class run together into one token rather
//!   than being rejected; the parser decides what is well-formed.

use std::fmt;

/// Characters that terminate the pending token and become one-character
/// [`TokenKind::Operator`] tokens.
const OPERATOR_CHARS: &str = "+-*/=%<>!:[]{}()";

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Boolean,
    Operator,
    /// Used internally while scanning `#` comments; never present in the
    /// output of [`tokenize`].
    Comment,
}

/// One lexed token.  The text is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }

    /// Human-readable rendering used in parse error messages,
    /// e.g. `identifier 'send'`.
    pub fn describe(&self) -> String {
        let kind = match self.kind {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::Operator => "operator",
            TokenKind::Comment => "comment",
        };
        format!("{kind} '{}'", self.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

enum Mode {
    Normal,
    /// Inside a `#` comment, until end of line.
    Comment,
    /// Inside a string opened by the given quote character.
    Str(char),
}

struct Lexer {
    tokens: Vec<Token>,
    pending: Option<Token>,
    mode: Mode,
}

/// Tokenize script source.  Total; never fails.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut lx = Lexer { tokens: Vec::new(), pending: None, mode: Mode::Normal };

    for ch in src.chars() {
        match lx.mode {
            Mode::Comment => {
                if ch == '\n' {
                    lx.mode = Mode::Normal;
                }
            }
            Mode::Str(quote) => {
                if ch == quote {
                    lx.conclude();
                    lx.mode = Mode::Normal;
                } else {
                    lx.append(ch);
                }
            }
            Mode::Normal => lx.scan_normal(ch),
        }
    }
    // EOF concludes whatever is pending (an unterminated string is emitted
    // as-is rather than dropped; lexing is total).
    lx.conclude();

    for tok in &mut lx.tokens {
        if tok.kind == TokenKind::Identifier && is_boolean_word(&tok.text) {
            tok.kind = TokenKind::Boolean;
        }
    }
    lx.tokens
}

impl Lexer {
    fn scan_normal(&mut self, ch: char) {
        if ch == '#' {
            self.conclude();
            self.mode = Mode::Comment;
            return;
        }

        if OPERATOR_CHARS.contains(ch) {
            self.conclude();
            self.tokens.push(Token::new(TokenKind::Operator, ch));
            return;
        }

        if ch.is_ascii_digit() {
            // A digit extends a Number, and retypes a pending Identifier to
            // Number: mixed-class characters run together by design.
            match &mut self.pending {
                Some(tok)
                    if tok.kind == TokenKind::Identifier || tok.kind == TokenKind::Number =>
                {
                    tok.kind = TokenKind::Number;
                    tok.text.push(ch);
                }
                _ => {
                    self.conclude();
                    self.pending = Some(Token::new(TokenKind::Number, ch));
                }
            }
            return;
        }

        // First decimal point only; a second '.' falls through to the
        // general merge rule below.
        if ch == '.' {
            if let Some(tok) = &mut self.pending {
                if tok.kind == TokenKind::Number && !tok.text.contains('.') {
                    tok.text.push(ch);
                    return;
                }
            }
        }

        if ch == '"' || ch == '\'' {
            self.conclude();
            self.pending = Some(Token::new(TokenKind::String, ""));
            self.mode = Mode::Str(ch);
            return;
        }

        if ch.is_whitespace() {
            self.conclude();
            return;
        }

        match &mut self.pending {
            Some(tok) => tok.text.push(ch),
            None => self.pending = Some(Token::new(TokenKind::Identifier, ch)),
        }
    }

    fn append(&mut self, ch: char) {
        if let Some(tok) = &mut self.pending {
            tok.text.push(ch);
        }
    }

    /// Move the pending token to the output.  Empty and comment tokens are
    /// dropped, which keeps the "token text is never empty" invariant.
    fn conclude(&mut self) {
        if let Some(tok) = self.pending.take() {
            if !tok.text.is_empty() && tok.kind != TokenKind::Comment {
                self.tokens.push(tok);
            }
        }
    }
}

fn is_boolean_word(text: &str) -> bool {
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
