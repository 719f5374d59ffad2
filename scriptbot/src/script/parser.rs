//! Recursive-descent parser: token sequence to instruction nodes.
//!
//! One rule per instruction keyword, selected by an exhaustive match on the
//! leading identifier.  The grammar is LL(1); the single token of lookahead
//! decides whether an optional channel value follows `send` / `embed:send`
//! (present iff the next token could begin a value).  Comment tokens never
//! reach the parser: the lexer discards them.

use crate::error::ParseError;

use super::ast::{EmbedOp, Node, RoleAction, Scope, Value};
use super::lexer::{Token, TokenKind};

/// Parse a token sequence into an ordered node sequence.
pub fn parse(tokens: &[Token]) -> Result<Vec<Node>, ParseError> {
    let mut parser = Parser { tokens, pos: 0 };
    let mut nodes = Vec::new();
    while parser.peek().is_some() {
        nodes.push(parser.instruction()?);
    }
    Ok(nodes)
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Rendering of the current token for error messages.
    fn found(&self) -> String {
        match self.peek() {
            Some(tok) => tok.describe(),
            None => "end of input".to_owned(),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::Unexpected { expected: expected.to_owned(), found: self.found() }
    }

    /// Consume one token of the given kind or fail with `expected`.
    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<&'a Token, ParseError> {
        match self.peek() {
            Some(tok) if tok.kind == kind => {
                self.pos += 1;
                Ok(tok)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Consume a specific operator token or fail with `expected`.
    fn expect_operator(&mut self, op: &str, expected: &str) -> Result<(), ParseError> {
        match self.peek() {
            Some(tok) if tok.kind == TokenKind::Operator && tok.text == op => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    // ── Instructions ──────────────────────────────────────────────────────────

    fn instruction(&mut self) -> Result<Node, ParseError> {
        let keyword = match self.peek() {
            Some(tok) if tok.kind == TokenKind::Identifier => tok,
            _ => return Err(self.unexpected("instruction keyword")),
        };
        match keyword.text.as_str() {
            "config" => {
                self.advance();
                self.config()
            }
            "set" => {
                self.advance();
                self.set_var(Scope::Global)
            }
            "setl" => {
                self.advance();
                self.set_var(Scope::Local)
            }
            "send" => {
                self.advance();
                self.send()
            }
            "react" => {
                self.advance();
                self.react()
            }
            "role" => {
                self.advance();
                self.role()
            }
            "embed" => {
                self.advance();
                self.embed()
            }
            _ => Err(ParseError::UnknownInstruction { found: keyword.describe() }),
        }
    }

    fn config(&mut self) -> Result<Node, ParseError> {
        let name = self.expect(
            TokenKind::Identifier,
            "configuration name after `config` (e.g. DEFAULT or COMMAND)",
        )?;
        Ok(Node::Config { name: name.text.clone() })
    }

    fn set_var(&mut self, scope: Scope) -> Result<Node, ParseError> {
        let (keyword, what) = match scope {
            Scope::Global => ("`set`", "global variable value"),
            Scope::Local => ("`setl`", "local variable value"),
        };
        let name = self.expect(
            TokenKind::Identifier,
            &format!("variable name after {keyword}"),
        )?;
        let value = self.value(what)?;
        Ok(Node::SetVar { scope, name: name.text.clone(), value })
    }

    fn send(&mut self) -> Result<Node, ParseError> {
        let message = self.value("message text or variable")?;
        let channel = self.optional_channel()?;
        Ok(Node::Send { message, channel })
    }

    fn react(&mut self) -> Result<Node, ParseError> {
        let emoji = self.expect(TokenKind::String, "emoji string after `react`")?;
        let message = self.value("message id or variable")?;
        Ok(Node::React { emoji: emoji.text.clone(), message })
    }

    fn role(&mut self) -> Result<Node, ParseError> {
        self.expect_operator(":", "`:` after `role`")?;
        let func = self.expect(TokenKind::Identifier, "role function (`add` or `remove`)")?;
        let action = match func.text.as_str() {
            "add" => RoleAction::Add,
            "remove" => RoleAction::Remove,
            _ => return Err(ParseError::UnknownRoleFunction { name: func.text.clone() }),
        };
        let member = self.value("member id or variable")?;
        let role = self.value("role id or variable")?;
        Ok(Node::RoleOp { action, member, role })
    }

    fn embed(&mut self) -> Result<Node, ParseError> {
        self.expect_operator(":", "`:` after `embed`")?;
        let func = self.expect(
            TokenKind::Identifier,
            "embed function (create, conf, set_author, set_thumbnail, add_l, add_nl, set_footer, send)",
        )?;
        let name = self.expect(TokenKind::Identifier, "embed name")?;
        let name = name.text.clone();

        let op = match func.text.as_str() {
            "create" => EmbedOp::Create,
            "conf" => EmbedOp::Conf {
                title: self.value("embed title")?,
                url: self.value("embed URL")?,
                description: self.value("embed description")?,
                color: self.value("embed color")?,
            },
            "set_author" => EmbedOp::SetAuthor {
                name: self.value("author name")?,
                url: self.value("author URL")?,
                icon_url: self.value("author icon URL")?,
            },
            "set_thumbnail" => EmbedOp::SetThumbnail { url: self.value("thumbnail URL")? },
            "add_l" | "add_nl" => EmbedOp::AddField {
                title: self.value("field title")?,
                value: self.value("field value")?,
                inline: func.text == "add_l",
            },
            "set_footer" => EmbedOp::SetFooter { text: self.value("footer text")? },
            "send" => EmbedOp::Send { channel: self.optional_channel()? },
            _ => return Err(ParseError::UnknownEmbedFunction { name: func.text.clone() }),
        };
        Ok(Node::Embed { name, op })
    }

    // ── Values ────────────────────────────────────────────────────────────────

    /// The shared literal-or-variable sub-rule.
    fn value(&mut self, what: &str) -> Result<Value, ParseError> {
        match self.peek() {
            Some(tok) if tok.kind == TokenKind::String => {
                self.advance();
                Ok(Value::Str(tok.text.clone()))
            }
            Some(tok) if tok.kind == TokenKind::Number => {
                self.advance();
                Ok(Value::Number(tok.text.clone()))
            }
            Some(tok) if tok.kind == TokenKind::Identifier => {
                self.advance();
                Ok(Value::Var(tok.text.clone()))
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// One-token lookahead for the optional channel argument: present iff
    /// the next token could begin a value.
    fn optional_channel(&mut self) -> Result<Option<Value>, ParseError> {
        let value_ahead = matches!(
            self.peek(),
            Some(tok) if matches!(
                tok.kind,
                TokenKind::String | TokenKind::Number | TokenKind::Identifier
            )
        );
        if value_ahead {
            Ok(Some(self.value("channel id or variable")?))
        } else {
            Ok(None)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn parse_src(src: &str) -> Result<Vec<Node>, ParseError> {
        parse(&tokenize(src))
    }

    fn one(src: &str) -> Node {
        let mut nodes = parse_src(src).expect("parse failed");
        assert_eq!(nodes.len(), 1, "expected one node from {src:?}");
        nodes.remove(0)
    }

    #[test]
    fn empty_token_stream() {
        assert!(parse(&[]).unwrap().is_empty());
    }

    #[test]
    fn config_alone() {
        let nodes = parse_src("config COMMAND").unwrap();
        assert_eq!(nodes, [Node::Config { name: "COMMAND".into() }]);
    }

    #[test]
    fn config_requires_identifier() {
        let err = parse_src("config \"COMMAND\"").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
        assert!(err.to_string().contains("string 'COMMAND'"));
    }

    #[test]
    fn set_global() {
        assert_eq!(
            one("set GREETING \"hello\""),
            Node::SetVar {
                scope: Scope::Global,
                name: "GREETING".into(),
                value: Value::Str("hello".into()),
            }
        );
    }

    #[test]
    fn setl_local_with_var_value() {
        assert_eq!(
            one("setl msg GREETING"),
            Node::SetVar {
                scope: Scope::Local,
                name: "msg".into(),
                value: Value::Var("GREETING".into()),
            }
        );
    }

    #[test]
    fn send_without_channel() {
        assert_eq!(
            one("send \"hi\""),
            Node::Send { message: Value::Str("hi".into()), channel: None }
        );
    }

    #[test]
    fn send_with_channel() {
        assert_eq!(
            one("send \"hi\" 200"),
            Node::Send {
                message: Value::Str("hi".into()),
                channel: Some(Value::Number("200".into())),
            }
        );
    }

    #[test]
    fn send_channel_lookahead_eats_following_identifier() {
        // Accepted consequence of the optional-channel grammar: an
        // identifier on the next line is consumed as the channel variable.
        let nodes = parse_src("send \"one\" send \"two\"").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes[0],
            Node::Send {
                message: Value::Str("one".into()),
                channel: Some(Value::Var("send".into())),
            }
        );
    }

    #[test]
    fn react_instruction() {
        assert_eq!(
            one("react \"👍\" 42"),
            Node::React { emoji: "👍".into(), message: Value::Number("42".into()) }
        );
    }

    #[test]
    fn react_requires_string_emoji() {
        let err = parse_src("react 👍 42").unwrap_err();
        assert!(err.to_string().contains("emoji string"));
    }

    #[test]
    fn role_add() {
        assert_eq!(
            one("role:add 300 400"),
            Node::RoleOp {
                action: RoleAction::Add,
                member: Value::Number("300".into()),
                role: Value::Number("400".into()),
            }
        );
    }

    #[test]
    fn role_remove_with_vars() {
        assert_eq!(
            one("role:remove MEMBER ROLE"),
            Node::RoleOp {
                action: RoleAction::Remove,
                member: Value::Var("MEMBER".into()),
                role: Value::Var("ROLE".into()),
            }
        );
    }

    #[test]
    fn role_unknown_function() {
        let err = parse_src("role:grant 1 2").unwrap_err();
        assert_eq!(err, ParseError::UnknownRoleFunction { name: "grant".into() });
    }

    #[test]
    fn role_missing_colon() {
        let err = parse_src("role add 1 2").unwrap_err();
        assert!(err.to_string().contains("`:` after `role`"));
    }

    #[test]
    fn embed_create() {
        assert_eq!(
            one("embed:create greeting"),
            Node::Embed { name: "greeting".into(), op: EmbedOp::Create }
        );
    }

    #[test]
    fn embed_conf() {
        assert_eq!(
            one("embed:conf greeting \"Title\" \"https://x\" \"Desc\" \"#ff00aa\""),
            Node::Embed {
                name: "greeting".into(),
                op: EmbedOp::Conf {
                    title: Value::Str("Title".into()),
                    url: Value::Str("https://x".into()),
                    description: Value::Str("Desc".into()),
                    color: Value::Str("#ff00aa".into()),
                },
            }
        );
    }

    #[test]
    fn embed_field_inline_flag() {
        let inline = one("embed:add_l e \"a\" \"b\"");
        let block = one("embed:add_nl e \"a\" \"b\"");
        assert!(matches!(
            inline,
            Node::Embed { op: EmbedOp::AddField { inline: true, .. }, .. }
        ));
        assert!(matches!(
            block,
            Node::Embed { op: EmbedOp::AddField { inline: false, .. }, .. }
        ));
    }

    #[test]
    fn embed_set_author_and_footer() {
        assert_eq!(
            one("embed:set_author e \"name\" \"url\" \"icon\""),
            Node::Embed {
                name: "e".into(),
                op: EmbedOp::SetAuthor {
                    name: Value::Str("name".into()),
                    url: Value::Str("url".into()),
                    icon_url: Value::Str("icon".into()),
                },
            }
        );
        assert_eq!(
            one("embed:set_footer e \"bye\""),
            Node::Embed { name: "e".into(), op: EmbedOp::SetFooter { text: Value::Str("bye".into()) } }
        );
    }

    #[test]
    fn embed_send_without_channel() {
        assert_eq!(
            one("embed:send e"),
            Node::Embed { name: "e".into(), op: EmbedOp::Send { channel: None } }
        );
    }

    #[test]
    fn embed_send_with_channel() {
        assert_eq!(
            one("embed:send e 200"),
            Node::Embed {
                name: "e".into(),
                op: EmbedOp::Send { channel: Some(Value::Number("200".into())) },
            }
        );
    }

    #[test]
    fn embed_unknown_function() {
        let err = parse_src("embed:explode e").unwrap_err();
        assert_eq!(err, ParseError::UnknownEmbedFunction { name: "explode".into() });
    }

    #[test]
    fn unknown_instruction() {
        let err = parse_src("config DEFAULT\nfrobnicate 1").unwrap_err();
        assert!(matches!(err, ParseError::UnknownInstruction { .. }));
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn value_position_rejects_boolean() {
        // Boolean tokens exist but no value position accepts them.
        let err = parse_src("set FLAG true").unwrap_err();
        assert!(err.to_string().contains("global variable value"));
        assert!(err.to_string().contains("boolean 'true'"));
    }

    #[test]
    fn truncated_instruction_reports_end_of_input() {
        let err = parse_src("react \"👍\"").unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                expected: "message id or variable".into(),
                found: "end of input".into(),
            }
        );
    }

    #[test]
    fn multi_instruction_script() {
        let src = "\
config COMMAND
set COMMAND_NAME \"greet\"   # trigger name
set DESCRIPTION \"says hello\"
setl who \"world\"
send who
";
        let nodes = parse_src(src).unwrap();
        assert_eq!(nodes.len(), 5);
        assert!(nodes[0].is_config());
        assert_eq!(
            nodes[4],
            Node::Send { message: Value::Var("who".into()), channel: None }
        );
    }
}
