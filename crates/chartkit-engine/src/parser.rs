//! Action parsing: expression AST and `define` block structure.
//!
//! The expression grammar is the pipeline dialect:
//!
//! ```text
//! pipeline := command ('|' command)*
//! command  := ident operand* | operand
//! operand  := literal | dot-path | '(' pipeline ')'
//! ```
//!
//! Pipelines desugar at parse time: the piped value becomes the final
//! argument of the next stage, so `.V | default "x" | quote` parses as
//! `quote(default("x", .V))`.

use std::sync::Arc;

use serde_json::Number;

use crate::lexer::{self, Segment};

/// One node of a compiled template body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Output(Expr),
    /// A named fragment definition. Registered during Pass 1 (or locally
    /// for a primary file); renders to nothing in place.
    Define { name: String, body: Arc<Vec<Node>> },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
    /// Dot-path into the render context; empty means the bare `.`.
    Path(Vec<String>),
    Call { name: String, args: Vec<Expr> },
}

/// Parse a full template source into a body.
pub(crate) fn parse(source: &str) -> Result<Vec<Node>, String> {
    let segments = lexer::segments(source)?;
    let mut root: Vec<Node> = Vec::new();
    // at most one open define block; nesting is rejected
    let mut open: Option<(String, Vec<Node>)> = None;

    for segment in segments {
        match segment {
            Segment::Text(text) => {
                let target = open.as_mut().map(|(_, body)| body).unwrap_or(&mut root);
                target.push(Node::Text(text));
            }
            Segment::Action { body, line } => {
                match parse_action(&body).map_err(|e| format!("{e} on line {line}"))? {
                    Action::Define(name) => {
                        if open.is_some() {
                            return Err(format!("nested define on line {line}"));
                        }
                        open = Some((name, Vec::new()));
                    }
                    Action::End => match open.take() {
                        Some((name, block)) => root.push(Node::Define {
                            name,
                            body: Arc::new(block),
                        }),
                        None => return Err(format!("unexpected end on line {line}")),
                    },
                    Action::Output(expr) => {
                        let target = open.as_mut().map(|(_, body)| body).unwrap_or(&mut root);
                        target.push(Node::Output(expr));
                    }
                }
            }
        }
    }

    if let Some((name, _)) = open {
        return Err(format!("unclosed define {name:?}"));
    }
    Ok(root)
}

enum Action {
    Output(Expr),
    Define(String),
    End,
}

fn parse_action(body: &str) -> Result<Action, String> {
    let tokens = tokenize(body)?;
    if tokens.is_empty() {
        return Err("empty action".to_string());
    }
    if let Tok::Ident(head) = &tokens[0] {
        match head.as_str() {
            "define" => {
                return match tokens.get(1) {
                    Some(Tok::Str(name)) if tokens.len() == 2 => Ok(Action::Define(name.clone())),
                    _ => Err("define expects a quoted fragment name".to_string()),
                };
            }
            "end" => {
                return if tokens.len() == 1 {
                    Ok(Action::End)
                } else {
                    Err("unexpected tokens after end".to_string())
                };
            }
            _ => {}
        }
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let expr = parser.pipeline()?;
    if parser.pos != tokens.len() {
        return Err("unexpected trailing tokens".to_string());
    }
    Ok(Action::Output(expr))
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Number(Number),
    Dot(Vec<String>),
    LParen,
    RParen,
    Pipe,
}

fn tokenize(body: &str) -> Result<Vec<Tok>, String> {
    let mut tokens = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '|' => {
                chars.next();
                tokens.push(Tok::Pipe);
            }
            '(' => {
                chars.next();
                tokens.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Tok::RParen);
            }
            '"' => {
                chars.next();
                tokens.push(Tok::Str(scan_string(&mut chars)?));
            }
            '.' => {
                chars.next();
                let mut path = Vec::new();
                loop {
                    let mut segment = String::new();
                    while let Some(&c) = chars.peek() {
                        if c.is_alphanumeric() || c == '_' || c == '-' {
                            segment.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if segment.is_empty() {
                        if path.is_empty() {
                            break; // bare dot
                        }
                        return Err("trailing dot in path".to_string());
                    }
                    path.push(segment);
                    if chars.peek() == Some(&'.') {
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Tok::Dot(path));
            }
            _ if c.is_ascii_digit() || c == '-' => {
                tokens.push(Tok::Number(scan_number(&mut chars)?));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Tok::Ident(ident));
            }
            other => return Err(format!("unexpected character {other:?}")),
        }
    }
    Ok(tokens)
}

fn scan_string(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String, String> {
    let mut out = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(out),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => return Err(format!("unsupported escape \\{other}")),
                None => return Err("unterminated string".to_string()),
            },
            Some(c) => out.push(c),
            None => return Err("unterminated string".to_string()),
        }
    }
}

fn scan_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Number, String> {
    let mut raw = String::new();
    if chars.peek() == Some(&'-') {
        raw.push('-');
        chars.next();
    }
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            raw.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Number::from(i));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| format!("invalid number {raw:?}"))
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

struct Parser<'a> {
    tokens: &'a [Tok],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn pipeline(&mut self) -> Result<Expr, String> {
        let mut expr = self.command()?;
        while self.peek() == Some(&Tok::Pipe) {
            self.pos += 1;
            match self.command()? {
                Expr::Call { name, mut args } => {
                    args.push(expr);
                    expr = Expr::Call { name, args };
                }
                _ => return Err("pipeline stage must be a function call".to_string()),
            }
        }
        Ok(expr)
    }

    fn command(&mut self) -> Result<Expr, String> {
        if let Some(Tok::Ident(name)) = self.peek() {
            if !is_literal_keyword(name) {
                let name = name.clone();
                self.pos += 1;
                let mut args = Vec::new();
                while self.at_operand() {
                    args.push(self.operand()?);
                }
                return Ok(Expr::Call { name, args });
            }
        }
        let expr = self.operand()?;
        if self.at_operand() {
            return Err("unexpected argument after value".to_string());
        }
        Ok(expr)
    }

    fn at_operand(&self) -> bool {
        matches!(
            self.peek(),
            Some(Tok::Ident(_) | Tok::Str(_) | Tok::Number(_) | Tok::Dot(_) | Tok::LParen)
        )
    }

    fn operand(&mut self) -> Result<Expr, String> {
        let tok = self.peek().cloned().ok_or("expected a value")?;
        self.pos += 1;
        match tok {
            Tok::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                "nil" | "null" => Expr::Null,
                // a bare ident in argument position is a zero-argument call
                _ => Expr::Call {
                    name,
                    args: Vec::new(),
                },
            }),
            Tok::Str(s) => Ok(Expr::Str(s)),
            Tok::Number(n) => Ok(Expr::Number(n)),
            Tok::Dot(path) => Ok(Expr::Path(path)),
            Tok::LParen => {
                let inner = self.pipeline()?;
                match self.peek() {
                    Some(Tok::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Tok::RParen | Tok::Pipe => Err("expected a value".to_string()),
        }
    }
}

fn is_literal_keyword(name: &str) -> bool {
    matches!(name, "true" | "false" | "nil" | "null")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(body: &str) -> Expr {
        match parse(&format!("{{{{ {body} }}}}")).unwrap().remove(0) {
            Node::Output(expr) => expr,
            other => panic!("expected output node, got {other:?}"),
        }
    }

    fn call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    #[test]
    fn parses_literals() {
        assert_eq!(parse_expr("\"hi\""), Expr::Str("hi".into()));
        assert_eq!(parse_expr("42"), Expr::Number(Number::from(42)));
        assert_eq!(parse_expr("-3"), Expr::Number(Number::from(-3)));
        assert_eq!(parse_expr("true"), Expr::Bool(true));
        assert_eq!(parse_expr("nil"), Expr::Null);
    }

    #[test]
    fn parses_paths() {
        assert_eq!(
            parse_expr(".Values.image.tag"),
            Expr::Path(vec!["Values".into(), "image".into(), "tag".into()])
        );
        assert_eq!(parse_expr("."), Expr::Path(vec![]));
    }

    #[test]
    fn parses_calls_with_arguments() {
        assert_eq!(
            parse_expr("default \"x\" .Values.name"),
            call(
                "default",
                vec![Expr::Str("x".into()), Expr::Path(vec!["Values".into(), "name".into()])]
            )
        );
    }

    #[test]
    fn pipeline_desugars_to_nested_calls() {
        assert_eq!(
            parse_expr(".V | default \"x\" | quote"),
            call(
                "quote",
                vec![call(
                    "default",
                    vec![Expr::Str("x".into()), Expr::Path(vec!["V".into()])]
                )]
            )
        );
    }

    #[test]
    fn parenthesized_subexpressions_nest() {
        assert_eq!(
            parse_expr("indent 2 (toYaml .Values)"),
            call(
                "indent",
                vec![
                    Expr::Number(Number::from(2)),
                    call("toYaml", vec![Expr::Path(vec!["Values".into()])])
                ]
            )
        );
    }

    #[test]
    fn define_blocks_collect_their_body() {
        let nodes = parse("{{ define \"X\" }}body {{ .N }}{{ end }}").unwrap();
        match &nodes[0] {
            Node::Define { name, body } => {
                assert_eq!(name, "X");
                assert_eq!(body.len(), 2);
            }
            other => panic!("expected define, got {other:?}"),
        }
    }

    #[test]
    fn define_errors() {
        assert!(parse("{{ define \"a\" }}{{ define \"b\" }}").unwrap_err().contains("nested define"));
        assert!(parse("{{ end }}").unwrap_err().contains("unexpected end"));
        assert!(parse("{{ define \"a\" }}x").unwrap_err().contains("unclosed define"));
        assert!(parse("{{ define }}").unwrap_err().contains("quoted fragment name"));
    }

    #[test]
    fn expression_errors_carry_the_line() {
        let err = parse("ok\n{{ \"a\" \"b\" }}").unwrap_err();
        assert!(err.contains("on line 2"), "{err}");
    }

    #[test]
    fn pipeline_into_a_literal_is_rejected() {
        assert!(parse("{{ .V | \"x\" }}").is_err());
    }

    #[test]
    fn string_escapes() {
        assert_eq!(parse_expr("\"a\\nb\\\"c\""), Expr::Str("a\nb\"c".into()));
    }
}
