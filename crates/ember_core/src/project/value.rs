//! Tokenizer and parser for the Lua-table subset used by project files.
//!
//! The grammar is deliberately small: a file is a sequence of
//! `name = value` globals, where a value is a number, a quoted string,
//! a boolean, or a `{ ... }` table holding named fields and/or positional
//! entries. `--` starts a line comment. This is enough to read every file
//! the writer emits plus hand-edited variations (extra whitespace,
//! trailing commas, reordered fields).

use thiserror::Error;

/// Errors from the textual layer of project loading.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("parse error at line {line}: expected {expected}, found {found}")]
    Unexpected {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("invalid number at line {line}: {text}")]
    InvalidNumber { line: usize, text: String },

    #[error("unterminated string starting at line {line}")]
    UnterminatedString { line: usize },
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    Table(Table),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
        }
    }
}

/// A parsed `{ ... }` literal: named fields plus positional entries,
/// both in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    fields: Vec<(String, Value)>,
    items: Vec<Value>,
}

impl Table {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        match self.get(name)? {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Positional entries, e.g. the records of a section array.
    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// A parsed file: the ordered list of global assignments.
#[derive(Clone, Debug, Default)]
pub struct Document {
    globals: Vec<(String, Value)>,
}

impl Document {
    pub fn parse(text: &str) -> ParseResult<Self> {
        let tokens = tokenize(text)?;
        let mut parser = Parser { tokens, pos: 0 };
        parser.document()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.globals
            .iter()
            .find(|(global, _)| global == name)
            .map(|(_, value)| value)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        match self.get(name)? {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    Bool(bool),
    Equals,
    LBrace,
    RBrace,
    Comma,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Number(n) => format!("number `{n}`"),
            TokenKind::Str(s) => format!("string \"{s}\""),
            TokenKind::Bool(b) => format!("`{b}`"),
            TokenKind::Equals => "`=`".to_string(),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    line: usize,
}

fn tokenize(text: &str) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '=' => {
                chars.next();
                tokens.push(Token { kind: TokenKind::Equals, line });
            }
            '{' => {
                chars.next();
                tokens.push(Token { kind: TokenKind::LBrace, line });
            }
            '}' => {
                chars.next();
                tokens.push(Token { kind: TokenKind::RBrace, line });
            }
            ',' => {
                chars.next();
                tokens.push(Token { kind: TokenKind::Comma, line });
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\n') | None => {
                            return Err(ParseError::UnterminatedString { line });
                        }
                        Some(c) => text.push(c),
                    }
                }
                tokens.push(Token { kind: TokenKind::Str(text), line });
            }
            '-' | '.' | '0'..='9' => {
                // `--` starts a comment, anything else here is a number.
                let mut text = String::new();
                text.push(c);
                chars.next();
                if c == '-' && chars.peek() == Some(&'-') {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            line += 1;
                            break;
                        }
                    }
                    continue;
                }
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' {
                        text.push(c);
                        chars.next();
                    } else if (c == '+' || c == '-')
                        && matches!(text.chars().last(), Some('e') | Some('E'))
                    {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number: f64 = text
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber { line, text: text.clone() })?;
                tokens.push(Token { kind: TokenKind::Number(number), line });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let kind = match name.as_str() {
                    "true" => TokenKind::Bool(true),
                    "false" => TokenKind::Bool(false),
                    _ => TokenKind::Ident(name),
                };
                tokens.push(Token { kind, line });
            }
            other => {
                return Err(ParseError::Unexpected {
                    line,
                    expected: "token",
                    found: format!("`{other}`"),
                });
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn document(&mut self) -> ParseResult<Document> {
        let mut globals = Vec::new();
        while self.pos < self.tokens.len() {
            let name = self.expect_ident()?;
            self.expect(TokenKind::Equals, "`=`")?;
            let value = self.value()?;
            globals.push((name, value));
        }
        Ok(Document { globals })
    }

    fn value(&mut self) -> ParseResult<Value> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Number(n) => Ok(Value::Number(n)),
            TokenKind::Str(s) => Ok(Value::Str(s)),
            TokenKind::Bool(b) => Ok(Value::Bool(b)),
            TokenKind::LBrace => self.table(),
            other => Err(ParseError::Unexpected {
                line: token.line,
                expected: "a value",
                found: other.describe(),
            }),
        }
    }

    fn table(&mut self) -> ParseResult<Value> {
        let mut table = Table::default();
        loop {
            match self.peek()? {
                TokenKind::RBrace => {
                    self.pos += 1;
                    return Ok(Value::Table(table));
                }
                TokenKind::Ident(_) if self.peek_ahead(1) == Some(&TokenKind::Equals) => {
                    let name = self.expect_ident()?;
                    self.pos += 1; // consume `=`
                    let value = self.value()?;
                    table.fields.push((name, value));
                }
                _ => {
                    let value = self.value()?;
                    table.items.push(value);
                }
            }

            // Entries are comma separated, trailing comma allowed.
            match self.peek()? {
                TokenKind::Comma => self.pos += 1,
                TokenKind::RBrace => {}
                other => {
                    let line = self.tokens[self.pos].line;
                    return Err(ParseError::Unexpected {
                        line,
                        expected: "`,` or `}`",
                        found: other.describe(),
                    });
                }
            }
        }
    }

    fn next(&mut self) -> ParseResult<Token> {
        let token = self.tokens.get(self.pos).cloned().ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(token)
    }

    fn peek(&self) -> ParseResult<&TokenKind> {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .ok_or(ParseError::UnexpectedEof)
    }

    fn peek_ahead(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> ParseResult<()> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(())
        } else {
            Err(ParseError::Unexpected {
                line: token.line,
                expected,
                found: token.kind.describe(),
            })
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            other => Err(ParseError::Unexpected {
                line: token.line,
                expected: "an identifier",
                found: other.describe(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_globals() {
        let doc = Document::parse("project_version = 1\nname = \"demo\"").unwrap();
        assert_eq!(doc.number("project_version"), Some(1.0));
        assert_eq!(doc.get("name"), Some(&Value::Str("demo".to_string())));
        assert!(doc.get("missing").is_none());
    }

    #[test]
    fn test_nested_tables() {
        let text = r#"
            world =
            {
                background_color = {r = 0.1, g = 0.2, b = 0.3},
                samplers =
                {
                    {
                        type = "regular",
                        num_samples = 16
                    },
                    {
                        type = "jittered",
                        num_samples = 64
                    }
                }
            }
        "#;
        let doc = Document::parse(text).unwrap();
        let world = doc.table("world").unwrap();

        let bg = world.table("background_color").unwrap();
        assert_eq!(bg.number("g"), Some(0.2));

        let samplers = world.table("samplers").unwrap();
        assert_eq!(samplers.items().len(), 2);
        let Value::Table(first) = &samplers.items()[0] else {
            panic!("expected a table entry");
        };
        assert_eq!(first.string("type"), Some("regular"));
        assert_eq!(first.number("num_samples"), Some(16.0));
    }

    #[test]
    fn test_negative_numbers_and_booleans() {
        let doc = Document::parse("t = {x = -1.5, y = 2e-3, flag = true}").unwrap();
        let t = doc.table("t").unwrap();
        assert_eq!(t.number("x"), Some(-1.5));
        assert_eq!(t.number("y"), Some(2e-3));
        assert_eq!(t.boolean("flag"), Some(true));
    }

    #[test]
    fn test_comments_and_trailing_commas() {
        let text = "-- project file\nt = {a = 1, b = 2,} -- trailing\n";
        let doc = Document::parse(text).unwrap();
        assert_eq!(doc.table("t").unwrap().number("b"), Some(2.0));
    }

    #[test]
    fn test_error_carries_line() {
        let err = Document::parse("t =\n{\n  a = $\n}").unwrap_err();
        match err {
            ParseError::Unexpected { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            Document::parse("t = \"oops"),
            Err(ParseError::UnterminatedString { .. })
        ));
    }
}
