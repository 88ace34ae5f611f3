//! Parser for the SDL-like project file syntax.
//!
//! A file is a list of tags.  A tag is a name followed by values and an
//! optional `{ ... }` block of child tags, terminated by a newline or `;`:
//!
//! ```text
//! rule "build" {
//!     cmd "cc -o out in.c"
//!     in "in.c"; out "out"
//! }
//! ```
//!
//! A tag that starts with a value instead of a name is anonymous and gets
//! the name `content`.  Attributes (`key=value`) are not supported.

use crate::node::{Node, Value};
use crate::scanner::{ParseError, ParseResult, Scanner};

/// A parsed tag, with the line it started on for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub values: Vec<Value>,
    pub children: Vec<Tag>,
    pub line: usize,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            values: Vec::new(),
            children: Vec::new(),
            line: 0,
        }
    }

    pub fn value(mut self, value: Value) -> Self {
        self.values.push(value);
        self
    }

    pub fn child(mut self, child: Tag) -> Self {
        self.children.push(child);
        self
    }
}

impl Node for Tag {
    fn name(&self) -> &str {
        &self.name
    }
    fn values(&self) -> &[Value] {
        &self.values
    }
    fn children(&self) -> &[Tag] {
        &self.children
    }
}

const ANONYMOUS_TAG: &str = "content";

fn is_ident_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_ident_char(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' | '$' | ':')
}

pub struct Parser<'text> {
    scanner: Scanner<'text>,
}

impl<'text> Parser<'text> {
    /// The buffer must be nul-terminated.
    pub fn new(buf: &'text [u8]) -> Parser<'text> {
        Parser {
            scanner: Scanner::new(buf),
        }
    }

    pub fn format_parse_error(&self, filename: &str, err: ParseError) -> String {
        self.scanner.format_parse_error(filename, err)
    }

    /// Reads the next top-level tag, or None at end of input.
    pub fn read(&mut self) -> ParseResult<Option<Tag>> {
        self.skip_trivia(true)?;
        match self.scanner.peek() {
            '\0' if self.scanner.at_end() => Ok(None),
            '\0' => self.scanner.parse_error("unexpected NUL byte"),
            '}' => self.scanner.parse_error("unexpected '}'"),
            _ => Ok(Some(self.read_tag()?)),
        }
    }

    /// Reads all remaining tags.
    pub fn read_all(&mut self) -> ParseResult<Vec<Tag>> {
        let mut tags = Vec::new();
        while let Some(tag) = self.read()? {
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Skips spaces, comments and line continuations; with `newlines`, also
    /// skips blank lines and `;` separators.
    fn skip_trivia(&mut self, newlines: bool) -> ParseResult<()> {
        loop {
            self.scanner.skip_spaces();
            match self.scanner.peek() {
                '#' => self.skip_line_comment(),
                '/' if self.scanner.peek2() == '/' => self.skip_line_comment(),
                '-' if self.scanner.peek2() == '-' => self.skip_line_comment(),
                '/' if self.scanner.peek2() == '*' => self.skip_block_comment()?,
                '\\' => {
                    self.scanner.next();
                    self.scanner.skip_spaces();
                    if !self.scanner.skip('\n') {
                        return self.scanner.parse_error("expected newline after '\\'");
                    }
                }
                '\n' | ';' if newlines => self.scanner.next(),
                _ => return Ok(()),
            }
        }
    }

    /// Leaves the scanner on the newline (or EOF) ending the comment.
    fn skip_line_comment(&mut self) {
        loop {
            match self.scanner.peek() {
                '\0' | '\n' => return,
                _ => self.scanner.next(),
            }
        }
    }

    fn skip_block_comment(&mut self) -> ParseResult<()> {
        self.scanner.next();
        self.scanner.next();
        loop {
            match self.scanner.read() {
                '\0' => return self.scanner.parse_error("unterminated comment"),
                '*' if self.scanner.peek() == '/' => {
                    self.scanner.next();
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    fn read_tag(&mut self) -> ParseResult<Tag> {
        let line = self.scanner.line;
        let mut tag = Tag::new(ANONYMOUS_TAG);
        tag.line = line;

        if is_ident_start(self.scanner.peek()) {
            let ident = self.read_ident()?;
            match keyword_value(ident) {
                Some(value) => tag.values.push(value),
                None => tag.name = ident.to_owned(),
            }
        } else {
            tag.values.push(self.read_value()?);
        }

        loop {
            self.skip_trivia(false)?;
            match self.scanner.peek() {
                '\0' | '}' => break,
                '\n' | ';' => {
                    self.scanner.next();
                    break;
                }
                '{' => {
                    self.scanner.next();
                    tag.children = self.read_children()?;
                    break;
                }
                _ => {
                    let value = self.read_value()?;
                    tag.values.push(value);
                }
            }
        }

        if tag.name == ANONYMOUS_TAG && tag.values.is_empty() {
            return self.scanner.parse_error("anonymous tag needs a value");
        }
        Ok(tag)
    }

    fn read_children(&mut self) -> ParseResult<Vec<Tag>> {
        let mut children = Vec::new();
        loop {
            self.skip_trivia(true)?;
            match self.scanner.peek() {
                '\0' if self.scanner.at_end() => {
                    return self.scanner.parse_error("unexpected EOF, expected '}'")
                }
                '\0' => return self.scanner.parse_error("unexpected NUL byte"),
                '}' => {
                    self.scanner.next();
                    return Ok(children);
                }
                _ => children.push(self.read_tag()?),
            }
        }
    }

    fn read_ident(&mut self) -> ParseResult<&'text str> {
        let start = self.scanner.ofs;
        while is_ident_char(self.scanner.peek()) {
            self.scanner.next();
        }
        let end = self.scanner.ofs;
        if end == start {
            return self.scanner.parse_error("failed to scan ident");
        }
        self.scanner.slice(start, end)
    }

    fn read_value(&mut self) -> ParseResult<Value> {
        let value = match self.scanner.peek() {
            '"' => Value::String(self.read_string()?),
            '`' => Value::String(self.read_raw_string()?),
            '0'..='9' | '-' | '+' | '.' => self.read_number()?,
            c if is_ident_start(c) => {
                let start = self.scanner.ofs;
                let ident = self.read_ident()?;
                if let Some(value) = keyword_value(ident) {
                    value
                } else if self.scanner.peek() == '=' {
                    return self.scanner.parse_error("attributes are not supported");
                } else {
                    self.scanner.ofs = start;
                    return self
                        .scanner
                        .parse_error(format!("unexpected identifier {:?}", ident));
                }
            }
            c => {
                return self
                    .scanner
                    .parse_error(format!("unexpected character {:?}", c))
            }
        };
        self.expect_delimiter()?;
        Ok(value)
    }

    /// Values must be followed by something that can't continue them.
    fn expect_delimiter(&mut self) -> ParseResult<()> {
        match self.scanner.peek() {
            ' ' | '\t' | '\r' | '\n' | ';' | '{' | '}' | '\0' | '#' | '\\' => Ok(()),
            '/' if matches!(self.scanner.peek2(), '/' | '*') => Ok(()),
            '-' if self.scanner.peek2() == '-' => Ok(()),
            '=' => self.scanner.parse_error("attributes are not supported"),
            c => self
                .scanner
                .parse_error(format!("unexpected character {:?}", c)),
        }
    }

    fn read_string(&mut self) -> ParseResult<String> {
        let start = self.scanner.ofs;
        self.scanner.expect('"')?;
        let mut bytes = Vec::new();
        loop {
            let c = self.scanner.peek();
            match c {
                '\0' | '\n' => return self.scanner.parse_error("unterminated string"),
                '"' => {
                    self.scanner.next();
                    break;
                }
                '\\' => {
                    self.scanner.next();
                    match self.scanner.read() {
                        'n' => bytes.push(b'\n'),
                        't' => bytes.push(b'\t'),
                        'r' => bytes.push(b'\r'),
                        '"' => bytes.push(b'"'),
                        '\\' => bytes.push(b'\\'),
                        '\n' => self.scanner.skip_spaces(),
                        c => {
                            self.scanner.back();
                            return self
                                .scanner
                                .parse_error(format!("invalid escape {:?}", c));
                        }
                    }
                }
                _ => {
                    bytes.push(c as u8);
                    self.scanner.next();
                }
            }
        }
        String::from_utf8(bytes).or_else(|_| {
            self.scanner.ofs = start;
            self.scanner.parse_error("invalid UTF-8 in string")
        })
    }

    fn read_raw_string(&mut self) -> ParseResult<String> {
        self.scanner.expect('`')?;
        let start = self.scanner.ofs;
        loop {
            match self.scanner.peek() {
                '\0' => return self.scanner.parse_error("unterminated string"),
                '`' => break,
                _ => self.scanner.next(),
            }
        }
        let end = self.scanner.ofs;
        self.scanner.next();
        Ok(self.scanner.slice(start, end)?.to_owned())
    }

    fn read_number(&mut self) -> ParseResult<Value> {
        let start = self.scanner.ofs;
        if matches!(self.scanner.peek(), '-' | '+') {
            self.scanner.next();
        }
        let mut float = false;
        while let c @ ('0'..='9' | '.') = self.scanner.peek() {
            float = float || c == '.';
            self.scanner.next();
        }
        let end = self.scanner.ofs;
        let text = self.scanner.slice(start, end)?;
        match self.scanner.peek() {
            'L' | 'l' if !float => self.scanner.next(),
            'f' | 'F' | 'd' | 'D' => {
                self.scanner.next();
                float = true;
            }
            _ => {}
        }
        let parsed = if float {
            text.parse::<f64>().map(Value::Float).ok()
        } else {
            text.parse::<i64>().map(Value::Int).ok()
        };
        match parsed {
            Some(value) => Ok(value),
            None => {
                self.scanner.ofs = start;
                self.scanner
                    .parse_error(format!("invalid number {:?}", text))
            }
        }
    }
}

fn keyword_value(ident: &str) -> Option<Value> {
    Some(match ident {
        "true" | "on" => Value::Bool(true),
        "false" | "off" => Value::Bool(false),
        "null" => Value::Null,
        _ => return None,
    })
}

/// Parses a whole buffer, which must be nul-terminated.
pub fn parse(buf: &[u8]) -> ParseResult<Vec<Tag>> {
    Parser::new(buf).read_all()
}
