//! Scans an input string (source file) character by character.

#[derive(Debug)]
pub struct ParseError {
    msg: String,
    ofs: usize,
}
pub type ParseResult<T> = Result<T, ParseError>;

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.msg, self.ofs)
    }
}

pub struct Scanner<'a> {
    buf: &'a [u8],
    pub ofs: usize,
    pub line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        if !buf.ends_with(b"\0") {
            panic!("Scanner requires nul-terminated buf");
        }
        Scanner {
            buf,
            ofs: 0,
            line: 1,
        }
    }

    /// Slices the buffer as text.  Callers only slice between positions they
    /// scanned past, so a bad UTF-8 sequence is reported rather than trusted.
    pub fn slice(&self, start: usize, end: usize) -> ParseResult<&'a str> {
        std::str::from_utf8(&self.buf[start..end]).map_err(|_| ParseError {
            msg: "invalid UTF-8".into(),
            ofs: start,
        })
    }
    pub fn peek(&self) -> char {
        self.buf[self.ofs] as char
    }
    /// True only on the terminating nul, not on a nul inside the text.
    pub fn at_end(&self) -> bool {
        self.ofs == self.buf.len() - 1
    }
    pub fn peek2(&self) -> char {
        match self.buf.get(self.ofs + 1) {
            Some(&c) => c as char,
            None => '\0',
        }
    }
    pub fn next(&mut self) {
        if self.peek() == '\n' {
            self.line += 1;
        }
        if self.ofs == self.buf.len() - 1 {
            panic!("scanned past end")
        }
        self.ofs += 1;
    }
    pub fn back(&mut self) {
        if self.ofs == 0 {
            panic!("back at start")
        }
        self.ofs -= 1;
        if self.peek() == '\n' {
            self.line -= 1;
        }
    }
    pub fn read(&mut self) -> char {
        let c = self.peek();
        if c != '\0' {
            self.next();
        }
        c
    }
    pub fn skip(&mut self, ch: char) -> bool {
        if self.peek() == ch {
            self.next();
            return true;
        }
        false
    }

    /// Skips spaces and tabs, but not newlines.
    pub fn skip_spaces(&mut self) {
        while self.skip(' ') || self.skip('\t') || self.skip('\r') {}
    }

    pub fn expect(&mut self, ch: char) -> ParseResult<()> {
        let r = self.peek();
        if r != ch {
            return self.parse_error(format!("expected {:?}, got {:?}", ch, r));
        }
        self.next();
        Ok(())
    }

    pub fn parse_error<T, S: Into<String>>(&self, msg: S) -> ParseResult<T> {
        Err(ParseError {
            msg: msg.into(),
            ofs: self.ofs,
        })
    }

    pub fn format_parse_error(&self, filename: &str, err: ParseError) -> String {
        let mut ofs = 0;
        let lines = self.buf.split(|&c| c == b'\n');
        for (line_number, line) in lines.enumerate() {
            if ofs + line.len() >= err.ofs {
                let mut msg = "parse error: ".to_string();
                msg.push_str(&err.msg);
                msg.push('\n');

                let prefix = format!("{}:{}: ", filename, line_number + 1);
                msg.push_str(&prefix);

                let line = line.strip_suffix(b"\0").unwrap_or(line);
                let context = String::from_utf8_lossy(line);
                let mut context: &str = &context;
                let mut col = err.ofs - ofs;
                if col > 40 && context.is_char_boundary(col - 20) {
                    // Trim beginning of line to fit it on screen.
                    msg.push_str("...");
                    context = &context[col - 20..];
                    col = 3 + 20;
                }
                if context.len() > 40 && context.is_char_boundary(40) {
                    msg.push_str(&context[0..40]);
                    msg.push_str("...");
                } else {
                    msg.push_str(context);
                }
                msg.push('\n');

                msg.push_str(&" ".repeat(prefix.len() + col));
                msg.push_str("^\n");
                return msg;
            }
            ofs += line.len() + 1;
        }
        panic!("invalid offset when formatting error")
    }
}
