//! MADR line lexer
//!
//! Classifies each source line into a token for the parser to consume.
//! The dialect is line-oriented, so a token never spans more than one line.

/// A token in a MADR document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind of token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// ATX heading (`#` to `######`), text trimmed and comments removed
    Heading { level: u8, text: String },
    /// Bullet list item (`*`, `-` or `+`), text after the marker without comments
    ListItem(String),
    /// Any other non-blank line, trailing whitespace removed
    Text(String),
    /// Whitespace-only or comment-only line
    Blank,
    /// End of file
    Eof,
}

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Starting byte offset
    pub start: usize,
    /// Ending byte offset (exclusive, line terminator not included)
    pub end: usize,
    /// Starting line (1-indexed)
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// Span covering both `self` and `other`
    pub fn to(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
        }
    }
}

/// Lexer for MADR documents
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position
    pos: usize,
    /// Current line (1-indexed)
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        if self.pos >= self.input.len() {
            return Token {
                kind: TokenKind::Eof,
                span: Span::new(self.pos, self.pos, self.line),
            };
        }

        let start = self.pos;
        let rest = &self.input[start..];
        let (raw, consumed) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let token = Token {
            kind: classify_line(raw),
            span: Span::new(start, start + raw.len(), self.line),
        };

        self.pos += consumed;
        self.line += 1;
        token
    }
}

/// Classify a single line (without its terminator)
fn classify_line(raw: &str) -> TokenKind {
    let line = raw.trim();

    if line.is_empty() || is_comment_only(line) {
        return TokenKind::Blank;
    }

    if let Some((level, text)) = heading(line) {
        return TokenKind::Heading {
            level,
            text: strip_comments(text).trim().to_string(),
        };
    }

    for marker in ["* ", "- ", "+ "] {
        if let Some(text) = line.strip_prefix(marker) {
            return TokenKind::ListItem(strip_comments(text).trim().to_string());
        }
    }
    // A bare marker is an empty item
    if matches!(line, "*" | "-" | "+") {
        return TokenKind::ListItem(String::new());
    }

    TokenKind::Text(raw.trim_end().to_string())
}

/// Split an ATX heading into its level and text
fn heading(line: &str) -> Option<(u8, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let text = &line[level..];
    if text.is_empty() {
        return Some((level as u8, ""));
    }
    if !text.starts_with([' ', '\t']) {
        return None;
    }
    Some((level as u8, text))
}

fn is_comment_only(line: &str) -> bool {
    line.starts_with("<!--") && line.ends_with("-->") && strip_comments(line).trim().is_empty()
}

/// Remove `<!-- ... -->` comments that open and close on the same line
pub(crate) fn strip_comments(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(open) = rest.find("<!--") {
        let Some(close) = rest[open + 4..].find("-->") else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + 4 + close + 3..];
    }
    out.push_str(rest);
    out
}
