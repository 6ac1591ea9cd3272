//! # JSON-with-Comments Normalizer
//!
//! Converts JSONC text into strict JSON text in two linear passes:
//!
//! 1. [`strip_comments`] drops `// ...` line comments (the newline stays) and
//!    `/* ... */` block comments. An unterminated block comment swallows the
//!    rest of the input.
//! 2. [`strip_trailing_commas`] drops a comma when the next non-whitespace
//!    character is `}` or `]`.
//!
//! Both passes share [`StringTracker`], so nothing inside a string literal is
//! ever treated as a comment marker or a trailing comma. A plain regex
//! substitution of `,\s*}` cannot make that distinction: it would rewrite a
//! description such as `"a,}"`.
//!
//! Neither pass can fail. Unbalanced quotes or comments produce best-effort
//! output and the JSON parser reports the problem.

/// Quote tracking shared by both normalizer passes.
///
/// Feed every character that is not inside a comment to [`consume`]; it
/// reports whether that character belongs to a string literal, including the
/// opening and closing quotes. A backslash inside a string escapes the next
/// character, so `\"` never closes the literal.
///
/// [`consume`]: StringTracker::consume
#[derive(Debug, Default, Clone, Copy)]
struct StringTracker {
    quote: Option<char>,
    escaped: bool,
}

impl StringTracker {
    fn consume(&mut self, c: char) -> bool {
        match self.quote {
            Some(quote) => {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == quote {
                    self.quote = None;
                }
                true
            }
            None if c == '"' || c == '\'' => {
                self.quote = Some(c);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comment {
    None,
    Line,
    Block,
}

/// Normalize JSONC text into strict JSON text.
///
/// Equivalent to `strip_trailing_commas(&strip_comments(text))`. String
/// contents are never altered.
pub fn normalize(text: &str) -> String {
    strip_trailing_commas(&strip_comments(text))
}

/// Remove `//` and `/* */` comments outside string literals.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut strings = StringTracker::default();
    let mut comment = Comment::None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match comment {
            Comment::Line => {
                if c == '\n' {
                    out.push(c);
                    comment = Comment::None;
                }
                continue;
            }
            Comment::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    comment = Comment::None;
                }
                continue;
            }
            Comment::None => {}
        }

        if strings.consume(c) {
            out.push(c);
            continue;
        }

        match (c, chars.peek()) {
            ('/', Some('/')) => {
                chars.next();
                comment = Comment::Line;
            }
            ('/', Some('*')) => {
                chars.next();
                comment = Comment::Block;
            }
            _ => out.push(c),
        }
    }

    out
}

/// Remove commas that directly precede `}` or `]`, ignoring whitespace in
/// between. Commas inside string literals are kept.
///
/// The whitespace between a removed comma and the closing bracket is kept.
pub fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut strings = StringTracker::default();
    // Whitespace buffered after a comma whose fate is not yet known.
    let mut pending: Option<String> = None;

    for c in text.chars() {
        if let Some(gap) = pending.as_mut() {
            if c.is_whitespace() {
                gap.push(c);
                continue;
            }
        }
        if let Some(gap) = pending.take() {
            if c != '}' && c != ']' {
                out.push(',');
            }
            out.push_str(&gap);
        }

        if strings.consume(c) {
            out.push(c);
        } else if c == ',' {
            pending = Some(String::new());
        } else {
            out.push(c);
        }
    }

    if let Some(gap) = pending {
        out.push(',');
        out.push_str(&gap);
    }

    out
}
