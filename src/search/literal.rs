//! Decoder for the JavaScript data files that make up a generated search index.
//!
//! `searchdata.js` and the per-shard files are not JSON: strings are single-quoted,
//! object keys are bare integers, and trailing commas are common. This module parses
//! that literal subset into [`serde_json::Value`] trees.

use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;
use thiserror::Error;

/// Deepest array/object nesting accepted before parsing gives up.
const MAX_DEPTH: usize = 128;

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:var|let|const)[ \t]+([A-Za-z_$][A-Za-z0-9_$]*)[ \t]*=")
        .expect("assignment pattern is valid")
});

/// A parse failure with the byte offset where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Parses a single literal, ignoring surrounding whitespace and comments.
pub fn parse_literal(source: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(source, 0);
    let value = parser.value()?;
    parser.skip_trivia()?;
    if parser.peek().is_some_and(|c| c != ';') {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

/// Extracts every top-level `var|let|const NAME = <literal>` statement.
///
/// Statements whose right-hand side is not a literal (function calls, expressions) are
/// skipped rather than reported.
pub fn parse_assignments(source: &str) -> Result<Vec<(String, Value)>, LiteralError> {
    let mut assignments = Vec::new();
    let mut resume = 0;

    for captures in ASSIGNMENT.captures_iter(source) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() < resume {
            // Inside a literal we already consumed.
            continue;
        }

        let mut parser = Parser::new(source, whole.end());
        parser.skip_trivia()?;
        if !starts_literal(&source[parser.pos..]) {
            tracing::trace!("Skipping non-literal assignment to {}", name.as_str());
            continue;
        }
        let value = parser.value()?;
        resume = parser.pos;
        assignments.push((name.as_str().to_string(), value));
    }

    Ok(assignments)
}

/// Looks up one assignment by name.
pub fn find_assignment(source: &str, name: &str) -> Result<Option<Value>, LiteralError> {
    Ok(parse_assignments(source)?
        .into_iter()
        .find_map(|(found, value)| (found == name).then_some(value)))
}

fn starts_literal(rest: &str) -> bool {
    match rest.chars().next() {
        Some('[' | '{' | '\'' | '"' | '-' | '+' | '.' | '0'..='9') => true,
        Some(c) if c.is_ascii_alphabetic() => {
            let word_end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '$')
                .unwrap_or(rest.len());
            matches!(&rest[..word_end], "true" | "false" | "null" | "undefined")
        }
        _ => false,
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, pos: usize) -> Self {
        Self {
            source,
            pos,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            let rest = &self.source[self.pos..];
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                let end = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += end;
            } else if trimmed.starts_with("/*") {
                let end = trimmed
                    .find("*/")
                    .ok_or_else(|| self.error("unterminated comment"))?;
                self.pos += end + 2;
            } else {
                return Ok(());
            }
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('[') => self.nested(Self::array),
            Some('{') => self.nested(Self::object),
            Some(quote @ ('\'' | '"')) => self.string(quote).map(Value::String),
            Some('-' | '+' | '.' | '0'..='9') => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn array(&mut self) -> Result<Value, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            if !self.eat(',') {
                self.skip_trivia()?;
                self.expect(']')?;
                return Ok(Value::Array(items));
            }
        }
    }

    fn object(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            let key = self.key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_trivia()?;
            if !self.eat(',') {
                self.skip_trivia()?;
                self.expect('}')?;
                return Ok(Value::Object(map));
            }
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => self.string(quote),
            Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '$' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
                {
                    self.bump();
                }
                Ok(self.source[start..self.pos].to_string())
            }
            _ => Err(self.error("expected object key")),
        }
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        match &self.source[start..self.pos] {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "undefined" => Ok(Value::Null),
            other => {
                self.pos = start;
                Err(self.error(format!("unexpected identifier '{}'", other)))
            }
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.'))
        {
            self.bump();
        }
        let text = &self.source[start..self.pos];
        let text = text.strip_prefix('+').unwrap_or(text);

        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            return i64::from_str_radix(hex, 16)
                .map(|n| Value::Number(n.into()))
                .map_err(|_| self.error(format!("invalid hex number '{}'", text)));
        }
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number '{}'", text)))
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.error("unterminated string"))?;
            match c {
                c if c == quote => return Ok(out),
                '\\' => self.escape(&mut out)?,
                '\n' => return Err(self.error("newline in string")),
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape"))?;
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2)?;
                out.push(char::from_u32(code).ok_or_else(|| self.error("invalid \\x escape"))?);
            }
            'u' => {
                let c = self.unicode_escape()?;
                out.push(c);
            }
            // Line continuation.
            '\n' => {}
            other => out.push(other),
        }
        Ok(())
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        if self.eat('{') {
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let code = u32::from_str_radix(&self.source[start..self.pos], 16)
                .map_err(|_| self.error("invalid \\u{...} escape"))?;
            self.expect('}')?;
            return char::from_u32(code).ok_or_else(|| self.error("invalid code point"));
        }

        let unit = self.hex_digits(4)?;
        if (0xD800..=0xDBFF).contains(&unit) && self.source[self.pos..].starts_with("\\u") {
            let checkpoint = self.pos;
            self.pos += 2;
            let low = self.hex_digits(4)?;
            if (0xDC00..=0xDFFF).contains(&low) {
                let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(code).ok_or_else(|| self.error("invalid surrogate pair"));
            }
            self.pos = checkpoint;
        }
        // Unpaired surrogates cannot live in a Rust string.
        Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn hex_digits(&mut self, count: usize) -> Result<u32, LiteralError> {
        let end = self.pos + count;
        let digits = self
            .source
            .get(self.pos..end)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error(format!("expected {} hex digits", count)))?;
        let value = u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid hex"))?;
        self.pos = end;
        Ok(value)
    }
}
