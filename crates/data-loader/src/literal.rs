//! Reader for the serialized list fields found in dataset dumps.
//!
//! The TMDB CSV files store nested fields as JSON, but older exports (and
//! anything that went through a Python `repr`) use single quotes and
//! `True`/`False`/`None`. JSON is tried first; the literal parser below
//! accepts both syntaxes and produces the same [`serde_json::Value`] tree.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Deepest list/dict nesting accepted, same limit as `serde_json`
pub const MAX_DEPTH: usize = 128;

/// Why a serialized field could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at offset {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub reason: String,
}

/// Parse a JSON or Python-literal value.
pub fn parse_value(input: &str) -> Result<Value, LiteralError> {
    if let Ok(value) = serde_json::from_str::<Value>(input) {
        return Ok(value);
    }
    let mut parser = LiteralParser::new(input);
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("trailing characters"));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), LiteralError> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    /// Enter a list or dict, failing past [`MAX_DEPTH`]
    fn nested<F>(&mut self, parse: F) -> Result<Value, LiteralError>
    where
        F: FnOnce(&mut Self) -> Result<Value, LiteralError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'[') => self.nested(|p| p.parse_sequence(b'[', b']')),
            Some(b'(') => self.nested(|p| p.parse_sequence(b'(', b')')),
            Some(b'{') => self.nested(|p| p.parse_dict()),
            Some(quote @ (b'\'' | b'"')) => self.parse_string(quote).map(Value::String),
            Some(b'-' | b'+' | b'.' | b'0'..=b'9') => self.parse_number(),
            Some(b) if b.is_ascii_alphabetic() => self.parse_keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_sequence(&mut self, open: u8, close: u8) -> Result<Value, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {}
                _ => return Err(self.error("expected ',' or end of sequence")),
            }
        }
    }

    fn parse_dict(&mut self) -> Result<Value, LiteralError> {
        self.expect(b'{')?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }
            let key = match self.parse_value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(self.error("unsupported dict key")),
            };
            self.expect(b':')?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn parse_string(&mut self, quote: u8) -> Result<String, LiteralError> {
        self.pos += 1;
        let src = self.src;
        let mut out = String::new();
        let mut chars = src[self.pos..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                c if c as u32 == quote as u32 => {
                    self.pos += offset + 1;
                    return Ok(out);
                }
                '\\' => {
                    let Some((_, esc)) = chars.next() else {
                        break;
                    };
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' => out.push(esc),
                        'x' | 'u' => {
                            let width = if esc == 'x' { 2 } else { 4 };
                            let mut code = 0u32;
                            for _ in 0..width {
                                let digit = chars
                                    .next()
                                    .and_then(|(_, d)| d.to_digit(16))
                                    .ok_or_else(|| self.error("bad escape sequence"))?;
                                code = code * 16 + digit;
                            }
                            let decoded = char::from_u32(code)
                                .ok_or_else(|| self.error("invalid code point"))?;
                            out.push(decoded);
                        }
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c => out.push(c),
            }
        }
        self.pos = self.bytes.len();
        Err(self.error("unterminated string"))
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number '{}'", text)))
    }

    fn parse_keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            other => {
                self.pos = start;
                Err(self.error(format!("unknown identifier '{}'", other)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_input() {
        let value = parse_value(r#"[{"id": 28, "name": "Action"}]"#).unwrap();
        assert_eq!(value, json!([{"id": 28, "name": "Action"}]));
    }

    #[test]
    fn test_python_literal_input() {
        let value =
            parse_value("[{'id': 1, 'name': \"Ngozi's Story\", 'adult': False, 'x': None},]")
                .unwrap();
        assert_eq!(
            value,
            json!([{"id": 1, "name": "Ngozi's Story", "adult": false, "x": null}])
        );
    }

    #[test]
    fn test_escapes_and_tuples() {
        let value = parse_value(r"('a\'b', 'caf\xe9', -1.5)").unwrap();
        assert_eq!(value, json!(["a'b", "café", -1.5]));
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(parse_value(&ok).is_ok());

        let too_deep = format!("{}{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        let err = parse_value(&too_deep).unwrap_err();
        assert_eq!(err.reason, "nesting too deep");

        assert!(parse_value(&"[".repeat(100_000)).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = parse_value("[1, 2] extra").unwrap_err();
        assert_eq!(err.to_string(), format!("trailing characters at offset {}", err.offset));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_value("[{'name': 'x'").is_err());
        assert!(parse_value("not a list").is_err());
        assert!(parse_value("[1, 2] extra").is_err());
        assert!(parse_value("").is_err());
    }
}
