//! Reader for the legacy `application/vnd.demo.dto` payload format.
//!
//! Older servers answer that media type with the output of PHP's `serialize()`.
//! The payload is untrusted input: this reader only builds a neutral
//! [`LegacyValue`] tree and never lets the class names embedded in the payload
//! decide what gets constructed. Mapping the tree onto a DTO happens afterwards,
//! driven entirely by the caller's target type.
//!
//! Supported entries:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `N;` | null |
//! | `b:0;` / `b:1;` | boolean |
//! | `i:<int>;` | 64-bit integer |
//! | `d:<float>;` | finite float |
//! | `s:<len>:"<bytes>";` | UTF-8 string, `len` counted in bytes |
//! | `a:<n>:{...}` | array of `n` key/value pairs |
//! | `O:<len>:"<class>":<n>:{...}` | object with `n` properties |
//!
//! References, custom-serialized objects and enums are rejected.

use serde_json::{Map, Number, Value};
use std::fmt;

/// Media type the server uses for legacy payloads.
pub const MEDIA_TYPE: &str = "application/vnd.demo.dto";

/// Maximum nesting of arrays and objects.
pub const MAX_DEPTH: usize = 64;

// Smallest possible entry: an `i:0;` key followed by an `N;` value.
const MIN_ENTRY_LEN: usize = 6;

/// A value read from a legacy payload.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered key/value pairs, exactly as they appear in the payload.
    Array(Vec<(LegacyKey, LegacyValue)>),
    /// An object entry. `class` is informational only.
    Object {
        class: String,
        properties: Vec<(String, LegacyValue)>,
    },
}

/// Key of a legacy array entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyKey {
    Int(i64),
    String(String),
}

impl fmt::Display for LegacyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyKey::Int(i) => write!(f, "{}", i),
            LegacyKey::String(s) => f.write_str(s),
        }
    }
}

/// Failure to read a legacy payload, with the byte offset where it happened.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{kind} at byte {offset}")]
pub struct LegacyError {
    /// Offset into the payload.
    pub offset: usize,
    /// What went wrong.
    pub kind: LegacyErrorKind,
}

/// The kinds of [`LegacyError`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LegacyErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected byte {0:#04x}")]
    UnexpectedByte(u8),
    #[error("unsupported entry type '{0}'")]
    Unsupported(char),
    #[error("invalid number")]
    InvalidNumber,
    #[error("non-finite float")]
    NonFiniteFloat,
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("nesting deeper than {} levels", MAX_DEPTH)]
    TooDeep,
    #[error("{0} entries declared but the input is too short to hold them")]
    LengthOverflow(usize),
    #[error("array keys must be integers or strings")]
    InvalidKey,
    #[error("trailing bytes after the top-level value")]
    TrailingBytes,
}

/// Reads one complete legacy payload.
///
/// # Examples
///
/// ```
/// use demo_api_client::legacy::{self, LegacyKey, LegacyValue};
///
/// let value = legacy::parse(br#"a:1:{i:0;s:3:"abc";}"#).unwrap();
/// assert_eq!(
///     value,
///     LegacyValue::Array(vec![(LegacyKey::Int(0), LegacyValue::String("abc".into()))])
/// );
/// ```
pub fn parse(input: &[u8]) -> Result<LegacyValue, LegacyError> {
    let mut reader = Reader { input, pos: 0 };
    let value = reader.value(0)?;
    if reader.pos != input.len() {
        return Err(reader.error(LegacyErrorKind::TrailingBytes));
    }
    Ok(value)
}

impl LegacyValue {
    /// Converts the tree into JSON so it can be mapped onto a DTO with serde.
    ///
    /// Arrays keyed `0..n` in order become JSON arrays; any other array
    /// becomes a JSON object with stringified keys. Objects lose their class
    /// name.
    pub fn into_json(self) -> Value {
        match self {
            LegacyValue::Null => Value::Null,
            LegacyValue::Bool(b) => Value::Bool(b),
            LegacyValue::Int(i) => Value::Number(i.into()),
            LegacyValue::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            LegacyValue::String(s) => Value::String(s),
            LegacyValue::Array(entries) => {
                let is_list = entries
                    .iter()
                    .enumerate()
                    .all(|(i, (key, _))| matches!(key, LegacyKey::Int(k) if *k == i as i64));
                if is_list {
                    Value::Array(entries.into_iter().map(|(_, v)| v.into_json()).collect())
                } else {
                    Value::Object(
                        entries
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), v.into_json()))
                            .collect::<Map<_, _>>(),
                    )
                }
            }
            LegacyValue::Object { properties, .. } => Value::Object(
                properties
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

/// Strips PHP visibility markers: `\0*\0name` (protected) and
/// `\0Class\0name` (private) both become `name`.
fn property_name(raw: String) -> String {
    match raw.strip_prefix('\0') {
        Some(rest) => match rest.split_once('\0') {
            Some((_, name)) => name.to_string(),
            None => rest.to_string(),
        },
        None => raw,
    }
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn error(&self, kind: LegacyErrorKind) -> LegacyError {
        LegacyError {
            offset: self.pos,
            kind,
        }
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn bump(&mut self) -> Result<u8, LegacyError> {
        let byte = *self
            .input
            .get(self.pos)
            .ok_or_else(|| self.error(LegacyErrorKind::UnexpectedEof))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> Result<(), LegacyError> {
        let start = self.pos;
        let byte = self.bump()?;
        if byte != expected {
            return Err(LegacyError {
                offset: start,
                kind: LegacyErrorKind::UnexpectedByte(byte),
            });
        }
        Ok(())
    }

    /// Returns the bytes up to `terminator` and consumes the terminator.
    fn read_until(&mut self, terminator: u8) -> Result<&'a [u8], LegacyError> {
        let input = self.input;
        let rest = &input[self.pos..];
        let len = rest.iter().position(|b| *b == terminator).ok_or(LegacyError {
            offset: input.len(),
            kind: LegacyErrorKind::UnexpectedEof,
        })?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn read_number<N: std::str::FromStr>(&mut self, terminator: u8) -> Result<N, LegacyError> {
        let start = self.pos;
        let raw = self.read_until(terminator)?;
        std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(LegacyError {
                offset: start,
                kind: LegacyErrorKind::InvalidNumber,
            })
    }

    fn read_quoted(&mut self, len: usize) -> Result<String, LegacyError> {
        self.expect(b'"')?;
        if len > self.remaining() {
            return Err(self.error(LegacyErrorKind::UnexpectedEof));
        }
        let start = self.pos;
        let bytes = &self.input[start..start + len];
        self.pos += len;
        self.expect(b'"')?;
        String::from_utf8(bytes.to_vec()).map_err(|_| LegacyError {
            offset: start,
            kind: LegacyErrorKind::InvalidUtf8,
        })
    }

    /// Reads `<n>:{` and checks that `n` entries can fit in what is left.
    fn open_entries(&mut self, depth: usize) -> Result<usize, LegacyError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(LegacyErrorKind::TooDeep));
        }
        let count: usize = self.read_number(b':')?;
        self.expect(b'{')?;
        if count.saturating_mul(MIN_ENTRY_LEN) > self.remaining() {
            return Err(self.error(LegacyErrorKind::LengthOverflow(count)));
        }
        Ok(count)
    }

    fn key(&mut self, depth: usize) -> Result<LegacyKey, LegacyError> {
        let start = self.pos;
        match self.value(depth)? {
            LegacyValue::Int(i) => Ok(LegacyKey::Int(i)),
            LegacyValue::String(s) => Ok(LegacyKey::String(s)),
            _ => Err(LegacyError {
                offset: start,
                kind: LegacyErrorKind::InvalidKey,
            }),
        }
    }

    fn value(&mut self, depth: usize) -> Result<LegacyValue, LegacyError> {
        let tag_pos = self.pos;
        let tag = self.bump()?;
        match tag {
            b'N' => {
                self.expect(b';')?;
                Ok(LegacyValue::Null)
            }
            b'b' => {
                self.expect(b':')?;
                match self.read_number::<u8>(b';')? {
                    0 => Ok(LegacyValue::Bool(false)),
                    1 => Ok(LegacyValue::Bool(true)),
                    _ => Err(LegacyError {
                        offset: tag_pos,
                        kind: LegacyErrorKind::InvalidNumber,
                    }),
                }
            }
            b'i' => {
                self.expect(b':')?;
                Ok(LegacyValue::Int(self.read_number(b';')?))
            }
            b'd' => {
                self.expect(b':')?;
                let f: f64 = self.read_number(b';')?;
                if !f.is_finite() {
                    return Err(LegacyError {
                        offset: tag_pos,
                        kind: LegacyErrorKind::NonFiniteFloat,
                    });
                }
                Ok(LegacyValue::Float(f))
            }
            b's' => {
                self.expect(b':')?;
                let len = self.read_number(b':')?;
                let s = self.read_quoted(len)?;
                self.expect(b';')?;
                Ok(LegacyValue::String(s))
            }
            b'a' => {
                self.expect(b':')?;
                let count = self.open_entries(depth)?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = self.key(depth + 1)?;
                    let value = self.value(depth + 1)?;
                    entries.push((key, value));
                }
                self.expect(b'}')?;
                Ok(LegacyValue::Array(entries))
            }
            b'O' => {
                self.expect(b':')?;
                let len = self.read_number(b':')?;
                let class = self.read_quoted(len)?;
                self.expect(b':')?;
                let count = self.open_entries(depth)?;
                let mut properties = Vec::with_capacity(count);
                for _ in 0..count {
                    let name = match self.key(depth + 1)? {
                        LegacyKey::String(s) => property_name(s),
                        LegacyKey::Int(i) => i.to_string(),
                    };
                    let value = self.value(depth + 1)?;
                    properties.push((name, value));
                }
                self.expect(b'}')?;
                Ok(LegacyValue::Object { class, properties })
            }
            b'r' | b'R' | b'C' | b'E' => Err(LegacyError {
                offset: tag_pos,
                kind: LegacyErrorKind::Unsupported(tag as char),
            }),
            other => Err(LegacyError {
                offset: tag_pos,
                kind: LegacyErrorKind::UnexpectedByte(other),
            }),
        }
    }
}
