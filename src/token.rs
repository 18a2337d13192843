use std::borrow::Cow;
use std::fmt::Display;

/// The complete set of token kinds in CSS Syntax Level 3.
///
/// Comments are removed from the token stream by the CSS specification, but
/// they are preserved here; a parser that wants the specified behavior can
/// enable [`TokenizerOptions::skip_comments`](crate::TokenizerOptions).
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "snake_case")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumIs, strum_macros::AsRefStr)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE")]
pub enum TokenKind {
    Error,
    #[cfg_attr(feature = "serde", serde(rename = "eof"))]
    EOF,

    Ident,
    AtKeyword,
    String,
    Hash,
    Number,
    Percentage,
    Dimension,
    #[cfg_attr(feature = "serde", serde(rename = "uri"))]
    URI,
    UnicodeRange,
    #[cfg_attr(feature = "serde", serde(rename = "cdo"))]
    CDO,
    #[cfg_attr(feature = "serde", serde(rename = "cdc"))]
    CDC,
    S,
    Comment,
    Function,

    Includes,
    DashMatch,
    PrefixMatch,
    SuffixMatch,
    SubstringMatch,
    Column,
    Delim,

    BadString,
    #[cfg_attr(feature = "serde", serde(rename = "bad_uri"))]
    BadURI,
    BadEscape,

    Colon,
    Semicolon,
    Comma,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
}

impl TokenKind {
    /// A consumer that does not want to tolerate parsing errors should stop
    /// when this returns true.
    pub fn is_stop(self) -> bool {
        matches!(
            self,
            Self::Error | Self::EOF | Self::BadEscape | Self::BadString | Self::BadURI
        )
    }

    /// Whether tokens of this kind carry a [`TokenExtra`] payload. The kind
    /// also determines which variant: errors on the stop tokens, hash flags
    /// on `Hash`, numeric data on `Number`/`Percentage`/`Dimension`, and the
    /// decoded range on `UnicodeRange`.
    pub fn carries_extra(self) -> bool {
        matches!(
            self,
            Self::Error
                | Self::BadEscape
                | Self::BadString
                | Self::BadURI
                | Self::Hash
                | Self::Number
                | Self::Percentage
                | Self::Dimension
                | Self::UnicodeRange
        )
    }

    /// The canonical text of the fixed-string tokens.
    pub fn fixed_text(self) -> Option<&'static str> {
        Some(match self {
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::PrefixMatch => "^=",
            Self::SuffixMatch => "$=",
            Self::SubstringMatch => "*=",
            Self::Column => "||",
            Self::CDO => "<!--",
            Self::CDC => "-->",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::OpenBracket => "[",
            Self::CloseBracket => "]",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::OpenBrace => "{",
            Self::CloseBrace => "}",
            _ => return None,
        })
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A CSS syntax error recorded while tokenizing.
///
/// `kind` names the token that carries the error (`BadString`, `BadURI`,
/// `BadEscape`, or `Error` for reader failures).
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: TokenKind,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(kind: TokenKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Any failure surfaced by the tokenizer: a structured syntax error, or an
/// I/O error from the underlying reader (EOF is not an error).
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("read error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Kind-specific payload attached to a [`Token`]. The token's kind uniquely
/// determines the variant; see [`TokenKind::carries_extra`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "snake_case")
)]
#[derive(Debug, Clone, PartialEq, strum_macros::EnumIs)]
pub enum TokenExtra {
    Hash {
        /// True iff the name after `#` would start an identifier; such a
        /// hash may be used as an id selector. Otherwise the hash is
        /// "unrestricted".
        is_identifier: bool,
    },
    Numeric {
        /// True iff a decimal point or exponent appeared in the number.
        non_integer: bool,
        /// Unit suffix; non-empty exactly for `Dimension` tokens.
        dimension: Vec<u8>,
    },
    UnicodeRange {
        start: u32,
        end: u32,
    },
    Error(Error),
}

impl Display for TokenExtra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash { is_identifier } => {
                f.write_str(if *is_identifier { "id" } else { "unrestricted" })
            }
            Self::Numeric { dimension, .. } => {
                write!(f, "{}", String::from_utf8_lossy(dimension))
            }
            Self::UnicodeRange { start, end } => {
                if start == end {
                    write!(f, "U+{:04X}", start)
                } else {
                    write!(f, "U+{:04X}-{:04X}", start, end)
                }
            }
            Self::Error(err) => write!(f, "{}", err),
        }
    }
}

/// A single token in the CSS syntax.
///
/// `value` is a byte string: input bytes outside ASCII pass through the
/// tokenizer uninterpreted, so payloads are not guaranteed to be UTF-8.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Vec<u8>,
    pub extra: Option<TokenExtra>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            value: value.into(),
            extra: None,
        }
    }

    pub(crate) fn with_extra(kind: TokenKind, value: impl Into<Vec<u8>>, extra: TokenExtra) -> Self {
        Self {
            kind,
            value: value.into(),
            extra: Some(extra),
        }
    }

    /// A fixed-string token carrying its canonical text, or an empty value
    /// for kinds without one.
    pub(crate) fn fixed(kind: TokenKind) -> Self {
        Self::new(kind, kind.fixed_text().unwrap_or_default())
    }

    pub(crate) fn eof() -> Self {
        Self::new(TokenKind::EOF, Vec::new())
    }

    pub(crate) fn delim(by: u8) -> Self {
        Self::new(TokenKind::Delim, vec![by])
    }

    /// The value as text, with invalid UTF-8 replaced by U+FFFD.
    pub fn value_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }
}

impl Display for Token {
    /// Displays the serialized form of the token; see [`Token::render`].
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.render()))
    }
}

impl FromIterator<Token> for String {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        String::from_iter(iter.into_iter().map(|v| v.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_tokens() {
        for kind in [
            TokenKind::Error,
            TokenKind::EOF,
            TokenKind::BadEscape,
            TokenKind::BadString,
            TokenKind::BadURI,
        ] {
            assert!(kind.is_stop(), "{kind} must be a stop token");
        }
        assert!(!TokenKind::Ident.is_stop());
        assert!(!TokenKind::Comment.is_stop());
    }

    #[test]
    fn unicode_range_display() {
        let single = TokenExtra::UnicodeRange {
            start: 0x42,
            end: 0x42,
        };
        assert_eq!(single.to_string(), "U+0042");
        let range = TokenExtra::UnicodeRange {
            start: 0,
            end: 0xFFFFFF,
        };
        assert_eq!(range.to_string(), "U+0000-FFFFFF");
    }

    #[test]
    fn hash_extra_display() {
        assert_eq!(
            TokenExtra::Hash {
                is_identifier: true
            }
            .to_string(),
            "id"
        );
        assert_eq!(
            TokenExtra::Hash {
                is_identifier: false
            }
            .to_string(),
            "unrestricted"
        );
    }

    #[test]
    fn kind_names() {
        assert_eq!(TokenKind::Ident.as_ref(), "IDENT");
        assert_eq!(TokenKind::UnicodeRange.as_ref(), "UNICODE-RANGE");
        assert_eq!(TokenKind::BadURI.as_ref(), "BAD-URI");
        assert_eq!(TokenKind::CDO.as_ref(), "CDO");
    }
}
