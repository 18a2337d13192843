use std::borrow::Cow;
use std::io::{self, Write};

use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::token::{Token, TokenExtra, TokenKind};
use crate::tokenizer::{is_name_code, is_name_start, is_non_printable};

/// Escaping context for serializing a name. Dimension units additionally
/// hex-escape a leading `e`/`E` so the unit cannot be read back as an
/// exponent; hash names skip the first-character identifier rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeMode {
    Identifier,
    HashName,
    Dimension,
}

fn push_hex_escape(buf: &mut Vec<u8>, by: u8) {
    buf.extend_from_slice(format!("\\{:X} ", by).as_bytes());
}

fn escape_ident(s: &[u8], mode: EscapeMode) -> Cow<'_, [u8]> {
    if s.is_empty() {
        return Cow::Borrowed(s);
    }
    let mut buf = Vec::with_capacity(s.len());
    let mut any_changes = false;

    let start;
    if mode != EscapeMode::HashName {
        // first-character rules: a bare or dangling dash becomes `\-`, a
        // non-name-start byte is escaped, and a dimension may not open with
        // an exponent letter
        let first = s[0];
        if !is_name_start(first) && first != b'-' && first != b'e' && first != b'E' {
            // hex form with its trailing space, so a digit first character
            // cannot extend the escape or continue into the name
            push_hex_escape(&mut buf, first);
            any_changes = true;
        } else if first == b'e' || first == b'E' {
            if mode == EscapeMode::Dimension {
                push_hex_escape(&mut buf, first);
                any_changes = true;
            } else {
                buf.push(first);
            }
        } else if first == b'-' {
            if s.len() == 1 {
                return Cow::Borrowed(b"\\-");
            } else if is_name_start(s[1]) {
                buf.push(b'-');
            } else {
                buf.extend_from_slice(b"\\-");
                any_changes = true;
            }
        } else {
            buf.push(first);
        }
        start = 1;
    } else {
        start = 0;
    }

    for &by in &s[start..] {
        if !is_name_code(by) {
            push_hex_escape(&mut buf, by);
            any_changes = true;
        } else {
            buf.push(by);
        }
    }

    if any_changes {
        Cow::Owned(buf)
    } else {
        Cow::Borrowed(s)
    }
}

/// Serializes a string body with its surrounding double quotes. Quotes,
/// backslashes, and CR/LF have short escape forms; other non-printables get
/// a hex escape. The trailing space keeps a following hex digit in the
/// value from being read back as part of the escape.
fn escape_string(s: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(s.len() + 2);
    buf.push(b'"');
    for &by in s {
        match by {
            b'"' => buf.extend_from_slice(b"\\\""),
            b'\n' => buf.extend_from_slice(b"\\0A "),
            b'\r' => buf.extend_from_slice(b"\\0D "),
            b'\\' => buf.extend_from_slice(b"\\\\"),
            _ if by < 0x80 && is_non_printable(by) => push_hex_escape(&mut buf, by),
            _ => buf.push(by),
        }
    }
    buf.push(b'"');
    buf
}

impl Token {
    /// Serialize this token to a writer. `Error` and `EOF` produce nothing;
    /// every other kind emits text that re-tokenizes to the same kind, value,
    /// and extra (stop tokens to the same kind).
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self.kind {
            TokenKind::Error | TokenKind::EOF => Ok(()),
            TokenKind::Ident => w.write_all(&escape_ident(&self.value, EscapeMode::Identifier)),
            TokenKind::AtKeyword => {
                w.write_all(b"@")?;
                w.write_all(&escape_ident(&self.value, EscapeMode::Identifier))
            }
            TokenKind::Delim => {
                if self.value == b"\\" {
                    w.write_all(b"\\\n")
                } else {
                    w.write_all(&self.value)
                }
            }
            TokenKind::Hash => {
                w.write_all(b"#")?;
                let is_identifier = matches!(
                    self.extra,
                    Some(TokenExtra::Hash {
                        is_identifier: true
                    })
                );
                if is_identifier {
                    w.write_all(&escape_ident(&self.value, EscapeMode::Identifier))
                } else {
                    w.write_all(&escape_ident(&self.value, EscapeMode::HashName))
                }
            }
            TokenKind::Percentage => {
                w.write_all(&self.value)?;
                w.write_all(b"%")
            }
            TokenKind::Dimension => {
                w.write_all(&self.value)?;
                if let Some(TokenExtra::Numeric { dimension, .. }) = &self.extra {
                    w.write_all(&escape_ident(dimension, EscapeMode::Dimension))?;
                }
                Ok(())
            }
            TokenKind::String => w.write_all(&escape_string(&self.value)),
            TokenKind::URI => {
                w.write_all(b"url(")?;
                w.write_all(&escape_string(&self.value))?;
                w.write_all(b")")
            }
            TokenKind::UnicodeRange => match &self.extra {
                Some(extra @ TokenExtra::UnicodeRange { .. }) => {
                    w.write_all(extra.to_string().as_bytes())
                }
                _ => w.write_all(&self.value),
            },
            TokenKind::Comment => {
                w.write_all(b"/*")?;
                w.write_all(&self.value)?;
                w.write_all(b"*/")
            }
            TokenKind::Function => {
                w.write_all(&escape_ident(&self.value, EscapeMode::Identifier))?;
                w.write_all(b"(")
            }
            TokenKind::BadEscape => w.write_all(b"\\\n"),
            TokenKind::BadString => {
                w.write_all(b"\"")?;
                w.write_all(&self.value)?;
                w.write_all(b"\n")
            }
            TokenKind::BadURI => {
                w.write_all(b"url(")?;
                let mut body = escape_string(&self.value);
                if body.last() == Some(&b'"') {
                    body.pop();
                }
                w.write_all(&body)?;
                w.write_all(b"\n)")
            }
            _ => match self.kind.fixed_text() {
                Some(text) => w.write_all(text.as_bytes()),
                None => w.write_all(&self.value),
            },
        }
    }

    /// Serialize this token to a byte vector. The stateless single-token
    /// form; see [`Renderer`] for boundary-preserving stream output.
    pub fn render(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        buf
    }
}

/// Adjacency key: the token kind, or the delimiter byte for `Delim`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RenderKey {
    Kind(TokenKind),
    Byte(u8),
}

fn render_key(tok: &Token) -> RenderKey {
    match tok.kind {
        TokenKind::Delim => RenderKey::Byte(tok.value.first().copied().unwrap_or(0)),
        kind => match kind.fixed_text() {
            // single-character structural tokens share adjacency behavior
            // with the delimiter of the same byte
            Some(text) if text.len() == 1 => RenderKey::Byte(text.as_bytes()[0]),
            _ => RenderKey::Kind(kind),
        },
    }
}

type InsertionRules = HashMap<RenderKey, HashMap<RenderKey, bool>>;

fn rule_map(entries: &[(RenderKey, bool)]) -> HashMap<RenderKey, bool> {
    entries.iter().copied().collect()
}

/// `insert[prev][curr]`: whether `/**/` must be emitted between the two
/// tokens to keep them from re-tokenizing as one. Pairs not present default
/// to no insertion.
static COMMENT_INSERTION_RULES: Lazy<InsertionRules> = Lazy::new(|| {
    use RenderKey::{Byte, Kind};
    use TokenKind::*;

    let through_cdc = rule_map(&[
        (Kind(Ident), true),
        (Kind(Function), true),
        (Kind(URI), true),
        (Kind(BadURI), true),
        (Kind(Number), true),
        (Kind(Percentage), true),
        (Kind(Dimension), true),
        (Kind(UnicodeRange), true),
        (Kind(CDC), true),
        (Byte(b'-'), true),
        (Byte(b'('), false),
    ]);
    let numeric_follow = rule_map(&[
        (Kind(Ident), true),
        (Kind(Function), true),
        (Kind(URI), true),
        (Kind(BadURI), true),
        (Kind(Number), true),
        (Kind(Percentage), true),
        (Kind(Dimension), true),
        (Kind(UnicodeRange), true),
        (Kind(CDC), false),
        (Byte(b'-'), false),
        (Byte(b'('), false),
    ]);

    let mut ident_follow = through_cdc.clone();
    ident_follow.insert(Byte(b'('), true);

    let mut hash_delim_follow = numeric_follow.clone();
    hash_delim_follow.insert(Byte(b'-'), true);

    let number_sign = rule_map(&[
        (Kind(Number), true),
        (Kind(Percentage), true),
        (Kind(Dimension), true),
    ]);
    let eq_suffix = rule_map(&[(Byte(b'='), true)]);

    let mut rules: InsertionRules = HashMap::new();
    rules.insert(Kind(Ident), ident_follow);
    rules.insert(Kind(AtKeyword), through_cdc.clone());
    rules.insert(Kind(Hash), through_cdc.clone());
    rules.insert(Kind(Dimension), through_cdc);
    rules.insert(Byte(b'#'), hash_delim_follow);
    rules.insert(Byte(b'-'), numeric_follow.clone());
    rules.insert(Kind(Number), numeric_follow);
    rules.insert(
        Byte(b'@'),
        rule_map(&[
            (Kind(Ident), true),
            (Kind(Function), true),
            (Kind(URI), true),
            (Kind(BadURI), true),
            (Kind(Number), false),
            (Kind(Percentage), false),
            (Kind(Dimension), false),
            (Kind(UnicodeRange), true),
            (Kind(CDC), false),
            (Byte(b'-'), true),
            (Byte(b'('), false),
        ]),
    );
    rules.insert(
        Kind(UnicodeRange),
        rule_map(&[
            (Kind(Ident), true),
            (Kind(Function), true),
            (Kind(Number), true),
            (Kind(Percentage), true),
            (Kind(Dimension), true),
            (Kind(UnicodeRange), false),
            (Byte(b'?'), true),
        ]),
    );
    rules.insert(Byte(b'.'), number_sign.clone());
    rules.insert(Byte(b'+'), number_sign);
    rules.insert(Byte(b'$'), eq_suffix.clone());
    rules.insert(Byte(b'*'), eq_suffix.clone());
    rules.insert(Byte(b'^'), eq_suffix.clone());
    rules.insert(Byte(b'~'), eq_suffix);
    rules.insert(Byte(b'|'), rule_map(&[(Byte(b'='), true), (Byte(b'|'), true)]));
    rules.insert(Byte(b'/'), rule_map(&[(Byte(b'*'), true)]));
    rules
});

/// Stateful stream serializer.
///
/// Remembers the previously written token and inserts an empty `/**/`
/// comment wherever the pair would otherwise merge into a single token when
/// read back (an identifier followed by an identifier, a number followed by
/// a dimension, `|` followed by `=`, and so on).
#[derive(Debug, Default)]
pub struct Renderer {
    last: Option<RenderKey>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `tok` to `w`, preceded by `/**/` when required after the
    /// previously written token.
    pub fn write<W: Write>(&mut self, w: &mut W, tok: &Token) -> io::Result<()> {
        let cur = render_key(tok);
        if let Some(prev) = self.last {
            if let Some(follow) = COMMENT_INSERTION_RULES.get(&prev) {
                if follow.get(&cur).copied().unwrap_or(false) {
                    w.write_all(b"/**/")?;
                }
            }
        }
        tok.write_to(w)?;
        self.last = Some(cur);
        Ok(())
    }

    /// Convenience form of [`write`](Self::write) returning the bytes.
    pub fn render(&mut self, tok: &Token) -> Vec<u8> {
        let mut buf = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write(&mut buf, tok);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenExtra, TokenKind};

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Ident, name)
    }

    #[test]
    fn escape_ident_passthrough() {
        assert_eq!(&*escape_ident(b"abcd", EscapeMode::Identifier), b"abcd");
        assert_eq!(&*escape_ident(b"-moz", EscapeMode::Identifier), b"-moz");
        assert_eq!(&*escape_ident(b"a1-_", EscapeMode::Identifier), b"a1-_");
    }

    #[test]
    fn escape_ident_first_char() {
        assert_eq!(&*escape_ident(b"-", EscapeMode::Identifier), b"\\-");
        assert_eq!(&*escape_ident(b"--x", EscapeMode::Identifier), b"\\--x");
        assert_eq!(
            &*escape_ident(&[0x01, b'a'], EscapeMode::Identifier),
            b"\\1 a"
        );
    }

    #[test]
    fn escape_dimension_exponent() {
        assert_eq!(&*escape_ident(b"em", EscapeMode::Dimension), b"\\65 m");
        assert_eq!(&*escape_ident(b"Em", EscapeMode::Dimension), b"\\45 m");
        assert_eq!(&*escape_ident(b"px", EscapeMode::Dimension), b"px");
        // only a dimension escapes its exponent letter
        assert_eq!(&*escape_ident(b"em", EscapeMode::Identifier), b"em");
    }

    #[test]
    fn escape_hash_name_skips_first_char_rules() {
        assert_eq!(&*escape_ident(b"0af", EscapeMode::HashName), b"0af");
        assert_eq!(&*escape_ident(b"a b", EscapeMode::HashName), b"a\\20 b");
    }

    #[test]
    fn escape_string_forms() {
        assert_eq!(escape_string(b"abc"), b"\"abc\"");
        assert_eq!(escape_string(b"a\"b"), b"\"a\\\"b\"");
        assert_eq!(escape_string(b"a\nb"), b"\"a\\0A b\"");
        assert_eq!(escape_string(b"a\\b"), b"\"a\\\\b\"");
        assert_eq!(escape_string(&[0x01]), b"\"\\1 \"");
        // a hex digit after an escaped non-printable must not join the escape
        assert_eq!(escape_string(&[0x7F, b'a']), b"\"\\7F a\"");
    }

    #[test]
    fn render_single_tokens() {
        assert_eq!(ident("foo").render(), b"foo");
        assert_eq!(Token::new(TokenKind::AtKeyword, "media").render(), b"@media");
        assert_eq!(Token::new(TokenKind::Function, "rgb").render(), b"rgb(");
        assert_eq!(Token::new(TokenKind::URI, "x").render(), b"url(\"x\")");
        assert_eq!(Token::new(TokenKind::Comment, " c ").render(), b"/* c */");
        assert_eq!(Token::new(TokenKind::CDO, "<!--").render(), b"<!--");
        assert_eq!(Token::new(TokenKind::EOF, "").render(), b"");
        assert_eq!(Token::new(TokenKind::Delim, "\\").render(), b"\\\n");
        assert_eq!(
            Token {
                kind: TokenKind::Dimension,
                value: b"42".to_vec(),
                extra: Some(TokenExtra::Numeric {
                    non_integer: false,
                    dimension: b"px".to_vec(),
                }),
            }
            .render(),
            b"42px"
        );
        assert_eq!(
            Token {
                kind: TokenKind::Hash,
                value: b"name".to_vec(),
                extra: Some(TokenExtra::Hash {
                    is_identifier: true
                }),
            }
            .render(),
            b"#name"
        );
        assert_eq!(
            Token {
                kind: TokenKind::UnicodeRange,
                value: Vec::new(),
                extra: Some(TokenExtra::UnicodeRange {
                    start: 0x42,
                    end: 0x45
                }),
            }
            .render(),
            b"U+0042-0045"
        );
    }

    #[test]
    fn adjacent_idents_get_a_comment() {
        let mut r = Renderer::new();
        let mut out = Vec::new();
        r.write(&mut out, &ident("a")).unwrap();
        r.write(&mut out, &ident("b")).unwrap();
        assert_eq!(out, b"a/**/b");
    }

    #[test]
    fn ident_then_open_paren_gets_a_comment() {
        let mut r = Renderer::new();
        let mut out = Vec::new();
        r.write(&mut out, &ident("a")).unwrap();
        r.write(&mut out, &Token::new(TokenKind::OpenParen, "(")).unwrap();
        assert_eq!(out, b"a/**/(");
    }

    #[test]
    fn adjacent_numbers_get_a_comment() {
        let mut r = Renderer::new();
        let mut out = Vec::new();
        r.write(
            &mut out,
            &Token {
                kind: TokenKind::Number,
                value: b"1".to_vec(),
                extra: Some(TokenExtra::Numeric {
                    non_integer: false,
                    dimension: Vec::new(),
                }),
            },
        )
        .unwrap();
        r.write(
            &mut out,
            &Token {
                kind: TokenKind::Number,
                value: b"2".to_vec(),
                extra: Some(TokenExtra::Numeric {
                    non_integer: false,
                    dimension: Vec::new(),
                }),
            },
        )
        .unwrap();
        assert_eq!(out, b"1/**/2");
    }

    #[test]
    fn pipe_pairs_get_comments() {
        let mut r = Renderer::new();
        let mut out = Vec::new();
        r.write(&mut out, &Token::delim(b'|')).unwrap();
        r.write(&mut out, &Token::delim(b'|')).unwrap();
        r.write(&mut out, &Token::delim(b'=')).unwrap();
        assert_eq!(out, b"|/**/|/**/=");
    }

    #[test]
    fn unrelated_pairs_get_no_comment() {
        let mut r = Renderer::new();
        let mut out = Vec::new();
        r.write(&mut out, &ident("a")).unwrap();
        r.write(&mut out, &Token::new(TokenKind::Colon, ":")).unwrap();
        r.write(&mut out, &ident("b")).unwrap();
        assert_eq!(out, b"a:b");
    }
}
