use std::io::Read;

use encoding_rs::Encoding;

use crate::input::{ByteReader, DecodeReader, NormalizedReader};
use crate::token::{Error, ParseError, Token, TokenExtra, TokenKind};

type Result<T> = std::result::Result<T, Error>;

// §4.3.9: classification shared by the dispatcher and the sub-consumers.
// High bytes are name-code without being decoded.

pub(crate) fn is_name_start(by: u8) -> bool {
    by >= 0x80 || by == b'_' || by.is_ascii_alphabetic()
}

pub(crate) fn is_name_code(by: u8) -> bool {
    is_name_start(by) || by.is_ascii_digit() || by == b'-'
}

pub(crate) fn is_non_printable(by: u8) -> bool {
    by <= 0x08 || by == 0x0B || (0x0E..=0x1F).contains(&by) || by == 0x7F
}

fn is_whitespace(by: u8) -> bool {
    matches!(by, b' ' | b'\t' | b'\n')
}

// §4.3.8. The 0 sentinel only appears in a window slot past EOF, so the
// second check also rules out an escape truncated by end of input.
fn is_valid_escape(window: &[u8]) -> bool {
    window.len() >= 2 && window[0] == b'\\' && window[1] != b'\n' && window[1] != 0
}

fn starts_identifier(window: &[u8; 3]) -> bool {
    let p: &[u8] = if window[0] == b'-' {
        &window[1..]
    } else {
        &window[..]
    };
    is_name_start(p[0]) || is_valid_escape(p)
}

// §4.3.10
fn starts_number(window: &[u8; 3]) -> bool {
    let mut p: &[u8] = window;
    if p[0] == b'+' || p[0] == b'-' {
        p = &p[1..];
    }
    if p[0] == b'.' {
        p = &p[1..];
    }
    p[0].is_ascii_digit()
}

fn hex_value(digits: &[u8]) -> u32 {
    digits.iter().fold(0, |acc, &by| {
        let digit = match by {
            b'0'..=b'9' => by - b'0',
            b'a'..=b'f' => by - b'a' + 10,
            _ => by - b'A' + 10,
        };
        acc * 16 + u32::from(digit)
    })
}

fn encode_utf8_into(cp: char, out: &mut Vec<u8>) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(cp.encode_utf8(&mut buf).as_bytes());
}

/// Tokenizer configuration.
///
/// When `encoding` is set the source is transcoded to UTF-8 ahead of
/// normalization; by default bytes pass through uninterpreted.
/// `skip_comments` drops `Comment` tokens from the stream, which is what the
/// CSS specification mandates for parsers; the default preserves them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizerOptions {
    pub encoding: Option<&'static Encoding>,
    pub skip_comments: bool,
}

impl TokenizerOptions {
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn skip_comments(mut self, skip: bool) -> Self {
        self.skip_comments = skip;
        self
    }
}

/// A streaming CSS tokenizer.
///
/// Scans an input and emits tokens following the tokenization algorithms of
/// CSS Syntax Level 3 (§4 of the specification). Input need not be
/// normalized: newlines and NUL bytes are preprocessed per the spec.
///
/// Malformed input never aborts the stream: it surfaces as `BadEscape`,
/// `BadString`, or `BadURI` tokens (with a [`ParseError`] attached) and
/// tokenization continues. I/O failures surface as an `Error` token and are
/// sticky. `EOF` is the only terminal token and repeats on every subsequent
/// call.
///
/// One departure from the W3C algorithm, kept for round-trip stability: end
/// of input inside a quoted string yields a `String` token rather than a
/// parse error.
pub struct Tokenizer<'src> {
    options: TokenizerOptions,
    reader: ByteReader<'src>,
    err: Option<Error>,
    parse_errors: Vec<ParseError>,
}

impl<'src> Tokenizer<'src> {
    /// Construct a tokenizer over a byte source with default options.
    pub fn new<R: Read + 'src>(source: R) -> Self {
        Self::with_options(source, TokenizerOptions::default())
    }

    pub fn with_options<R: Read + 'src>(source: R, options: TokenizerOptions) -> Self {
        let reader = match options.encoding {
            Some(encoding) => {
                ByteReader::new(NormalizedReader::new(DecodeReader::new(source, encoding)))
            }
            None => ByteReader::new(NormalizedReader::new(source)),
        };
        Self {
            options,
            reader,
            err: None,
            parse_errors: Vec::new(),
        }
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Token {
        if let Some(err) = self.err.clone() {
            return Token::with_extra(TokenKind::Error, err.to_string(), TokenExtra::Error(err));
        }
        loop {
            match self.consume() {
                Ok(tok) => {
                    if self.options.skip_comments && tok.kind == TokenKind::Comment {
                        continue;
                    }
                    return tok;
                }
                Err(err) => {
                    self.err = Some(err.clone());
                    return Token::with_extra(
                        TokenKind::Error,
                        err.to_string(),
                        TokenExtra::Error(err),
                    );
                }
            }
        }
    }

    /// The reader error surfaced by the last `Error` token, if any.
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Check if the tokenizer has recorded any parse errors.
    pub fn has_errors(&self) -> bool {
        !self.parse_errors.is_empty()
    }

    /// Every parse error recorded so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        self.parse_errors.as_slice()
    }

    // §4.3.1
    fn consume(&mut self) -> Result<Token> {
        let ch = self.reader.read_byte()?;
        match ch {
            0 => Ok(Token::eof()),
            b'\n' | b'\t' | b' ' => self.consume_whitespace(ch),
            b'"' | b'\'' => self.consume_string(ch),
            b'#' => {
                let pk = self.reader.repeek()?;
                if is_name_code(pk[0]) || is_valid_escape(&pk[..2]) {
                    let extra = TokenExtra::Hash {
                        is_identifier: starts_identifier(&pk),
                    };
                    let name = self.consume_name()?;
                    Ok(Token::with_extra(TokenKind::Hash, name, extra))
                } else {
                    Ok(Token::delim(b'#'))
                }
            }
            b'(' => Ok(Token::fixed(TokenKind::OpenParen)),
            b')' => Ok(Token::fixed(TokenKind::CloseParen)),
            b'[' => Ok(Token::fixed(TokenKind::OpenBracket)),
            b']' => Ok(Token::fixed(TokenKind::CloseBracket)),
            b'{' => Ok(Token::fixed(TokenKind::OpenBrace)),
            b'}' => Ok(Token::fixed(TokenKind::CloseBrace)),
            b':' => Ok(Token::fixed(TokenKind::Colon)),
            b';' => Ok(Token::fixed(TokenKind::Semicolon)),
            b',' => Ok(Token::fixed(TokenKind::Comma)),
            b'$' | b'*' | b'^' | b'~' => {
                let pk = self.reader.repeek()?;
                if pk[0] == b'=' {
                    self.reader.discard(1);
                    Ok(Token::fixed(match ch {
                        b'$' => TokenKind::SuffixMatch,
                        b'*' => TokenKind::SubstringMatch,
                        b'^' => TokenKind::PrefixMatch,
                        _ => TokenKind::Includes,
                    }))
                } else {
                    Ok(Token::delim(ch))
                }
            }
            b'|' => {
                let pk = self.reader.repeek()?;
                if pk[0] == b'=' {
                    self.reader.discard(1);
                    Ok(Token::fixed(TokenKind::DashMatch))
                } else if pk[0] == b'|' {
                    self.reader.discard(1);
                    Ok(Token::fixed(TokenKind::Column))
                } else {
                    Ok(Token::delim(b'|'))
                }
            }
            b'+' => {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if starts_number(&pk) {
                    self.consume_numeric()
                } else {
                    self.reader.read_byte()?;
                    Ok(Token::delim(b'+'))
                }
            }
            b'-' => {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if starts_number(&pk) {
                    self.consume_numeric()
                } else if starts_identifier(&pk) {
                    self.consume_identish()
                } else if pk == *b"-->" {
                    self.reader.discard(3);
                    Ok(Token::fixed(TokenKind::CDC))
                } else {
                    self.reader.read_byte()?;
                    Ok(Token::delim(b'-'))
                }
            }
            b'.' => {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if starts_number(&pk) {
                    self.consume_numeric()
                } else {
                    self.reader.read_byte()?;
                    Ok(Token::delim(b'.'))
                }
            }
            b'/' => {
                let pk = self.reader.repeek()?;
                if pk[0] == b'*' {
                    self.reader.discard(1);
                    self.consume_comment()
                } else {
                    Ok(Token::delim(b'/'))
                }
            }
            b'<' => {
                let pk = self.reader.repeek()?;
                if pk == *b"!--" {
                    self.reader.discard(3);
                    Ok(Token::fixed(TokenKind::CDO))
                } else {
                    Ok(Token::delim(b'<'))
                }
            }
            b'@' => {
                let pk = self.reader.repeek()?;
                if starts_identifier(&pk) {
                    let name = self.consume_name()?;
                    Ok(Token::new(TokenKind::AtKeyword, name))
                } else {
                    Ok(Token::delim(b'@'))
                }
            }
            b'\\' => {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if is_valid_escape(&pk[..2]) {
                    self.consume_identish()
                } else {
                    self.reader.read_byte()?;
                    let err =
                        ParseError::new(TokenKind::BadEscape, "bad escape (backslash-newline) in input");
                    self.parse_errors.push(err.clone());
                    Ok(Token::with_extra(
                        TokenKind::BadEscape,
                        &b"\\"[..],
                        TokenExtra::Error(err.into()),
                    ))
                }
            }
            b'U' | b'u' => {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if pk[1] == b'+' && (pk[2].is_ascii_hexdigit() || pk[2] == b'?') {
                    // discard only the U+; the range consumer reads the rest
                    self.reader.discard(2);
                    self.consume_unicode_range()
                } else {
                    self.consume_identish()
                }
            }
            _ if ch.is_ascii_digit() => {
                self.reader.unread_byte();
                self.consume_numeric()
            }
            _ if is_name_start(ch) => {
                self.reader.unread_byte();
                self.consume_identish()
            }
            _ => Ok(Token::delim(ch)),
        }
    }

    /// Discards a run of whitespace, reporting whether it contained a
    /// newline.
    fn skip_whitespace(&mut self) -> Result<bool> {
        let mut saw_newline = false;
        loop {
            let pk = self.reader.repeek()?;
            match pk[0] {
                b'\n' => {
                    saw_newline = true;
                    self.reader.discard(1);
                }
                b' ' | b'\t' => self.reader.discard(1),
                _ => return Ok(saw_newline),
            }
        }
    }

    /// Absorbs the maximal whitespace run starting with `first` and emits a
    /// canonical `S` token: `"\n"` if the run contained a newline, else
    /// `" "`.
    fn consume_whitespace(&mut self, first: u8) -> Result<Token> {
        let mut saw_newline = first == b'\n';
        saw_newline |= self.skip_whitespace()?;
        Ok(Token::new(
            TokenKind::S,
            if saw_newline { &b"\n"[..] } else { &b" "[..] },
        ))
    }

    // §4.3.4. End of input closes the string; an unescaped newline is pushed
    // back and produces `BadString`.
    fn consume_string(&mut self, delim: u8) -> Result<Token> {
        let mut value = Vec::new();
        loop {
            let by = self.reader.read_byte()?;
            if by == delim || by == 0 {
                return Ok(Token::new(TokenKind::String, value));
            } else if by == b'\n' {
                self.reader.unread_byte();
                let err = ParseError::new(TokenKind::BadString, "unterminated string");
                self.parse_errors.push(err.clone());
                return Ok(Token::with_extra(
                    TokenKind::BadString,
                    value,
                    TokenExtra::Error(err.into()),
                ));
            } else if by == b'\\' {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if pk[1] == 0 {
                    // escape at EOF: drop the backslash
                    self.reader.read_byte()?;
                } else if pk[1] == b'\n' {
                    // escaped newline: drop both
                    self.reader.read_byte()?;
                    self.reader.read_byte()?;
                } else {
                    self.reader.read_byte()?;
                    let cp = self.consume_escaped_code_point()?;
                    encode_utf8_into(cp, &mut value);
                }
            } else {
                value.push(by);
            }
        }
    }

    // §4.3.2
    fn consume_numeric(&mut self) -> Result<Token> {
        let (repr, non_integer) = self.consume_number_repr()?;
        let pk = self.reader.repeek()?;
        if starts_identifier(&pk) {
            let dimension = self.consume_name()?;
            Ok(Token::with_extra(
                TokenKind::Dimension,
                repr,
                TokenExtra::Numeric {
                    non_integer,
                    dimension,
                },
            ))
        } else if pk[0] == b'%' {
            self.reader.discard(1);
            Ok(Token::with_extra(
                TokenKind::Percentage,
                repr,
                TokenExtra::Numeric {
                    non_integer,
                    dimension: Vec::new(),
                },
            ))
        } else {
            Ok(Token::with_extra(
                TokenKind::Number,
                repr,
                TokenExtra::Numeric {
                    non_integer,
                    dimension: Vec::new(),
                },
            ))
        }
    }

    // §4.3.12. Sign, integer digits, optional fraction, optional exponent;
    // the textual representation is kept, never evaluated.
    fn consume_number_repr(&mut self) -> Result<(Vec<u8>, bool)> {
        let mut repr = Vec::new();
        let mut non_integer = false;

        let mut by = self.reader.read_byte()?;
        if by == b'+' || by == b'-' {
            repr.push(by);
            by = self.reader.read_byte()?;
        }
        while by.is_ascii_digit() {
            repr.push(by);
            by = self.reader.read_byte()?;
        }
        self.reader.unread_byte();

        let pk = self.reader.repeek()?;
        if pk[0] == b'.' && pk[1].is_ascii_digit() {
            non_integer = true;
            repr.push(self.reader.read_byte()?);
            by = self.reader.read_byte()?;
            while by.is_ascii_digit() {
                repr.push(by);
                by = self.reader.read_byte()?;
            }
            self.reader.unread_byte();
        }

        let pk = self.reader.repeek()?;
        if pk[0] == b'e' || pk[0] == b'E' {
            let n = if (pk[1] == b'+' || pk[1] == b'-') && pk[2].is_ascii_digit() {
                3
            } else if pk[1].is_ascii_digit() {
                2
            } else {
                0
            };
            if n > 0 {
                non_integer = true;
                repr.extend_from_slice(&pk[..n]);
                self.reader.discard(n);
                by = self.reader.read_byte()?;
                while by.is_ascii_digit() {
                    repr.push(by);
                    by = self.reader.read_byte()?;
                }
                self.reader.unread_byte();
            }
        }

        Ok((repr, non_integer))
    }

    // §4.3.3
    fn consume_identish(&mut self) -> Result<Token> {
        let name = self.consume_name()?;
        let pk = self.reader.repeek()?;
        if pk[0] == b'(' {
            self.reader.discard(1);
            if name.eq_ignore_ascii_case(b"url") {
                self.consume_url()
            } else {
                Ok(Token::new(TokenKind::Function, name))
            }
        } else {
            Ok(Token::new(TokenKind::Ident, name))
        }
    }

    // §4.3.5; the reader is positioned just past `url(`.
    fn consume_url(&mut self) -> Result<Token> {
        self.skip_whitespace()?;
        let pk = self.reader.repeek()?;
        if pk[0] == 0 {
            return Ok(Token::new(TokenKind::URI, Vec::new()));
        }
        if pk[0] == b'"' || pk[0] == b'\'' {
            let delim = pk[0];
            self.reader.read_byte()?;
            let tok = self.consume_string(delim)?;
            let mut value = tok.value;
            if tok.kind == TokenKind::BadString {
                value.extend(self.consume_bad_url()?);
                return Ok(self.bad_url_token(value, "unterminated string in url()"));
            }
            self.skip_whitespace()?;
            let pk = self.reader.repeek()?;
            if pk[0] == b')' || pk[0] == 0 {
                self.reader.read_byte()?;
                return Ok(Token::new(TokenKind::URI, value));
            }
            value.extend(self.consume_bad_url()?);
            return Ok(self.bad_url_token(value, "url() with string missing close parenthesis"));
        }
        let mut value = Vec::new();
        loop {
            let by = self.reader.read_byte()?;
            if by == b')' || by == 0 {
                return Ok(Token::new(TokenKind::URI, value));
            } else if is_whitespace(by) {
                self.skip_whitespace()?;
                let pk = self.reader.repeek()?;
                if pk[0] == b')' || pk[0] == 0 {
                    self.reader.read_byte()?;
                    return Ok(Token::new(TokenKind::URI, value));
                }
                value.extend(self.consume_bad_url()?);
                return Ok(self.bad_url_token(value, "bare url() with internal whitespace"));
            } else if by == b'"' || by == b'\'' || by == b'(' {
                value.extend(self.consume_bad_url()?);
                return Ok(self.bad_url_token(
                    value,
                    format!("bare url() with illegal character '{}'", by as char),
                ));
            } else if is_non_printable(by) {
                value.extend(self.consume_bad_url()?);
                return Ok(self.bad_url_token(
                    value,
                    format!("bare url() with unprintable character '{by}'"),
                ));
            } else if by == b'\\' {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if is_valid_escape(&pk[..2]) {
                    self.reader.read_byte()?;
                    let cp = self.consume_escaped_code_point()?;
                    encode_utf8_into(cp, &mut value);
                } else {
                    value.extend(self.consume_bad_url()?);
                    return Ok(self.bad_url_token(value, "bare url() with invalid escape"));
                }
            } else {
                value.push(by);
            }
        }
    }

    fn bad_url_token(&mut self, value: Vec<u8>, message: impl Into<String>) -> Token {
        let err = ParseError::new(TokenKind::BadURI, message);
        self.parse_errors.push(err.clone());
        Token::with_extra(TokenKind::BadURI, value, TokenExtra::Error(err.into()))
    }

    // §4.3.14. Advances past the broken url() so the stream is recoverable;
    // valid escapes still decode (allowing an escaped close paren), invalid
    // backslashes are dropped.
    fn consume_bad_url(&mut self) -> Result<Vec<u8>> {
        let mut value = Vec::new();
        loop {
            let by = self.reader.read_byte()?;
            if by == b')' || by == 0 {
                return Ok(value);
            } else if by == b'\\' {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if is_valid_escape(&pk[..2]) {
                    self.reader.read_byte()?;
                    let cp = self.consume_escaped_code_point()?;
                    encode_utf8_into(cp, &mut value);
                } else {
                    self.reader.read_byte()?;
                }
            } else {
                value.push(by);
            }
        }
    }

    // §4.3.6. A block of up to six hex digits, where question marks may
    // terminate the digit run; once one is seen no further hex is accepted.
    fn consume_unicode_range(&mut self) -> Result<Token> {
        let mut sdigits = [0u8; 6];
        let mut have_question_marks = false;
        let mut i = 0;
        loop {
            let by = self.reader.read_byte()?;
            if i >= 6 {
                break;
            }
            if by == b'?' {
                sdigits[i] = by;
                have_question_marks = true;
                i += 1;
            } else if !have_question_marks && by.is_ascii_hexdigit() {
                sdigits[i] = by;
                i += 1;
            } else {
                break;
            }
        }
        self.reader.unread_byte();
        let slen = i;

        let (start, end);
        if have_question_marks {
            let mut sds = sdigits;
            let mut eds = sdigits;
            for idx in 0..slen {
                if sds[idx] == b'?' {
                    sds[idx] = b'0';
                    eds[idx] = b'F';
                }
            }
            start = hex_value(&sds[..slen]);
            end = hex_value(&eds[..slen]);
        } else {
            let pk = self.reader.repeek()?;
            if pk[0] == b'-' && pk[1].is_ascii_hexdigit() {
                self.reader.read_byte()?;
                let mut edigits = [0u8; 6];
                let mut elen = 0;
                loop {
                    let by = self.reader.read_byte()?;
                    if elen < 6 && by.is_ascii_hexdigit() {
                        edigits[elen] = by;
                        elen += 1;
                    } else {
                        break;
                    }
                }
                self.reader.unread_byte();
                start = hex_value(&sdigits[..slen]);
                // an inverted range collapses to its start
                end = hex_value(&edigits[..elen]).max(start);
            } else {
                start = hex_value(&sdigits[..slen]);
                end = start;
            }
        }

        let extra = TokenExtra::UnicodeRange { start, end };
        let value = extra.to_string().into_bytes();
        Ok(Token::with_extra(TokenKind::UnicodeRange, value, extra))
    }

    // Already past `/*`; EOF closes the comment without error.
    fn consume_comment(&mut self) -> Result<Token> {
        let mut value = Vec::new();
        loop {
            let by = self.reader.read_byte()?;
            if by == b'*' {
                let pk = self.reader.repeek()?;
                if pk[0] == b'/' {
                    self.reader.read_byte()?;
                    return Ok(Token::new(TokenKind::Comment, value));
                }
            } else if by == 0 {
                return Ok(Token::new(TokenKind::Comment, value));
            }
            value.push(by);
        }
    }

    // §4.3.7; the backslash is already consumed. Returns a code point so the
    // caller encodes into UTF-8 once.
    fn consume_escaped_code_point(&mut self) -> Result<char> {
        let by = self.reader.read_byte()?;
        if by == 0 {
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        if by.is_ascii_hexdigit() {
            let mut digits = [0u8; 6];
            digits[0] = by;
            let mut i = 1;
            let mut last = self.reader.read_byte()?;
            while i < 6 && last.is_ascii_hexdigit() {
                digits[i] = last;
                i += 1;
                last = self.reader.read_byte()?;
            }
            // a single trailing whitespace byte is part of the escape
            if !is_whitespace(last) && last != 0 {
                self.reader.unread_byte();
            }
            let cp = hex_value(&digits[..i]);
            if cp == 0 || cp > 0x10FFFF {
                return Ok(char::REPLACEMENT_CHARACTER);
            }
            Ok(char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
        } else {
            self.reader.unread_byte();
            Ok(self.reader.read_code_point()?)
        }
    }

    // §4.3.11
    fn consume_name(&mut self) -> Result<Vec<u8>> {
        let mut name = Vec::new();
        loop {
            let by = self.reader.read_byte()?;
            if by == b'\\' {
                self.reader.unread_byte();
                let pk = self.reader.repeek()?;
                if is_valid_escape(&pk[..2]) {
                    self.reader.read_byte()?;
                    let cp = self.consume_escaped_code_point()?;
                    encode_utf8_into(cp, &mut name);
                } else {
                    return Ok(name);
                }
            } else if is_name_code(by) {
                name.push(by);
            } else {
                self.reader.unread_byte();
                return Ok(name);
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    /// Yields tokens until `EOF`. A sticky reader failure is yielded once as
    /// an `Error` token and then terminates the iterator.
    fn next(&mut self) -> Option<Self::Item> {
        if self.err.is_some() {
            return None;
        }
        let tok = Tokenizer::next(self);
        (tok.kind != TokenKind::EOF).then_some(tok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_classification() {
        assert!(is_name_start(b'a'));
        assert!(is_name_start(b'Z'));
        assert!(is_name_start(b'_'));
        assert!(is_name_start(0x80));
        assert!(is_name_start(0xFF));
        assert!(!is_name_start(b'1'));
        assert!(!is_name_start(b'-'));
        assert!(is_name_code(b'1'));
        assert!(is_name_code(b'-'));
        assert!(!is_name_code(b' '));
    }

    #[test]
    fn escape_classification() {
        assert!(is_valid_escape(b"\\a"));
        assert!(is_valid_escape(b"\\\\"));
        assert!(!is_valid_escape(b"\\\n"));
        assert!(!is_valid_escape(b"a\\"));
        // zero-filled window slot past EOF
        assert!(!is_valid_escape(&[b'\\', 0]));
    }

    #[test]
    fn identifier_start_classification() {
        assert!(starts_identifier(b"abc"));
        assert!(starts_identifier(b"-ab"));
        assert!(starts_identifier(b"\\ab"));
        assert!(starts_identifier(b"-\\a"));
        assert!(!starts_identifier(b"--a"));
        assert!(!starts_identifier(b"1ab"));
        assert!(!starts_identifier(b"-1a"));
    }

    #[test]
    fn number_start_classification() {
        assert!(starts_number(b"123"));
        assert!(starts_number(b"+12"));
        assert!(starts_number(b"-12"));
        assert!(starts_number(b".12"));
        assert!(starts_number(b"+.1"));
        assert!(starts_number(b"-.1"));
        assert!(!starts_number(b"+a1"));
        assert!(!starts_number(b"..1"));
        assert!(!starts_number(b"a12"));
    }

    #[test]
    fn non_printable_classification() {
        assert!(is_non_printable(0x00));
        assert!(is_non_printable(0x08));
        assert!(is_non_printable(0x0B));
        assert!(is_non_printable(0x0E));
        assert!(is_non_printable(0x1F));
        assert!(is_non_printable(0x7F));
        assert!(!is_non_printable(b'\t'));
        assert!(!is_non_printable(b'\n'));
        assert!(!is_non_printable(b' '));
    }

    #[test]
    fn hex_values() {
        assert_eq!(hex_value(b"0"), 0);
        assert_eq!(hex_value(b"42"), 0x42);
        assert_eq!(hex_value(b"FFFFFF"), 0xFFFFFF);
        assert_eq!(hex_value(b"abcdef"), 0xABCDEF);
    }
}
