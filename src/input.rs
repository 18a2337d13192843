use std::collections::VecDeque;
use std::io::{self, Read};

use encoding_rs::{CoderResult, Decoder, Encoding};

/// UTF-8 encoding of U+FFFD REPLACEMENT CHARACTER.
pub const REPLACEMENT: [u8; 3] = [0xEF, 0xBF, 0xBD];

/// Outcome of a [`Normalizer::transform`] call, in the coder-result style of
/// [`encoding_rs`]: either the whole source was consumed, or the destination
/// filled up first and the caller should retry with more room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeResult {
    InputEmpty,
    OutputFull,
}

/// Streaming input preprocessor.
///
/// Per the specification: `\r\n`, lone `\r`, and `\n` are all collapsed to a
/// single `\n`, and each NUL byte is replaced with the UTF-8 encoding of
/// U+FFFD. No other bytes are modified. The transform is restartable: state
/// is a single remembered byte, so input may be fed in arbitrary chunks.
#[derive(Debug, Default)]
pub struct Normalizer {
    prev: u8,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.prev = 0;
    }

    /// Transforms bytes from `src` into `dst`, returning the result state
    /// and the number of bytes read and written. A NUL replacement needs
    /// three bytes of room in `dst`; when it does not fit the call returns
    /// [`NormalizeResult::OutputFull`] with the progress made so far.
    pub fn transform(&mut self, src: &[u8], dst: &mut [u8]) -> (NormalizeResult, usize, usize) {
        let mut nsrc = 0;
        let mut ndst = 0;
        while nsrc < src.len() {
            let by = src[nsrc];
            match by {
                b'\r' => {
                    if ndst >= dst.len() {
                        return (NormalizeResult::OutputFull, nsrc, ndst);
                    }
                    dst[ndst] = b'\n';
                    ndst += 1;
                }
                b'\n' => {
                    if self.prev == b'\r' {
                        // second half of a CRLF pair, already emitted
                        self.prev = by;
                        nsrc += 1;
                        continue;
                    }
                    if ndst >= dst.len() {
                        return (NormalizeResult::OutputFull, nsrc, ndst);
                    }
                    dst[ndst] = b'\n';
                    ndst += 1;
                }
                0 => {
                    if ndst + REPLACEMENT.len() > dst.len() {
                        return (NormalizeResult::OutputFull, nsrc, ndst);
                    }
                    dst[ndst..ndst + REPLACEMENT.len()].copy_from_slice(&REPLACEMENT);
                    ndst += REPLACEMENT.len();
                }
                _ => {
                    if ndst >= dst.len() {
                        return (NormalizeResult::OutputFull, nsrc, ndst);
                    }
                    dst[ndst] = by;
                    ndst += 1;
                }
            }
            self.prev = by;
            nsrc += 1;
        }
        (NormalizeResult::InputEmpty, nsrc, ndst)
    }
}

/// An [`io::Read`] adapter that applies [`Normalizer`] to everything read
/// from the source. The tokenizer stacks this between the raw input and its
/// peek buffer.
pub struct NormalizedReader<R> {
    inner: R,
    norm: Normalizer,
    raw: [u8; 4096],
    start: usize,
    end: usize,
    done: bool,
}

impl<R: Read> NormalizedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            norm: Normalizer::new(),
            raw: [0; 4096],
            start: 0,
            end: 0,
            done: false,
        }
    }
}

impl<R: Read> Read for NormalizedReader<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }
        loop {
            if self.start == self.end {
                if self.done {
                    return Ok(0);
                }
                self.start = 0;
                self.end = self.inner.read(&mut self.raw)?;
                if self.end == 0 {
                    self.done = true;
                    return Ok(0);
                }
            }
            let (result, nsrc, ndst) = self
                .norm
                .transform(&self.raw[self.start..self.end], dst);
            self.start += nsrc;
            if ndst > 0 {
                return Ok(ndst);
            }
            if result == NormalizeResult::OutputFull && dst.len() < REPLACEMENT.len() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "destination smaller than a replacement character",
                ));
            }
        }
    }
}

/// An [`io::Read`] adapter that converts a source in some other encoding to
/// UTF-8 using a streaming [`encoding_rs::Decoder`]. Only inserted when an
/// encoding is supplied via
/// [`TokenizerOptions::encoding`](crate::TokenizerOptions); the default path
/// leaves bytes uninterpreted.
pub struct DecodeReader<R> {
    inner: R,
    decoder: Decoder,
    raw: [u8; 4096],
    start: usize,
    end: usize,
    done: bool,
    finished: bool,
}

impl<R: Read> DecodeReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            decoder: encoding.new_decoder(),
            raw: [0; 4096],
            start: 0,
            end: 0,
            done: false,
            finished: false,
        }
    }
}

impl<R: Read> Read for DecodeReader<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if dst.is_empty() || self.finished {
            return Ok(0);
        }
        loop {
            if self.start == self.end && !self.done {
                self.start = 0;
                self.end = self.inner.read(&mut self.raw)?;
                if self.end == 0 {
                    self.done = true;
                }
            }
            let last = self.done && self.start == self.end;
            let (result, nsrc, ndst, _) =
                self.decoder
                    .decode_to_utf8(&self.raw[self.start..self.end], dst, last);
            self.start += nsrc;
            if last && result == CoderResult::InputEmpty {
                self.finished = true;
            }
            if ndst > 0 {
                return Ok(ndst);
            }
            if self.finished {
                return Ok(0);
            }
            if result == CoderResult::OutputFull && dst.len() < 4 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "destination smaller than a UTF-8 sequence",
                ));
            }
        }
    }
}

/// Buffered byte source with the three-byte lookahead window the tokenizer
/// dispatch rules need. Wraps the normalized stream.
///
/// EOF is reported as a 0 sentinel from [`read_byte`](Self::read_byte) and is
/// sticky; NUL bytes cannot otherwise appear because normalization replaced
/// them. [`repeek`](Self::repeek) zero-fills window slots past EOF.
pub struct ByteReader<'src> {
    inner: Box<dyn Read + 'src>,
    pending: VecDeque<u8>,
    last: Option<u8>,
    eof: bool,
    done: bool,
}

impl<'src> ByteReader<'src> {
    pub fn new<R: Read + 'src>(inner: R) -> Self {
        Self {
            inner: Box::new(inner),
            pending: VecDeque::new(),
            last: None,
            eof: false,
            done: false,
        }
    }

    fn fill(&mut self, want: usize) -> io::Result<()> {
        let mut chunk = [0u8; 64];
        while self.pending.len() < want && !self.done {
            let n = self.inner.read(&mut chunk)?;
            if n == 0 {
                self.done = true;
            } else {
                self.pending.extend(&chunk[..n]);
            }
        }
        Ok(())
    }

    /// Returns the next byte, or the 0 sentinel at EOF.
    pub fn read_byte(&mut self) -> io::Result<u8> {
        if self.pending.is_empty() {
            self.fill(1)?;
        }
        match self.pending.pop_front() {
            Some(by) => {
                self.last = Some(by);
                Ok(by)
            }
            None => {
                self.eof = true;
                self.last = None;
                Ok(0)
            }
        }
    }

    /// Puts the most recently read byte back. A no-op once EOF has been
    /// reached, and after a second call without an intervening read.
    pub fn unread_byte(&mut self) {
        if self.eof {
            return;
        }
        if let Some(by) = self.last.take() {
            self.pending.push_front(by);
        }
    }

    /// Refreshes and returns the three-byte lookahead window. Slots past the
    /// end of input are 0.
    pub fn repeek(&mut self) -> io::Result<[u8; 3]> {
        self.fill(3)?;
        let mut window = [0u8; 3];
        for (i, slot) in window.iter_mut().enumerate() {
            *slot = self.pending.get(i).copied().unwrap_or(0);
        }
        Ok(window)
    }

    /// Drops `n` already-peeked bytes.
    pub fn discard(&mut self, n: usize) {
        for _ in 0..n {
            self.pending.pop_front();
        }
        self.last = None;
    }

    /// Decodes one UTF-8 code point from the stream. An invalid sequence
    /// consumes only its leading byte and yields U+FFFD, leaving the rest in
    /// place. Used by the escape consumer; the caller has already ruled out
    /// EOF for the leading byte.
    pub(crate) fn read_code_point(&mut self) -> io::Result<char> {
        let b0 = self.read_byte()?;
        let len = match b0 {
            0x00..=0x7F => return Ok(b0 as char),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Ok(char::REPLACEMENT_CHARACTER),
        };
        let mut buf = [b0, 0, 0, 0];
        for i in 1..len {
            let by = self.read_byte()?;
            if by & 0xC0 != 0x80 {
                // not a continuation byte: keep it (and any continuations
                // already taken) in the stream
                if !(by == 0 && self.eof) {
                    self.pending.push_front(by);
                }
                for j in (1..i).rev() {
                    self.pending.push_front(buf[j]);
                }
                self.last = None;
                return Ok(char::REPLACEMENT_CHARACTER);
            }
            buf[i] = by;
        }
        match std::str::from_utf8(&buf[..len]) {
            Ok(s) => Ok(s.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)),
            Err(_) => {
                // overlong or surrogate encoding; consume the leading byte only
                for j in (1..len).rev() {
                    self.pending.push_front(buf[j]);
                }
                self.last = None;
                Ok(char::REPLACEMENT_CHARACTER)
            }
        }
    }
}

#[cfg(feature = "async")]
mod async_input {
    use std::collections::VecDeque;
    use std::pin::Pin;

    use futures_util::{Stream, StreamExt};

    use super::Normalizer;

    /// Async twin of the normalized peek buffer: wraps a byte stream,
    /// applies the newline/NUL normalization rules, and exposes the same
    /// three-byte lookahead surface as [`ByteReader`](super::ByteReader).
    pub struct AsyncByteStream {
        stream: Pin<Box<dyn Stream<Item = u8>>>,
        norm: Normalizer,
        pending: VecDeque<u8>,
        last: Option<u8>,
        eof: bool,
        done: bool,
    }

    impl AsyncByteStream {
        pub fn new<S: Stream<Item = u8> + 'static>(stream: S) -> Self {
            Self {
                stream: Box::pin(stream),
                norm: Normalizer::new(),
                pending: VecDeque::new(),
                last: None,
                eof: false,
                done: false,
            }
        }

        async fn fill(&mut self, want: usize) {
            let mut out = [0u8; 3];
            while self.pending.len() < want && !self.done {
                match self.stream.next().await {
                    Some(by) => {
                        let (_, _, n) = self.norm.transform(&[by], &mut out);
                        self.pending.extend(&out[..n]);
                    }
                    None => self.done = true,
                }
            }
        }

        /// Returns the next normalized byte, or the 0 sentinel at EOF.
        pub async fn read_byte(&mut self) -> u8 {
            if self.pending.is_empty() {
                self.fill(1).await;
            }
            match self.pending.pop_front() {
                Some(by) => {
                    self.last = Some(by);
                    by
                }
                None => {
                    self.eof = true;
                    self.last = None;
                    0
                }
            }
        }

        /// Puts the most recently read byte back; no-op after EOF.
        pub fn unread_byte(&mut self) {
            if self.eof {
                return;
            }
            if let Some(by) = self.last.take() {
                self.pending.push_front(by);
            }
        }

        /// Refreshes and returns the three-byte lookahead window.
        pub async fn repeek(&mut self) -> [u8; 3] {
            self.fill(3).await;
            let mut window = [0u8; 3];
            for (i, slot) in window.iter_mut().enumerate() {
                *slot = self.pending.get(i).copied().unwrap_or(0);
            }
            window
        }

        /// Drops `n` already-peeked bytes.
        pub fn discard(&mut self, n: usize) {
            for _ in 0..n {
                self.pending.pop_front();
            }
            self.last = None;
        }
    }

}

#[cfg(feature = "async")]
pub use async_input::AsyncByteStream;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizer_collapses_newlines() {
        let mut norm = Normalizer::new();
        let mut dst = [0u8; 16];
        let (res, nsrc, ndst) = norm.transform(b"a\r\nb\rc\nd", &mut dst);
        assert_eq!(res, NormalizeResult::InputEmpty);
        assert_eq!(nsrc, 8);
        assert_eq!(&dst[..ndst], b"a\nb\nc\nd");
    }

    #[test]
    fn normalizer_crlf_across_chunks() {
        let mut norm = Normalizer::new();
        let mut dst = [0u8; 16];
        let (_, _, n1) = norm.transform(b"a\r", &mut dst);
        assert_eq!(&dst[..n1], b"a\n");
        let (_, _, n2) = norm.transform(b"\nb", &mut dst);
        assert_eq!(&dst[..n2], b"b");
    }

    #[test]
    fn normalizer_replaces_nul() {
        let mut norm = Normalizer::new();
        let mut dst = [0u8; 16];
        let (_, _, ndst) = norm.transform(b"a\x00b", &mut dst);
        assert_eq!(&dst[..ndst], b"a\xEF\xBF\xBDb");
    }

    #[test]
    fn normalizer_short_destination() {
        let mut norm = Normalizer::new();
        let mut dst = [0u8; 2];
        let (res, nsrc, ndst) = norm.transform(b"a\x00b", &mut dst);
        assert_eq!(res, NormalizeResult::OutputFull);
        assert_eq!(nsrc, 1);
        assert_eq!(&dst[..ndst], b"a");
        // retry with room for the expansion
        let mut dst = [0u8; 8];
        let (res, _, ndst) = norm.transform(b"\x00b", &mut dst);
        assert_eq!(res, NormalizeResult::InputEmpty);
        assert_eq!(&dst[..ndst], b"\xEF\xBF\xBDb");
    }

    #[test]
    fn normalized_reader_stream() {
        let mut r = NormalizedReader::new(&b"x\r\ny\x00"[..]);
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"x\ny\xEF\xBF\xBD");
    }

    #[test]
    fn byte_reader_eof_is_sticky() {
        let mut r = ByteReader::new(&b"a"[..]);
        assert_eq!(r.read_byte().unwrap(), b'a');
        assert_eq!(r.read_byte().unwrap(), 0);
        assert_eq!(r.read_byte().unwrap(), 0);
        // unread after EOF is a no-op
        r.unread_byte();
        assert_eq!(r.read_byte().unwrap(), 0);
    }

    #[test]
    fn byte_reader_peek_window() {
        let mut r = ByteReader::new(&b"ab"[..]);
        assert_eq!(r.repeek().unwrap(), [b'a', b'b', 0]);
        assert_eq!(r.read_byte().unwrap(), b'a');
        r.unread_byte();
        assert_eq!(r.repeek().unwrap(), [b'a', b'b', 0]);
        r.discard(1);
        assert_eq!(r.repeek().unwrap(), [b'b', 0, 0]);
    }

    #[test]
    fn byte_reader_single_unread() {
        let mut r = ByteReader::new(&b"abc"[..]);
        assert_eq!(r.read_byte().unwrap(), b'a');
        assert_eq!(r.read_byte().unwrap(), b'b');
        r.unread_byte();
        r.unread_byte(); // second unread without a read is a no-op
        assert_eq!(r.read_byte().unwrap(), b'b');
        assert_eq!(r.read_byte().unwrap(), b'c');
    }

    #[test]
    fn read_code_point_ascii_and_multibyte() {
        let mut r = ByteReader::new("a\u{1F642}".as_bytes());
        assert_eq!(r.read_code_point().unwrap(), 'a');
        assert_eq!(r.read_code_point().unwrap(), '\u{1F642}');
    }

    #[test]
    fn read_code_point_invalid_consumes_leading_byte() {
        // 0xE2 starts a three-byte sequence but 'a' is not a continuation
        let mut r = ByteReader::new(&b"\xE2abc"[..]);
        assert_eq!(r.read_code_point().unwrap(), char::REPLACEMENT_CHARACTER);
        assert_eq!(r.read_byte().unwrap(), b'a');
    }

    #[test]
    fn read_code_point_truncated_at_eof() {
        let mut r = ByteReader::new(&b"\xE2\x82"[..]);
        assert_eq!(r.read_code_point().unwrap(), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn decode_reader_latin1() {
        let mut r = DecodeReader::new(&b"caf\xE9"[..], encoding_rs::WINDOWS_1252);
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, "café".as_bytes());
    }
}
