//! Streaming tokenizer for CSS Syntax Level 3, with a renderer whose output
//! re-tokenizes to an equivalent stream.
//!
//! The tokenizer implements the tokenization algorithms of
//! <http://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms> over arbitrary
//! byte input. Create one for a given input and call
//! [`next`](Tokenizer::next) until it returns a stop token:
//!
//! ```
//! use csstok::Tokenizer;
//!
//! let mut tz = Tokenizer::new("a { color: red }".as_bytes());
//! loop {
//!     let token = tz.next();
//!     if token.kind.is_stop() {
//!         break;
//!     }
//!     // do something with the token
//! }
//! ```
//!
//! A consumer that wants to accept malformed input checks for
//! [`TokenKind::EOF`] and [`TokenKind::Error`] instead: the three
//! tokenization errors (a bad escape, meaning backslash-newline outside a
//! string; a bad string, meaning an unescaped newline inside one; and a bad
//! url) are ordinary tokens carrying a [`ParseError`], and the stream
//! continues after them.
//!
//! [`Renderer`] serializes tokens back to CSS text, inserting empty `/**/`
//! comments wherever two adjacent tokens would otherwise merge when read
//! back; [`verify::round_trip`] checks that property for a given input.
//!
//! Note: this crate only implements §4 of the CSS Syntax Level 3
//! specification; see §5 for the parsing rules built on top of it.

mod input;
mod render;
mod token;
mod tokenizer;
pub mod verify;

#[cfg(feature = "async")]
pub use input::AsyncByteStream;
pub use input::{ByteReader, DecodeReader, NormalizeResult, NormalizedReader, Normalizer, REPLACEMENT};
pub use render::Renderer;
pub use token::{Error, ParseError, Token, TokenExtra, TokenKind};
pub use tokenizer::{Tokenizer, TokenizerOptions};
