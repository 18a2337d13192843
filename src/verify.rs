//! Round-trip verification: tokenize, render, retokenize, compare.
//!
//! The property driven by the fuzz tests: rendering a token stream and
//! tokenizing the result yields the same stream, ignoring comments, with
//! stop tokens compared by kind only. The renderer and second tokenizer are
//! connected by a plain buffer; the property does not depend on streaming.

use crate::render::Renderer;
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;

/// A violation of the round-trip property, with a description of the first
/// mismatch.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct RoundTripFailure(String);

fn fail(message: String) -> Result<(), RoundTripFailure> {
    Err(RoundTripFailure(message))
}

/// Tokenizes `input` up to EOF, failing on reader errors.
fn collect_tokens(input: &[u8]) -> Result<Vec<Token>, RoundTripFailure> {
    let mut tz = Tokenizer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = tz.next();
        match tok.kind {
            TokenKind::Error => {
                return Err(RoundTripFailure(format!(
                    "reader error while tokenizing: {}",
                    tok.value_str()
                )))
            }
            TokenKind::EOF => return Ok(tokens),
            _ => tokens.push(tok),
        }
    }
}

/// Asserts that tokenize → render → tokenize is stable for `input`.
///
/// Comments are skipped on both sides. Comparison runs element-wise over
/// (kind, value, extra) and ends successfully at the first stop token, whose
/// value and extra are not required to survive recovery.
pub fn round_trip(input: &[u8]) -> Result<(), RoundTripFailure> {
    let tokens = collect_tokens(input)?;

    let mut rendered = Vec::new();
    let mut renderer = Renderer::new();
    for tok in &tokens {
        renderer
            .write(&mut rendered, tok)
            .map_err(|err| RoundTripFailure(format!("render failed: {err}")))?;
    }

    let mut retok = Tokenizer::new(&rendered[..]);
    let mut i = 0;
    loop {
        while i < tokens.len() && tokens[i].kind == TokenKind::Comment {
            i += 1;
        }
        let tt = retok.next();
        if tt.kind == TokenKind::Comment {
            continue;
        }
        if tt.kind == TokenKind::Error {
            return fail(format!("reader error while retokenizing: {}", tt.value_str()));
        }
        if tt.kind == TokenKind::EOF {
            if i != tokens.len() {
                return fail(format!(
                    "unexpected EOF: retokenizer ended at {}/{} of the original stream\nrendered: {:?}",
                    i,
                    tokens.len(),
                    String::from_utf8_lossy(&rendered),
                ));
            }
            return Ok(());
        }
        if i == tokens.len() {
            return fail(format!(
                "expected EOF: original stream is exhausted but retokenizer produced {:?}\nrendered: {:?}",
                tt,
                String::from_utf8_lossy(&rendered),
            ));
        }

        let ot = &tokens[i];
        if tt.kind != ot.kind {
            return fail(format!(
                "kind mismatch at {i}: got {:?}, expected {:?}\nrendered: {:?}",
                tt,
                ot,
                String::from_utf8_lossy(&rendered),
            ));
        }
        if tt.kind.is_stop() {
            // recovery payloads are exempt, and the streams may diverge
            // beyond this point
            return Ok(());
        }
        if tt.value != ot.value {
            return fail(format!(
                "value mismatch at {i}: got {:?}, expected {:?}",
                tt, ot,
            ));
        }
        if tt.kind.carries_extra() && tt.extra != ot.extra {
            return fail(format!(
                "extra mismatch at {i}: got {:?}, expected {:?}",
                tt, ot,
            ));
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_inputs() {
        for input in [
            &b""[..],
            b"abcd",
            b"foo { bar: rgb(255, 0, 127); }",
            b"url( http://example.com/a?b=c )",
            b"U+0042 U+1?? U+??????",
            b"a/**/b /*x*/ c",
            b"42px 4.2% .5em 6e3 -7E-2",
            b"@media #id ##two ~= |= || $= *= ^=",
        ] {
            round_trip(input).unwrap();
        }
    }

    #[test]
    fn recovery_inputs() {
        for input in [
            &b"\"bad\nstring\""[..],
            b"url(bad url)rest",
            b"url('unterminated\n)",
            b"\\\nafter",
        ] {
            round_trip(input).unwrap();
        }
    }
}
