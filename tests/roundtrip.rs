//! Property-based round-trip tests.
//!
//! These generate random inputs (both CSS-shaped text and arbitrary bytes)
//! and verify that tokenize then render then tokenize yields the same token
//! stream, ignoring comments, with stop tokens compared by kind only. This
//! complements the fixed corpus in `tokenizer.rs` by exercising inputs the
//! corpus does not contain.

use csstok::verify::round_trip;
use proptest::prelude::*;

/// Generate one plausible CSS token's worth of text.
fn css_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("-?[a-zA-Z_][a-zA-Z0-9_-]{0,8}").expect("valid regex"),
        prop::string::string_regex("(#[a-zA-Z0-9_-]{1,6}|@[a-zA-Z][a-zA-Z-]{0,7})")
            .expect("valid regex"),
        prop::string::string_regex(
            "[+-]?[0-9]{1,3}(\\.[0-9]{1,3})?([eE][+-]?[0-9]{1,2})?(px|em|rem|vh|ch|%)?"
        )
        .expect("valid regex"),
        prop::string::string_regex(
            "(\"[a-zA-Z0-9 !#-&(-.:;<->?-Z^-~]{0,10}\"|'[a-zA-Z0-9 ]{0,10}')"
        )
        .expect("valid regex"),
        prop::string::string_regex("url\\( ?[a-zA-Z0-9/:._%-]{0,12} ?\\)").expect("valid regex"),
        prop::string::string_regex(
            "U\\+([0-9a-fA-F]{1,5}|[0-9a-fA-F]{1,3}-[0-9a-fA-F]{1,4}|[0-9a-fA-F]{0,2}\\?{1,3})"
        )
        .expect("valid regex"),
        prop::string::string_regex("/\\*[a-z ]{0,8}\\*/").expect("valid regex"),
        prop::string::string_regex("\\\\[0-9a-fA-F]{1,6} ?[a-z]{0,3}").expect("valid regex"),
        prop::string::string_regex("[a-z]{1,6}\\(").expect("valid regex"),
        prop::sample::select(vec![
            "<!--", "-->", "~=", "|=", "||", "^=", "$=", "*=", "{", "}", "[", "]", "(", ")",
            ":", ";", ",", ".", "+", "-", "*", "/", "<", ">", "@", "#", "~", "|", "!", "=",
        ])
        .prop_map(str::to_owned),
    ]
}

fn css_input() -> impl Strategy<Value = String> {
    let spacer = prop::sample::select(vec!["", " ", "\n", "\t", " \n "]);
    prop::collection::vec((css_fragment(), spacer), 0..16).prop_map(|parts| {
        let mut out = String::new();
        for (fragment, spacer) in parts {
            out.push_str(&fragment);
            out.push_str(spacer);
        }
        out
    })
}

proptest! {
    #[test]
    fn css_shaped_inputs_round_trip(input in css_input()) {
        if let Err(failure) = round_trip(input.as_bytes()) {
            panic!("round trip failed for {input:?}: {failure}");
        }
    }

    #[test]
    fn arbitrary_bytes_round_trip(input in prop::collection::vec(any::<u8>(), 0..128)) {
        if let Err(failure) = round_trip(&input) {
            panic!("round trip failed for {:?}: {failure}", input);
        }
    }

    #[test]
    fn arbitrary_ascii_round_trip(
        input in prop::collection::vec(0x20u8..0x7F, 0..64)
    ) {
        if let Err(failure) = round_trip(&input) {
            panic!(
                "round trip failed for {:?}: {failure}",
                String::from_utf8_lossy(&input)
            );
        }
    }

    #[test]
    fn tokenization_terminates_and_eof_repeats(
        input in prop::collection::vec(any::<u8>(), 0..128)
    ) {
        let mut tz = csstok::Tokenizer::new(&input[..]);
        let mut count = 0usize;
        loop {
            let tok = tz.next();
            prop_assert_ne!(tok.kind, csstok::TokenKind::Error);
            if tok.kind == csstok::TokenKind::EOF {
                break;
            }
            count += 1;
            prop_assert!(count <= input.len() + 4, "more tokens than bytes");
        }
        prop_assert_eq!(tz.next().kind, csstok::TokenKind::EOF);
    }

    #[test]
    fn extras_are_determined_by_kind(input in prop::collection::vec(any::<u8>(), 0..128)) {
        for tok in csstok::Tokenizer::new(&input[..]) {
            prop_assert_eq!(tok.extra.is_some(), tok.kind.carries_extra());
            if let Some(csstok::TokenExtra::UnicodeRange { start, end }) = tok.extra {
                prop_assert!(start <= end);
                prop_assert!(end <= 0xFFFFFF);
            }
        }
    }
}
