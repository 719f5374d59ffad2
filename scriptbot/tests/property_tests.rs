//! Property tests for the tokenizer and parser.

use proptest::prelude::*;

use scriptbot::script::{parse, tokenize, TokenKind};

proptest! {
    /// Lexing is total: any input produces a token sequence without
    /// panicking, and the parser returns Ok or Err but never panics either.
    #[test]
    fn pipeline_never_panics(s in "\\PC*") {
        let tokens = tokenize(&s);
        let _ = parse(&tokens);
    }
}

proptest! {
    /// No output token is empty and the internal Comment kind never leaks.
    #[test]
    fn tokens_are_never_empty_or_comments(s in "\\PC*") {
        for tok in tokenize(&s) {
            prop_assert!(!tok.text.is_empty());
            prop_assert!(tok.kind != TokenKind::Comment);
        }
    }
}

proptest! {
    /// Comment content never appears in the token sequence.
    #[test]
    fn comment_content_is_discarded(code in "[a-z ]{0,40}", comment in "[a-z ]{0,40}") {
        let src = format!("{code} #SENTINEL{comment}");
        for tok in tokenize(&src) {
            prop_assert!(!tok.text.contains("SENTINEL"));
        }
    }
}

proptest! {
    /// Whitespace-separated words are never dropped: every word comes back
    /// as exactly one token with its text intact.
    #[test]
    fn words_are_preserved(words in prop::collection::vec("[a-z]{1,12}", 0..20)) {
        let src = words.join(" ");
        let texts: Vec<String> = tokenize(&src).into_iter().map(|t| t.text).collect();
        prop_assert_eq!(texts, words);
    }
}

proptest! {
    /// String literals round-trip verbatim, including whitespace, the other
    /// quote kind and `#`.
    #[test]
    fn string_literals_roundtrip(content in "[a-z0-9#' .!?]{1,60}") {
        let src = format!("\"{content}\"");
        let tokens = tokenize(&src);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::String);
        prop_assert_eq!(tokens[0].text.as_str(), content.as_str());
    }
}

proptest! {
    /// Digit runs lex as a single Number token.
    #[test]
    fn digit_runs_are_numbers(digits in "[0-9]{1,18}") {
        let tokens = tokenize(&digits);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::Number);
        prop_assert_eq!(tokens[0].text.as_str(), digits.as_str());
    }
}

proptest! {
    /// A well-formed send script always parses, whatever the message text.
    #[test]
    fn send_with_any_string_parses(content in "[a-z0-9#' .!?]{1,60}") {
        let src = format!("config DEFAULT\nsend \"{content}\" 200");
        let tokens = tokenize(&src);
        prop_assert!(parse(&tokens).is_ok());
    }
}
