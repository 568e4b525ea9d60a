//! Property-based tests for the manual command filter

use proptest::prelude::*;
use sshlooper_core::{CommandFilter, DEFAULT_DENIED_COMMANDS, DispatchError, approve};

/// Strategy for harmless command text (no letters that could spell a denied word)
fn harmless_command() -> impl Strategy<Value = String> {
    "[0-9 ./|_=-]{0,40}".prop_map(|s| format!("echo {s}"))
}

/// Strategy for one of the default denied words
fn denied_word() -> impl Strategy<Value = &'static str> {
    prop::sample::select(DEFAULT_DENIED_COMMANDS)
}

/// Randomly upper-cases ASCII letters
fn scramble_case(text: &str, mask: u64) -> String {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            if (mask >> (i % 64)) & 1 == 1 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A denied word anywhere in the command, in any case, rejects it
    #[test]
    fn denied_word_anywhere_is_rejected(
        prefix in "[a-z ]{0,12}",
        suffix in "[a-z ]{0,12}",
        word in denied_word(),
        mask in any::<u64>(),
    ) {
        let command = scramble_case(&format!("{prefix}{word}{suffix}"), mask);
        prop_assert!(!approve(&command), "'{}' should be rejected", command);
    }

    /// Commands built from harmless characters always pass
    #[test]
    fn harmless_commands_are_approved(command in harmless_command()) {
        prop_assert!(approve(&command));
    }

    /// `check` and `approve` agree, and the error names a word in the command
    #[test]
    fn check_agrees_with_approve(command in "[a-zA-Z0-9 -]{0,30}") {
        let filter = CommandFilter::new();
        match filter.check(&command) {
            Ok(()) => prop_assert!(filter.approve(&command)),
            Err(DispatchError::CommandRejected { word }) => {
                prop_assert!(!filter.approve(&command));
                prop_assert!(command.to_lowercase().contains(&word));
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    /// Extra words never remove the defaults
    #[test]
    fn extra_words_keep_defaults(extra in prop::collection::vec("[a-z]{3,8}", 0..5)) {
        let filter = CommandFilter::new().with_denied(&extra);
        for word in DEFAULT_DENIED_COMMANDS {
            prop_assert!(filter.denied_words().iter().any(|w| w.as_str() == *word));
        }
        for word in &extra {
            let command = format!("run {word}");
            prop_assert!(!filter.approve(&command));
        }
    }
}
