//! Property-based tests for output extraction and result composition

use proptest::prelude::*;
use secrecy::SecretString;
use sshlooper_core::{
    ACCEPT_ALL_PATTERN, CommandOutput, ExtractError, Extractor, Host, HostResult,
    PARSE_ERROR_SENTINEL, compose_result, extract,
};

/// Strategy for single output lines without line breaks
fn line() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .:%/_-]{1,30}"
}

fn empty_result() -> HostResult {
    let host = Host::new(
        "node",
        "10.0.0.1",
        22,
        "ops",
        SecretString::from("pw".to_string()),
    );
    HostResult::for_host(&host)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Accept-all returns every line in document order
    #[test]
    fn accept_all_returns_all_lines(lines in prop::collection::vec(line(), 1..10)) {
        let stdout = lines.join("\n") + "\n";
        prop_assert_eq!(extract(&stdout, ACCEPT_ALL_PATTERN).unwrap(), lines.join("\n"));
        prop_assert_eq!(extract(&stdout, "").unwrap(), lines.join("\n"));
    }

    /// A capture group yields exactly the captured text
    #[test]
    fn capture_group_yields_value(value in "[a-z0-9 ]{1,20}", noise in "[A-Z]{0,10}") {
        let stdout = format!("{noise}\nValue: {value}\n{noise}");
        prop_assert_eq!(extract(&stdout, "Value: (.+)").unwrap(), value);
    }

    /// Arbitrary patterns never panic; failures are typed errors
    #[test]
    fn arbitrary_patterns_never_panic(pattern in ".{0,12}", stdout in ".{0,40}") {
        match Extractor::new(&pattern).extract(&stdout) {
            Ok(_)
            | Err(ExtractError::PatternInvalid { .. } | ExtractError::NoMatch | ExtractError::NoMatches) => {}
        }
    }

    /// Output and error fields follow the composition rules
    #[test]
    fn composition_rules_hold(
        stdout in prop_oneof![Just(String::new()), line()],
        stderr in prop_oneof![Just(String::new()), line()],
        exit in prop_oneof![Just(0i32), 1i32..255],
    ) {
        let mut result = empty_result();
        compose_result(
            &mut result,
            CommandOutput::new(stdout.clone(), stderr.clone(), exit),
            &Extractor::new("(.+)"),
        );

        prop_assert_eq!(result.exit_status, Some(exit));

        let failed = exit != 0 || !stderr.trim().is_empty();
        if failed {
            let prefix = format!("Exit Code {exit}:");
            prop_assert!(result.error.starts_with(&prefix));
        }

        if stdout.trim().is_empty() {
            prop_assert_eq!(result.output.as_str(), PARSE_ERROR_SENTINEL);
        } else {
            prop_assert_eq!(result.output.as_str(), stdout.as_str());
        }
        if !failed && !stdout.trim().is_empty() {
            prop_assert!(result.error.is_empty());
        }
    }
}
