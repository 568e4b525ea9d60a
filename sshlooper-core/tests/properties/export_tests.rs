//! Property-based tests for result merging and CSV escaping

use proptest::prelude::*;
use secrecy::SecretString;
use sshlooper_core::export::escape_csv_field;
use sshlooper_core::{Host, HostEntry, HostResult, HostStatus, merge_results};

/// Strategy for a host list with distinct addresses
fn host_list() -> impl Strategy<Value = Vec<HostEntry>> {
    prop::collection::btree_set(1u8..=254, 1..20).prop_map(|octets| {
        octets
            .into_iter()
            .map(|o| HostEntry::new(format!("h{o}"), format!("10.0.0.{o}"), 22))
            .collect()
    })
}

fn result_for(entry: &HostEntry, failed: bool) -> HostResult {
    let host = Host::new(
        entry.hostname.clone(),
        entry.address.clone(),
        entry.port,
        "ops",
        SecretString::from("pw".to_string()),
    );
    if failed {
        HostResult::failed(&host, "boom")
    } else {
        HostResult::for_host(&host)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every host appears once, in host list order, whatever arrived
    #[test]
    fn merge_keeps_one_record_per_host(
        hosts in host_list(),
        picks in prop::collection::vec((any::<bool>(), any::<bool>()), 20),
    ) {
        let results: Vec<HostResult> = hosts
            .iter()
            .zip(&picks)
            .filter(|(_, (arrived, _))| *arrived)
            .map(|(entry, (_, failed))| result_for(entry, *failed))
            .rev()
            .collect();

        let records = merge_results(&hosts, &results);
        prop_assert_eq!(records.len(), hosts.len());

        for ((record, entry), (arrived, failed)) in records.iter().zip(&hosts).zip(&picks) {
            prop_assert_eq!(&record.ip, &entry.address);
            let expected = match (arrived, failed) {
                (false, _) => HostStatus::Pending,
                (true, true) => HostStatus::Error,
                (true, false) => HostStatus::Complete,
            };
            prop_assert_eq!(record.status, expected);
        }
    }

    /// Escaped fields are quoted exactly when needed and unquote to the input
    #[test]
    fn csv_escaping_is_reversible(field in ".{0,30}") {
        let escaped = escape_csv_field(&field);
        let special = field.contains([',', '"', '\n', '\r']);

        if special {
            prop_assert!(escaped.starts_with('"') && escaped.ends_with('"'));
            let inner = &escaped[1..escaped.len() - 1];
            prop_assert_eq!(inner.replace("\"\"", "\""), field);
        } else {
            prop_assert_eq!(escaped, field);
        }
    }
}
