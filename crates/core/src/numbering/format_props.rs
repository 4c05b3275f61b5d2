//! Property-based tests for identifier formats.

use chrono::NaiveDate;
use proptest::prelude::*;

use super::service::{format_sequence, format_voucher_number};

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2099, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Padding never truncates and round-trips through parsing.
    #[test]
    fn prop_sequence_round_trips(value in 1u64..10_000_000, width in 1usize..8) {
        let formatted = format_sequence(value, width);
        prop_assert!(formatted.len() >= width);
        prop_assert_eq!(formatted.parse::<u64>().unwrap(), value);
    }

    /// Within one day, larger counters sort after smaller ones.
    #[test]
    fn prop_numbers_increase_with_counter(
        date in arb_date(),
        a in 1u64..9_999,
        b in 1u64..9_999,
    ) {
        prop_assume!(a < b);
        let first = format_voucher_number("JV", date, None, a, 4);
        let second = format_voucher_number("JV", date, None, b, 4);
        prop_assert!(first < second);
        let expected_prefix = format!("JV-{}-", date.format("%y%m%d"));
        prop_assert!(first.starts_with(&expected_prefix));
    }

    /// Scoped numbers keep the scope between date and sequence.
    #[test]
    fn prop_scope_embedded(date in arb_date(), scope in "[A-Z0-9]{2,8}", n in 1u64..100) {
        let number = format_voucher_number("BRV", date, Some(&scope), n, 4);
        let parts: Vec<&str> = number.split('-').collect();
        prop_assert_eq!(parts.len(), 4);
        prop_assert_eq!(parts[2], scope.as_str());
    }
}
