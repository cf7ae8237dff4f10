#[cfg(test)]
mod tests {
    use crate::capacity::count_overlapping;
    use crate::policy::BookingPolicy;
    use crate::schedule::{operational_window, service_duration, OperationalWindow};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use gastify_common::services::ExistingBooking;
    use proptest::prelude::*;

    fn booking(start: DateTime<Utc>, end: DateTime<Utc>) -> ExistingBooking {
        ExistingBooking {
            event_id: "evt".to_string(),
            summary: "Catering".to_string(),
            start,
            end,
            cancelled: false,
            idempotency_tag: None,
        }
    }

    proptest! {
        // The operational window always brackets the requested start and
        // its width is exactly prep + service + cleanup.
        #[test]
        fn test_window_brackets_the_requested_start(
            secs in 1_600_000_000i64..1_900_000_000i64,
            code in prop::sample::select(vec!["small", "medium", "large", "deluxe", ""]),
        ) {
            let policy = BookingPolicy::default();
            let start = Utc.timestamp_opt(secs, 0).unwrap();
            let window = operational_window(&policy, start, code);

            prop_assert!(window.start < start);
            prop_assert!(start < window.end);
            prop_assert_eq!(
                window.end - window.start,
                policy.prep + service_duration(&policy, code) + policy.cleanup
            );
        }

        // The overlap test is symmetric and touching endpoints never count.
        #[test]
        fn test_overlap_symmetric_and_touching_excluded(
            a_start in 0i64..10_000,
            a_len in 1i64..5_000,
            b_start in 0i64..10_000,
            b_len in 1i64..5_000,
        ) {
            let base = Utc.with_ymd_and_hms(2026, 9, 5, 0, 0, 0).unwrap();
            let a = OperationalWindow {
                start: base + Duration::seconds(a_start),
                end: base + Duration::seconds(a_start + a_len),
            };
            let b = OperationalWindow {
                start: base + Duration::seconds(b_start),
                end: base + Duration::seconds(b_start + b_len),
            };

            let b_against_a = count_overlapping(&[booking(b.start, b.end)], &a);
            let a_against_b = count_overlapping(&[booking(a.start, a.end)], &b);
            prop_assert_eq!(b_against_a, a_against_b);

            if b.end == a.start || a.end == b.start {
                prop_assert_eq!(b_against_a, 0);
            }
        }
    }
}
