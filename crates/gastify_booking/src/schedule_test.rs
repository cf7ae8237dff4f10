#[cfg(test)]
mod tests {
    use crate::policy::BookingPolicy;
    use crate::schedule::{
        calendar_day_bounds, day_bounds_for_date, operational_window, service_duration,
        validate_business_hours, ScheduleError,
    };
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;

    // Instant for a Zurich wall-clock time.
    fn zurich(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Tz::Europe__Zurich
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_service_duration_lookup_table() {
        let policy = BookingPolicy::default();
        assert_eq!(service_duration(&policy, "small"), Duration::minutes(120));
        assert_eq!(service_duration(&policy, "medium"), Duration::minutes(150));
        assert_eq!(service_duration(&policy, "large"), Duration::minutes(180));
        // Codes are matched case-insensitively and trimmed.
        assert_eq!(service_duration(&policy, " MEDIUM "), Duration::minutes(150));
    }

    #[test]
    fn test_unknown_package_defaults_instead_of_failing() {
        let policy = BookingPolicy::default();
        assert_eq!(service_duration(&policy, "deluxe"), Duration::minutes(120));
        assert_eq!(service_duration(&policy, ""), Duration::minutes(120));
    }

    #[test]
    fn test_business_hours_boundaries() {
        let policy = BookingPolicy::default();

        // 08:59 local is still hour 8: rejected.
        assert_eq!(
            validate_business_hours(&policy, zurich(2026, 9, 5, 8, 59)),
            Err(ScheduleError::OutsideBusinessHours { hour: 8 })
        );
        // 09:00 opens the day.
        assert!(validate_business_hours(&policy, zurich(2026, 9, 5, 9, 0)).is_ok());
        // 21:59 is the last acceptable minute.
        assert!(validate_business_hours(&policy, zurich(2026, 9, 5, 21, 59)).is_ok());
        // The interval is half-open: 22:00 itself is rejected.
        assert_eq!(
            validate_business_hours(&policy, zurich(2026, 9, 5, 22, 0)),
            Err(ScheduleError::OutsideBusinessHours { hour: 22 })
        );
    }

    #[test]
    fn test_business_hours_use_civil_local_time() {
        let policy = BookingPolicy::default();
        // 07:30 UTC on a summer day is 09:30 in Zurich (CEST, UTC+2):
        // acceptable even though the UTC hour is before opening.
        let start = Utc.with_ymd_and_hms(2026, 7, 10, 7, 30, 0).unwrap();
        assert!(validate_business_hours(&policy, start).is_ok());
        // The same UTC time in winter is 08:30 local (CET, UTC+1): rejected.
        let start = Utc.with_ymd_and_hms(2026, 1, 10, 7, 30, 0).unwrap();
        assert_eq!(
            validate_business_hours(&policy, start),
            Err(ScheduleError::OutsideBusinessHours { hour: 8 })
        );
    }

    #[test]
    fn test_operational_window_brackets_the_requested_start() {
        let policy = BookingPolicy::default();
        // 14:00 local, medium package (2.5 h service), 1 h prep and cleanup:
        // on-site from 13:00 to 17:30.
        let start = zurich(2026, 9, 5, 14, 0);
        let window = operational_window(&policy, start, "medium");

        assert_eq!(window.start, zurich(2026, 9, 5, 13, 0));
        assert_eq!(window.end, zurich(2026, 9, 5, 17, 30));
        assert!(window.start < start && start < window.end);
        assert_eq!(
            window.end - window.start,
            policy.prep + Duration::minutes(150) + policy.cleanup
        );
    }

    #[test]
    fn test_day_bounds_are_local_midnights() {
        let policy = BookingPolicy::default();
        let bounds = calendar_day_bounds(&policy, zurich(2026, 9, 5, 14, 0));

        assert_eq!(bounds.start, zurich(2026, 9, 5, 0, 0));
        assert_eq!(bounds.end, zurich(2026, 9, 6, 0, 0));
        assert_eq!(bounds.end - bounds.start, Duration::hours(24));
    }

    #[test]
    fn test_day_bounds_on_dst_transition_days() {
        let policy = BookingPolicy::default();

        // Spring-forward: 2026-03-29 in Zurich has 23 hours.
        let spring = day_bounds_for_date(&policy, NaiveDate::from_ymd_opt(2026, 3, 29).unwrap());
        assert_eq!(spring.end - spring.start, Duration::hours(23));

        // Fall-back: 2026-10-25 has 25 hours.
        let autumn = day_bounds_for_date(&policy, NaiveDate::from_ymd_opt(2026, 10, 25).unwrap());
        assert_eq!(autumn.end - autumn.start, Duration::hours(25));
    }

    #[test]
    fn test_day_bounds_contain_the_instant() {
        let policy = BookingPolicy::default();
        for (h, min) in [(0, 0), (9, 30), (23, 59)] {
            let instant = zurich(2026, 9, 5, h, min);
            let bounds = calendar_day_bounds(&policy, instant);
            assert!(bounds.start <= instant && instant < bounds.end);
        }
    }
}
