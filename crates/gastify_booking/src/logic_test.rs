#[cfg(test)]
mod tests {
    use crate::logic::{
        admit_booking, offerable_start_hours, BookingError, BookingOutcome, BookingRequest,
    };
    use crate::policy::BookingPolicy;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;
    use gastify_common::services::{
        BookingRecord, BoxFuture, BoxedError, CalendarService, CreatedBooking, ExistingBooking,
        IDEMPOTENCY_TAG_KEY,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const CALENDAR_ID: &str = "primary";

    /// In-memory calendar store used to exercise the orchestrator.
    struct InMemoryCalendar {
        bookings: Mutex<Vec<ExistingBooking>>,
        next_id: AtomicUsize,
    }

    impl InMemoryCalendar {
        fn new() -> Self {
            Self::with_bookings(Vec::new())
        }

        fn with_bookings(bookings: Vec<ExistingBooking>) -> Self {
            Self {
                bookings: Mutex::new(bookings),
                next_id: AtomicUsize::new(1),
            }
        }

        fn stored(&self) -> Vec<ExistingBooking> {
            self.bookings.lock().unwrap().clone()
        }
    }

    impl CalendarService for InMemoryCalendar {
        type Error = BoxedError;

        fn list_bookings(
            &self,
            _calendar_id: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            idempotency_tag: Option<&str>,
        ) -> BoxFuture<'_, Vec<ExistingBooking>, Self::Error> {
            let tag = idempotency_tag.map(|s| s.to_string());

            Box::pin(async move {
                let mut matches: Vec<ExistingBooking> = self
                    .bookings
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|b| b.start < end && b.end > start)
                    .filter(|b| {
                        tag.as_deref()
                            .map_or(true, |t| b.idempotency_tag.as_deref() == Some(t))
                    })
                    .cloned()
                    .collect();
                matches.sort_by_key(|b| b.start);
                Ok(matches)
            })
        }

        fn create_booking(
            &self,
            _calendar_id: &str,
            record: BookingRecord,
        ) -> BoxFuture<'_, CreatedBooking, Self::Error> {
            Box::pin(async move {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let event_id = format!("evt-{}", id);
                self.bookings.lock().unwrap().push(ExistingBooking {
                    event_id: event_id.clone(),
                    summary: record.summary.clone(),
                    start: record.start,
                    end: record.end,
                    cancelled: false,
                    idempotency_tag: record.tags.get(IDEMPOTENCY_TAG_KEY).cloned(),
                });
                Ok(CreatedBooking {
                    event_id,
                    status: "confirmed".to_string(),
                })
            })
        }

        fn mark_booking_cancelled(
            &self,
            _calendar_id: &str,
            event_id: &str,
            _notify_attendees: bool,
        ) -> BoxFuture<'_, CreatedBooking, Self::Error> {
            let event_id = event_id.to_string();

            Box::pin(async move {
                let mut bookings = self.bookings.lock().unwrap();
                for b in bookings.iter_mut() {
                    if b.event_id == event_id {
                        b.cancelled = true;
                        return Ok(CreatedBooking {
                            event_id,
                            status: "cancelled".to_string(),
                        });
                    }
                }
                Err(BoxedError(
                    format!("404: no booking {}", event_id).into(),
                ))
            })
        }
    }

    /// Calendar whose reads and writes always fail.
    struct UnreachableCalendar;

    impl CalendarService for UnreachableCalendar {
        type Error = BoxedError;

        fn list_bookings(
            &self,
            _calendar_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _idempotency_tag: Option<&str>,
        ) -> BoxFuture<'_, Vec<ExistingBooking>, Self::Error> {
            Box::pin(async move { Err(BoxedError("connection reset".to_string().into())) })
        }

        fn create_booking(
            &self,
            _calendar_id: &str,
            _record: BookingRecord,
        ) -> BoxFuture<'_, CreatedBooking, Self::Error> {
            Box::pin(async move { Err(BoxedError("connection reset".to_string().into())) })
        }

        fn mark_booking_cancelled(
            &self,
            _calendar_id: &str,
            _event_id: &str,
            _notify_attendees: bool,
        ) -> BoxFuture<'_, CreatedBooking, Self::Error> {
            Box::pin(async move { Err(BoxedError("connection reset".to_string().into())) })
        }
    }

    fn zurich(day: u32, h: u32, min: u32) -> DateTime<Utc> {
        Tz::Europe__Zurich
            .with_ymd_and_hms(2026, 9, day, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn request(start: DateTime<Utc>, token: Option<&str>) -> BookingRequest {
        BookingRequest {
            customer_name: "Muster AG".to_string(),
            package_code: "medium".to_string(),
            offering: "bbq".to_string(),
            start_time: start,
            venue: Some("Seestrasse 12, Zurich".to_string()),
            contact_emails: vec!["events@muster.example".to_string()],
            total_amount: Some(150000),
            deposit_amount: Some(30000),
            idempotency_key: token.map(|s| s.to_string()),
        }
    }

    fn seeded(start: DateTime<Utc>, end: DateTime<Utc>, cancelled: bool) -> ExistingBooking {
        ExistingBooking {
            event_id: format!("seed-{}", start.timestamp()),
            summary: "Catering".to_string(),
            start,
            end,
            cancelled,
            idempotency_tag: None,
        }
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected_before_any_read() {
        let calendar = InMemoryCalendar::new();
        let policy = BookingPolicy::default();
        let mut req = request(zurich(5, 14, 0), None);
        req.customer_name = "  ".to_string();

        let result = admit_booking(&calendar, CALENDAR_ID, &policy, &req).await;
        match result {
            Err(BookingError::MissingFields(detail)) => {
                assert!(detail.contains("customer_name"))
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
        assert!(calendar.stored().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_exceeding_total_is_rejected() {
        let calendar = InMemoryCalendar::new();
        let policy = BookingPolicy::default();
        let mut req = request(zurich(5, 14, 0), None);
        req.total_amount = Some(10000);
        req.deposit_amount = Some(20000);

        assert!(matches!(
            admit_booking(&calendar, CALENDAR_ID, &policy, &req).await,
            Err(BookingError::MissingFields(_))
        ));
    }

    #[tokio::test]
    async fn test_start_outside_business_hours_is_rejected() {
        let calendar = InMemoryCalendar::new();
        let policy = BookingPolicy::default();
        let req = request(zurich(5, 8, 0), None);

        assert!(matches!(
            admit_booking(&calendar, CALENDAR_ID, &policy, &req).await,
            Err(BookingError::OutsideBusinessHours { hour: 8 })
        ));
        assert!(calendar.stored().is_empty());
    }

    #[tokio::test]
    async fn test_admitted_booking_occupies_the_operational_window() {
        let calendar = InMemoryCalendar::new();
        let policy = BookingPolicy::default();
        let req = request(zurich(5, 14, 0), Some("cs_test_1"));

        let outcome = admit_booking(&calendar, CALENDAR_ID, &policy, &req)
            .await
            .unwrap();
        assert!(matches!(outcome, BookingOutcome::Booked { .. }));

        let stored = calendar.stored();
        assert_eq!(stored.len(), 1);
        // Medium package: 1 h prep + 2.5 h service + 1 h cleanup.
        assert_eq!(stored[0].start, zurich(5, 13, 0));
        assert_eq!(stored[0].end, zurich(5, 17, 30));
        assert_eq!(stored[0].idempotency_tag.as_deref(), Some("cs_test_1"));
    }

    #[tokio::test]
    async fn test_duplicate_token_is_a_no_op_success() {
        let calendar = InMemoryCalendar::new();
        let policy = BookingPolicy::default();
        let req = request(zurich(5, 14, 0), Some("cs_test_1"));

        let first = admit_booking(&calendar, CALENDAR_ID, &policy, &req)
            .await
            .unwrap();
        let second = admit_booking(&calendar, CALENDAR_ID, &policy, &req)
            .await
            .unwrap();

        let BookingOutcome::Booked { event_id } = first else {
            panic!("first admission should commit");
        };
        assert_eq!(
            second,
            BookingOutcome::AlreadyBooked {
                event_id: event_id.clone()
            }
        );
        assert_eq!(calendar.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_absent_token_disables_the_guard() {
        let calendar = InMemoryCalendar::new();
        let policy = BookingPolicy::default();
        let req = request(zurich(5, 14, 0), None);

        // Without a token every delivery is treated as novel; the second
        // commit is admitted because one overlap is still below the cap.
        let first = admit_booking(&calendar, CALENDAR_ID, &policy, &req)
            .await
            .unwrap();
        let second = admit_booking(&calendar, CALENDAR_ID, &policy, &req)
            .await
            .unwrap();
        assert!(matches!(first, BookingOutcome::Booked { .. }));
        assert!(matches!(second, BookingOutcome::Booked { .. }));
        assert_eq!(calendar.stored().len(), 2);
    }

    #[tokio::test]
    async fn test_full_day_rejects_regardless_of_time() {
        let policy = BookingPolicy::default();
        let calendar = InMemoryCalendar::with_bookings(vec![
            seeded(zurich(5, 8, 0), zurich(5, 10, 0), false),
            seeded(zurich(5, 11, 0), zurich(5, 13, 0), false),
            seeded(zurich(5, 18, 0), zurich(5, 20, 0), false),
        ]);
        let req = request(zurich(5, 15, 0), None);

        assert!(matches!(
            admit_booking(&calendar, CALENDAR_ID, &policy, &req).await,
            Err(BookingError::DayCapacityExceeded { active: 3 })
        ));
    }

    #[tokio::test]
    async fn test_day_cap_reported_even_when_overlap_cap_also_violated() {
        let policy = BookingPolicy::default();
        // Three active bookings, all overlapping the candidate window.
        let calendar = InMemoryCalendar::with_bookings(vec![
            seeded(zurich(5, 13, 0), zurich(5, 16, 0), false),
            seeded(zurich(5, 14, 0), zurich(5, 17, 0), false),
            seeded(zurich(5, 15, 0), zurich(5, 18, 0), false),
        ]);
        let req = request(zurich(5, 14, 0), None);

        assert!(matches!(
            admit_booking(&calendar, CALENDAR_ID, &policy, &req).await,
            Err(BookingError::DayCapacityExceeded { active: 3 })
        ));
    }

    #[tokio::test]
    async fn test_overlap_cap_rejects_but_free_slot_on_same_day_is_admitted() {
        let policy = BookingPolicy::default();
        let calendar = InMemoryCalendar::with_bookings(vec![
            seeded(zurich(5, 13, 30), zurich(5, 16, 0), false),
            seeded(zurich(5, 14, 30), zurich(5, 17, 0), false),
        ]);

        // 14:00 window [13:00, 17:30) overlaps both seeds: rejected.
        let overlapping = request(zurich(5, 14, 0), None);
        assert!(matches!(
            admit_booking(&calendar, CALENDAR_ID, &policy, &overlapping).await,
            Err(BookingError::OverlapCapacityExceeded { overlapping: 2 })
        ));

        // 9:00 window [8:00, 12:30) is clear and the day is not capped.
        let free = request(zurich(5, 9, 0), None);
        assert!(matches!(
            admit_booking(&calendar, CALENDAR_ID, &policy, &free).await,
            Ok(BookingOutcome::Booked { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_bookings_do_not_consume_capacity() {
        let policy = BookingPolicy::default();
        let calendar = InMemoryCalendar::with_bookings(vec![
            seeded(zurich(5, 13, 0), zurich(5, 16, 0), true),
            seeded(zurich(5, 14, 0), zurich(5, 17, 0), true),
            seeded(zurich(5, 15, 0), zurich(5, 18, 0), true),
        ]);
        let req = request(zurich(5, 14, 0), None);

        assert!(matches!(
            admit_booking(&calendar, CALENDAR_ID, &policy, &req).await,
            Ok(BookingOutcome::Booked { .. })
        ));
    }

    #[tokio::test]
    async fn test_window_crossing_midnight_sees_next_day_bookings() {
        let policy = BookingPolicy {
            max_per_slot: 1,
            ..BookingPolicy::default()
        };
        // Early booking on the next day, overlapping the cleanup tail of a
        // late request: 21:30 medium window runs [20:30, 01:00).
        let calendar = InMemoryCalendar::with_bookings(vec![seeded(
            zurich(6, 0, 30),
            zurich(6, 2, 0),
            false,
        )]);
        let req = request(zurich(5, 21, 30), None);

        assert!(matches!(
            admit_booking(&calendar, CALENDAR_ID, &policy, &req).await,
            Err(BookingError::OverlapCapacityExceeded { overlapping: 1 })
        ));
    }

    #[tokio::test]
    async fn test_calendar_read_failure_surfaces_as_read_error() {
        let policy = BookingPolicy::default();
        let req = request(zurich(5, 14, 0), None);

        let result = admit_booking(&UnreachableCalendar, CALENDAR_ID, &policy, &req).await;
        match result {
            Err(err @ BookingError::CalendarReadFailed(_)) => {
                assert!(!err.is_business_rejection())
            }
            other => panic!("expected CalendarReadFailed, got {:?}", other),
        }
    }

    // --- Availability ---

    #[test]
    fn test_empty_day_offers_every_business_hour() {
        let policy = BookingPolicy::default();
        let date = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();
        let now = zurich(1, 12, 0);

        let hours = offerable_start_hours(&policy, date, "medium", &[], now);
        assert_eq!(hours, (9..22).collect::<Vec<u32>>());
    }

    #[test]
    fn test_past_hours_are_not_offerable() {
        let policy = BookingPolicy::default();
        let date = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();
        // Mid-afternoon on the queried day: 14:00 has already started.
        let now = zurich(5, 14, 30);

        let hours = offerable_start_hours(&policy, date, "medium", &[], now);
        assert_eq!(hours, (15..22).collect::<Vec<u32>>());
    }

    #[test]
    fn test_saturated_hours_are_excluded() {
        let policy = BookingPolicy::default();
        let date = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();
        let now = zurich(1, 12, 0);
        let bookings = vec![
            seeded(zurich(5, 12, 0), zurich(5, 16, 0), false),
            seeded(zurich(5, 13, 0), zurich(5, 15, 0), false),
        ];

        // Hours 10 through 15 produce windows overlapping both seeds and
        // meet the slot cap; the rest overlap at most one.
        let hours = offerable_start_hours(&policy, date, "medium", &bookings, now);
        assert_eq!(hours, vec![9, 16, 17, 18, 19, 20, 21]);
    }

    #[test]
    fn test_capped_day_offers_nothing() {
        let policy = BookingPolicy::default();
        let date = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();
        let now = zurich(1, 12, 0);
        let bookings = vec![
            seeded(zurich(5, 9, 0), zurich(5, 10, 0), false),
            seeded(zurich(5, 11, 0), zurich(5, 12, 0), false),
            seeded(zurich(5, 13, 0), zurich(5, 14, 0), false),
        ];

        let hours = offerable_start_hours(&policy, date, "medium", &bookings, now);
        assert!(hours.is_empty());
    }
}
