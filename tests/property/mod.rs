//! Property-based invariants, generated with proptest.

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Asia::Seoul;
use edgekit_scheduler::{next_monthly_fire, next_periodic_fire, Period, TaskDescriptor};
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    // Period strings either parse to a positive duration or error; no panics.
    #[test]
    fn period_parse_never_panics(input in "\\PC{0,8}") {
        match Period::parse(&input) {
            Ok(Period::Every(duration)) => prop_assert!(duration >= Duration::from_secs(60)),
            Ok(Period::Monthly) => prop_assert_eq!(input.as_str(), "M"),
            Err(_) => {}
        }
    }

    // Well-formed period strings always parse.
    #[test]
    fn well_formed_periods_parse(count in 1u64..10_000, unit in prop::sample::select(vec!["w", "d", "h", "m"])) {
        let input = format!("{count}{unit}");
        prop_assert!(Period::parse(&input).is_ok());
    }

    // The computed first fire is always strictly in the future, on the
    // scheduled minute.
    #[test]
    fn periodic_first_fire_is_future_and_on_the_minute(
        hour in 0u32..24,
        minute in 0u32..60,
        now_hour in 0u32..24,
        now_minute in 0u32..60,
        period_hours in 1u64..48,
    ) {
        let descriptor = TaskDescriptor::builder("p")
            .time(&format!("{hour:02}:{minute:02}")).unwrap()
            .cadence(Period::Every(Duration::from_secs(period_hours * 3600)))
            .build().unwrap();

        let now = Seoul.with_ymd_and_hms(2026, 8, 1, now_hour, now_minute, 0).unwrap();
        let fire = next_periodic_fire(&descriptor, now).unwrap();

        prop_assert!(fire > now);
        prop_assert_eq!(fire.timestamp_subsec_millis(), 0);
        if period_hours % 24 == 0 || period_hours >= 24 {
            // Day-grained cadences always land on the scheduled time of day.
            use chrono::Timelike;
            prop_assert_eq!(fire.minute(), minute);
        }
    }

    // Monthly fires always land on the clamped anchor day.
    #[test]
    fn monthly_fire_lands_on_the_clamped_anchor(
        anchor_day in 1u32..=31,
        month in 1u32..=12,
    ) {
        let start = NaiveDate::from_ymd_opt(2026, 1, anchor_day.min(31)).unwrap();
        let descriptor = TaskDescriptor::builder("m")
            .time("03:00").unwrap()
            .cadence(Period::Monthly)
            .start_day(&start.format("%Y%m%d").to_string()).unwrap()
            .build().unwrap();

        let now = Seoul.with_ymd_and_hms(2026, month, 1, 0, 0, 0).unwrap();
        let fire = next_monthly_fire(&descriptor, now).unwrap();

        use chrono::Datelike;
        prop_assert!(fire > now);
        prop_assert!(fire.day() <= anchor_day);
        // Clamping only happens in months shorter than the anchor.
        if fire.day() < anchor_day {
            let last = NaiveDate::from_ymd_opt(
                fire.year(),
                fire.month(),
                1,
            ).unwrap()
            .checked_add_months(chrono::Months::new(1)).unwrap()
            .pred_opt().unwrap()
            .day();
            prop_assert_eq!(fire.day(), last);
        }
    }

    // A URI admitted with 200 never contains traversal or double-slash
    // sequences (round-trip property of the admission filter).
    #[test]
    fn admitted_uris_are_sound(path in "/[a-z0-9./_-]{0,40}") {
        use bytes::Bytes;
        use edgekit_admission::AdmissionConfig;
        use http::{Request, Response, StatusCode};
        use tower::{ServiceBuilder, ServiceExt};

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let status = runtime.block_on(async {
            let service = ServiceBuilder::new()
                .layer(AdmissionConfig::builder().build())
                .service_fn(|_req: Request<Bytes>| async {
                    Ok::<_, std::convert::Infallible>(Response::new(Bytes::new()))
                });
            let request = Request::builder().uri(path.as_str()).body(Bytes::new());
            match request {
                Ok(request) => service.oneshot(request).await.unwrap().status(),
                // Unparseable URIs never reach the filter.
                Err(_) => StatusCode::BAD_REQUEST,
            }
        });

        if status == StatusCode::OK {
            prop_assert!(!path.contains(".."));
            prop_assert!(!path.contains("//"));
            prop_assert!(!path.to_ascii_lowercase().ends_with(".php"));
        }
    }
}
