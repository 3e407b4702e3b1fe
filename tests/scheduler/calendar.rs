//! Deterministic fire-time computation.

use chrono::{Datelike, TimeZone, Weekday};
use chrono_tz::Asia::Seoul;
use chrono_tz::Tz;
use edgekit_scheduler::{next_monthly_fire, next_periodic_fire, TaskDescriptor};

fn seoul(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> chrono::DateTime<Tz> {
    Seoul
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

fn hourly_mon_wed_fri() -> TaskDescriptor {
    TaskDescriptor::builder("hourly")
        .time("00:05")
        .unwrap()
        .period("1h")
        .unwrap()
        .days_of_week("MON,WED,FRI")
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn hourly_task_registered_wednesday_afternoon() {
    // Registered Wednesday 14:20: the first fire lands on the next grid
    // point, Wednesday 15:05, and the one after on 16:05.
    let registered = seoul(2026, 7, 29, 14, 20);
    assert_eq!(registered.weekday(), Weekday::Wed);

    let descriptor = hourly_mon_wed_fri();
    let first = next_periodic_fire(&descriptor, registered).unwrap();
    assert_eq!(first, seoul(2026, 7, 29, 15, 5));

    let second = next_periodic_fire(&descriptor, first).unwrap();
    assert_eq!(second, seoul(2026, 7, 29, 16, 5));
}

#[test]
fn thursday_grid_points_are_skipped_friday_fires() {
    let descriptor = hourly_mon_wed_fri();

    // Thursday is off-calendar: the grid still ticks, the wrapper skips.
    let thursday = seoul(2026, 7, 30, 0, 5);
    assert_eq!(thursday.weekday(), Weekday::Thu);
    assert!(!descriptor.day_allowed(thursday.weekday()));

    // Friday 00:05 is both a grid point and an allowed day.
    let friday = seoul(2026, 7, 31, 0, 5);
    assert_eq!(friday.weekday(), Weekday::Fri);
    assert!(descriptor.day_allowed(friday.weekday()));
}

#[test]
fn time_equal_to_now_advances_a_day() {
    let descriptor = TaskDescriptor::builder("daily")
        .time("09:00")
        .unwrap()
        .period("1d")
        .unwrap()
        .build()
        .unwrap();

    let now = seoul(2026, 8, 3, 9, 0);
    let fire = next_periodic_fire(&descriptor, now).unwrap();
    assert_eq!(fire, seoul(2026, 8, 4, 9, 0));
}

#[test]
fn weekly_period_lands_on_an_allowed_day() {
    let descriptor = TaskDescriptor::builder("weekly")
        .time("06:30")
        .unwrap()
        .period("1w")
        .unwrap()
        .days_of_week("SAT")
        .unwrap()
        .build()
        .unwrap();

    // Saturday 2026-08-01, after 06:30: next Saturday.
    let now = seoul(2026, 8, 1, 12, 0);
    assert_eq!(now.weekday(), Weekday::Sat);
    let fire = next_periodic_fire(&descriptor, now).unwrap();
    assert_eq!(fire, seoul(2026, 8, 8, 6, 30));
}

#[test]
fn monthly_day_31_maps_to_day_30_in_a_30_day_month() {
    let descriptor = TaskDescriptor::builder("report")
        .time("07:00")
        .unwrap()
        .period("M")
        .unwrap()
        .start_day("20260131")
        .unwrap()
        .build()
        .unwrap();

    let fire = next_monthly_fire(&descriptor, seoul(2026, 6, 5, 0, 0)).unwrap();
    assert_eq!(fire, seoul(2026, 6, 30, 7, 0));

    // A spent anchor advances to the next month's clamped day.
    let fire = next_monthly_fire(&descriptor, seoul(2026, 6, 30, 7, 0)).unwrap();
    assert_eq!(fire, seoul(2026, 7, 31, 7, 0));
}

#[test]
fn monthly_february_clamp() {
    let descriptor = TaskDescriptor::builder("report")
        .time("07:00")
        .unwrap()
        .period("M")
        .unwrap()
        .start_day("20251231")
        .unwrap()
        .build()
        .unwrap();

    // 2026 is not a leap year.
    let fire = next_monthly_fire(&descriptor, seoul(2026, 2, 10, 0, 0)).unwrap();
    assert_eq!(fire, seoul(2026, 2, 28, 7, 0));

    // 2028 is.
    let fire = next_monthly_fire(&descriptor, seoul(2028, 2, 10, 0, 0)).unwrap();
    assert_eq!(fire, seoul(2028, 2, 29, 7, 0));
}

#[test]
fn future_start_date_wins_over_the_calendar() {
    let descriptor = TaskDescriptor::builder("later")
        .time("10:00")
        .unwrap()
        .period("M")
        .unwrap()
        .start_day("20270401")
        .unwrap()
        .build()
        .unwrap();

    let fire = next_monthly_fire(&descriptor, seoul(2026, 8, 1, 0, 0)).unwrap();
    assert_eq!(fire, seoul(2027, 4, 1, 10, 0));
}
