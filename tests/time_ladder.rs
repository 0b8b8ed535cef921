//! Integration tests for clock arithmetic and the time-ladder preview.

use chrono::NaiveTime;
use tournament_schedule_web::{
    add_minutes_to_time, format_clock, parse_clock, time_ladder, ScheduleError, TimePreview,
    TimeSettings,
};

fn at(raw: &str) -> NaiveTime {
    parse_clock(raw).unwrap()
}

fn settings(start: &str, duration: u32, interval: u32) -> TimeSettings {
    TimeSettings {
        start_time: at(start),
        duration,
        interval,
    }
}

fn starts_and_ends(preview: &TimePreview) -> Vec<(String, String)> {
    preview
        .rows()
        .iter()
        .map(|r| (format_clock(r.start), format_clock(r.end)))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(s, e)| (s.to_string(), e.to_string()))
        .collect()
}

#[test]
fn add_minutes_wraps_at_midnight() {
    assert_eq!(add_minutes_to_time("23:30", 90).unwrap(), "01:00");
    assert_eq!(add_minutes_to_time("08:00", 90).unwrap(), "09:30");
    assert_eq!(add_minutes_to_time("00:10", -20).unwrap(), "23:50");
    assert_eq!(add_minutes_to_time("12:00", 24 * 60).unwrap(), "12:00");
}

#[test]
fn parse_clock_accepts_seconds_and_rejects_garbage() {
    assert_eq!(parse_clock("09:45:00").unwrap(), at("09:45"));
    assert_eq!(
        add_minutes_to_time("9h45", 5),
        Err(ScheduleError::InvalidTime("9h45".to_string()))
    );
    assert!(parse_clock("24:00").is_err());
}

#[test]
fn ladder_places_matches_back_to_back() {
    let preview = TimePreview::new(settings("08:00", 90, 15), &[11, 12, 13]).unwrap();

    assert_eq!(
        starts_and_ends(&preview),
        pairs(&[("08:00", "09:30"), ("09:45", "11:15"), ("11:30", "13:00")])
    );
    assert_eq!(preview.match_ids(), vec![11, 12, 13]);
    assert!(preview.rows().iter().all(|r| !r.edited));
}

#[test]
fn ladder_wraps_past_midnight() {
    let slots = time_ladder(at("22:00"), 3, 60, 30);
    let formatted: Vec<_> = slots
        .iter()
        .map(|(s, e)| (format_clock(*s), format_clock(*e)))
        .collect();
    assert_eq!(
        formatted,
        pairs(&[("22:00", "23:00"), ("23:30", "00:30"), ("01:00", "02:00")])
    );
}

#[test]
fn zero_interval_is_allowed_zero_duration_is_not() {
    let preview = TimePreview::new(settings("10:00", 30, 0), &[1, 2]).unwrap();
    assert_eq!(
        starts_and_ends(&preview),
        pairs(&[("10:00", "10:30"), ("10:30", "11:00")])
    );

    assert!(matches!(
        TimePreview::new(settings("10:00", 0, 10), &[1]),
        Err(ScheduleError::InvalidTimeSettings(_))
    ));
}

#[test]
fn preview_needs_a_selection() {
    assert_eq!(
        TimePreview::new(TimeSettings::default(), &[]),
        Err(ScheduleError::EmptySelection)
    );
}

#[test]
fn override_touches_only_that_row_until_recalculated() {
    let mut preview = TimePreview::new(settings("08:00", 90, 15), &[1, 2, 3, 4]).unwrap();

    preview.override_start(1, at("10:00")).unwrap();
    assert_eq!(
        starts_and_ends(&preview),
        pairs(&[
            ("08:00", "09:30"),
            ("10:00", "11:30"),
            ("11:30", "13:00"),
            ("13:15", "14:45"),
        ])
    );
    assert!(preview.rows()[1].edited);

    preview.recalculate_following(1).unwrap();
    assert_eq!(
        starts_and_ends(&preview),
        pairs(&[
            ("08:00", "09:30"),
            ("10:00", "11:30"),
            ("11:45", "13:15"),
            ("13:30", "15:00"),
        ])
    );
    assert!(preview.rows()[1].edited);
    assert!(!preview.rows()[2].edited);
}

#[test]
fn recalculate_from_last_row_only_fixes_its_end() {
    let mut preview = TimePreview::new(settings("08:00", 60, 0), &[1, 2]).unwrap();
    preview.override_start(1, at("20:00")).unwrap();
    preview.recalculate_following(1).unwrap();
    assert_eq!(
        starts_and_ends(&preview),
        pairs(&[("08:00", "09:00"), ("20:00", "21:00")])
    );
}

#[test]
fn preview_row_out_of_range() {
    let mut preview = TimePreview::new(TimeSettings::default(), &[1, 2]).unwrap();
    assert_eq!(
        preview.override_start(2, at("08:00")),
        Err(ScheduleError::IndexOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(
        preview.recalculate_following(5),
        Err(ScheduleError::IndexOutOfRange { index: 5, len: 2 })
    );
}

#[test]
fn settings_serialize_clock_as_hh_mm() {
    let json = serde_json::to_value(settings("07:05", 45, 10)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "start_time": "07:05", "duration": 45, "interval": 10 })
    );
    let back: TimeSettings = serde_json::from_value(json).unwrap();
    assert_eq!(back, settings("07:05", 45, 10));
}
