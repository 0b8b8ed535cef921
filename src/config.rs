//! Scheduler settings: playing fields, default time ladder, undo depth.
//!
//! Read from the environment by the web binary; malformed values fall back to the defaults.

use crate::models::clock::parse_clock;
use crate::models::{FieldNumber, TimeSettings};

/// Configured values for generation and editing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScheduleConfig {
    /// Fields matches are assigned to, cycled in this order by the generator.
    pub fields: Vec<FieldNumber>,
    /// Defaults for the time-ladder dialog.
    pub time_settings: TimeSettings,
    /// How many batch mutations can be undone.
    pub undo_depth: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            fields: vec![FieldNumber(1), FieldNumber(2)],
            time_settings: TimeSettings::default(),
            undo_depth: 1,
        }
    }
}

impl ScheduleConfig {
    /// Build from `SCHEDULE_FIELDS` (e.g. `1,2`), `SCHEDULE_START_TIME` (`HH:MM`),
    /// `SCHEDULE_MATCH_DURATION`, `SCHEDULE_MATCH_INTERVAL` and `SCHEDULE_UNDO_DEPTH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ScheduleConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let fields = match lookup("SCHEDULE_FIELDS") {
            Some(raw) => parse_fields(&raw).unwrap_or_else(|| {
                log::warn!("Ignoring SCHEDULE_FIELDS={raw:?}, using default fields");
                defaults.fields.clone()
            }),
            None => defaults.fields.clone(),
        };

        let start_time = match lookup("SCHEDULE_START_TIME") {
            Some(raw) => parse_clock(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring SCHEDULE_START_TIME: {e}");
                defaults.time_settings.start_time
            }),
            None => defaults.time_settings.start_time,
        };

        let duration = parse_number(&lookup, "SCHEDULE_MATCH_DURATION")
            .filter(|d| *d > 0)
            .unwrap_or(defaults.time_settings.duration);
        let interval = parse_number(&lookup, "SCHEDULE_MATCH_INTERVAL")
            .unwrap_or(defaults.time_settings.interval);
        let undo_depth = parse_number(&lookup, "SCHEDULE_UNDO_DEPTH")
            .map(|d| d as usize)
            .filter(|d| *d > 0)
            .unwrap_or(defaults.undo_depth);

        Self {
            fields,
            time_settings: TimeSettings {
                start_time,
                duration,
                interval,
            },
            undo_depth,
        }
    }

    pub fn is_configured_field(&self, field: FieldNumber) -> bool {
        self.fields.contains(&field)
    }
}

/// `"1, 2,3"` -> fields 1, 2, 3. None if empty or any entry is not a number.
/// A repeated field is kept once, at its first position.
fn parse_fields(raw: &str) -> Option<Vec<FieldNumber>> {
    let parsed = raw
        .split(',')
        .map(|s| s.trim().parse::<u8>().ok().map(FieldNumber))
        .collect::<Option<Vec<_>>>()?;
    let listed = parsed.len();
    let mut fields = Vec::with_capacity(listed);
    for field in parsed {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    if fields.len() < listed {
        log::warn!("SCHEDULE_FIELDS={raw:?} repeats a field, using {fields:?}");
    }
    (!fields.is_empty()).then_some(fields)
}

fn parse_number(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("Ignoring {key}={raw:?}, not a number");
            None
        }
    }
}
