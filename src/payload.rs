use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

const WEEKDAYS_ID: [&str; 7] = ["Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu"];

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// What gets posted for one attempt: sanitized text plus the attempt's
/// timestamp rendered in the fixed `id-ID` locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SubmissionPayload {
    pub(crate) date: String,
    pub(crate) time: String,
    pub(crate) message: String,
}

/// Wire envelope: `{"data": {...}}`.
#[derive(Serialize)]
pub(crate) struct Envelope<'a> {
    pub(crate) data: &'a SubmissionPayload,
}

impl SubmissionPayload {
    pub(crate) fn new(message: String, at: NaiveDateTime) -> Self {
        Self {
            date: long_date_id(at),
            time: short_time_id(at),
            message,
        }
    }
}

/// `Minggu, 18 Oktober 2026`
pub(crate) fn long_date_id(at: NaiveDateTime) -> String {
    let weekday = WEEKDAYS_ID[at.weekday().num_days_from_sunday() as usize];
    let month = MONTHS_ID[at.month0() as usize];
    format!("{weekday}, {} {month} {}", at.day(), at.year())
}

/// `09.05`
pub(crate) fn short_time_id(at: NaiveDateTime) -> String {
    format!("{:02}.{:02}", at.hour(), at.minute())
}
