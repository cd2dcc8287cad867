//! Purpose: Strict timestamp coercion for date-typed fields.
//! Exports: `parse_timestamp`, `format_timestamp`, `TIMESTAMP_FORMAT`.
//! Role: The only accepted textual date profile for the decode engine.
//! Invariants: Fractional seconds and a numeric offset are mandatory.
//! Invariants: Parsed instants are normalized to UTC.
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// `YYYY-MM-DDTHH:MM:SS.ffffff+HH:MM`
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
);

const OUTPUT_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6][offset_hour sign:mandatory]:[offset_minute]"
);

pub fn parse_timestamp(input: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(input, TIMESTAMP_FORMAT)
        .ok()
        .map(|ts| ts.to_offset(UtcOffset::UTC))
}

pub fn format_timestamp(ts: OffsetDateTime) -> Option<String> {
    ts.format(OUTPUT_FORMAT).ok()
}
