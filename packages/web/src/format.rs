//! Small conversions between form fields and record values.

use chrono::{DateTime, NaiveDateTime, Utc};

pub fn date(value: &DateTime<Utc>) -> String {
    value.format("%b %-d, %Y").to_string()
}

pub fn date_time(value: &DateTime<Utc>) -> String {
    value.format("%b %-d, %Y %H:%M").to_string()
}

/// Value for an `<input type="datetime-local">`.
pub fn datetime_local(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M").to_string()
}

pub fn parse_datetime_local(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `None` for a blank field, the trimmed text otherwise.
pub fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Comma separated list field.
pub fn list(value: &str) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

pub fn join_list(items: &Option<Vec<String>>) -> String {
    items.as_deref().map(|items| items.join(", ")).unwrap_or_default()
}
