//! Turns an arbitrary JSON filter object into [`ValidatedFilters`].
//!
//! Validation never fails. A bad field is dropped (or, for `runtime` and
//! `sortBy`, coerced to its default) with a warning, so a malformed request
//! degrades to "no filter" for that field.

use chrono::{Datelike, Utc};
use serde_json::{Map, Value};

use crate::models::{
    filters::{
        EARLIEST_YEAR_EXCLUSIVE, MAX_LIMIT, MAX_RATING, MIN_LIMIT, MIN_RATING,
    },
    ContentRating, RuntimeBucket, SortBy, ValidatedFilters, YearRange,
};

/// Validates filters against the current calendar year
pub fn validate_filters(raw: &Value) -> ValidatedFilters {
    validate_filters_for_year(raw, Utc::now().year())
}

pub fn validate_filters_for_year(raw: &Value, current_year: i32) -> ValidatedFilters {
    let Some(obj) = raw.as_object() else {
        if !raw.is_null() {
            tracing::warn!(kind = %json_kind(raw), "Filters must be an object, ignoring");
        }
        return ValidatedFilters::default();
    };

    ValidatedFilters {
        mood: non_empty_string(obj, "mood"),
        genre: string_list(obj, "genre"),
        platform: string_list(obj, "platform"),
        language: string_list(obj, "language"),
        country: non_empty_string(obj, "country").map(|c| c.to_uppercase()),
        runtime: runtime(obj),
        content_rating: content_rating(obj),
        min_rating: rating_bound(obj, "minRating"),
        max_rating: rating_bound(obj, "maxRating"),
        year_range: year_range(obj, current_year),
        sort_by: sort_by(obj),
        limit: limit(obj),
        hide_watched: hide_watched(obj),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_empty_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        other => {
            tracing::warn!(field = key, kind = %json_kind(other), "Dropping invalid string filter");
            None
        }
    }
}

/// Accepts a single string or an array of strings
fn string_list(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let values: Vec<String> = match obj.get(key)? {
        Value::String(s) => vec![s.trim().to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                other => {
                    tracing::warn!(
                        field = key,
                        kind = %json_kind(other),
                        "Dropping non-string list entry"
                    );
                    None
                }
            })
            .collect(),
        other => {
            tracing::warn!(field = key, kind = %json_kind(other), "Dropping invalid list filter");
            return None;
        }
    };

    let values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Numbers and numeric strings
fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn runtime(obj: &Map<String, Value>) -> Option<RuntimeBucket> {
    let value = obj.get("runtime")?;
    match value.as_str().and_then(RuntimeBucket::parse) {
        Some(bucket) => Some(bucket),
        None => {
            tracing::warn!(value = %value, "Invalid runtime filter, using 'all'");
            Some(RuntimeBucket::All)
        }
    }
}

fn content_rating(obj: &Map<String, Value>) -> Option<ContentRating> {
    let value = obj.get("contentRating")?;
    let rating = value.as_str().and_then(|s| ContentRating::parse(s.trim()));
    if rating.is_none() {
        tracing::warn!(value = %value, "Dropping unknown content rating");
    }
    rating
}

fn rating_bound(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = obj.get(key)?;
    match numeric(value) {
        Some(n) if (MIN_RATING..=MAX_RATING).contains(&n) => Some(n),
        _ => {
            tracing::warn!(field = key, value = %value, "Dropping out-of-range rating bound");
            None
        }
    }
}

fn whole_year(value: &Value) -> Option<i32> {
    numeric(value)
        .filter(|n| n.fract() == 0.0 && *n >= i32::MIN as f64 && *n <= i32::MAX as f64)
        .map(|n| n as i32)
}

fn year_range(obj: &Map<String, Value>, current_year: i32) -> Option<YearRange> {
    let range = obj.get("yearRange")?;
    let Some(range) = range.as_object() else {
        tracing::warn!(kind = %json_kind(range), "Dropping non-object yearRange");
        return None;
    };

    let min = range.get("min").and_then(|v| {
        let year = whole_year(v).filter(|y| *y > EARLIEST_YEAR_EXCLUSIVE);
        if year.is_none() {
            tracing::warn!(value = %v, "Dropping invalid yearRange.min");
        }
        year
    });
    let max = range.get("max").and_then(|v| {
        let year = whole_year(v).filter(|y| *y <= current_year);
        if year.is_none() {
            tracing::warn!(value = %v, "Dropping invalid yearRange.max");
        }
        year
    });

    if min.is_none() && max.is_none() {
        None
    } else {
        Some(YearRange { min, max })
    }
}

fn sort_by(obj: &Map<String, Value>) -> Option<SortBy> {
    let value = obj.get("sortBy")?;
    match value.as_str().and_then(SortBy::parse) {
        Some(sort) => Some(sort),
        None => {
            tracing::warn!(value = %value, "Invalid sortBy, using 'relevance'");
            Some(SortBy::Relevance)
        }
    }
}

fn limit(obj: &Map<String, Value>) -> Option<u32> {
    let value = obj.get("limit")?;
    match numeric(value) {
        Some(n) => {
            let clamped = n.floor().clamp(MIN_LIMIT as f64, MAX_LIMIT as f64) as u32;
            if clamped as f64 != n {
                tracing::warn!(requested = n, limit = clamped, "Clamped limit");
            }
            Some(clamped)
        }
        None => {
            tracing::warn!(value = %value, "Dropping non-numeric limit");
            None
        }
    }
}

fn hide_watched(obj: &Map<String, Value>) -> Option<bool> {
    match obj.get("hideWatched")? {
        Value::Bool(b) => Some(*b),
        other => {
            tracing::warn!(kind = %json_kind(other), "Dropping non-boolean hideWatched");
            None
        }
    }
}
