//! Primitive value-type descriptors.
//!
//! A value-type descriptor bundles the four conversions a simple map or object
//! field needs: parsing from a document value, parsing from a client-sent JSON
//! value, and rendering back to each of those shapes. Six built-ins are provided;
//! each is a zero-sized marker type implementing [`ValueType`], so a `SimpleMap`
//! or object field is parameterized by the marker type rather than by an enum tag.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value as Json;

use crate::error::{Error, Result};

/// A document-shaped value. This crate has no real BSON driver dependency (the
/// database I/O layer is out of scope), so document values are represented the
/// same way a parsed-JSON value is: as [`serde_json::Value`]. A BSON-backed
/// deployment would substitute `bson::Bson` here without touching the tracking
/// engine built on top of this trait.
pub type DocValue = Json;

/// A client-facing sync/delete value, also `serde_json::Value`.
pub type SyncValue = Json;

/// Converts a primitive Rust value to and from the document and client-sync shapes.
pub trait ValueType {
    /// The canonical in-memory representation, e.g. `i64` for `Integer`.
    type Native: Clone + PartialEq;

    /// Name used in [`Error::TypeMismatch`] messages.
    fn type_name() -> &'static str;

    /// Parses a value taken from an already-loaded document (strict: present but
    /// wrongly-typed values are a [`Error::TypeMismatch`]).
    fn parse_from_document(v: &DocValue) -> Result<Self::Native>;

    /// Parses a value taken from client-sent JSON (lenient: `null`/absent-shaped
    /// values fall back to the type's default rather than erroring).
    fn parse_from_json(v: &Json) -> Result<Self::Native>;

    /// Renders the canonical value back to document shape.
    fn to_document_value(v: &Self::Native) -> DocValue;

    /// Renders the canonical value to client-sync shape.
    fn to_sync_value(v: &Self::Native) -> SyncValue;
}

fn mismatch(expected: &'static str, actual: &Json) -> Error {
    let actual = match actual {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    };
    Error::type_mismatch(expected, actual)
}

/// 64-bit integer. Accepts 32/64-bit integers and float64 (truncated) on input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer;

impl ValueType for Integer {
    type Native = i64;

    fn type_name() -> &'static str {
        "integer"
    }

    fn parse_from_document(v: &DocValue) -> Result<i64> {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
            .ok_or_else(|| mismatch(Self::type_name(), v))
    }

    fn parse_from_json(v: &Json) -> Result<i64> {
        match v {
            Json::Null => Ok(0),
            other => Self::parse_from_document(other),
        }
    }

    fn to_document_value(v: &i64) -> DocValue {
        Json::from(*v)
    }

    fn to_sync_value(v: &i64) -> SyncValue {
        Json::from(*v)
    }
}

/// UTF-8 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl ValueType for StringType {
    type Native = String;

    fn type_name() -> &'static str {
        "string"
    }

    fn parse_from_document(v: &DocValue) -> Result<String> {
        v.as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch(Self::type_name(), v))
    }

    fn parse_from_json(v: &Json) -> Result<String> {
        match v {
            Json::Null => Ok(String::new()),
            other => Self::parse_from_document(other),
        }
    }

    fn to_document_value(v: &String) -> DocValue {
        Json::from(v.clone())
    }

    fn to_sync_value(v: &String) -> SyncValue {
        Json::from(v.clone())
    }
}

/// 64-bit float. Accepts integers and float32/float64 on input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Float;

impl ValueType for Float {
    type Native = f64;

    fn type_name() -> &'static str {
        "float"
    }

    fn parse_from_document(v: &DocValue) -> Result<f64> {
        v.as_f64().ok_or_else(|| mismatch(Self::type_name(), v))
    }

    fn parse_from_json(v: &Json) -> Result<f64> {
        match v {
            Json::Null => Ok(0.0),
            other => Self::parse_from_document(other),
        }
    }

    fn to_document_value(v: &f64) -> DocValue {
        serde_json::Number::from_f64(*v)
            .map(Json::Number)
            .unwrap_or(Json::Null)
    }

    fn to_sync_value(v: &f64) -> SyncValue {
        Self::to_document_value(v)
    }
}

/// Boolean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

impl ValueType for Boolean {
    type Native = bool;

    fn type_name() -> &'static str {
        "boolean"
    }

    fn parse_from_document(v: &DocValue) -> Result<bool> {
        v.as_bool().ok_or_else(|| mismatch(Self::type_name(), v))
    }

    fn parse_from_json(v: &Json) -> Result<bool> {
        match v {
            Json::Null => Ok(false),
            other => Self::parse_from_document(other),
        }
    }

    fn to_document_value(v: &bool) -> DocValue {
        Json::from(*v)
    }

    fn to_sync_value(v: &bool) -> SyncValue {
        Json::from(*v)
    }
}

/// UTC datetime. Document shape is an RFC 3339 string (the closest stand-in for
/// a native datetime without a real BSON dependency); sync shape is epoch
/// milliseconds, per spec.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeType;

impl ValueType for DateTimeType {
    type Native = DateTime<Utc>;

    fn type_name() -> &'static str {
        "datetime"
    }

    fn parse_from_document(v: &DocValue) -> Result<DateTime<Utc>> {
        if let Some(s) = v.as_str() {
            return DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| mismatch(Self::type_name(), v));
        }
        if let Some(millis) = v.as_i64() {
            return millis_to_datetime(millis).ok_or_else(|| mismatch(Self::type_name(), v));
        }
        Err(mismatch(Self::type_name(), v))
    }

    fn parse_from_json(v: &Json) -> Result<DateTime<Utc>> {
        match v {
            Json::Null => Ok(Utc.timestamp_opt(0, 0).unwrap()),
            Json::Number(n) => n
                .as_i64()
                .and_then(millis_to_datetime)
                .ok_or_else(|| mismatch(Self::type_name(), v)),
            other => Self::parse_from_document(other),
        }
    }

    fn to_document_value(v: &DateTime<Utc>) -> DocValue {
        Json::from(v.to_rfc3339())
    }

    fn to_sync_value(v: &DateTime<Utc>) -> SyncValue {
        Json::from(v.timestamp_millis())
    }
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Calendar date, encoded as a `YYYYMMDD` integer on both the document and sync
/// sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl ValueType for DateType {
    type Native = NaiveDate;

    fn type_name() -> &'static str {
        "date"
    }

    fn parse_from_document(v: &DocValue) -> Result<NaiveDate> {
        let n = v.as_i64().ok_or_else(|| mismatch(Self::type_name(), v))?;
        num_to_date(n).ok_or_else(|| Error::parse_failure(format!("invalid YYYYMMDD value {n}")))
    }

    fn parse_from_json(v: &Json) -> Result<NaiveDate> {
        match v {
            Json::Null => Ok(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            other => Self::parse_from_document(other),
        }
    }

    fn to_document_value(v: &NaiveDate) -> DocValue {
        Json::from(date_to_num(*v))
    }

    fn to_sync_value(v: &NaiveDate) -> SyncValue {
        Self::to_document_value(v)
    }
}

/// `YYYYMMDD` integer to calendar date.
pub fn num_to_date(n: i64) -> Option<NaiveDate> {
    let year = (n / 10_000) as i32;
    let month = ((n / 100) % 100) as u32;
    let day = (n % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Calendar date to `YYYYMMDD` integer.
pub fn date_to_num(d: NaiveDate) -> i64 {
    use chrono::Datelike;
    d.year() as i64 * 10_000 + d.month() as i64 * 100 + d.day() as i64
}
