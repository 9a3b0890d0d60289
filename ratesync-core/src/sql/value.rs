use core::cmp::Ordering;
use core::fmt;
use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::naming::escape_literal;
use crate::timeseries::period::{format_date, parse_date};

/// A single SQL value as exchanged with a `Store`.
///
/// `Null` is the only representation of an absent value; numeric values are
/// carried as `Decimal` so that rates survive the round trip exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SqlValue {
    /// SQL `NULL`.
    #[default]
    Null,
    /// Integer value.
    Int(i64),
    /// Exact decimal value.
    Decimal(Decimal),
    /// Text value.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Timestamp without timezone.
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// True for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render as an SQL literal suitable for embedding in statement text.
    ///
    /// Text is single-quoted with embedded quotes doubled; dates are quoted
    /// `YYYY-MM-DD`; `Null` renders as `NULL`.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Int(v) => v.to_string(),
            Self::Decimal(v) => v.normalize().to_string(),
            Self::Text(s) => format!("'{}'", escape_literal(s)),
            Self::Date(d) => format!("'{}'", format_date(*d)),
            Self::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }

    /// Interpret as a calendar date.
    ///
    /// Dates, timestamps and text in any accepted date format qualify.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            Self::Text(s) => parse_date(s).ok(),
            Self::Null | Self::Int(_) | Self::Decimal(_) => None,
        }
    }

    /// Interpret as a decimal number.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Int(v) => Some(Decimal::from(*v)),
            Self::Decimal(v) => Some(*v),
            Self::Text(s) => Decimal::from_str(s.trim()).ok(),
            Self::Null | Self::Date(_) | Self::DateTime(_) => None,
        }
    }

    /// Borrow the text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Order two values when they share an interpretation.
    ///
    /// Dates compare as dates, numbers as decimals, text lexically. Values with
    /// no common interpretation (including `Null`) are incomparable.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        if let (Some(a), Some(b)) = (self.as_date(), other.as_date()) {
            return Some(a.cmp(&b));
        }
        if let (Some(a), Some(b)) = (self.as_decimal(), other.as_decimal()) {
            return Some(a.cmp(&b));
        }
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<Option<Decimal>> for SqlValue {
    fn from(v: Option<Decimal>) -> Self {
        v.map_or(Self::Null, Self::Decimal)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Named parameters bound to `%(name)s` placeholders.
pub type NamedParams = BTreeMap<String, SqlValue>;

/// One row of a result set, or one parameter row of a batched statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Values addressed by column name, in column order.
    Named(Vec<(String, SqlValue)>),
    /// Values addressed by position only.
    Positional(Vec<SqlValue>),
}

impl Row {
    /// Build a named row from `(column, value)` pairs.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Named(pairs) => pairs.len(),
            Self::Positional(values) => values.len(),
        }
    }

    /// True if the row has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for rows carrying column names.
    #[must_use]
    pub const fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    /// Value of column `name`.
    ///
    /// An exact match wins; otherwise the first ASCII case-insensitive match is
    /// returned. Positional rows never match.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        let Self::Named(pairs) = self else {
            return None;
        };
        pairs
            .iter()
            .find(|(k, _)| k == name)
            .or_else(|| pairs.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)))
            .map(|(_, v)| v)
    }

    /// Value at zero-based position `index`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        match self {
            Self::Named(pairs) => pairs.get(index).map(|(_, v)| v),
            Self::Positional(values) => values.get(index),
        }
    }

    /// Column names, or `None` for positional rows.
    #[must_use]
    pub fn column_names(&self) -> Option<Vec<&str>> {
        match self {
            Self::Named(pairs) => Some(pairs.iter().map(|(k, _)| k.as_str()).collect()),
            Self::Positional(_) => None,
        }
    }

    /// Values in field order.
    #[must_use]
    pub fn values(&self) -> Vec<&SqlValue> {
        match self {
            Self::Named(pairs) => pairs.iter().map(|(_, v)| v).collect(),
            Self::Positional(values) => values.iter().collect(),
        }
    }
}
