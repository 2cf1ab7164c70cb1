use std::{cmp::Ordering, fmt, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use shapefile::dbase::FieldValue;

/// Stable key for a precinct, shared by geometry attributes and statistics feeds.
///
/// Upstream sources disagree on the type of the precinct number: shapefile attributes
/// may be character or numeric fields, feed payloads key their objects by strings, and
/// CSV exports contain bare integers. Every source is normalized to one canonical text
/// form at the boundary:
///
/// - surrounding whitespace is trimmed,
/// - integers (and floats with a zero fraction, as dBase numeric fields produce) are
///   written in plain decimal without leading zeros, so `"012"`, `12` and `12.0` all
///   become `"12"`,
/// - anything else keeps its trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrecinctId(Arc<str>);

/// Text of the sentinel id meaning "no precinct".
const SENTINEL: &str = "0";

/// Text of the synthetic county-wide total row.
const TOTAL_ROW: &str = "-1";

impl PrecinctId {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        match canonical_integer(trimmed) {
            Some(n) => Self(Arc::from(n.to_string())),
            None => Self(Arc::from(trimmed)),
        }
    }

    pub fn from_number(n: i64) -> Self {
        Self(Arc::from(n.to_string()))
    }

    /// Float inputs with a fractional part keep their textual form.
    pub fn from_f64(x: f64) -> Self {
        if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
            Self::from_number(x as i64)
        } else {
            Self(Arc::from(x.to_string()))
        }
    }

    /// Precinct id from a shapefile attribute, `None` for empty or non-scalar fields.
    pub fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Character(Some(s)) | FieldValue::Memo(s) => Self::non_empty(s),
            FieldValue::Numeric(Some(n)) => Some(Self::from_f64(*n)),
            FieldValue::Float(Some(n)) => Some(Self::from_f64(f64::from(*n))),
            FieldValue::Integer(n) => Some(Self::from_number(i64::from(*n))),
            FieldValue::Double(n) => Some(Self::from_f64(*n)),
            _ => None,
        }
    }

    /// Precinct id from a decoded JSON property, `None` for null/empty/non-scalar values.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::non_empty(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::from_number(i)),
                None => n.as_f64().map(Self::from_f64),
            },
            _ => None,
        }
    }

    fn non_empty(raw: &str) -> Option<Self> {
        let id = Self::new(raw);
        (!id.0.is_empty()).then_some(id)
    }

    pub fn total_row() -> Self {
        Self(Arc::from(TOTAL_ROW))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for precinct `0`, which never denotes a real precinct.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        &*self.0 == SENTINEL
    }

    /// `true` for the `-1` row carrying official county-wide totals.
    #[inline]
    pub fn is_total_row(&self) -> bool {
        &*self.0 == TOTAL_ROW
    }

    /// `true` when the id names a geographic precinct.
    #[inline]
    pub fn is_geographic(&self) -> bool {
        !self.is_sentinel() && !self.is_total_row()
    }

    fn numeric(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

/// Parse an integer written either as an integer or as a float with zero fraction.
fn canonical_integer(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    let x = text.parse::<f64>().ok()?;
    (x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 && text.contains('.'))
        .then_some(x as i64)
}

impl fmt::Display for PrecinctId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrecinctId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Ord for PrecinctId {
    /// Numbers ascending first, then non-numeric ids by text.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for PrecinctId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for PrecinctId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PrecinctId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid precinct number: {value}")))
    }
}
