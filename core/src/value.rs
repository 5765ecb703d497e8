//! Property values.
//!
//! Values carry their natural [`RequiredType`]. Property definitions declare a
//! required type, and values are converted into it before constraint checks.

use crate::{CoreError, CoreResult, Name, NamespaceContext, Path};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of property types a definition can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequiredType {
    String,
    Binary,
    Long,
    Double,
    Date,
    Boolean,
    Name,
    Path,
    Reference,
    Undefined,
}

impl RequiredType {
    pub const ALL: [RequiredType; 10] = [
        RequiredType::String,
        RequiredType::Binary,
        RequiredType::Long,
        RequiredType::Double,
        RequiredType::Date,
        RequiredType::Boolean,
        RequiredType::Name,
        RequiredType::Path,
        RequiredType::Reference,
        RequiredType::Undefined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredType::String => "STRING",
            RequiredType::Binary => "BINARY",
            RequiredType::Long => "LONG",
            RequiredType::Double => "DOUBLE",
            RequiredType::Date => "DATE",
            RequiredType::Boolean => "BOOLEAN",
            RequiredType::Name => "NAME",
            RequiredType::Path => "PATH",
            RequiredType::Reference => "REFERENCE",
            RequiredType::Undefined => "UNDEFINED",
        }
    }

    /// True when a value of type `value_type` can be stored as-is.
    pub fn accepts(&self, value_type: RequiredType) -> bool {
        *self == RequiredType::Undefined || *self == value_type
    }
}

impl fmt::Display for RequiredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequiredType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequiredType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownRequiredType(s.to_string()))
    }
}

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Binary(Vec<u8>),
    Long(i64),
    Double(f64),
    Date(DateTime<FixedOffset>),
    Boolean(bool),
    Name(Name),
    Path(Path),
    /// Identifier of the referenced node.
    Reference(String),
}

impl Value {
    /// The natural type of this value.
    pub fn required_type(&self) -> RequiredType {
        match self {
            Value::String(_) => RequiredType::String,
            Value::Binary(_) => RequiredType::Binary,
            Value::Long(_) => RequiredType::Long,
            Value::Double(_) => RequiredType::Double,
            Value::Date(_) => RequiredType::Date,
            Value::Boolean(_) => RequiredType::Boolean,
            Value::Name(_) => RequiredType::Name,
            Value::Path(_) => RequiredType::Path,
            Value::Reference(_) => RequiredType::Reference,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Value::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Render the value as text, using `context` for names and paths.
    pub fn to_text(&self, context: &dyn NamespaceContext) -> CoreResult<String> {
        Ok(match self {
            Value::String(s) => s.clone(),
            Value::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Value::Long(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Date(d) => format_date(d),
            Value::Boolean(b) => b.to_string(),
            Value::Name(n) => n.to_prefixed(context)?,
            Value::Path(p) => p.to_prefixed(context)?,
            Value::Reference(id) => id.clone(),
        })
    }

    /// Convert this value into `target`.
    ///
    /// Doubles convert to longs by truncation. Strings are parsed, with names
    /// and paths resolved through `context`.
    pub fn convert_to(&self, target: RequiredType, context: &dyn NamespaceContext) -> CoreResult<Value> {
        let source = self.required_type();
        if target.accepts(source) {
            return Ok(self.clone());
        }
        let fail = || CoreError::conversion(source, target, self.to_string());

        match (target, self) {
            (RequiredType::String, _) => Ok(Value::String(self.to_text(context)?)),
            (RequiredType::Binary, _) => Ok(Value::Binary(self.to_text(context)?.into_bytes())),

            (RequiredType::Long, Value::Double(v)) if v.is_finite() => Ok(Value::Long(v.trunc() as i64)),
            (RequiredType::Long, Value::Date(d)) => Ok(Value::Long(d.timestamp_millis())),
            (RequiredType::Long, Value::String(_) | Value::Binary(_)) => {
                let text = self.to_text(context)?;
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        text.parse::<f64>()
                            .ok()
                            .filter(|v| v.is_finite())
                            .map(|v| v.trunc() as i64)
                    })
                    .map(Value::Long)
                    .ok_or_else(fail)
            }

            (RequiredType::Double, Value::Long(v)) => Ok(Value::Double(*v as f64)),
            (RequiredType::Double, Value::Date(d)) => Ok(Value::Double(d.timestamp_millis() as f64)),
            (RequiredType::Double, Value::String(_) | Value::Binary(_)) => self
                .to_text(context)?
                .trim()
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| fail()),

            (RequiredType::Date, Value::Long(ms)) => millis_to_date(*ms).map(Value::Date).ok_or_else(fail),
            (RequiredType::Date, Value::Double(ms)) if ms.is_finite() => {
                millis_to_date(ms.trunc() as i64).map(Value::Date).ok_or_else(fail)
            }
            (RequiredType::Date, Value::String(_) | Value::Binary(_)) => {
                parse_date(&self.to_text(context)?).map(Value::Date)
            }

            (RequiredType::Boolean, Value::String(_) | Value::Binary(_)) => {
                Ok(Value::Boolean(self.to_text(context)?.trim().eq_ignore_ascii_case("true")))
            }

            (RequiredType::Name, Value::Path(p)) => match (p.is_absolute(), p.segments()) {
                (false, [segment]) => segment.name().cloned().map(Value::Name).ok_or_else(fail),
                _ => Err(fail()),
            },
            (RequiredType::Name, Value::String(_) | Value::Binary(_)) => {
                Name::parse(self.to_text(context)?.trim(), context).map(Value::Name)
            }

            (RequiredType::Path, Value::Name(n)) => {
                Ok(Value::Path(Path::new(false, vec![crate::Segment::named(n.clone())])))
            }
            (RequiredType::Path, Value::String(_) | Value::Binary(_)) => {
                Path::parse(self.to_text(context)?.trim(), context).map(Value::Path)
            }

            (RequiredType::Reference, Value::String(_) | Value::Binary(_)) => {
                let id = self.to_text(context)?;
                if id.trim().is_empty() {
                    Err(fail())
                } else {
                    Ok(Value::Reference(id.trim().to_string()))
                }
            }

            _ => Err(fail()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Long(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", format_date(d)),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Name(n) => write!(f, "{}", n),
            Value::Path(p) => write!(f, "{}", p),
            Value::Reference(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Name> for Value {
    fn from(n: Name) -> Self {
        Value::Name(n)
    }
}

impl From<Path> for Value {
    fn from(p: Path) -> Self {
        Value::Path(p)
    }
}

fn millis_to_date(ms: i64) -> Option<DateTime<FixedOffset>> {
    Utc.timestamp_millis_opt(ms).single().map(|d| d.fixed_offset())
}

/// Parse a timestamp such as `+1945-08-01T01:30:00.000Z`.
///
/// The year may carry a sign (`-` for years before the common era). The
/// offset is `Z` or `±hh:mm`; a missing offset means UTC. A bare date is
/// taken as midnight.
pub fn parse_date(text: &str) -> CoreResult<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (local, offset) = split_offset(body).ok_or_else(|| CoreError::invalid_date(text))?;

    let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDate::parse_from_str(local, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| CoreError::invalid_date(text))?;
    let naive = if negative {
        naive
            .with_year(-naive.year())
            .ok_or_else(|| CoreError::invalid_date(text))?
    } else {
        naive
    };

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| CoreError::invalid_date(text))
}

fn split_offset(body: &str) -> Option<(&str, FixedOffset)> {
    if let Some(local) = body.strip_suffix('Z').or_else(|| body.strip_suffix('z')) {
        return Some((local, FixedOffset::east_opt(0)?));
    }
    let bytes = body.as_bytes();
    let len = bytes.len();
    if len > 6 && matches!(bytes[len - 6], b'+' | b'-') && bytes[len - 3] == b':' && body.contains('T') {
        let sign = if bytes[len - 6] == b'-' { -1 } else { 1 };
        let hours: i32 = body.get(len - 5..len - 3)?.parse().ok()?;
        let minutes: i32 = body.get(len - 2..)?.parse().ok()?;
        let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
        return Some((&body[..len - 6], offset));
    }
    Some((body, FixedOffset::east_opt(0)?))
}

/// Format a timestamp in the signed-year form accepted by [`parse_date`].
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    let year = date.year();
    let sign = if year < 0 { '-' } else { '+' };
    let offset = if date.offset().local_minus_utc() == 0 {
        "Z".to_string()
    } else {
        date.format("%:z").to_string()
    };
    format!(
        "{}{:04}-{}{}",
        sign,
        year.abs(),
        date.format("%m-%dT%H:%M:%S%.3f"),
        offset
    )
}
