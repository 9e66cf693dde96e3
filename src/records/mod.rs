use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use chrono::NaiveDate;

mod compliance;
mod expense;
mod finance;
mod leave;

pub use compliance::ComplianceOfficer;
pub use expense::ExpenseLine;
pub use finance::FinanceExecutive;
pub use leave::LeaveRequest;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single typed cell value of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    // Numbers sort before dates, dates before text. Missing values always come last.
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Number(_) => 0,
            FieldValue::Date(_) => 1,
            FieldValue::Text(_) => 2,
            FieldValue::Missing => 3,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Ascending order: text case-insensitively, numbers by value, dates chronologically.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    /// Like `compare` but reversed for descending order, keeping missing values at the end.
    pub fn compare_directed(&self, other: &FieldValue, ascending: bool) -> Ordering {
        match (self.is_missing(), other.is_missing()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) if ascending => self.compare(other),
            (false, false) => other.compare(self),
        }
    }

    /// `needle` has to be lowercase already.
    pub fn contains_folded(&self, needle: &str) -> bool {
        match self {
            FieldValue::Missing => needle.is_empty(),
            FieldValue::Text(s) => s.to_lowercase().contains(needle),
            other => other.to_string().to_lowercase().contains(needle),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            FieldValue::Number(n) => write!(f, "{n:.2}"),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::Missing => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Missing)
    }
}

/// Capabilities a row type needs to be driven by a `TableViewController`.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;

    /// Human readable table name.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    /// Display order of the columns. Every column is sortable.
    fn columns() -> &'static [&'static str];

    /// Columns matched by the free text search.
    fn searchable_fields() -> &'static [&'static str];

    /// `None` if the record has no field of that name.
    fn field(&self, name: &str) -> Option<FieldValue>;

    fn has_field(name: &str) -> bool {
        Self::columns().contains(&name)
    }

    fn cells(&self) -> Vec<String> {
        Self::columns()
            .iter()
            .map(|c| self.field(c).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
