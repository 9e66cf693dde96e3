use chrono::NaiveDate;

use crate::records::{FieldValue, Record};

/// Categorical predicates configured per table, applied after the free text search.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Case-insensitive equality with the rendered field value.
    Equals { field: String, value: String },
    /// Inclusive numeric range, either bound may be open.
    NumberRange {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Inclusive date range, either bound may be open.
    DateRange {
        field: String,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn number_range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Filter::NumberRange {
            field: field.into(),
            min,
            max,
        }
    }

    pub fn date_range(
        field: impl Into<String>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        Filter::DateRange {
            field: field.into(),
            from,
            to,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Filter::Equals { field, .. }
            | Filter::NumberRange { field, .. }
            | Filter::DateRange { field, .. } => field,
        }
    }

    /// A record without the field, or with a value of the wrong kind, never matches.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let Some(value) = record.field(self.field()) else {
            return false;
        };
        match (self, value) {
            (Filter::Equals { value: expected, .. }, v) => {
                !v.is_missing() && v.to_string().to_lowercase() == expected.to_lowercase()
            }
            (Filter::NumberRange { min, max, .. }, FieldValue::Number(n)) => {
                min.is_none_or(|m| n >= m) && max.is_none_or(|m| n <= m)
            }
            (Filter::DateRange { from, to, .. }, FieldValue::Date(d)) => {
                from.is_none_or(|f| d >= f) && to.is_none_or(|t| d <= t)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = |b: Option<String>| b.unwrap_or_else(|| "*".to_string());
        match self {
            Filter::Equals { field, value } => write!(f, "{field}={value}"),
            Filter::NumberRange { field, min, max } => write!(
                f,
                "{field} in {}..{}",
                bound(min.map(|m| m.to_string())),
                bound(max.map(|m| m.to_string()))
            ),
            Filter::DateRange { field, from, to } => write!(
                f,
                "{field} in {}..{}",
                bound(from.map(|d| d.to_string())),
                bound(to.map(|d| d.to_string()))
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{FinanceExecutive, LeaveRequest};

    #[test]
    fn equals_is_case_insensitive() {
        let leaves = LeaveRequest::sample();
        let filter = Filter::equals("status", "pending");
        let hits: Vec<u32> = leaves.iter().filter(|l| filter.matches(*l)).map(|l| l.id).collect();
        assert_eq!(hits, vec![3, 6, 8, 10]);
    }

    #[test]
    fn number_range_is_inclusive() {
        let execs = FinanceExecutive::sample();
        let filter = Filter::number_range("budget", Some(120_000.0), Some(180_000.0));
        let hits: Vec<u32> = execs.iter().filter(|e| filter.matches(*e)).map(|e| e.id).collect();
        assert_eq!(hits, vec![3, 6, 8]);
    }

    #[test]
    fn date_range_with_open_end() {
        let leaves = LeaveRequest::sample();
        let from = NaiveDate::from_ymd_opt(2024, 4, 15);
        let filter = Filter::date_range("start_date", from, None);
        let hits: Vec<u32> = leaves.iter().filter(|l| filter.matches(*l)).map(|l| l.id).collect();
        assert_eq!(hits, vec![10, 11, 12]);
    }

    #[test]
    fn unknown_field_or_wrong_kind_never_matches() {
        let leave = &LeaveRequest::sample()[0];
        assert!(!Filter::equals("salary", "1").matches(leave));
        assert!(!Filter::number_range("employee", None, None).matches(leave));
    }
}
