use chrono::NaiveDate;

use super::{FieldValue, Record, date};
use crate::domain::DeskError;
use crate::loader::{FromRow, RawRow};

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRequest {
    pub id: u32,
    pub employee: String,
    pub department: String,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub reason: Option<String>,
}

impl LeaveRequest {
    /// Calendar days covered by the request, both ends included.
    pub fn days(&self) -> u32 {
        let span = (self.end_date - self.start_date).num_days();
        if span < 0 { 0 } else { span as u32 + 1 }
    }

    pub fn sample() -> Vec<Self> {
        let rows = [
            (1, "Amelia Hart", "Engineering", "Annual", (2024, 1, 8), (2024, 1, 12), "Approved", Some("Family trip")),
            (2, "Ben Okafor", "Finance", "Sick", (2024, 1, 15), (2024, 1, 16), "Approved", None),
            (3, "Chloe Martin", "Compliance", "Annual", (2024, 2, 5), (2024, 2, 9), "Pending", Some("Ski week")),
            (4, "Daniel Reyes", "Engineering", "Parental", (2024, 2, 12), (2024, 4, 12), "Approved", None),
            (5, "Elif Demir", "Operations", "Unpaid", (2024, 2, 19), (2024, 2, 23), "Rejected", Some("Moving house")),
            (6, "Farah Nasser", "Finance", "Annual", (2024, 3, 4), (2024, 3, 8), "Pending", None),
            (7, "George Liu", "HR", "Sick", (2024, 3, 11), (2024, 3, 11), "Approved", None),
            (8, "Hana Sato", "Compliance", "Study", (2024, 3, 18), (2024, 3, 22), "Pending", Some("Certification exam")),
            (9, "Ivan Petrov", "Operations", "Annual", (2024, 4, 1), (2024, 4, 5), "Approved", None),
            (10, "Julia Rossi", "HR", "Annual", (2024, 4, 15), (2024, 4, 26), "Pending", Some("Wedding")),
            (11, "Kofi Mensah", "Engineering", "Sick", (2024, 5, 2), (2024, 5, 3), "Approved", None),
            (12, "Lena Fischer", "Finance", "Unpaid", (2024, 5, 13), (2024, 5, 17), "Cancelled", None),
        ];
        rows.into_iter()
            .map(|(id, employee, department, leave_type, s, e, status, reason)| LeaveRequest {
                id,
                employee: employee.to_string(),
                department: department.to_string(),
                leave_type: leave_type.to_string(),
                start_date: date(s.0, s.1, s.2),
                end_date: date(e.0, e.1, e.2),
                status: status.to_string(),
                reason: reason.map(str::to_string),
            })
            .collect()
    }
}

impl Record for LeaveRequest {
    type Id = u32;
    const KIND: &'static str = "Leave requests";

    fn id(&self) -> u32 {
        self.id
    }

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "employee",
            "department",
            "leave_type",
            "start_date",
            "end_date",
            "days",
            "status",
            "reason",
        ]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["employee", "department", "leave_type", "status", "reason"]
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value: FieldValue = match name {
            "id" => self.id.into(),
            "employee" => self.employee.as_str().into(),
            "department" => self.department.as_str().into(),
            "leave_type" => self.leave_type.as_str().into(),
            "start_date" => self.start_date.into(),
            "end_date" => self.end_date.into(),
            "days" => self.days().into(),
            "status" => self.status.as_str().into(),
            "reason" => self.reason.as_deref().into(),
            _ => return None,
        };
        Some(value)
    }
}

impl FromRow for LeaveRequest {
    fn from_row(row: &RawRow<'_>) -> Result<Self, DeskError> {
        Ok(LeaveRequest {
            id: row.integer("id")?,
            employee: row.text("employee")?,
            department: row.text("department")?,
            leave_type: row.text("leave_type")?,
            start_date: row.date("start_date")?,
            end_date: row.date("end_date")?,
            status: row.text("status")?,
            reason: row.opt_text("reason"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_include_both_ends() {
        let mut leave = LeaveRequest::sample().remove(0);
        assert_eq!(leave.days(), 5);
        leave.end_date = leave.start_date;
        assert_eq!(leave.days(), 1);
        leave.end_date = date(2023, 12, 31);
        assert_eq!(leave.days(), 0);
    }

    #[test]
    fn missing_reason_is_missing_field() {
        let leave = &LeaveRequest::sample()[1];
        assert_eq!(leave.field("reason"), Some(FieldValue::Missing));
        assert_eq!(leave.field("salary"), None);
    }
}
