pub mod controller;
pub mod domain;
pub mod export;
pub mod filter;
pub mod inputter;
pub mod loader;
pub mod model;
pub mod records;
pub mod table;
pub mod ui;

pub use domain::{AppConfig, DeskError, TableConfig};
pub use filter::Filter;
pub use records::{ComplianceOfficer, ExpenseLine, FieldValue, FinanceExecutive, LeaveRequest, Record};
pub use table::{Order, TableViewController};
