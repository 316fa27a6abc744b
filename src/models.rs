use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of the input table, keyed by normalized column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub manager_name: Option<String>,
    pub department: Option<String>,
    pub training_status: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    clap::ValueEnum,
)]
pub enum Category {
    Internal,
    External,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Internal, Category::External];

    pub fn label(self) -> &'static str {
        match self {
            Category::Internal => "Internal",
            Category::External => "External",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Approved,
    Failed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Approved => "Approved",
            Status::Failed => "Failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub email: String,
    pub employee_name: String,
    pub manager_name: String,
    pub department: String,
    pub category: Category,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    EmployeeName,
    ManagerName,
    Department,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentityField::EmployeeName => "employee name",
            IdentityField::ManagerName => "manager name",
            IdentityField::Department => "department",
        })
    }
}

/// Distinct values seen for one display field of a single employee, in
/// first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityConflict {
    pub field: IdentityField,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeAggregate {
    pub email: String,
    pub employee_name: String,
    pub manager_name: String,
    pub department: String,
    pub category: Category,
    pub total_trainings: usize,
    pub completed_count: usize,
    pub pass_rate: f64,
    pub status: Status,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<IdentityConflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerRollup {
    pub manager_name: String,
    pub approved_internal: usize,
    pub failed_internal: usize,
    pub approved_external: usize,
    pub failed_external: usize,
    pub pass_percentage: f64,
}

impl ManagerRollup {
    pub fn employee_count(&self) -> usize {
        self.approved_internal + self.failed_internal + self.approved_external + self.failed_external
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub approved: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.approved + self.failed
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Approved => self.approved,
            Status::Failed => self.failed,
        }
    }
}

/// Employee counts by category and status. Every category is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub counts: BTreeMap<Category, StatusCounts>,
}

/// One line of the failing-employee export, in export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailingEmployeeRow {
    pub employee_name: String,
    pub email: String,
    pub manager_name: String,
    pub department: String,
    pub category: Category,
    pub total_trainings: usize,
    pub completed_count: usize,
    pub pass_rate: f64,
}

impl From<&EmployeeAggregate> for FailingEmployeeRow {
    fn from(employee: &EmployeeAggregate) -> Self {
        Self {
            employee_name: employee.employee_name.clone(),
            email: employee.email.clone(),
            manager_name: employee.manager_name.clone(),
            department: employee.department.clone(),
            category: employee.category,
            total_trainings: employee.total_trainings,
            completed_count: employee.completed_count,
            pass_rate: employee.pass_rate,
        }
    }
}
