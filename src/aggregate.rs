use std::collections::BTreeMap;

use crate::models::{
    Category, EmployeeAggregate, IdentityConflict, IdentityField, NormalizedRecord, Status,
};

pub const PASS_THRESHOLD_PCT: usize = 80;

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `part` over `whole`, rounded to two decimals. Zero when
/// `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / whole as f64)
}

pub fn classify(completed: usize, total: usize) -> Status {
    if total > 0 && completed * 100 >= PASS_THRESHOLD_PCT * total {
        Status::Approved
    } else {
        Status::Failed
    }
}

/// Occurrence counts of one display field, in first-seen order.
#[derive(Debug, Default)]
struct Tally {
    values: Vec<(String, usize)>,
}

impl Tally {
    fn record(&mut self, value: &str) {
        match self.values.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => self.values.push((value.to_string(), 1)),
        }
    }

    /// Most frequent value; the earliest one wins a tie.
    fn representative(&self) -> String {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.values {
            if best.map_or(true, |current| entry.1 > current.1) {
                best = Some(entry);
            }
        }
        best.map(|(value, _)| value.clone()).unwrap_or_default()
    }

    fn conflict(&self, field: IdentityField) -> Option<IdentityConflict> {
        (self.values.len() > 1).then(|| IdentityConflict {
            field,
            values: self.values.iter().map(|(value, _)| value.clone()).collect(),
        })
    }
}

struct EmployeeGroup {
    category: Category,
    names: Tally,
    managers: Tally,
    departments: Tally,
    total: usize,
    completed: usize,
}

/// Groups records by email, one aggregate per distinct email, sorted by email.
pub fn aggregate_employees(records: &[NormalizedRecord]) -> Vec<EmployeeAggregate> {
    let mut groups: BTreeMap<&str, EmployeeGroup> = BTreeMap::new();

    for record in records {
        let group = groups
            .entry(record.email.as_str())
            .or_insert_with(|| EmployeeGroup {
                category: record.category,
                names: Tally::default(),
                managers: Tally::default(),
                departments: Tally::default(),
                total: 0,
                completed: 0,
            });

        group.names.record(&record.employee_name);
        group.managers.record(&record.manager_name);
        group.departments.record(&record.department);
        group.total += 1;
        if record.completed {
            group.completed += 1;
        }
    }

    groups
        .into_iter()
        .map(|(email, group)| {
            let conflicts: Vec<IdentityConflict> = [
                group.names.conflict(IdentityField::EmployeeName),
                group.managers.conflict(IdentityField::ManagerName),
                group.departments.conflict(IdentityField::Department),
            ]
            .into_iter()
            .flatten()
            .collect();

            for conflict in &conflicts {
                tracing::warn!(
                    email,
                    field = %conflict.field,
                    values = ?conflict.values,
                    "employee has conflicting values, using the most frequent"
                );
            }

            EmployeeAggregate {
                email: email.to_string(),
                employee_name: group.names.representative(),
                manager_name: group.managers.representative(),
                department: group.departments.representative(),
                category: group.category,
                total_trainings: group.total,
                completed_count: group.completed,
                pass_rate: percentage(group.completed, group.total),
                status: classify(group.completed, group.total),
                conflicts,
            }
        })
        .collect()
}
