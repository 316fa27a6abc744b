use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::percentage;
use crate::models::{Category, EmployeeAggregate, ManagerRollup, Status};

/// Per-manager employee counts over the employees whose category is in
/// `categories`, sorted by manager name. Managers with no qualifying employee
/// are absent.
pub fn rollup_by_manager(
    employees: &[EmployeeAggregate],
    categories: &BTreeSet<Category>,
) -> Vec<ManagerRollup> {
    let mut managers: BTreeMap<&str, ManagerRollup> = BTreeMap::new();

    for employee in employees
        .iter()
        .filter(|employee| categories.contains(&employee.category))
    {
        let row = managers
            .entry(employee.manager_name.as_str())
            .or_insert_with(|| ManagerRollup {
                manager_name: employee.manager_name.clone(),
                approved_internal: 0,
                failed_internal: 0,
                approved_external: 0,
                failed_external: 0,
                pass_percentage: 0.0,
            });

        match (employee.category, employee.status) {
            (Category::Internal, Status::Approved) => row.approved_internal += 1,
            (Category::Internal, Status::Failed) => row.failed_internal += 1,
            (Category::External, Status::Approved) => row.approved_external += 1,
            (Category::External, Status::Failed) => row.failed_external += 1,
        }
    }

    managers
        .into_values()
        .map(|mut row| {
            row.pass_percentage = percentage(
                row.approved_internal + row.approved_external,
                row.employee_count(),
            );
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(email: &str, manager: &str, status: Status) -> EmployeeAggregate {
        let category = crate::normalize::categorize(email);
        EmployeeAggregate {
            email: email.to_string(),
            employee_name: "Someone".to_string(),
            manager_name: manager.to_string(),
            department: "Ops".to_string(),
            category,
            total_trainings: 5,
            completed_count: if status == Status::Approved { 5 } else { 1 },
            pass_rate: if status == Status::Approved { 100.0 } else { 20.0 },
            status,
            conflicts: Vec::new(),
        }
    }

    fn both() -> BTreeSet<Category> {
        Category::ALL.into_iter().collect()
    }

    fn sample() -> Vec<EmployeeAggregate> {
        vec![
            employee("a@corp.com", "Zoe", Status::Approved),
            employee("b@corp.com", "Bob", Status::Failed),
            employee("externo.c@corp.com", "Bob", Status::Approved),
            employee("externo.d@corp.com", "Bob", Status::Approved),
            employee("externo.e@corp.com", "Mia", Status::Failed),
        ]
    }

    #[test]
    fn counts_split_by_category_and_status() {
        let rows = rollup_by_manager(&sample(), &both());
        let names: Vec<&str> = rows.iter().map(|r| r.manager_name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Mia", "Zoe"]);

        let bob = &rows[0];
        assert_eq!(bob.approved_internal, 0);
        assert_eq!(bob.failed_internal, 1);
        assert_eq!(bob.approved_external, 2);
        assert_eq!(bob.failed_external, 0);
        assert!((bob.pass_percentage - 66.67).abs() < 1e-9);
    }

    #[test]
    fn pass_percentage_matches_counts() {
        let employees = sample();
        for row in rollup_by_manager(&employees, &both()) {
            let under_manager = employees
                .iter()
                .filter(|e| e.manager_name == row.manager_name)
                .count();
            assert_eq!(row.employee_count(), under_manager);
            let recomputed = (row.approved_internal + row.approved_external) as f64 * 100.0
                / row.employee_count() as f64;
            assert!((row.pass_percentage - recomputed).abs() <= 0.01);
        }
    }

    #[test]
    fn removing_a_category_shrinks_or_drops_managers() {
        let employees = sample();
        let full = rollup_by_manager(&employees, &both());
        let internal_only: BTreeSet<Category> = [Category::Internal].into_iter().collect();
        let filtered = rollup_by_manager(&employees, &internal_only);

        assert!(filtered.iter().all(|row| row.manager_name != "Mia"));
        for row in &filtered {
            let unfiltered = full
                .iter()
                .find(|r| r.manager_name == row.manager_name)
                .expect("manager present without filter");
            assert!(row.employee_count() <= unfiltered.employee_count());
        }
        let bob = filtered.iter().find(|r| r.manager_name == "Bob").unwrap();
        assert_eq!(bob.pass_percentage, 0.0);
    }

    #[test]
    fn empty_filter_yields_empty_rollup() {
        assert!(rollup_by_manager(&sample(), &BTreeSet::new()).is_empty());
        assert!(rollup_by_manager(&[], &both()).is_empty());
    }
}
