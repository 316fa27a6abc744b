use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::percentage;
use crate::models::{Category, CategorySummary, EmployeeAggregate, Status, StatusCounts};

impl CategorySummary {
    pub fn count(&self, category: Category, status: Status) -> usize {
        self.counts
            .get(&category)
            .map_or(0, |counts| counts.get(status))
    }

    pub fn approved_pct(&self, category: Category) -> f64 {
        let counts = self.counts.get(&category).copied().unwrap_or_default();
        percentage(counts.approved, counts.total())
    }

    pub fn failed_pct(&self, category: Category) -> f64 {
        let counts = self.counts.get(&category).copied().unwrap_or_default();
        percentage(counts.failed, counts.total())
    }

    pub fn total(&self) -> usize {
        self.counts.values().map(StatusCounts::total).sum()
    }
}

/// Sorted, de-duplicated manager names among employees in `categories`.
pub fn managers(employees: &[EmployeeAggregate], categories: &BTreeSet<Category>) -> Vec<String> {
    employees
        .iter()
        .filter(|employee| categories.contains(&employee.category))
        .map(|employee| employee.manager_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Failed employees in `categories` whose manager is in `managers` (every
/// manager when `None`), lowest pass rate first.
pub fn failing_employees(
    employees: &[EmployeeAggregate],
    categories: &BTreeSet<Category>,
    managers: Option<&BTreeSet<String>>,
) -> Vec<EmployeeAggregate> {
    let mut failing: Vec<EmployeeAggregate> = employees
        .iter()
        .filter(|employee| categories.contains(&employee.category))
        .filter(|employee| employee.status == Status::Failed)
        .filter(|employee| managers.map_or(true, |set| set.contains(&employee.manager_name)))
        .cloned()
        .collect();

    // Stable, so equal rates keep email order.
    failing.sort_by(|a, b| a.pass_rate.total_cmp(&b.pass_rate));
    failing
}

pub fn category_summary(
    employees: &[EmployeeAggregate],
    categories: &BTreeSet<Category>,
) -> CategorySummary {
    let mut counts: BTreeMap<Category, StatusCounts> = Category::ALL
        .into_iter()
        .map(|category| (category, StatusCounts::default()))
        .collect();

    for employee in employees
        .iter()
        .filter(|employee| categories.contains(&employee.category))
    {
        let entry = counts.entry(employee.category).or_default();
        match employee.status {
            Status::Approved => entry.approved += 1,
            Status::Failed => entry.failed += 1,
        }
    }

    CategorySummary { counts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(email: &str, manager: &str, completed: usize) -> EmployeeAggregate {
        let total = 5;
        EmployeeAggregate {
            email: email.to_string(),
            employee_name: email.to_string(),
            manager_name: manager.to_string(),
            department: "Ops".to_string(),
            category: crate::normalize::categorize(email),
            total_trainings: total,
            completed_count: completed,
            pass_rate: percentage(completed, total),
            status: crate::aggregate::classify(completed, total),
            conflicts: Vec::new(),
        }
    }

    fn sample() -> Vec<EmployeeAggregate> {
        vec![
            employee("a@corp.com", "Bob", 3),
            employee("b@corp.com", "Bob", 5),
            employee("c@corp.com", "Carol", 1),
            employee("externo.d@corp.com", "Carol", 2),
            employee("externo.e@corp.com", "Bob", 4),
        ]
    }

    fn both() -> BTreeSet<Category> {
        Category::ALL.into_iter().collect()
    }

    #[test]
    fn failing_view_sorts_lowest_first() {
        let failing = failing_employees(&sample(), &both(), None);
        let emails: Vec<&str> = failing.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(emails, vec!["c@corp.com", "externo.d@corp.com", "a@corp.com"]);
        assert!(failing.iter().all(|e| e.status == Status::Failed));
    }

    #[test]
    fn failing_view_respects_manager_and_category_filters() {
        let bob: BTreeSet<String> = ["Bob".to_string()].into_iter().collect();
        let failing = failing_employees(&sample(), &both(), Some(&bob));
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].email, "a@corp.com");

        let external: BTreeSet<Category> = [Category::External].into_iter().collect();
        let failing = failing_employees(&sample(), &external, None);
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].email, "externo.d@corp.com");

        assert!(failing_employees(&sample(), &both(), Some(&BTreeSet::new())).is_empty());
    }

    #[test]
    fn summary_always_has_every_key() {
        let internal: BTreeSet<Category> = [Category::Internal].into_iter().collect();
        let summary = category_summary(&sample(), &internal);
        assert_eq!(summary.count(Category::Internal, Status::Approved), 1);
        assert_eq!(summary.count(Category::Internal, Status::Failed), 2);
        assert_eq!(summary.count(Category::External, Status::Approved), 0);
        assert_eq!(summary.count(Category::External, Status::Failed), 0);
        assert_eq!(summary.counts.len(), 2);
        assert!((summary.approved_pct(Category::Internal) - 33.33).abs() < 1e-9);
        assert!((summary.failed_pct(Category::Internal) - 66.67).abs() < 1e-9);
        assert_eq!(summary.approved_pct(Category::External), 0.0);

        let empty = category_summary(&[], &both());
        assert_eq!(empty.total(), 0);
        assert_eq!(empty.counts.len(), 2);
    }

    #[test]
    fn manager_list_is_sorted_and_unique() {
        let external: BTreeSet<Category> = [Category::External].into_iter().collect();
        assert_eq!(managers(&sample(), &both()), vec!["Bob", "Carol"]);
        assert_eq!(managers(&sample(), &external), vec!["Bob", "Carol"]);
        assert!(managers(&sample(), &BTreeSet::new()).is_empty());
    }
}
