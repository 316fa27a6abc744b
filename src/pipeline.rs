use std::collections::BTreeSet;

use serde::Serialize;

use crate::aggregate::aggregate_employees;
use crate::load::Dataset;
use crate::models::{Category, CategorySummary, EmployeeAggregate, ManagerRollup, NormalizedRecord};
use crate::normalize::{normalize, title_case};
use crate::rollup::rollup_by_manager;
use crate::views::{category_summary, failing_employees};

#[derive(Debug, Clone)]
pub struct Filters {
    pub categories: BTreeSet<Category>,
    /// `None` keeps every manager present after category filtering.
    pub managers: Option<BTreeSet<String>>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            categories: Category::ALL.into_iter().collect(),
            managers: None,
        }
    }
}

impl Filters {
    /// Builds filters from user input. An empty category list means every
    /// category; manager names are title-cased to match normalized data.
    pub fn from_args(categories: &[Category], managers: &[String]) -> Self {
        let categories = if categories.is_empty() {
            Category::ALL.into_iter().collect()
        } else {
            categories.iter().copied().collect()
        };
        let managers = (!managers.is_empty())
            .then(|| managers.iter().map(|name| title_case(name)).collect());

        Self {
            categories,
            managers,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub record_count: usize,
    pub employees: Vec<EmployeeAggregate>,
    pub managers: Vec<ManagerRollup>,
    pub failing: Vec<EmployeeAggregate>,
    pub summary: CategorySummary,
}

pub fn normalize_all(dataset: &Dataset) -> Vec<NormalizedRecord> {
    dataset
        .records
        .iter()
        .map(|raw| normalize(raw, dataset.name_strategy))
        .collect()
}

/// Recomputes every derived table from the dataset; nothing is cached.
pub fn run(dataset: &Dataset, filters: &Filters) -> TrainingReport {
    let normalized = normalize_all(dataset);
    let employees = aggregate_employees(&normalized);
    let managers = rollup_by_manager(&employees, &filters.categories);
    let failing = failing_employees(&employees, &filters.categories, filters.managers.as_ref());
    let summary = category_summary(&employees, &filters.categories);

    tracing::debug!(
        records = normalized.len(),
        employees = employees.len(),
        managers = managers.len(),
        failing = failing.len(),
        "pipeline run complete"
    );

    TrainingReport {
        record_count: normalized.len(),
        employees,
        managers,
        failing,
        summary,
    }
}
