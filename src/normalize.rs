use crate::models::{Category, NormalizedRecord, RawRecord};

const EXTERNAL_PREFIX: &str = "extern";
const COMPLETED: &str = "completed";

/// How employee display names are derived, decided once per dataset from its
/// header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStrategy {
    /// `first_name` and `last_name` columns are both present.
    SplitColumns,
    /// Derive the name from the local part of the email address.
    EmailLocalPart,
}

impl NameStrategy {
    pub fn from_columns(has_first_name: bool, has_last_name: bool) -> Self {
        if has_first_name && has_last_name {
            NameStrategy::SplitColumns
        } else {
            NameStrategy::EmailLocalPart
        }
    }
}

pub fn normalize(raw: &RawRecord, strategy: NameStrategy) -> NormalizedRecord {
    let email = normalize_email(raw.email.as_deref());

    let employee_name = match strategy {
        NameStrategy::SplitColumns => {
            let first = raw.first_name.as_deref().unwrap_or_default();
            let last = raw.last_name.as_deref().unwrap_or_default();
            title_case(&format!("{} {}", first.trim(), last.trim()))
        }
        NameStrategy::EmailLocalPart => name_from_email(&email),
    };

    NormalizedRecord {
        category: categorize(&email),
        employee_name,
        manager_name: title_case(raw.manager_name.as_deref().unwrap_or_default()),
        department: title_case(raw.department.as_deref().unwrap_or_default()),
        completed: is_completed(raw.training_status.as_deref()),
        email,
    }
}

pub fn normalize_email(email: Option<&str>) -> String {
    email.unwrap_or_default().trim().to_lowercase()
}

pub fn categorize(email: &str) -> Category {
    if email.to_lowercase().starts_with(EXTERNAL_PREFIX) {
        Category::External
    } else {
        Category::Internal
    }
}

/// Only an exact (case- and whitespace-insensitive) "completed" counts.
pub fn is_completed(status: Option<&str>) -> bool {
    status.is_some_and(|value| value.trim().to_lowercase() == COMPLETED)
}

pub fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let spaced: String = local
        .chars()
        .map(|c| if matches!(c, '.' | '_' | '-') { ' ' } else { c })
        .collect();
    title_case(&spaced)
}

/// Trims, then upper-cases the first letter of every word and lower-cases the
/// rest. A word starts after any non-alphanumeric character.
pub fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut at_word_start = true;

    for c in value.trim().chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                output.extend(c.to_uppercase());
            } else {
                output.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            output.push(c);
            at_word_start = true;
        }
    }

    output
}
