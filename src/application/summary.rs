//! Monthly roll-ups shown on the finances page and the dashboard.

use crate::domain::entries::{FinanceEntry, FinanceKind, Goal, HealthEntry, Task};
use crate::domain::error::DomainError;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

const TOP_CATEGORY_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
    pub top_categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalStats {
    pub total: usize,
    pub average_progress: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub tasks: TaskStats,
    pub goals: GoalStats,
    pub health_entries: usize,
    pub finances: FinanceSummary,
}

/// `YYYY-MM` of the current UTC date.
pub fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

pub fn validate_month(month: &str) -> Result<(), DomainError> {
    let well_formed = month.len() == 7
        && NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "Month must be formatted as YYYY-MM, got {}",
            month
        )))
    }
}

pub fn summarize_finances(entries: &[FinanceEntry], month: &str) -> FinanceSummary {
    let mut income = 0.0;
    let mut expenses = 0.0;
    let mut by_category: HashMap<&str, f64> = HashMap::new();

    for entry in entries.iter().filter(|e| e.date.starts_with(month)) {
        match entry.kind {
            FinanceKind::Income => income += entry.amount,
            FinanceKind::Expense => {
                expenses += entry.amount;
                *by_category.entry(entry.category.as_str()).or_insert(0.0) += entry.amount;
            }
        }
    }

    let mut top_categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    top_categories.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    top_categories.truncate(TOP_CATEGORY_COUNT);

    FinanceSummary {
        month: month.to_string(),
        income,
        expenses,
        balance: income - expenses,
        top_categories,
    }
}

pub fn build_dashboard(
    tasks: &[Task],
    goals: &[Goal],
    health_entries: &[HealthEntry],
    finances: &[FinanceEntry],
    month: &str,
) -> Dashboard {
    let average_progress = if goals.is_empty() {
        0.0
    } else {
        goals.iter().map(|g| f64::from(g.progress)).sum::<f64>() / goals.len() as f64
    };

    Dashboard {
        tasks: TaskStats {
            total: tasks.len(),
            completed: tasks.iter().filter(|t| t.completed).count(),
        },
        goals: GoalStats {
            total: goals.len(),
            average_progress,
        },
        health_entries: health_entries.len(),
        finances: summarize_finances(finances, month),
    }
}
