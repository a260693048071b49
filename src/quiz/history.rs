// src/quiz/history.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{HISTORY_TABLE_LIMIT, RESTRICTED_CATEGORY};
use crate::models::result::QuizResult;
use crate::quiz::result::{QuizType, passed, percentage};

/// Read-time projections over a user's stored results. Nothing here
/// mutates the rows; the handler fetches them newest-first and derives
/// whatever the current view needs.

/// Distinct categories in first-seen (newest-first) order, for the chart
/// category picker.
pub fn categories(results: &[QuizResult]) -> Vec<String> {
    let mut seen = Vec::new();
    for r in results {
        if !seen.contains(&r.category) {
            seen.push(r.category.clone());
        }
    }
    seen
}

/// The chart defaults to the fixed category when present, otherwise the
/// most recent one.
pub fn default_category(categories: &[String]) -> Option<&str> {
    categories
        .iter()
        .find(|c| c.as_str() == RESTRICTED_CATEGORY)
        .or_else(|| categories.first())
        .map(|c| c.as_str())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub percentage: u32,
}

/// Chronologically-ascending score series for one category.
/// `results` arrive newest-first, so the filtered series is reversed.
pub fn chart_series(results: &[QuizResult], category: &str) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = results
        .iter()
        .filter(|r| r.category == category)
        .map(|r| ChartPoint {
            timestamp: r.created_at.unwrap_or_default(),
            percentage: percentage(r.score as u32, r.total_questions as u32),
        })
        .collect();
    points.reverse();
    points
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableRow {
    pub result_id: i64,
    pub date: DateTime<Utc>,
    pub category: String,
    /// Mode-dependent: minutes per question for custom results, seconds
    /// taken for interview results.
    pub time_spent: i64,
    pub percentage: u32,
    pub passed: bool,
}

/// The 10 most recent results of the active quiz-type tab.
pub fn table_rows(results: &[QuizResult], tab: QuizType) -> Vec<TableRow> {
    results
        .iter()
        .filter(|r| QuizType::from_str(&r.quiz_type) == tab)
        .take(HISTORY_TABLE_LIMIT)
        .map(|r| {
            let pct = percentage(r.score as u32, r.total_questions as u32);
            let time_spent = match tab {
                QuizType::Custom => r.time_per_question.unwrap_or(0),
                QuizType::Interview => r.time_taken_seconds.unwrap_or(0),
            };
            TableRow {
                result_id: r.id,
                date: r.created_at.unwrap_or_default(),
                category: r.category.clone(),
                time_spent,
                percentage: pct,
                passed: passed(tab, pct),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Date,
    Category,
    TimeSpent,
    Percentage,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Current sort state of the table. Clicking the active column toggles the
/// direction; clicking a different column resets to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            column: SortColumn::Date,
            direction: SortDirection::Descending,
        }
    }
}

impl SortSpec {
    pub fn click(self, column: SortColumn) -> SortSpec {
        let direction = if self.column == column {
            match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            }
        } else {
            SortDirection::Ascending
        };
        SortSpec { column, direction }
    }
}

/// Stable sort; rows comparing equal keep their relative (newest-first)
/// order, and descending is the exact reverse comparator.
pub fn sort_rows(rows: &mut [TableRow], spec: SortSpec) {
    rows.sort_by(|a, b| {
        let ordering = match spec.column {
            SortColumn::Date => a.date.cmp(&b.date),
            SortColumn::Category => a.category.cmp(&b.category),
            SortColumn::TimeSpent => a.time_spent.cmp(&b.time_spent),
            SortColumn::Percentage => a.percentage.cmp(&b.percentage),
            // Binary: pass = 1, fail = 0.
            SortColumn::Status => (a.passed as u8).cmp(&(b.passed as u8)),
        };
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
