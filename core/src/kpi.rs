//! Headline KPI reductions over the merged view.
//!
//! Pure reductions, no side effects: an empty (or fully filtered-out) view
//! yields zero for every metric, never an error.

use std::collections::BTreeSet;

use chrono::Datelike;
use serde::Serialize;

use crate::{
    rowset::{RowSet, Value},
    types::{AMOUNT_COL, DATE_COL, FRAUD_COL, FRAUD_LABEL, GENDER_COL},
};

/// Exact-match filters; `None` means "All".
#[derive(Debug, Clone, Default)]
pub struct KpiFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub gender: Option<String>,
}

impl KpiFilter {
    fn matches(&self, row: &[Value], date_idx: Option<usize>, gender_idx: Option<usize>) -> bool {
        if let Some(year) = self.year {
            match date_idx.and_then(|i| row[i].as_timestamp()) {
                Some(t) if t.year() == year => {}
                _ => return false,
            }
        }
        if let Some(month) = self.month {
            match date_idx.and_then(|i| row[i].as_timestamp()) {
                Some(t) if t.month() == month => {}
                _ => return false,
            }
        }
        if let Some(gender) = &self.gender {
            if gender_idx.and_then(|i| row[i].as_str()) != Some(gender.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_transactions: u64,
    /// Rounded to 2 decimal places.
    pub total_amount: f64,
    pub fraud_transactions: u64,
    /// Rounded to 2 decimal places.
    pub fraud_amount: f64,
}

pub fn compute(view: &RowSet, filter: &KpiFilter) -> KpiSummary {
    let amount_idx = view.column_index(AMOUNT_COL);
    let date_idx = view.column_index(DATE_COL);
    let fraud_idx = view.column_index(FRAUD_COL);
    let gender_idx = view.column_index(GENDER_COL);

    let mut total_transactions = 0u64;
    let mut total_amount = 0.0f64;
    let mut fraud_transactions = 0u64;
    let mut fraud_amount = 0.0f64;

    for row in view.rows() {
        if !filter.matches(row, date_idx, gender_idx) {
            continue;
        }
        total_transactions += 1;
        let amount = amount_idx.and_then(|i| row[i].as_f64()).unwrap_or(0.0);
        total_amount += amount;

        let is_fraud = fraud_idx.is_some_and(|i| row[i].as_str() == Some(FRAUD_LABEL));
        if is_fraud {
            fraud_transactions += 1;
            fraud_amount += amount;
        }
    }

    KpiSummary {
        total_transactions,
        total_amount: round2(total_amount),
        fraud_transactions,
        fraud_amount: round2(fraud_amount),
    }
}

/// Distinct filter choices the dashboard offers, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub genders: Vec<String>,
}

pub fn filter_options(view: &RowSet) -> FilterOptions {
    let date_idx = view.column_index(DATE_COL);
    let gender_idx = view.column_index(GENDER_COL);

    let mut years = BTreeSet::new();
    let mut months = BTreeSet::new();
    let mut genders = BTreeSet::new();

    for row in view.rows() {
        if let Some(t) = date_idx.and_then(|i| row[i].as_timestamp()) {
            years.insert(t.year());
            months.insert(t.month());
        }
        if let Some(g) = gender_idx.and_then(|i| row[i].as_str()) {
            genders.insert(g.to_string());
        }
    }

    FilterOptions {
        years: years.into_iter().collect(),
        months: months.into_iter().collect(),
        genders: genders.into_iter().collect(),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
