//! Anomalous-transaction detection on the monetary column.
//!
//! Two user-selectable methods with an adjustable parameter each:
//! z-score against a threshold, or IQR fences against a multiplier. Both
//! return the flagged row subset plus the subset of flagged rows labeled
//! fraud, so the caller can cross-tabulate "how many flagged anomalies are
//! actually labeled fraud".

use serde::Serialize;

use crate::{
    error::{LensError, LensResult},
    rowset::{RowSet, Value},
    types::{AMOUNT_COL, DEFAULT_IQR_MULTIPLIER, DEFAULT_Z_THRESHOLD, FRAUD_COL, FRAUD_LABEL},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    /// Flag |z| > threshold. The z-score uses the population standard
    /// deviation, with no degrees-of-freedom correction.
    ZScore { threshold: f64 },
    /// Flag values outside [Q1 - k·IQR, Q3 + k·IQR].
    Iqr { multiplier: f64 },
}

impl Default for Method {
    fn default() -> Self {
        Method::ZScore {
            threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

impl Method {
    pub fn iqr_default() -> Self {
        Method::Iqr {
            multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

/// Boundary description of the detection run, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Bounds {
    ZScore {
        mean: f64,
        std_dev: f64,
        threshold: f64,
    },
    Iqr {
        q1: f64,
        q3: f64,
        lower: f64,
        upper: f64,
        multiplier: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    /// Flagged rows. The z-score method appends a derived `z_score` column;
    /// for the IQR method the flag itself is the score.
    pub flagged: RowSet,
    /// Flagged rows whose fraud label is "Fraud".
    pub fraud_flagged: RowSet,
    pub bounds: Bounds,
}

pub fn detect(view: &RowSet, method: Method) -> LensResult<OutlierReport> {
    let amount_idx = view
        .column_index(AMOUNT_COL)
        .ok_or_else(|| LensError::MissingColumn {
            table: "merged view".into(),
            column: AMOUNT_COL.into(),
        })?;

    // Rows with a numeric amount participate; everything else is skipped,
    // mirroring the coerce-and-drop cleaning upstream.
    let samples: Vec<(usize, f64)> = view
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row[amount_idx].as_f64().map(|v| (i, v)))
        .collect();

    if samples.is_empty() {
        return Err(LensError::EmptyInput {
            table: "merged view".into(),
        });
    }

    match method {
        Method::ZScore { threshold } => z_score_detect(view, &samples, threshold),
        Method::Iqr { multiplier } => iqr_detect(view, &samples, multiplier),
    }
}

fn z_score_detect(
    view: &RowSet,
    samples: &[(usize, f64)],
    threshold: f64,
) -> LensResult<OutlierReport> {
    let n = samples.len() as f64;
    let mean = samples.iter().map(|(_, v)| v).sum::<f64>() / n;
    let var = samples.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = var.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return Err(LensError::ZeroVariance);
    }

    let mut columns = view.columns().to_vec();
    columns.push("z_score".into());
    let mut flagged = RowSet::new(columns.clone());
    let mut fraud_flagged = RowSet::new(columns);

    let fraud_idx = view.column_index(FRAUD_COL);
    for &(row_idx, value) in samples {
        let z = (value - mean) / std_dev;
        if z.abs() > threshold {
            let mut row = view.rows()[row_idx].clone();
            row.push(Value::Float(z));
            if is_fraud(&row, fraud_idx) {
                fraud_flagged.push_row(row.clone());
            }
            flagged.push_row(row);
        }
    }

    Ok(OutlierReport {
        flagged,
        fraud_flagged,
        bounds: Bounds::ZScore {
            mean,
            std_dev,
            threshold,
        },
    })
}

fn iqr_detect(
    view: &RowSet,
    samples: &[(usize, f64)],
    multiplier: f64,
) -> LensResult<OutlierReport> {
    let mut sorted: Vec<f64> = samples.iter().map(|&(_, v)| v).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - multiplier * iqr;
    let upper = q3 + multiplier * iqr;

    let columns = view.columns().to_vec();
    let mut flagged = RowSet::new(columns.clone());
    let mut fraud_flagged = RowSet::new(columns);

    let fraud_idx = view.column_index(FRAUD_COL);
    for &(row_idx, value) in samples {
        if value < lower || value > upper {
            let row = view.rows()[row_idx].clone();
            if is_fraud(&row, fraud_idx) {
                fraud_flagged.push_row(row.clone());
            }
            flagged.push_row(row);
        }
    }

    Ok(OutlierReport {
        flagged,
        fraud_flagged,
        bounds: Bounds::Iqr {
            q1,
            q3,
            lower,
            upper,
            multiplier,
        },
    })
}

fn is_fraud(row: &[Value], fraud_idx: Option<usize>) -> bool {
    fraud_idx.is_some_and(|i| row[i].as_str() == Some(FRAUD_LABEL))
}

/// Linear-interpolation quantile over a sorted slice
/// (`[1..9, 1000]` gives Q1 = 3.25, Q3 = 7.75).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    let pos = q * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    if lower == upper || upper >= n {
        sorted[lower.min(n - 1)]
    } else {
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}
