//! Fraud vs non-fraud statistics over the monetary column.
//!
//! The comparison partitions the merged view by exact fraud label, summarizes
//! each group, and runs Welch's two-sample t-test: the unequal-variance
//! form, which does not assume the two groups share a variance. The
//! two-tailed p-value comes from the Student-t survival function, evaluated
//! through the regularized incomplete beta function in continued-fraction
//! form.

use serde::Serialize;

use crate::{
    rowset::RowSet,
    types::{AMOUNT_COL, FRAUD_COL, FRAUD_LABEL, NON_FRAUD_LABEL, P_SIGNIFICANT},
};

/// Descriptive statistics for one labeled group. `std_dev` is the sample
/// standard deviation (n - 1), matching the test's variance convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelchTest {
    pub t_stat: f64,
    pub df: f64,
    pub p_value: f64,
    /// p < 0.05, the fixed design threshold.
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Comparison {
    /// Either group has fewer than 2 observations; the test is undefined.
    Insufficient {
        fraud_count: usize,
        non_fraud_count: usize,
    },
    Tested {
        fraud: GroupSummary,
        non_fraud: GroupSummary,
        test: WelchTest,
        /// Share of all view rows labeled fraud, in percent.
        fraud_rate_pct: f64,
    },
}

impl Comparison {
    /// Human-readable conclusion for the presentation boundary.
    pub fn verdict(&self) -> &'static str {
        match self {
            Comparison::Insufficient { .. } => "insufficient data",
            Comparison::Tested { test, .. } if test.significant => {
                "statistically significant difference (p < 0.05)"
            }
            Comparison::Tested { .. } => "no significant difference",
        }
    }
}

pub fn compare_groups(view: &RowSet) -> Comparison {
    let (fraud, non_fraud) = partition_amounts(view);

    if fraud.len() < 2 || non_fraud.len() < 2 {
        return Comparison::Insufficient {
            fraud_count: fraud.len(),
            non_fraud_count: non_fraud.len(),
        };
    }

    let fraud_rate_pct = if view.is_empty() {
        0.0
    } else {
        fraud.len() as f64 / view.len() as f64 * 100.0
    };

    let fraud = summarize(FRAUD_LABEL, fraud);
    let non_fraud = summarize(NON_FRAUD_LABEL, non_fraud);
    let test = welch_t_test(&fraud, &non_fraud);

    Comparison::Tested {
        fraud,
        non_fraud,
        test,
        fraud_rate_pct,
    }
}

/// Numeric amounts split by exact label match. Rows with any other label are
/// excluded from the comparison, not merged into either group.
fn partition_amounts(view: &RowSet) -> (Vec<f64>, Vec<f64>) {
    let (Some(amount_idx), Some(fraud_idx)) = (
        view.column_index(AMOUNT_COL),
        view.column_index(FRAUD_COL),
    ) else {
        return (Vec::new(), Vec::new());
    };

    let mut fraud = Vec::new();
    let mut non_fraud = Vec::new();
    for row in view.rows() {
        let Some(amount) = row[amount_idx].as_f64() else {
            continue;
        };
        match row[fraud_idx].as_str() {
            Some(FRAUD_LABEL) => fraud.push(amount),
            Some(NON_FRAUD_LABEL) => non_fraud.push(amount),
            _ => {}
        }
    }
    (fraud, non_fraud)
}

fn summarize(label: &str, mut values: Vec<f64>) -> GroupSummary {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };

    GroupSummary {
        label: label.to_string(),
        count: n,
        mean,
        std_dev: var.sqrt(),
        min: values[0],
        max: values[n - 1],
        median,
    }
}

fn welch_t_test(a: &GroupSummary, b: &GroupSummary) -> WelchTest {
    let sa = a.std_dev * a.std_dev / a.count as f64;
    let sb = b.std_dev * b.std_dev / b.count as f64;

    let t_stat = (a.mean - b.mean) / (sa + sb).sqrt();

    // Welch–Satterthwaite degrees of freedom.
    let df = (sa + sb).powi(2)
        / (sa * sa / (a.count - 1) as f64 + sb * sb / (b.count - 1) as f64);

    let p_value = two_tailed_p(t_stat, df);

    WelchTest {
        t_stat,
        df,
        p_value,
        significant: p_value < P_SIGNIFICANT,
    }
}

/// P(|T| > t) under Student's t with `df` degrees of freedom:
/// I_x(df/2, 1/2) with x = df / (df + t²).
fn two_tailed_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    incomplete_beta(df / 2.0, 0.5, df / (df + t * t))
}

/// Regularized incomplete beta function I_x(a, b).
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let front =
        (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    // The continued fraction converges fast only on one side of the mean;
    // use the symmetry I_x(a,b) = 1 - I_{1-x}(b,a) on the other.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_cf(a, b, x) / a
    } else {
        1.0 - front * beta_cf(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 3.0e-14;
    const FPMIN: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Lanczos approximation of ln Γ(x) for x > 0.
fn ln_gamma(x: f64) -> f64 {
    const COEF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];

    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    for c in COEF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}
