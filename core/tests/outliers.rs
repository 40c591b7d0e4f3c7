use fraudlens_core::error::LensError;
use fraudlens_core::outlier::{self, Bounds, Method};
use fraudlens_core::rowset::{RowSet, Value};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A minimal view: amounts with optional fraud labels (default "Non-Fraud").
fn amounts_view(values: &[f64]) -> RowSet {
    labeled_view(&values.iter().map(|&v| (v, "Non-Fraud")).collect::<Vec<_>>())
}

fn labeled_view(rows: &[(f64, &str)]) -> RowSet {
    let mut rs = RowSet::new(vec!["amount".into(), "fraud_classification".into()]);
    for &(amount, label) in rows {
        rs.push_row(vec![Value::Float(amount), Value::Text(label.into())]);
    }
    rs
}

// ── Z-score ──────────────────────────────────────────────────────────────────

/// Population-standard-deviation convention, checked by hand: for
/// [10, 10, 10, 10, 100] the mean is 28, the population std is 36, and the
/// extreme value scores exactly z = 2.0. With a 1.5 threshold exactly that
/// value is flagged.
#[test]
fn z_score_uses_population_std_dev() {
    let view = amounts_view(&[10.0, 10.0, 10.0, 10.0, 100.0]);
    let report = outlier::detect(&view, Method::ZScore { threshold: 1.5 }).unwrap();

    assert_eq!(report.flagged.len(), 1);
    assert_eq!(report.flagged.value(0, "amount"), Some(&Value::Float(100.0)));

    let z = report
        .flagged
        .value(0, "z_score")
        .and_then(|v| v.as_f64())
        .unwrap();
    assert!((z - 2.0).abs() < 1e-12, "expected z = 2.0, got {z}");

    match report.bounds {
        Bounds::ZScore { mean, std_dev, .. } => {
            assert!((mean - 28.0).abs() < 1e-12);
            assert!((std_dev - 36.0).abs() < 1e-12);
        }
        other => panic!("expected z-score bounds, got {other:?}"),
    }
}

/// At the default 3.0 threshold an extreme value still has to clear the
/// population z-score: ten 10s plus one 100 give z ≈ 3.16 for the extreme
/// and it alone is flagged.
#[test]
fn default_threshold_flags_only_the_extreme() {
    let mut values = vec![10.0; 10];
    values.push(100.0);
    let view = amounts_view(&values);

    let report = outlier::detect(&view, Method::default()).unwrap();
    assert_eq!(report.flagged.len(), 1);
    assert_eq!(report.flagged.value(0, "amount"), Some(&Value::Float(100.0)));
}

/// Zero variance makes the z-score undefined: the method reports it rather
/// than propagating a division by zero.
#[test]
fn zero_variance_is_undefined() {
    let view = amounts_view(&[5.0, 5.0, 5.0, 5.0, 5.0]);
    let err = outlier::detect(&view, Method::default()).unwrap_err();
    assert!(
        matches!(err, LensError::ZeroVariance),
        "expected ZeroVariance, got {err}"
    );
}

/// The flagged row-set carries the derived z_score column.
#[test]
fn z_score_column_is_appended() {
    let view = amounts_view(&[10.0, 10.0, 10.0, 10.0, 100.0]);
    let report = outlier::detect(&view, Method::ZScore { threshold: 1.5 }).unwrap();
    assert_eq!(report.flagged.columns().last().map(String::as_str), Some("z_score"));
}

// ── IQR ──────────────────────────────────────────────────────────────────────

/// Hand-checked fences for [1..9, 1000]: Q1 = 3.25, Q3 = 7.75, IQR = 4.5,
/// k = 1.5 ⇒ upper bound 14.5 ⇒ only 1000 is flagged.
#[test]
fn iqr_fences_flag_only_the_extreme() {
    let view = amounts_view(&[
        1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 1000.0,
    ]);
    let report = outlier::detect(&view, Method::iqr_default()).unwrap();

    assert_eq!(report.flagged.len(), 1);
    assert_eq!(
        report.flagged.value(0, "amount"),
        Some(&Value::Float(1000.0))
    );

    match report.bounds {
        Bounds::Iqr {
            q1,
            q3,
            lower,
            upper,
            ..
        } => {
            assert!((q1 - 3.25).abs() < 1e-12, "Q1 = {q1}");
            assert!((q3 - 7.75).abs() < 1e-12, "Q3 = {q3}");
            assert!((lower - (-3.5)).abs() < 1e-12, "lower = {lower}");
            assert!((upper - 14.5).abs() < 1e-12, "upper = {upper}");
        }
        other => panic!("expected IQR bounds, got {other:?}"),
    }
}

/// A wider multiplier widens the fences; nothing is flagged once the extreme
/// value falls inside them.
#[test]
fn multiplier_widens_the_fences() {
    let view = amounts_view(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 20.0]);
    let tight = outlier::detect(&view, Method::Iqr { multiplier: 1.0 }).unwrap();
    let wide = outlier::detect(&view, Method::Iqr { multiplier: 3.0 }).unwrap();
    assert!(tight.flagged.len() >= wide.flagged.len());
    assert_eq!(wide.flagged.len(), 0);
}

// ── Cross-tabulation ─────────────────────────────────────────────────────────

/// The report separately carries the flagged rows labeled fraud, supporting
/// the "how many flagged anomalies are actually fraud" cross-tab.
#[test]
fn fraud_subset_of_flagged_rows() {
    let mut rows: Vec<(f64, &str)> = vec![(10.0, "Non-Fraud"); 10];
    rows.push((900.0, "Fraud"));
    rows.push((950.0, "Non-Fraud"));
    let view = labeled_view(&rows);
    let report = outlier::detect(&view, Method::iqr_default()).unwrap();

    assert_eq!(report.flagged.len(), 2);
    assert_eq!(report.fraud_flagged.len(), 1);
    assert_eq!(
        report.fraud_flagged.value(0, "amount"),
        Some(&Value::Float(900.0))
    );
}

/// A view without an amount column is a data-shape failure, not a panic.
#[test]
fn missing_amount_column_is_reported() {
    let view = RowSet::new(vec!["other".into()]);
    let err = outlier::detect(&view, Method::default()).unwrap_err();
    assert!(
        matches!(err, LensError::MissingColumn { ref column, .. } if column == "amount"),
        "expected MissingColumn for amount, got {err}"
    );
}
