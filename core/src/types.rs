//! Shared column names and fixed design constants.

/// Fraud label vocabulary used by the source data.
pub const FRAUD_LABEL: &str = "Fraud";
pub const NON_FRAUD_LABEL: &str = "Non-Fraud";

/// Columns of the merged view the analytics stages rely on.
pub const AMOUNT_COL: &str = "amount";
pub const DATE_COL: &str = "date";
pub const HOUR_COL: &str = "hour";
pub const FRAUD_COL: &str = "fraud_classification";
pub const GENDER_COL: &str = "gender";

/// Two-tailed significance threshold for the Welch test. Fixed, not
/// user-configurable.
pub const P_SIGNIFICANT: f64 = 0.05;

/// Z-score flagging threshold: default and adjustable range.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;
pub const Z_THRESHOLD_RANGE: (f64, f64) = (2.0, 5.0);

/// IQR fence multiplier: default and adjustable range.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;
pub const IQR_MULTIPLIER_RANGE: (f64, f64) = (1.0, 3.0);
