use fraudlens_core::error::LensError;
use fraudlens_core::merge::{merge, MergeInputs};
use fraudlens_core::rowset::{RowSet, Value};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn transactions(rows: &[(i64, i64, i64, i64, &str, &str, &str)]) -> RowSet {
    let mut rs = RowSet::new(columns(&[
        "id",
        "client_id",
        "merchant_id",
        "card_id",
        "amount",
        "date",
        "fraud_classification",
    ]));
    for &(id, client, merchant, card, amount, date, fraud) in rows {
        rs.push_row(vec![
            Value::Int(id),
            Value::Int(client),
            Value::Int(merchant),
            Value::Int(card),
            Value::Text(amount.into()),
            Value::Text(date.into()),
            Value::Text(fraud.into()),
        ]);
    }
    rs
}

fn users(rows: &[(i64, &str, &str)]) -> RowSet {
    let mut rs = RowSet::new(columns(&["id", "gender", "AgeGroup"]));
    for &(id, gender, age) in rows {
        rs.push_row(vec![
            Value::Int(id),
            Value::Text(gender.into()),
            Value::Text(age.into()),
        ]);
    }
    rs
}

fn merchants(rows: &[(i64, &str)]) -> RowSet {
    let mut rs = RowSet::new(columns(&["merchant_id", "merchant_state"]));
    for &(id, state) in rows {
        rs.push_row(vec![Value::Int(id), Value::Text(state.into())]);
    }
    rs
}

fn cards(rows: &[(i64, &str)]) -> RowSet {
    let mut rs = RowSet::new(columns(&["card_id", "card_brand"]));
    for &(id, brand) in rows {
        rs.push_row(vec![Value::Int(id), Value::Text(brand.into())]);
    }
    rs
}

fn default_inputs() -> MergeInputs {
    MergeInputs {
        transactions: transactions(&[
            (1, 1, 1, 1, "$1,234.56", "2025-03-11 14:05:00", "Fraud"),
            (2, 2, 1, 2, "200.00", "2025-03-12 02:30:00", "Non-Fraud"),
        ]),
        users: users(&[(1, "F", "26-40"), (2, "M", "41-60")]),
        merchants: merchants(&[(1, "CA")]),
        cards: cards(&[(1, "Visa"), (2, "Amex")]),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Currency formatting is pattern-stripped before the parse: "$1,234.56"
/// cleans to the numeric value 1234.56.
#[test]
fn currency_formatting_is_stripped() {
    let view = merge(default_inputs()).unwrap();
    assert_eq!(view.value(0, "amount"), Some(&Value::Float(1234.56)));
    assert_eq!(view.value(1, "amount"), Some(&Value::Float(200.0)));
}

/// A row whose amount cannot be coerced to a number is dropped, and the
/// cleaned row count is the input count minus the dropped rows.
#[test]
fn unparseable_amounts_drop_their_rows() {
    let mut inputs = default_inputs();
    inputs.transactions = transactions(&[
        (1, 1, 1, 1, "100.00", "2025-03-11 14:05:00", "Non-Fraud"),
        (2, 1, 1, 1, "N/A", "2025-03-11 15:05:00", "Non-Fraud"),
        (3, 1, 1, 1, "300.00", "2025-03-11 16:05:00", "Fraud"),
    ]);
    let view = merge(inputs).unwrap();
    assert_eq!(view.len(), 2);
    assert_eq!(view.value(1, "amount"), Some(&Value::Float(300.0)));
}

/// Any empty input aborts the merge; never a partial result.
#[test]
fn empty_input_aborts_the_merge() {
    let mut inputs = default_inputs();
    inputs.users = RowSet::new(vec!["id".into(), "gender".into(), "AgeGroup".into()]);
    let err = merge(inputs).unwrap_err();
    assert!(
        matches!(err, LensError::EmptyInput { ref table } if table == "user"),
        "expected EmptyInput for user, got {err}"
    );
}

/// Left-join semantics: a transaction referencing a client absent from the
/// users row-set keeps its own fields and gets null joined attributes.
#[test]
fn unmatched_client_joins_null() {
    let mut inputs = default_inputs();
    inputs.transactions = transactions(&[
        (1, 99, 1, 1, "50.00", "2025-01-01 08:00:00", "Non-Fraud"),
    ]);
    let view = merge(inputs).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.value(0, "gender"), Some(&Value::Null));
    assert_eq!(view.value(0, "AgeGroup"), Some(&Value::Null));
    assert_eq!(view.value(0, "amount"), Some(&Value::Float(50.0)));
}

/// The merged row count always equals the cleaned transaction row count:
/// left joins neither drop nor duplicate rows.
#[test]
fn merged_row_count_matches_cleaned_transactions() {
    let view = merge(default_inputs()).unwrap();
    assert_eq!(view.len(), 2);
}

/// Duplicate keys on a right-hand side would silently fan out the merge, so
/// they are rejected loudly instead.
#[test]
fn duplicate_right_hand_key_fails_loudly() {
    let mut inputs = default_inputs();
    inputs.cards = cards(&[(1, "Visa"), (1, "Mastercard")]);
    let err = merge(inputs).unwrap_err();
    assert!(
        matches!(err, LensError::DuplicateJoinKey { ref table, ref key }
            if table == "cards" && key == "1"),
        "expected DuplicateJoinKey for cards, got {err}"
    );
}

/// The derived hour column reflects the parsed timestamp, and an
/// unparseable timestamp coerces to null (both date and hour).
#[test]
fn hour_derived_from_timestamp() {
    let mut inputs = default_inputs();
    inputs.transactions = transactions(&[
        (1, 1, 1, 1, "10.00", "2025-03-11 14:05:00", "Non-Fraud"),
        (2, 1, 1, 1, "20.00", "not-a-date", "Non-Fraud"),
    ]);
    let view = merge(inputs).unwrap();
    assert_eq!(view.value(0, "hour"), Some(&Value::Int(14)));
    assert_eq!(view.value(1, "date"), Some(&Value::Null));
    assert_eq!(view.value(1, "hour"), Some(&Value::Null));
}

/// When the source schema has no date column at all, the hour column is
/// still present, fully null.
#[test]
fn missing_date_column_yields_all_null_hours() {
    let mut rs = RowSet::new(columns(&[
        "id",
        "client_id",
        "merchant_id",
        "card_id",
        "amount",
        "fraud_classification",
    ]));
    rs.push_row(vec![
        Value::Int(1),
        Value::Int(1),
        Value::Int(1),
        Value::Int(1),
        Value::Text("75.00".into()),
        Value::Text("Non-Fraud".into()),
    ]);

    let mut inputs = default_inputs();
    inputs.transactions = rs;
    let view = merge(inputs).unwrap();

    assert!(view.has_column("hour"));
    assert_eq!(view.value(0, "hour"), Some(&Value::Null));
}

/// A required join key column missing from the transactions row-set is a
/// reported data-shape failure, not a panic or a partial merge.
#[test]
fn missing_join_key_column_is_reported() {
    let mut rs = RowSet::new(columns(&["id", "amount", "date", "fraud_classification"]));
    rs.push_row(vec![
        Value::Int(1),
        Value::Text("10.00".into()),
        Value::Text("2025-01-01 00:00:00".into()),
        Value::Text("Fraud".into()),
    ]);

    let mut inputs = default_inputs();
    inputs.transactions = rs;
    let err = merge(inputs).unwrap_err();
    assert!(
        matches!(err, LensError::MissingColumn { ref column, .. } if column == "client_id"),
        "expected MissingColumn for client_id, got {err}"
    );
}
