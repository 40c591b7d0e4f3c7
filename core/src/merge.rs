//! Assembly of the denormalized transaction view.
//!
//! transactions → clean amount → left-join users, merchants, cards →
//! parse timestamps → derive hour-of-day.
//!
//! The merge never produces a partial result: a blocking condition (empty
//! input, missing key column, duplicate right-hand key) surfaces as an error
//! and the caller renders it as an empty view. Left joins never drop or
//! duplicate transaction rows, so the merged row count always equals the
//! cleaned transaction row count.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{
    error::{LensError, LensResult},
    rowset::{RowSet, Value},
    source::{ConnectionProvider, DataSource},
    types::{AMOUNT_COL, DATE_COL, HOUR_COL},
};

pub const TRANSACTIONS_SQL: &str = r#"SELECT * FROM "transaction""#;
pub const USERS_SQL: &str = "SELECT id, gender, AgeGroup FROM user";
pub const MERCHANTS_SQL: &str = "SELECT merchant_id, merchant_state FROM merchants";
pub const CARDS_SQL: &str = "SELECT id AS card_id, card_brand FROM cards";

/// Timestamp formats the source has been observed to carry.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];

/// The four raw row-sets the merge consumes.
pub struct MergeInputs {
    pub transactions: RowSet,
    pub users: RowSet,
    pub merchants: RowSet,
    pub cards: RowSet,
}

impl MergeInputs {
    /// Fetch all four inputs through the uniform fetch boundary.
    pub fn fetch<P: ConnectionProvider>(source: &DataSource<P>) -> Self {
        Self {
            transactions: source.fetch(TRANSACTIONS_SQL),
            users: source.fetch(USERS_SQL),
            merchants: source.fetch(MERCHANTS_SQL),
            cards: source.fetch(CARDS_SQL),
        }
    }
}

/// Fetch and merge in one call.
pub fn merged_view<P: ConnectionProvider>(source: &DataSource<P>) -> LensResult<RowSet> {
    merge(MergeInputs::fetch(source))
}

pub fn merge(inputs: MergeInputs) -> LensResult<RowSet> {
    for (table, rs) in [
        ("transaction", &inputs.transactions),
        ("user", &inputs.users),
        ("merchants", &inputs.merchants),
        ("cards", &inputs.cards),
    ] {
        if rs.is_empty() {
            return Err(LensError::EmptyInput {
                table: table.into(),
            });
        }
    }

    let MergeInputs {
        transactions,
        users,
        merchants,
        cards,
    } = inputs;

    let transactions = clean_amounts(transactions)?;
    if transactions.is_empty() {
        // Every amount failed to parse; nothing left to merge.
        return Err(LensError::EmptyInput {
            table: "transaction".into(),
        });
    }

    let users = JoinSide::build("user", &users, "id")?;
    let merchants = JoinSide::build("merchants", &merchants, "merchant_id")?;
    let cards = JoinSide::build("cards", &cards, "card_id")?;

    let client_idx = key_column(&transactions, "transaction", "client_id")?;
    let merchant_idx = key_column(&transactions, "transaction", "merchant_id")?;
    let card_idx = key_column(&transactions, "transaction", "card_id")?;

    let mut columns = transactions.columns().to_vec();
    columns.extend(users.carried.iter().cloned());
    columns.extend(merchants.carried.iter().cloned());
    columns.extend(cards.carried.iter().cloned());

    let mut merged = RowSet::new(columns);
    for row in transactions.rows() {
        let mut out = row.clone();
        users.append_match(&row[client_idx], &mut out);
        merchants.append_match(&row[merchant_idx], &mut out);
        cards.append_match(&row[card_idx], &mut out);
        merged.push_row(out);
    }

    Ok(derive_hour(merged))
}

/// Coerce the amount column to text, strip the currency symbol and thousands
/// separators, and parse. Rows whose amount does not parse are dropped,
/// never substituted with zero.
fn clean_amounts(transactions: RowSet) -> LensResult<RowSet> {
    let amount_idx = key_column(&transactions, "transaction", AMOUNT_COL)?;

    let mut cleaned = RowSet::new(transactions.columns().to_vec());
    let mut dropped = 0usize;
    for row in transactions.rows() {
        match parse_amount(&row[amount_idx]) {
            Some(v) => {
                let mut row = row.clone();
                row[amount_idx] = Value::Float(v);
                cleaned.push_row(row);
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::warn!("dropped {dropped} transaction rows with unparseable amounts");
    }
    Ok(cleaned)
}

fn parse_amount(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Text(s) => {
            let stripped: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
            let stripped = stripped.trim();
            if stripped.is_empty() {
                None
            } else {
                stripped.parse().ok()
            }
        }
        _ => None,
    }
}

/// One right-hand side of a left join: a unique-key index plus the non-key
/// columns it contributes to the merged view.
struct JoinSide {
    carried: Vec<String>,
    carried_idx: Vec<usize>,
    index: HashMap<String, Vec<Value>>,
}

impl JoinSide {
    /// Duplicate keys on a right-hand side would silently fan out the left
    /// rows, so they are rejected outright.
    fn build(table: &str, rs: &RowSet, key: &str) -> LensResult<JoinSide> {
        let key_idx = key_column(rs, table, key)?;

        let mut carried = Vec::new();
        let mut carried_idx = Vec::new();
        for (i, name) in rs.columns().iter().enumerate() {
            if i != key_idx {
                carried.push(name.clone());
                carried_idx.push(i);
            }
        }

        let mut index = HashMap::with_capacity(rs.len());
        for row in rs.rows() {
            let Some(k) = join_key(&row[key_idx]) else {
                continue;
            };
            let carried_values: Vec<Value> =
                carried_idx.iter().map(|&i| row[i].clone()).collect();
            if index.insert(k.clone(), carried_values).is_some() {
                return Err(LensError::DuplicateJoinKey {
                    table: table.into(),
                    key: k,
                });
            }
        }

        Ok(JoinSide {
            carried,
            carried_idx,
            index,
        })
    }

    /// Left-join semantics: a missing match fills the carried columns with
    /// nulls and keeps the row.
    fn append_match(&self, key: &Value, out: &mut Vec<Value>) {
        let matched = join_key(key).and_then(|k| self.index.get(&k));
        match matched {
            Some(values) => out.extend(values.iter().cloned()),
            None => out.extend(std::iter::repeat(Value::Null).take(self.carried_idx.len())),
        }
    }
}

/// Canonical text form used to compare keys across column affinities
/// (an INTEGER client_id must match a TEXT user id holding the same digits).
fn join_key(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Text(s) => Some(s.trim().to_string()),
        Value::Timestamp(t) => Some(t.to_string()),
    }
}

fn key_column(rs: &RowSet, table: &str, column: &str) -> LensResult<usize> {
    rs.column_index(column).ok_or_else(|| LensError::MissingColumn {
        table: table.into(),
        column: column.into(),
    })
}

/// Parse the date column to a timestamp (unparseable → null, never an error)
/// and append the derived hour-of-day column. When the source schema has no
/// date column at all, the hour column is still present and fully null.
fn derive_hour(view: RowSet) -> RowSet {
    let date_idx = view.column_index(DATE_COL);

    let mut columns = view.columns().to_vec();
    columns.push(HOUR_COL.into());

    let mut out = RowSet::new(columns);
    for row in view.rows() {
        let mut row = row.clone();
        let hour = match date_idx {
            Some(idx) => {
                let parsed = parse_timestamp(&row[idx]);
                row[idx] = match parsed {
                    Some(t) => Value::Timestamp(t),
                    None => Value::Null,
                };
                parsed.map(|t| Value::Int(i64::from(t.hour())))
            }
            None => None,
        };
        row.push(hour.unwrap_or(Value::Null));
        out.push_row(row);
    }
    out
}

fn parse_timestamp(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::Timestamp(t) => Some(*t),
        Value::Text(s) => {
            let s = s.trim();
            for fmt in DATETIME_FORMATS {
                if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(t);
                }
            }
            for fmt in DATE_FORMATS {
                if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                    return Some(d.and_time(NaiveTime::MIN));
                }
            }
            None
        }
        _ => None,
    }
}
