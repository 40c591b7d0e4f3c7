//! Deterministic demo database builder.
//!
//! Stands in for the SQL dump the dashboard's source repository shipped:
//! four tables in the shapes the pipeline expects, filled from a fixed-seed
//! PCG so two runs with the same seed produce byte-identical data. A share
//! of the amounts is written in the raw "$1,234.56" form and a few as junk,
//! so the cleaning pass has real work to do.

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rusqlite::{params, Connection};

const GENDERS: [&str; 2] = ["F", "M"];
const AGE_GROUPS: [&str; 4] = ["18-25", "26-40", "41-60", "60+"];
const STATES: [&str; 8] = ["CA", "NY", "TX", "FL", "IL", "WA", "GA", "MA"];
const BRANDS: [&str; 4] = ["Visa", "Mastercard", "Amex", "Discover"];
const CARD_TYPES: [&str; 3] = ["Credit", "Debit", "Prepaid"];
const USE_CHIP: [&str; 3] = ["Chip Transaction", "Swipe Transaction", "Online Transaction"];
const SCORE_CATEGORIES: [&str; 3] = ["Poor", "Fair", "Good"];
const TXN_ERRORS: [&str; 3] = ["Bad PIN", "Insufficient Balance", "Technical Glitch"];

const FRAUD_RATE: f64 = 0.05;

const SCHEMA: &str = r#"
DROP TABLE IF EXISTS "transaction";
DROP TABLE IF EXISTS user;
DROP TABLE IF EXISTS merchants;
DROP TABLE IF EXISTS cards;

CREATE TABLE user (
    id                  INTEGER PRIMARY KEY,
    gender              TEXT NOT NULL,
    AgeGroup            TEXT NOT NULL,
    creditscorecategory TEXT NOT NULL
);

CREATE TABLE merchants (
    merchant_id    INTEGER PRIMARY KEY,
    merchant_state TEXT NOT NULL
);

CREATE TABLE cards (
    id         INTEGER PRIMARY KEY,
    card_brand TEXT NOT NULL
);

CREATE TABLE "transaction" (
    id                   INTEGER PRIMARY KEY,
    client_id            INTEGER NOT NULL,
    merchant_id          INTEGER NOT NULL,
    card_id              INTEGER NOT NULL,
    amount               TEXT,
    date                 TEXT,
    fraud_classification TEXT NOT NULL,
    errors               TEXT,
    use_chip             TEXT NOT NULL,
    card_type            TEXT NOT NULL
);
"#;

pub fn build_demo_database(path: &str, txn_rows: usize, seed: u64) -> Result<()> {
    let mut conn = Connection::open(path).with_context(|| format!("cannot open {path}"))?;
    conn.execute_batch(SCHEMA)?;

    let mut rng = Pcg64::seed_from_u64(seed);

    let user_count = (txn_rows / 10).clamp(10, 2_000);
    let merchant_count = (txn_rows / 25).clamp(5, 500);
    let card_count = user_count * 2;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO user (id, gender, AgeGroup, creditscorecategory)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for id in 1..=user_count {
            stmt.execute(params![
                id as i64,
                pick(&mut rng, &GENDERS),
                pick(&mut rng, &AGE_GROUPS),
                pick(&mut rng, &SCORE_CATEGORIES),
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO merchants (merchant_id, merchant_state) VALUES (?1, ?2)",
        )?;
        for id in 1..=merchant_count {
            stmt.execute(params![id as i64, pick(&mut rng, &STATES)])?;
        }

        let mut stmt = tx.prepare("INSERT INTO cards (id, card_brand) VALUES (?1, ?2)")?;
        for id in 1..=card_count {
            stmt.execute(params![id as i64, pick(&mut rng, &BRANDS)])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO \"transaction\" (
                id, client_id, merchant_id, card_id, amount, date,
                fraud_classification, errors, use_chip, card_type
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for id in 1..=txn_rows {
            let fraud = rng.gen_bool(FRAUD_RATE);
            stmt.execute(params![
                id as i64,
                rng.gen_range(1..=user_count) as i64,
                rng.gen_range(1..=merchant_count) as i64,
                rng.gen_range(1..=card_count) as i64,
                amount_text(&mut rng, fraud),
                date_text(&mut rng),
                if fraud { "Fraud" } else { "Non-Fraud" },
                if rng.gen_bool(0.05) {
                    Some(pick(&mut rng, &TXN_ERRORS))
                } else {
                    None
                },
                pick(&mut rng, &USE_CHIP),
                pick(&mut rng, &CARD_TYPES),
            ])?;
        }
    }
    tx.commit()?;

    log::info!("seeded {txn_rows} transactions for {user_count} users at {path}");
    Ok(())
}

fn pick<'a>(rng: &mut Pcg64, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

/// Fraudulent amounts skew high so the demo statistics have a real signal.
/// Most amounts are plain decimal text; some carry the raw "$1,234.56" dump
/// formatting, and a sliver are unparseable.
fn amount_text(rng: &mut Pcg64, fraud: bool) -> String {
    if rng.gen_bool(0.01) {
        return "N/A".to_string();
    }

    let base = if fraud {
        400.0 + rng.gen::<f64>() * 2_600.0
    } else {
        1.0 + rng.gen::<f64>() * 250.0
    };
    let amount = (base * 100.0).round() / 100.0;

    if rng.gen_bool(0.10) {
        format!("${}", thousands(amount))
    } else {
        format!("{amount:.2}")
    }
}

fn thousands(amount: f64) -> String {
    let text = format!("{amount:.2}");
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::new();
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let whole: String = grouped.chars().rev().collect();
    format!("{whole}.{frac}")
}

fn date_text(rng: &mut Pcg64) -> String {
    format!(
        "2025-{:02}-{:02} {:02}:{:02}:{:02}",
        rng.gen_range(1..=12),
        rng.gen_range(1..=28),
        rng.gen_range(0..24),
        rng.gen_range(0..60),
        rng.gen_range(0..60),
    )
}
