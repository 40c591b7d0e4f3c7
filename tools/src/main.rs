//! fraudlens: headless analytics runner for the fraud dashboard core.
//!
//! Usage:
//!   fraudlens --db fraud.db tables
//!   fraudlens --db fraud.db show transactions --limit 20
//!   fraudlens --db fraud.db query "Monthly fraud trend"
//!   fraudlens --db fraud.db query --sql "SELECT COUNT(*) FROM \"transaction\""
//!   fraudlens --db fraud.db kpis --year 2025 --month 3 --gender F [--json]
//!   fraudlens --db fraud.db stats [--json]
//!   fraudlens --db fraud.db outliers --method zscore --threshold 3.0
//!   fraudlens --db fraud.db outliers --method iqr --multiplier 1.5
//!   fraudlens --db fraud.db seed --rows 5000 --seed 42
//!   fraudlens export report.pdf --out report_copy.pdf
//!
//! Every failure path prints a human-readable message and completes the
//! interaction; nothing aborts mid-render.

mod seed;

use std::env;
use std::io::Write;

use anyhow::{bail, Context, Result};
use fraudlens_core::{
    kpi::{self, KpiFilter},
    merge,
    outlier::{self, Bounds, Method},
    queries::Report,
    rowset::RowSet,
    source::{ConnectionProvider, DataSource, SqliteProvider},
    stats::{self, Comparison},
    types::{
        DEFAULT_IQR_MULTIPLIER, DEFAULT_Z_THRESHOLD, IQR_MULTIPLIER_RANGE, Z_THRESHOLD_RANGE,
    },
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let pos = positionals(&args);
    let Some(&command) = pos.first() else {
        print_usage();
        return Ok(());
    };

    let db = flag_value(&args, "--db").unwrap_or(":memory:").to_string();
    let source = DataSource::new(SqliteProvider::new(db.clone()));

    match command {
        "tables" => cmd_tables(&source),
        "show" => cmd_show(&source, &args),
        "query" => cmd_query(&source, &args),
        "kpis" => cmd_kpis(&source, &args),
        "stats" => cmd_stats(&source, &args),
        "outliers" => cmd_outliers(&source, &args),
        "seed" => cmd_seed(&db, &args),
        "export" => cmd_export(&args),
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn cmd_tables<P: ConnectionProvider>(
    source: &DataSource<P>,
) -> Result<()> {
    let tables = source.table_names();
    if tables.is_empty() {
        println!("No tables found in the database.");
        return Ok(());
    }
    for table in tables {
        println!("{table}");
    }
    Ok(())
}

fn cmd_show<P: ConnectionProvider>(
    source: &DataSource<P>,
    args: &[String],
) -> Result<()> {
    let Some(&table) = positionals(args).get(1) else {
        bail!("usage: fraudlens show <table> [--limit N]");
    };
    let limit: usize = parse_flag(args, "--limit", 50);

    let rows = source.fetch(&format!("SELECT * FROM \"{table}\" LIMIT {limit}"));
    print_rowset(&rows);
    Ok(())
}

fn cmd_query<P: ConnectionProvider>(
    source: &DataSource<P>,
    args: &[String],
) -> Result<()> {
    let sql = if let Some(sql) = flag_value(args, "--sql") {
        sql.to_string()
    } else if let Some(&label) = positionals(args).get(1) {
        match Report::from_label(label) {
            Some(report) => report.sql().to_string(),
            None => {
                println!("Unknown report '{label}'. Available reports:");
                for report in Report::ALL {
                    println!("  {}", report.label());
                }
                return Ok(());
            }
        }
    } else {
        println!("Available reports:");
        for report in Report::ALL {
            println!("  {}", report.label());
        }
        return Ok(());
    };

    let rows = source.fetch(&sql);
    print_rowset(&rows);
    Ok(())
}

fn cmd_kpis<P: ConnectionProvider>(
    source: &DataSource<P>,
    args: &[String],
) -> Result<()> {
    let view = match merge::merged_view(source) {
        Ok(view) => view,
        Err(e) => {
            println!("No data available: {e}");
            return Ok(());
        }
    };

    let filter = KpiFilter {
        year: flag_value(args, "--year").and_then(|v| v.parse().ok()),
        month: flag_value(args, "--month").and_then(|v| v.parse().ok()),
        gender: flag_value(args, "--gender").map(str::to_string),
    };
    let summary = kpi::compute(&view, &filter);

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let options = kpi::filter_options(&view);
    println!("Total transactions:  {}", summary.total_transactions);
    println!("Total amount:        ${:.2}", summary.total_amount);
    println!("Fraud transactions:  {}", summary.fraud_transactions);
    println!("Fraud amount:        ${:.2}", summary.fraud_amount);
    println!();
    println!(
        "Filters: year {} | month {} | gender {}",
        opt_display(&filter.year),
        opt_display(&filter.month),
        filter.gender.as_deref().unwrap_or("All"),
    );
    println!(
        "Available: years {:?}, months {:?}, genders {:?}",
        options.years, options.months, options.genders
    );
    Ok(())
}

fn cmd_stats<P: ConnectionProvider>(
    source: &DataSource<P>,
    args: &[String],
) -> Result<()> {
    let view = match merge::merged_view(source) {
        Ok(view) => view,
        Err(e) => {
            println!("No data available: {e}");
            return Ok(());
        }
    };

    let comparison = stats::compare_groups(&view);

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    match &comparison {
        Comparison::Insufficient {
            fraud_count,
            non_fraud_count,
        } => {
            println!(
                "Insufficient data for the test: {fraud_count} fraud vs \
                 {non_fraud_count} non-fraud observations (need at least 2 each).",
            );
        }
        Comparison::Tested {
            fraud,
            non_fraud,
            test,
            fraud_rate_pct,
        } => {
            for group in [fraud, non_fraud] {
                println!(
                    "{:<10} n={:<6} mean=${:<10.2} median=${:<10.2} std=${:<10.2} \
                     min=${:.2} max=${:.2}",
                    group.label, group.count, group.mean, group.median, group.std_dev,
                    group.min, group.max,
                );
            }
            println!();
            println!("Welch t-test: t = {:.4}, df = {:.1}, p = {:.4}", test.t_stat, test.df, test.p_value);
            println!("Conclusion:   {}", comparison.verdict());
            println!("Fraud rate:   {fraud_rate_pct:.2}%");
        }
    }
    Ok(())
}

fn cmd_outliers<P: ConnectionProvider>(
    source: &DataSource<P>,
    args: &[String],
) -> Result<()> {
    let view = match merge::merged_view(source) {
        Ok(view) => view,
        Err(e) => {
            println!("No data available: {e}");
            return Ok(());
        }
    };

    // Parameters are clamped to the ranges the dashboard sliders allowed.
    let method = match flag_value(args, "--method").unwrap_or("zscore") {
        "zscore" => Method::ZScore {
            threshold: parse_flag(args, "--threshold", DEFAULT_Z_THRESHOLD)
                .clamp(Z_THRESHOLD_RANGE.0, Z_THRESHOLD_RANGE.1),
        },
        "iqr" => Method::Iqr {
            multiplier: parse_flag(args, "--multiplier", DEFAULT_IQR_MULTIPLIER)
                .clamp(IQR_MULTIPLIER_RANGE.0, IQR_MULTIPLIER_RANGE.1),
        },
        other => bail!("unknown method '{other}' (expected zscore or iqr)"),
    };

    let report = match outlier::detect(&view, method) {
        Ok(report) => report,
        Err(e) => {
            println!("No result: {e}");
            return Ok(());
        }
    };

    match &report.bounds {
        Bounds::ZScore {
            mean,
            std_dev,
            threshold,
        } => println!(
            "Z-score method: mean=${mean:.2}, std=${std_dev:.2}, |z| > {threshold}",
        ),
        Bounds::Iqr {
            q1,
            q3,
            lower,
            upper,
            multiplier,
        } => println!(
            "IQR method: Q1=${q1:.2}, Q3=${q3:.2}, k={multiplier}, \
             bounds [${lower:.2}, ${upper:.2}]",
        ),
    }
    println!(
        "Anomalies detected: {} (of which labeled fraud: {})",
        report.flagged.len(),
        report.fraud_flagged.len()
    );
    println!();
    print_rowset(&report.flagged);
    Ok(())
}

fn cmd_seed(db: &str, args: &[String]) -> Result<()> {
    let rows: usize = parse_flag(args, "--rows", 5000);
    let seed_value: u64 = parse_flag(args, "--seed", 42);
    seed::build_demo_database(db, rows, seed_value)?;
    println!("Seeded {db} with {rows} transaction rows (seed {seed_value}).");
    Ok(())
}

/// Download boundary: stream static file bytes through unchanged.
fn cmd_export(args: &[String]) -> Result<()> {
    let Some(&path) = positionals(args).get(1) else {
        bail!("usage: fraudlens export <path> [--out <dest>]");
    };
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {path}"))?;

    match flag_value(args, "--out") {
        Some(dest) => {
            std::fs::write(dest, &bytes).with_context(|| format!("cannot write {dest}"))?;
            println!("Wrote {} bytes to {dest}.", bytes.len());
        }
        None => {
            std::io::stdout().write_all(&bytes)?;
        }
    }
    Ok(())
}

// ── Rendering ────────────────────────────────────────────────────────────────

fn print_rowset(rows: &RowSet) {
    if rows.is_empty() {
        println!("(no rows)");
        return;
    }

    let mut widths: Vec<usize> = rows.columns().iter().map(String::len).collect();
    let rendered: Vec<Vec<String>> = rows
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| v.display()).collect())
        .collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let header: Vec<String> = rows
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect();
    println!("{}", header.join("  "));
    println!("{}", "-".repeat(header.join("  ").len()));
    for row in &rendered {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join("  "));
    }
    println!();
    println!("Total rows: {}", rows.len());
}

// ── Argument helpers ─────────────────────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Flags that take no value; everything else starting with `--` consumes the
/// argument after it.
const BOOL_FLAGS: [&str; 1] = ["--json"];

/// The arguments that are neither a flag nor a flag's value, in order.
/// `positionals[0]` is the command.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in &args[1..] {
        if skip {
            skip = false;
            continue;
        }
        if arg.starts_with("--") {
            skip = !BOOL_FLAGS.contains(&arg.as_str());
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

fn opt_display<T: std::fmt::Display>(v: &Option<T>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "All".to_string(),
    }
}

fn print_usage() {
    println!("fraudlens: fraud dashboard analytics runner");
    println!();
    println!("Commands (all take --db <path>, default :memory:):");
    println!("  tables                         list source tables");
    println!("  show <table> [--limit N]       browse a raw table");
    println!("  query [<report>|--sql <text>]  run a canned report or ad-hoc SQL");
    println!("  kpis [--year --month --gender] headline totals over the merged view");
    println!("  stats                          fraud vs non-fraud comparison");
    println!("  outliers --method zscore|iqr   anomaly detection on amounts");
    println!("  seed [--rows N] [--seed S]     build a deterministic demo database");
    println!("  export <path> [--out <dest>]   stream a static report file");
}
