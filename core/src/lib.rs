//! fraudlens-core: data assembly and lightweight analytics for a
//! card-transaction fraud dashboard.
//!
//! Pipeline: fetch row-sets from the relational source, assemble the
//! denormalized merged view (clean → join → derive), then reduce it with one
//! of the analytics stages:
//!
//!   source → merge → { kpi, stats, outlier }
//!
//! RULE: only `source` talks to the database. Every other stage consumes and
//! produces row-sets, so all of them are testable without a connection.
//!
//! Nothing here retains state between invocations; each call re-fetches and
//! re-derives its working set from scratch.

pub mod error;
pub mod kpi;
pub mod merge;
pub mod outlier;
pub mod queries;
pub mod rowset;
pub mod source;
pub mod stats;
pub mod types;
