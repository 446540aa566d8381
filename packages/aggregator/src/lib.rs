// Murcia Race Calendar Aggregator - Core
//
// This crate collects running-race announcements for the Murcia region from
// several registration sites, merges same-date duplicates, and maintains a
// SQLite catalog that feeds a Make.com publication webhook.
//
// Batch operations are organized per-domain in domains/*/activities/

pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
