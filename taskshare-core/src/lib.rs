//! # TaskShare Core Library
//!
//! Access control for shared tasks: who may read, edit or manage a task
//! and its comments and files.
//!
//! ## Module Organization
//!
//! - `access`: Permission levels, the access resolver and the comment authorship rule
//! - `sharing`: Share registry, share stores (Postgres and in-memory) and the sharing service
//! - `activity`: Activity log stores, the task timeline and summaries
//! - `models`: Database models and data structures
//! - `db`: Connection pool and migrations
//! - `config`: Configuration management
//! - `telemetry`: Tracing subscriber setup
//! - `error`: Common HTTP error body
//! - `services`: Wiring of stores and services into one bundle

pub mod access;
pub mod activity;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod sharing;
pub mod telemetry;

/// Current version of the TaskShare core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
