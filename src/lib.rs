//! Internship Watch Library
//!
//! Watches a GitHub README for internship listings and mails a digest of
//! the ones not seen on the previous run.

pub mod config;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod notify;
pub mod run;
pub mod scrapers;
pub mod storage;
pub mod types;

pub use types::*;
