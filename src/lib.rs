//! coachdesk: consultant workstation for career-coaching clients.
//!
//! Client intake, the document registry, per-kind document generators,
//! the final report aggregator and the guided workflow all live here;
//! `main.rs` only parses arguments and dispatches into [`commands`].

pub mod aggregate;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod generators;
pub mod intake;
pub mod models;
pub mod office;
pub mod output;
pub mod registry;
pub mod utils;
pub mod workflow;
