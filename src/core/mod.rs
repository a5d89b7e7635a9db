//! Shared primitives: storage, configuration, errors, logging and rendering.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod output;
pub mod schemas;
pub mod storage;
pub mod store;
pub mod time;
pub mod tui;
