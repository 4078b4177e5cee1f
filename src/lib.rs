//! UK crime data explorer.
//!
//! Loads a merged crime table once at startup and serves a three-tab
//! dashboard (top/bottom locations, time series, map) over HTTP.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod server;
pub mod state;
pub mod views;
