//! Historical Steam player-count statistics.
//!
//! The store only has a row for a game in months it made the tracked top
//! list. This crate turns those sparse rows into dense monthly series for
//! tables and charts, and answers the three queries the site offers:
//! popularity over all time, a two-game comparison over a range, and the top
//! games for a month.

pub mod analysis;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod months;
pub mod present;
pub mod service;
