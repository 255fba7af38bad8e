//! alertdesk: terminal review client for ad render failure chains.
//!
//! Browse failure chains, open logs with backend-generated summaries (cached
//! per session), and build alert reports with prioritized recommendations
//! that can be copied or emailed.

pub mod activity;
pub mod backend;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod recommend;
pub mod session;
pub mod utils;
pub mod view;
