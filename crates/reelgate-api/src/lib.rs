//! Reelgate HTTP service
//!
//! Upload intake, the review workflow, admin auth, and the notification
//! and Plex integrations behind them.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
