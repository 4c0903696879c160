//! ladderd - media intake and resolution-ladder transcoding service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod dispatch;
pub mod ladder;
pub mod notifications;
pub mod policy;
pub mod processor;
pub mod server;
