//! VENUEX — Conversational Sports Venue Finder Agent
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod agent;
pub mod config;
pub mod crawler;
pub mod llm;
pub mod providers;
pub mod server;
pub mod service;
pub mod types;
