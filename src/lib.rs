//! Taskboard library
//!
//! This module exports the core components for testing and integration.

pub mod api;
pub mod board;
pub mod config;
pub mod db;
pub mod error;
pub mod ordering;
pub mod types;
