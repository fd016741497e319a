//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and pure index edits into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod board_service;
pub mod optimistic;
