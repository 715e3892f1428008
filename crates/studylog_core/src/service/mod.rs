//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into log and note use-cases.
//! - Map storage errors into the duplicate-week / not-found taxonomy.

pub mod log_service;
pub mod note_service;
