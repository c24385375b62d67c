//! Worldsmith Engine - Orchestration layer
//!
//! Provides high-level commands that coordinate the world definition in
//! `worldsmith-core` with persistence and bulk transfer in `worldsmith-store`.

pub mod commands;
