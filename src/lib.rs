//! Memkeep - local-first keeper for photo/video memories
//!
//! This crate provides the core functionality for the `mk` CLI tool: a
//! durable on-device record store, an optional remote mirror, and the
//! deterministic merge that keeps multiple devices convergent without
//! data loss.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - The `Record` type and id allocation
//! - [`storage`] - SQLite local record store
//! - [`sync`] - Merge engine and sync coordinator
//! - [`remote`] - Remote mirror clients (HTTP, null)
//! - [`backup`] - Backup document import/export
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
