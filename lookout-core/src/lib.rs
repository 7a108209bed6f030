//! Lookout Core
//!
//! Core types for the Lookout search watcher.
//!
//! This crate contains:
//! - Domain types: watermark, items, notifications and cycle outcomes
//! - DTOs: wire shapes exchanged with the search and mail APIs

pub mod domain;
pub mod dto;
