//! Core domain types
//!
//! These types are shared between the HTTP clients (which produce and consume
//! them) and the runner (which drives the poll cycle).

pub mod cycle;
pub mod item;
pub mod notification;
pub mod watermark;
