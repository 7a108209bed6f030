//! Data Transfer Objects for the external APIs
//!
//! These are the JSON shapes exchanged with the search API and the mail-send
//! API. Conversions into and out of domain types live next to each DTO.

pub mod mail;
pub mod search;
