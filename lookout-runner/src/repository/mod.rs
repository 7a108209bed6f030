//! Repository layer
//!
//! Repositories wrap the external collaborators of a poll cycle: the durable
//! checkpoint slot, the search API and the notification transport. They hold
//! no business logic.
//!
//! All repositories are trait-based so the cycle engine can be tested with
//! in-memory fakes.

mod checkpoint;
mod notifier;
mod search;

// Re-export traits
pub use checkpoint::CheckpointStore;
pub use notifier::Notifier;
pub use search::SearchSource;

// Re-export implementations
pub use checkpoint::{FileCheckpointStore, InMemoryCheckpointStore};
pub use notifier::{LogNotifier, MailNotifier};
pub use search::HttpSearchSource;
