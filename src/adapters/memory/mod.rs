//! In-memory adapters for tests and database-less runs.

mod hires;
mod identity;
mod queue;
mod registry;
mod store;

pub use hires::InMemoryHireDirectory;
pub use identity::InMemoryIdentityProvider;
pub use store::InMemoryChatStore;
