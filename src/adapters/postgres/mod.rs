//! PostgreSQL adapters - Database implementations for the storage ports.
//!
//! - `PostgresRoomRepository` - rooms and memberships
//! - `PostgresMessageRepository` - messages, listing and unread counts
//! - `PostgresMatchQueue` - waiting entries and transactional match formation
//! - `PostgresConnectionRegistry` - live connection ids on memberships
//! - `PostgresIdentityProvider` / `PostgresHireDirectory` - reads of neighbouring data

mod connection_registry;
mod errors;
mod hire_directory;
mod identity_provider;
mod match_queue;
mod message_repository;
mod room_repository;
mod rows;

pub use connection_registry::PostgresConnectionRegistry;
pub use hire_directory::PostgresHireDirectory;
pub use identity_provider::PostgresIdentityProvider;
pub use match_queue::PostgresMatchQueue;
pub use message_repository::PostgresMessageRepository;
pub use room_repository::PostgresRoomRepository;
