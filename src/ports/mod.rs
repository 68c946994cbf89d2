//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `RoomRepository` - Rooms, memberships and read cursors
//! - `MessageRepository` - Messages, history and unread counts
//! - `MatchQueue` - Waiting entries and atomic match formation
//! - `ConnectionRegistry` - Live connection bound to each membership
//!
//! ## Collaborator Ports
//!
//! - `IdentityProvider` - Users: resolve, look up, mask
//! - `HireDirectory` - Hires per vacancy
//! - `SessionValidator` - Bearer token validation
//!
//! ## Transport Ports
//!
//! - `RealtimePusher` - Push one notification to one live connection

mod connection_registry;
mod hire_directory;
mod identity_provider;
mod match_queue;
mod message_repository;
mod realtime_pusher;
mod room_repository;
mod session_validator;

pub use connection_registry::{ConnectionRegistry, LiveMember};
pub use hire_directory::HireDirectory;
pub use identity_provider::IdentityProvider;
pub use match_queue::MatchQueue;
pub use message_repository::{MessageQuery, MessageRepository};
pub use realtime_pusher::{PushError, RealtimePusher};
pub use room_repository::{
    HireRoomCriteria, RoomListing, RoomQuery, RoomRepository, RoomSort, RoomSortField,
};
pub use session_validator::SessionValidator;
