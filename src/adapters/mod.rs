//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx storage for rooms, messages, the queue and identities
//! - `memory` - In-process store implementing the same ports
//! - `websocket` - Realtime gateway and connection hub
//! - `http` - REST surface and auth middleware
//! - `auth` - Access token validation

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;
