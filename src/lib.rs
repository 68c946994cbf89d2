//! Recruit Chat - Messaging backend for a recruiting platform
//!
//! Candidates and recruiters join a matching queue, get grouped into rooms,
//! and exchange messages delivered in real time over WebSocket connections.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
