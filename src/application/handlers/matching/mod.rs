//! Queue matching handlers.

mod join_queue;

pub use join_queue::{JoinQueueCommand, JoinQueueHandler, JoinQueueResult};
