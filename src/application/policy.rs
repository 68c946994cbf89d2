//! Tunable limits applied by the chat handlers.

use crate::domain::chat::GroupSize;
use crate::domain::foundation::{PageRequest, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPolicy {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub min_participants: u32,
    pub max_participants: u32,
    pub dequeue_on_disconnect: bool,
}

impl ChatPolicy {
    pub fn group_size(&self, participants: u32) -> Result<GroupSize, ValidationError> {
        GroupSize::new(participants, self.min_participants, self.max_participants)
    }

    pub fn page(&self, page: Option<u32>, page_size: Option<u32>) -> Result<PageRequest, ValidationError> {
        PageRequest::from_query(page, page_size, self.default_page_size, self.max_page_size)
    }
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            min_participants: 2,
            max_participants: 10,
            dequeue_on_disconnect: true,
        }
    }
}
