//! Chat behaviour configuration

use serde::Deserialize;

use crate::application::ChatPolicy;

use super::error::ValidationError;

/// Limits for matching, listings and realtime delivery
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    #[serde(default = "max_page_size")]
    pub max_page_size: u32,

    /// Smallest room a queue join may request
    #[serde(default = "min_participants")]
    pub min_participants: u32,

    /// Largest room a queue join may request
    #[serde(default = "max_participants")]
    pub max_participants: u32,

    /// Drop waiting queue entries when their connection closes
    #[serde(default = "default_true")]
    pub dequeue_on_disconnect: bool,

    /// Per-connection outbound channel capacity
    #[serde(default = "outbound_buffer")]
    pub outbound_buffer: usize,
}

impl ChatConfig {
    /// Handler limits derived from this section
    pub fn policy(&self) -> ChatPolicy {
        ChatPolicy {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            min_participants: self.min_participants,
            max_participants: self.max_participants,
            dequeue_on_disconnect: self.dequeue_on_disconnect,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ValidationError::InvalidPageSize);
        }
        if self.min_participants < 2 || self.min_participants > self.max_participants {
            return Err(ValidationError::InvalidParticipantBounds);
        }
        if self.outbound_buffer == 0 {
            return Err(ValidationError::InvalidOutboundBuffer);
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: max_page_size(),
            min_participants: min_participants(),
            max_participants: max_participants(),
            dequeue_on_disconnect: true,
            outbound_buffer: outbound_buffer(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn max_page_size() -> u32 {
    100
}

fn min_participants() -> u32 {
    2
}

fn max_participants() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn outbound_buffer() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy_defaults() {
        assert_eq!(ChatConfig::default().policy(), ChatPolicy::default());
        assert_eq!(ChatConfig::default().outbound_buffer, 64);
    }

    #[test]
    fn test_validation_page_size() {
        let config = ChatConfig {
            default_page_size: 200,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPageSize));
    }

    #[test]
    fn test_validation_participant_bounds() {
        let config = ChatConfig {
            min_participants: 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidParticipantBounds));

        let config = ChatConfig {
            min_participants: 6,
            max_participants: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_outbound_buffer() {
        let config = ChatConfig {
            outbound_buffer: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidOutboundBuffer));
    }
}
