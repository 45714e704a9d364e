//! Queue roles of a family

use hookstack_core::Tag;

/// One of the three queues a family can declare, together with its consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueRole {
    Main,
    Delay,
    Dlq,
}

impl QueueRole {
    pub const ALL: [QueueRole; 3] = [Self::Main, Self::Delay, Self::Dlq];

    /// Human label of the consumer entity, used in error messages
    pub fn consumer_label(&self) -> &'static str {
        match self {
            Self::Main => "Main Consumer",
            Self::Delay => "Delay Consumer",
            Self::Dlq => "DLQ Consumer",
        }
    }

    /// Human label of the queue entity, used in error messages
    pub fn queue_label(&self) -> &'static str {
        match self {
            Self::Main => "Main Queue",
            Self::Delay => "Delay Queue",
            Self::Dlq => "DLQ Queue",
        }
    }

    /// Configuration key holding the consumer properties
    pub fn consumer_field(&self) -> &'static str {
        match self {
            Self::Main => "consumerProperties",
            Self::Delay => "delayConsumerProperties",
            Self::Dlq => "dlqConsumerProperties",
        }
    }

    /// Configuration key holding the queue properties
    pub fn queue_field(&self) -> &'static str {
        match self {
            Self::Main => "mainQueueProperties",
            Self::Delay => "delayQueueProperties",
            Self::Dlq => "dlqQueueProperties",
        }
    }

    pub(crate) fn function_suffix(&self) -> &'static str {
        match self {
            Self::Main => "",
            Self::Delay => "Delay",
            Self::Dlq => "DLQ",
        }
    }

    pub(crate) fn file_suffix(&self) -> &'static str {
        match self {
            Self::Main => "",
            Self::Delay => "-delay",
            Self::Dlq => "-dlq",
        }
    }

    pub(crate) fn env_var_suffix(&self) -> &'static str {
        match self {
            Self::Main => "SQS_QUEUE_URL",
            Self::Delay => "DELAY_QUEUE_URL",
            Self::Dlq => "DLQ_QUEUE_URL",
        }
    }

    /// Marker tag distinguishing auxiliary queues
    pub(crate) fn marker_tag(&self) -> Option<Tag> {
        match self {
            Self::Main => None,
            Self::Delay => Some(Tag::new("DelayQueue", "true")),
            Self::Dlq => Some(Tag::new("IsDLQ", "true")),
        }
    }
}
