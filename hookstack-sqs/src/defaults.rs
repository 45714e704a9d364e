//! Default property tables, one per entity
//!
//! The delay path is a variant of the main path, so its consumer and queue
//! start from the main defaults.

use serde_json::Value;

use crate::properties::{ConsumerProperties, QueueProperties};

/// Fourteen days, the SQS maximum
const DLQ_MESSAGE_RETENTION_PERIOD: u32 = 1_209_600;

pub fn consumer() -> ConsumerProperties {
    ConsumerProperties {
        timeout: Some(Value::from(15)),
        batch_size: Some(Value::from(1)),
        maximum_batching_window: Some(Value::from(10)),
        ..ConsumerProperties::default()
    }
}

pub fn main_queue() -> QueueProperties {
    QueueProperties {
        max_receive_count: Some(Value::from(5)),
        receive_message_wait_time_seconds: Some(Value::from(20)),
        visibility_timeout: Some(Value::from(60)),
        ..QueueProperties::default()
    }
}

pub fn delay_consumer() -> ConsumerProperties {
    consumer()
}

pub fn delay_queue() -> QueueProperties {
    main_queue()
}

pub fn dlq_consumer() -> ConsumerProperties {
    consumer()
}

pub fn dlq_queue() -> QueueProperties {
    QueueProperties {
        receive_message_wait_time_seconds: Some(Value::from(20)),
        visibility_timeout: Some(Value::from(60)),
        message_retention_period: Some(Value::from(DLQ_MESSAGE_RETENTION_PERIOD)),
        ..QueueProperties::default()
    }
}
