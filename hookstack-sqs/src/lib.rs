//! SQS queue family hooks for hookstack
//!
//! Derives the descriptors of a queue family from a small configuration:
//! - main queue and its consumer function
//! - optional delay queue between the main queue and the DLQ
//! - dead-letter queue, optionally with its own consumer
//! - queue URL environment variables and the queue IAM statement

pub mod builder;
pub mod consumer;
pub mod context;
pub mod defaults;
pub mod hook;
pub mod properties;
pub mod queue;
pub mod role;

pub use builder::{build_hooks, sqs_permissions, QueueHookBuilder};
pub use consumer::should_add_consumer;
pub use context::BuildContext;
pub use hook::{EventSource, FunctionHook, Hook, IamStatement, QueueResource, ResourceHook};
pub use properties::{ConsumerProperties, QueueHookConfig, QueueProperties};
pub use role::QueueRole;
