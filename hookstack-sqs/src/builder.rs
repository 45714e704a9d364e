//! Descriptor builder for a queue family

use hookstack_core::{HookError, Settings};
use serde_json::Value;
use tracing::{debug, info};

use crate::consumer::should_add_consumer;
use crate::context::BuildContext;
use crate::hook::{Hook, IamStatement};
use crate::properties::QueueHookConfig;
use crate::role::QueueRole;

/// Actions every consumer and producer of the service needs
pub const SQS_ACTIONS: [&str; 4] = [
    "sqs:SendMessage",
    "sqs:DeleteMessage",
    "sqs:ReceiveMessage",
    "sqs:GetQueueAttributes",
];

/// Builds the hooks of a queue family.
///
/// Only holds read-only settings, so one builder can serve any number of
/// builds, concurrent ones included.
#[derive(Debug, Clone, Default)]
pub struct QueueHookBuilder {
    settings: Settings,
}

impl QueueHookBuilder {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// IAM statement granting queue access on every queue of the account and region
    pub fn permissions(&self) -> Hook {
        Hook::IamStatement(IamStatement {
            action: SQS_ACTIONS.iter().map(ToString::to_string).collect(),
            resource: format!("{}:*", self.settings.queue_arn_prefix()),
        })
    }

    /// Derive the ordered descriptor list of one queue family
    ///
    /// Order: queue URL variables (when requested), main consumer, main queue,
    /// delay consumer and delay queue (when the delay queue is enabled), DLQ,
    /// DLQ consumer (when requested).
    pub fn build_hooks(&self, config: &QueueHookConfig) -> Result<Vec<Hook>, HookError> {
        let context = BuildContext::new(config, &self.settings)?;
        let mut hooks = Vec::new();

        if let Some(vars) = context.queue_url_env_vars() {
            debug!(count = vars.len(), "Adding queue URL variables");
            hooks.push(Hook::EnvVars(vars));
        }

        hooks.push(Hook::Function(context.consumer_function(QueueRole::Main)));
        hooks.push(Hook::Resource(context.queue_resource(QueueRole::Main)?));

        if context.use_delay_queue {
            // merged delay consumer properties are never empty, so the delay
            // queue is consumed either here or by the main consumer
            if should_add_consumer(Some(&context.delay_consumer)) {
                hooks.push(Hook::Function(context.consumer_function(QueueRole::Delay)));
            }
            hooks.push(Hook::Resource(context.queue_resource(QueueRole::Delay)?));
        }

        hooks.push(Hook::Resource(context.queue_resource(QueueRole::Dlq)?));

        // only an explicit DLQ consumer fragment adds a DLQ consumer
        if should_add_consumer(config.dlq_consumer_properties.as_ref()) {
            hooks.push(Hook::Function(context.consumer_function(QueueRole::Dlq)));
        }

        info!(
            name = %context.names.title_name,
            hooks = hooks.len(),
            fifo = context.fifo_queue,
            delay = context.use_delay_queue,
            "Built queue hooks"
        );

        Ok(hooks)
    }

    /// Same as [`Self::build_hooks`] for an untyped configuration
    pub fn build_hooks_from_value(&self, value: &Value) -> Result<Vec<Hook>, HookError> {
        let config = QueueHookConfig::from_value(value)?;
        self.build_hooks(&config)
    }
}

/// Build hooks with the default settings
pub fn build_hooks(config: &QueueHookConfig) -> Result<Vec<Hook>, HookError> {
    QueueHookBuilder::default().build_hooks(config)
}

/// Queue permissions with the default settings
pub fn sqs_permissions() -> Hook {
    QueueHookBuilder::default().permissions()
}
