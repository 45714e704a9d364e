//! Per-build derivation state

use hookstack_core::{derive_arns, derive_names, DerivedArns, DerivedNames, HookError, Settings};
use tracing::{debug, warn};

use crate::defaults;
use crate::properties::{is_truthy, ConsumerProperties, QueueHookConfig, QueueProperties};
use crate::role::QueueRole;

/// Everything a build derives before emitting its first descriptor.
///
/// Created once per build and only read afterwards, so builds never share
/// intermediate state.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
    pub(crate) settings: &'a Settings,
    pub names: DerivedNames,
    pub arns: DerivedArns,
    pub fifo_queue: bool,
    pub use_delay_queue: bool,
    pub consumer: ConsumerProperties,
    pub main_queue: QueueProperties,
    pub delay_consumer: ConsumerProperties,
    pub delay_queue: QueueProperties,
    pub dlq_consumer: ConsumerProperties,
    pub dlq_queue: QueueProperties,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &QueueHookConfig, settings: &'a Settings) -> Result<Self, HookError> {
        config.validate()?;

        // FIFO is an explicit opt-in of the user main queue fragment,
        // while the delay queue is enabled by the mere presence of its fragment
        let fifo_queue = is_truthy(
            config
                .main_queue_properties
                .as_ref()
                .and_then(|p| p.fifo_queue.as_ref()),
        );
        let use_delay_queue = config.delay_queue_properties.is_some();

        let names = derive_names(&config.name)?;
        let arns = derive_arns(&names, fifo_queue, settings)?;

        debug!(
            name = %config.name,
            title = %names.title_name,
            fifo = fifo_queue,
            delay = use_delay_queue,
            "Derived queue family"
        );

        let context = Self {
            settings,
            names,
            arns,
            fifo_queue,
            use_delay_queue,
            consumer: defaults::consumer().merged_with(config.consumer_properties.as_ref()),
            main_queue: defaults::main_queue().merged_with(config.main_queue_properties.as_ref()),
            delay_consumer: defaults::delay_consumer()
                .merged_with(config.delay_consumer_properties.as_ref()),
            delay_queue: defaults::delay_queue()
                .merged_with(config.delay_queue_properties.as_ref()),
            dlq_consumer: defaults::dlq_consumer()
                .merged_with(config.dlq_consumer_properties.as_ref()),
            dlq_queue: defaults::dlq_queue().merged_with(config.dlq_queue_properties.as_ref()),
        };

        if !use_delay_queue && context.delay_consumer.uses_main_handler() {
            warn!(
                name = %config.name,
                "delayConsumerProperties.useMainHandler is set but no delay queue is configured"
            );
        }

        Ok(context)
    }

    pub fn consumer_properties(&self, role: QueueRole) -> &ConsumerProperties {
        match role {
            QueueRole::Main => &self.consumer,
            QueueRole::Delay => &self.delay_consumer,
            QueueRole::Dlq => &self.dlq_consumer,
        }
    }

    pub fn queue_properties(&self, role: QueueRole) -> &QueueProperties {
        match role {
            QueueRole::Main => &self.main_queue,
            QueueRole::Delay => &self.delay_queue,
            QueueRole::Dlq => &self.dlq_queue,
        }
    }

    /// Logical name of the role's queue, without FIFO suffix
    pub fn queue_name(&self, role: QueueRole) -> &str {
        match role {
            QueueRole::Main => &self.names.main_queue,
            QueueRole::Delay => &self.names.delay_queue,
            QueueRole::Dlq => &self.names.dlq,
        }
    }

    pub fn queue_arn(&self, role: QueueRole) -> &str {
        match role {
            QueueRole::Main => &self.arns.main_queue,
            QueueRole::Delay => &self.arns.delay_queue,
            QueueRole::Dlq => &self.arns.dlq,
        }
    }

    /// Queue receiving the role's failed messages, if any
    pub fn redrive_target(&self, role: QueueRole) -> Option<QueueRole> {
        match role {
            QueueRole::Main if self.use_delay_queue => Some(QueueRole::Delay),
            QueueRole::Main | QueueRole::Delay => Some(QueueRole::Dlq),
            QueueRole::Dlq => None,
        }
    }

    /// Roles whose queue is consumed by the main function on top of its own
    pub fn main_handler_roles(&self) -> Vec<QueueRole> {
        let mut roles = Vec::new();
        if self.use_delay_queue && self.delay_consumer.uses_main_handler() {
            roles.push(QueueRole::Delay);
        }
        if self.dlq_consumer.uses_main_handler() {
            roles.push(QueueRole::Dlq);
        }
        roles
    }
}
