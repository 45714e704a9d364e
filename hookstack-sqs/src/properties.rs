//! Hook configuration and typed property records
//!
//! Every property bag is optional. Known fields are named but keep the value
//! exactly as given: deployment interpolations such as
//! `"${self:custom.timeout}"` are as valid as plain numbers. Any other key is
//! kept verbatim in `extra` and passed through to the emitted payload.

use hookstack_core::HookError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::role::QueueRole;

/// Properties of a consumer function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerProperties {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub handler: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub maximum_batching_window: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<Value>,
    /// Directory prepended to the handler file stem
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub prefix_path: Option<Value>,
    /// Extra keys merged into the function payload
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub function_properties: Option<Value>,
    /// Extra keys merged into the function raw properties
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub raw_properties: Option<Value>,
    /// Extra keys merged into the role's event source
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_properties: Option<Value>,
    /// Deliver this role's queue to the main consumer instead of a dedicated one
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub use_main_handler: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConsumerProperties {
    /// Shallow merge: every key present in `overrides` wins over `self`
    #[must_use]
    pub fn merged_with(self, overrides: Option<&Self>) -> Self {
        let Some(over) = overrides else {
            return self;
        };

        let mut extra = self.extra;
        extra.extend(over.extra.clone());

        Self {
            timeout: prefer(&over.timeout, self.timeout),
            handler: prefer(&over.handler, self.handler),
            description: prefer(&over.description, self.description),
            maximum_batching_window: prefer(
                &over.maximum_batching_window,
                self.maximum_batching_window,
            ),
            batch_size: prefer(&over.batch_size, self.batch_size),
            prefix_path: prefer(&over.prefix_path, self.prefix_path),
            function_properties: prefer(&over.function_properties, self.function_properties),
            raw_properties: prefer(&over.raw_properties, self.raw_properties),
            event_properties: prefer(&over.event_properties, self.event_properties),
            use_main_handler: prefer(&over.use_main_handler, self.use_main_handler),
            extra,
        }
    }

    /// True when not a single key is present, `null` values count as present
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn uses_main_handler(&self) -> bool {
        is_truthy(self.use_main_handler.as_ref())
    }
}

/// Properties of a queue resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueProperties {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub max_receive_count: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub receive_message_wait_time_seconds: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub visibility_timeout: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub message_retention_period: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<Value>,
    /// Only read from the main queue fragment
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub fifo_queue: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub fifo_throughput_limit: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content_based_deduplication: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub deduplication_scope: Option<Value>,
    /// Tags appended after the generated ones
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub add_tags: Option<Value>,
    /// Export the queue URL as an environment variable
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub generate_env_vars: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueueProperties {
    /// Shallow merge: every key present in `overrides` wins over `self`
    #[must_use]
    pub fn merged_with(self, overrides: Option<&Self>) -> Self {
        let Some(over) = overrides else {
            return self;
        };

        let mut extra = self.extra;
        extra.extend(over.extra.clone());

        Self {
            max_receive_count: prefer(&over.max_receive_count, self.max_receive_count),
            receive_message_wait_time_seconds: prefer(
                &over.receive_message_wait_time_seconds,
                self.receive_message_wait_time_seconds,
            ),
            visibility_timeout: prefer(&over.visibility_timeout, self.visibility_timeout),
            message_retention_period: prefer(
                &over.message_retention_period,
                self.message_retention_period,
            ),
            delay_seconds: prefer(&over.delay_seconds, self.delay_seconds),
            fifo_queue: prefer(&over.fifo_queue, self.fifo_queue),
            fifo_throughput_limit: prefer(&over.fifo_throughput_limit, self.fifo_throughput_limit),
            content_based_deduplication: prefer(
                &over.content_based_deduplication,
                self.content_based_deduplication,
            ),
            deduplication_scope: prefer(&over.deduplication_scope, self.deduplication_scope),
            add_tags: prefer(&over.add_tags, self.add_tags),
            generate_env_vars: prefer(&over.generate_env_vars, self.generate_env_vars),
            extra,
        }
    }

    pub fn generates_env_vars(&self) -> bool {
        is_truthy(self.generate_env_vars.as_ref())
    }
}

/// Truthiness of an optional configuration value.
///
/// Absent, `null`, `false`, zero and the empty string are falsy, everything
/// else (objects and arrays included) is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// The value itself when truthy
pub fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| is_truthy(Some(*v)))
}

/// Keys of an object value, nothing for any other value
pub fn object_entries(value: Option<&Value>) -> impl Iterator<Item = (String, Value)> + '_ {
    value
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())))
}

fn prefer(over: &Option<Value>, base: Option<Value>) -> Option<Value> {
    over.clone().or(base)
}

/// A present key is kept even when its value is `null`
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// User configuration of one queue family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueHookConfig {
    /// Base name of the family
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_properties: Option<ConsumerProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_queue_properties: Option<QueueProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_consumer_properties: Option<ConsumerProperties>,
    /// Presence alone enables the delay queue, `{}` included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_queue_properties: Option<QueueProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dlq_consumer_properties: Option<ConsumerProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dlq_queue_properties: Option<QueueProperties>,
}

impl QueueHookConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse an untyped configuration, checking its shape first
    ///
    /// `name` must be a non-empty string and every property bag, when
    /// present, a plain object. `null` bags count as absent.
    pub fn from_value(value: &Value) -> Result<Self, HookError> {
        let Some(object) = value.as_object() else {
            return Err(HookError::configuration(
                "Hook configuration must be an object",
            ));
        };

        let name = match object.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(missing_name()),
        };

        let mut config = Self::new(name);

        for role in QueueRole::ALL {
            let consumer = parse_bag(object, role.consumer_field(), role.consumer_label())?;
            let queue = parse_bag(object, role.queue_field(), role.queue_label())?;

            match role {
                QueueRole::Main => {
                    config.consumer_properties = consumer;
                    config.main_queue_properties = queue;
                }
                QueueRole::Delay => {
                    config.delay_consumer_properties = consumer;
                    config.delay_queue_properties = queue;
                }
                QueueRole::Dlq => {
                    config.dlq_consumer_properties = consumer;
                    config.dlq_queue_properties = queue;
                }
            }
        }

        debug!(name = %config.name, "Parsed hook configuration");
        Ok(config)
    }

    /// Check the fields the type system cannot enforce
    pub fn validate(&self) -> Result<(), HookError> {
        if self.name.is_empty() {
            return Err(missing_name());
        }
        Ok(())
    }

    pub fn consumer_for(&self, role: QueueRole) -> Option<&ConsumerProperties> {
        match role {
            QueueRole::Main => self.consumer_properties.as_ref(),
            QueueRole::Delay => self.delay_consumer_properties.as_ref(),
            QueueRole::Dlq => self.dlq_consumer_properties.as_ref(),
        }
    }

    pub fn queue_for(&self, role: QueueRole) -> Option<&QueueProperties> {
        match role {
            QueueRole::Main => self.main_queue_properties.as_ref(),
            QueueRole::Delay => self.delay_queue_properties.as_ref(),
            QueueRole::Dlq => self.dlq_queue_properties.as_ref(),
        }
    }
}

fn missing_name() -> HookError {
    HookError::configuration("Missing or empty name hook configuration in SQS helper")
        .with_field("name")
}

fn parse_bag<T: serde::de::DeserializeOwned>(
    object: &Map<String, Value>,
    field: &str,
    label: &str,
) -> Result<Option<T>, HookError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(bag @ Value::Object(_)) => serde_json::from_value(bag.clone())
            .map(Some)
            .map_err(|err| {
                HookError::configuration(format!(
                    "{label} Properties have invalid fields in SQS helper: {err}"
                ))
                .with_field(field)
            }),
        Some(_) => Err(HookError::configuration(format!(
            "{label} Properties must be an Object with configuration in SQS helper"
        ))
        .with_field(field)),
    }
}
