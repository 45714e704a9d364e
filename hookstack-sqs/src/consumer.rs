//! Consumer function descriptors

use serde_json::{Map, Value};
use tracing::debug;

use crate::context::BuildContext;
use crate::hook::{EventSource, FunctionHook, SqsEvent, REPORT_BATCH_ITEM_FAILURES};
use crate::properties::{object_entries, truthy, ConsumerProperties};
use crate::role::QueueRole;

/// Whether a role gets a dedicated consumer function.
///
/// Needs at least one property, and the role must not hand its queue over
/// to the main consumer.
pub fn should_add_consumer(properties: Option<&ConsumerProperties>) -> bool {
    properties.is_some_and(|p| !p.is_empty() && !p.uses_main_handler())
}

impl BuildContext<'_> {
    /// Consumer function of `role`, bound to its own queue
    pub fn consumer_function(&self, role: QueueRole) -> FunctionHook {
        let properties = self.consumer_properties(role);
        let title = format!("{}{}", self.names.title_name, role.function_suffix());

        let mut filename = format!("{}{}", self.names.filename, role.file_suffix());
        if let Some(prefix) = truthy(properties.prefix_path.as_ref()) {
            filename = format!("{}/{filename}", plain_text(prefix));
        }

        let handler = truthy(properties.handler.as_ref())
            .cloned()
            .unwrap_or_else(|| {
                Value::from(format!(
                    "{}/{filename}-consumer.handler",
                    self.settings.handler_dir
                ))
            });
        let description = truthy(properties.description.as_ref())
            .cloned()
            .unwrap_or_else(|| Value::from(format!("{title} SQS Queue Consumer")));

        // user raw properties may replace the generated dependsOn
        let mut raw_properties = Map::new();
        raw_properties.insert(
            "dependsOn".to_string(),
            Value::from(vec![self.queue_name(role).to_string()]),
        );
        raw_properties.extend(object_entries(properties.raw_properties.as_ref()));

        let mut events = vec![event_source(self.queue_arn(role), properties)];
        if role == QueueRole::Main {
            for extra_role in self.main_handler_roles() {
                events.push(event_source(
                    self.queue_arn(extra_role),
                    self.consumer_properties(extra_role),
                ));
            }
        }

        let mut extra = properties.extra.clone();
        extra.extend(object_entries(properties.function_properties.as_ref()));

        let function_name = format!("{title}QueueConsumer");
        debug!(function = %function_name, events = events.len(), "Built consumer function");

        FunctionHook {
            function_name,
            handler,
            description,
            timeout: properties.timeout.clone(),
            raw_properties,
            events,
            extra,
        }
    }
}

/// Event source binding `arn` to a consumer, tuned by `properties`
pub(crate) fn event_source(arn: &str, properties: &ConsumerProperties) -> EventSource {
    EventSource {
        sqs: SqsEvent {
            arn: arn.to_string(),
            function_response_type: REPORT_BATCH_ITEM_FAILURES.to_string(),
            batch_size: truthy(properties.batch_size.as_ref()).cloned(),
            maximum_batching_window: truthy(properties.maximum_batching_window.as_ref()).cloned(),
            extra: object_entries(properties.event_properties.as_ref()).collect(),
        },
    }
}

/// Text of a value as it reads inside a path
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::QueueHookConfig;
    use hookstack_core::Settings;
    use serde_json::json;

    #[test]
    fn test_should_add_consumer() {
        assert!(!should_add_consumer(None));
        assert!(!should_add_consumer(Some(&ConsumerProperties::default())));

        let own = ConsumerProperties {
            timeout: Some(json!(30)),
            ..ConsumerProperties::default()
        };
        assert!(should_add_consumer(Some(&own)));

        let shared = ConsumerProperties {
            use_main_handler: Some(json!(true)),
            ..ConsumerProperties::default()
        };
        assert!(!should_add_consumer(Some(&shared)));

        // a falsy flag keeps the dedicated consumer
        let own_with_flag = ConsumerProperties {
            use_main_handler: Some(json!(0)),
            ..ConsumerProperties::default()
        };
        assert!(should_add_consumer(Some(&own_with_flag)));
    }

    #[test]
    fn test_main_consumer_defaults() {
        let settings = Settings::default();
        let config = QueueHookConfig::new("order-created");
        let context = BuildContext::new(&config, &settings).unwrap();

        let function = context.consumer_function(QueueRole::Main);
        assert_eq!(function.function_name, "OrderCreatedQueueConsumer");
        assert_eq!(function.handler, "src/sqs-consumer/order-created-consumer.handler");
        assert_eq!(function.description, "OrderCreated SQS Queue Consumer");
        assert_eq!(function.timeout, Some(json!(15)));
        assert_eq!(function.depends_on(), vec!["OrderCreatedQueue"]);
        assert_eq!(function.event_arns(), vec![context.arns.main_queue.as_str()]);

        let event = &function.events[0].sqs;
        assert_eq!(event.function_response_type, "ReportBatchItemFailures");
        assert_eq!(event.batch_size, Some(json!(1)));
        assert_eq!(event.maximum_batching_window, Some(json!(10)));
    }

    #[test]
    fn test_delay_and_dlq_suffixes() {
        let settings = Settings::default();
        let config = QueueHookConfig::new("orders");
        let context = BuildContext::new(&config, &settings).unwrap();

        let delay = context.consumer_function(QueueRole::Delay);
        assert_eq!(delay.function_name, "OrdersDelayQueueConsumer");
        assert_eq!(delay.handler, "src/sqs-consumer/orders-delay-consumer.handler");
        assert_eq!(delay.description, "OrdersDelay SQS Queue Consumer");
        assert_eq!(delay.depends_on(), vec!["OrdersDelayQueue"]);

        let dlq = context.consumer_function(QueueRole::Dlq);
        assert_eq!(dlq.function_name, "OrdersDLQQueueConsumer");
        assert_eq!(dlq.handler, "src/sqs-consumer/orders-dlq-consumer.handler");
        assert_eq!(dlq.event_arns(), vec![context.arns.dlq.as_str()]);
    }

    #[test]
    fn test_user_overrides() {
        let settings = Settings::default();
        let config = QueueHookConfig::from_value(&json!({
            "name": "orders",
            "consumerProperties": {
                "prefixPath": "orders",
                "description": "Handles orders",
                "rawProperties": { "reservedConcurrency": 2 },
                "functionProperties": { "memorySize": 1024 },
                "eventProperties": { "enabled": false }
            }
        }))
        .unwrap();
        let context = BuildContext::new(&config, &settings).unwrap();

        let function = context.consumer_function(QueueRole::Main);
        assert_eq!(function.handler, "src/sqs-consumer/orders/orders-consumer.handler");
        assert_eq!(function.description, "Handles orders");
        assert_eq!(function.raw_properties["reservedConcurrency"], 2);
        assert_eq!(function.depends_on(), vec!["OrdersQueue"]);
        assert_eq!(function.extra["memorySize"], 1024);
        assert_eq!(function.events[0].sqs.extra["enabled"], false);
    }

    #[test]
    fn test_falsy_tuning_values_are_left_out() {
        let settings = Settings::default();
        let config = QueueHookConfig::from_value(&json!({
            "name": "orders",
            "consumerProperties": {
                "batchSize": 0,
                "maximumBatchingWindow": "${self:custom.batchingWindow}",
                "timeout": "${self:custom.timeout}",
                "handler": "",
                "prefixPath": null
            }
        }))
        .unwrap();
        let context = BuildContext::new(&config, &settings).unwrap();

        let function = context.consumer_function(QueueRole::Main);
        assert_eq!(function.timeout, Some(json!("${self:custom.timeout}")));
        assert_eq!(function.handler, "src/sqs-consumer/orders-consumer.handler");

        let event = &function.events[0].sqs;
        assert!(event.batch_size.is_none());
        assert_eq!(event.maximum_batching_window, Some(json!("${self:custom.batchingWindow}")));

        let json = serde_json::to_value(&function).unwrap();
        assert!(json["events"][0]["sqs"].get("batchSize").is_none());
    }

    #[test]
    fn test_raw_properties_replace_depends_on() {
        let settings = Settings::default();
        let config = QueueHookConfig::from_value(&json!({
            "name": "orders",
            "consumerProperties": { "rawProperties": { "dependsOn": ["SharedTable"] } }
        }))
        .unwrap();
        let context = BuildContext::new(&config, &settings).unwrap();

        let function = context.consumer_function(QueueRole::Main);
        assert_eq!(function.depends_on(), vec!["SharedTable"]);
    }

    #[test]
    fn test_main_handler_event_sources() {
        let settings = Settings::default();
        let config = QueueHookConfig::from_value(&json!({
            "name": "orders",
            "delayQueueProperties": {},
            "delayConsumerProperties": { "useMainHandler": true, "batchSize": 5 },
            "dlqConsumerProperties": { "useMainHandler": true }
        }))
        .unwrap();
        let context = BuildContext::new(&config, &settings).unwrap();

        let function = context.consumer_function(QueueRole::Main);
        assert_eq!(
            function.event_arns(),
            vec![
                context.arns.main_queue.as_str(),
                context.arns.delay_queue.as_str(),
                context.arns.dlq.as_str()
            ]
        );
        assert_eq!(function.events[1].sqs.batch_size, Some(json!(5)));

        // auxiliary consumers never pick up extra event sources
        let dlq = context.consumer_function(QueueRole::Dlq);
        assert_eq!(dlq.events.len(), 1);
    }
}
