//! Queue resource and queue URL descriptors

use hookstack_core::{apply_fifo_suffix, HookError, Tag};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::context::BuildContext;
use crate::hook::{QueueResource, QueueResourceProperties, ResourceHook, SQS_QUEUE_TYPE};
use crate::properties::{is_truthy, truthy};
use crate::role::QueueRole;

/// Redrive policy document, field order as the queue API documents it
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RedrivePolicy<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_receive_count: Option<&'a Value>,
    dead_letter_target_arn: &'a str,
}

impl BuildContext<'_> {
    /// Queue resource of `role`, wired to its dead-letter target
    pub fn queue_resource(&self, role: QueueRole) -> Result<ResourceHook, HookError> {
        let properties = self.queue_properties(role);
        let name = self.queue_name(role).to_string();
        let target = self.redrive_target(role);

        let redrive_policy = target
            .map(|target| {
                serde_json::to_string(&RedrivePolicy {
                    max_receive_count: properties.max_receive_count.as_ref(),
                    dead_letter_target_arn: self.queue_arn(target),
                })
            })
            .transpose()?;

        let mut generated = self.settings.default_tags.clone();
        generated.push(Tag::new("SQSConstruct", &self.names.title_name));
        generated.extend(role.marker_tag());

        let mut tags = generated
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(Value::Array(add_tags)) = &properties.add_tags {
            tags.extend(add_tags.iter().cloned());
        }

        // FIFO attributes are never defaulted, only forwarded when requested
        let fifo = self.fifo_queue;
        let fifo_only = |value: Option<&Value>| truthy(value).filter(|_| fifo).cloned();

        let queue_properties = QueueResourceProperties {
            queue_name: self
                .settings
                .queue_name(&apply_fifo_suffix(&name, fifo)),
            receive_message_wait_time_seconds: properties.receive_message_wait_time_seconds.clone(),
            visibility_timeout: properties.visibility_timeout.clone(),
            redrive_policy,
            message_retention_period: truthy(properties.message_retention_period.as_ref())
                .cloned(),
            delay_seconds: truthy(properties.delay_seconds.as_ref()).cloned(),
            fifo_queue: fifo.then_some(true),
            fifo_throughput_limit: fifo_only(properties.fifo_throughput_limit.as_ref()),
            deduplication_scope: fifo_only(properties.deduplication_scope.as_ref()),
            content_based_deduplication: (fifo
                && is_truthy(properties.content_based_deduplication.as_ref()))
            .then_some(true),
            tags,
            extra: properties.extra.clone(),
        };

        let depends_on = target.map(|target| vec![self.queue_name(target).to_string()]);

        debug!(
            queue = %name,
            redrive = ?target,
            fifo,
            "Built queue resource"
        );

        Ok(ResourceHook {
            name,
            resource: QueueResource {
                resource_type: SQS_QUEUE_TYPE.to_string(),
                properties: queue_properties,
                depends_on,
            },
        })
    }

    /// Queue URL variables requested through `generateEnvVars`, `None` when empty
    pub fn queue_url_env_vars(&self) -> Option<BTreeMap<String, String>> {
        let url_prefix = self.settings.queue_url_prefix();

        let vars: BTreeMap<String, String> = QueueRole::ALL
            .into_iter()
            .filter(|role| *role != QueueRole::Delay || self.use_delay_queue)
            .filter(|role| self.queue_properties(*role).generates_env_vars())
            .map(|role| {
                let queue_name = apply_fifo_suffix(self.queue_name(role), self.fifo_queue);
                (
                    format!("{}_{}", self.names.env_var_name, role.env_var_suffix()),
                    format!("{url_prefix}{}", self.settings.queue_name(&queue_name)),
                )
            })
            .collect();

        if vars.is_empty() {
            None
        } else {
            Some(vars)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::QueueHookConfig;
    use hookstack_core::Settings;
    use serde_json::json;

    fn context_for<'a>(value: serde_json::Value, settings: &'a Settings) -> BuildContext<'a> {
        let config = QueueHookConfig::from_value(&value).unwrap();
        BuildContext::new(&config, settings).unwrap()
    }

    fn redrive(resource: &ResourceHook) -> Option<serde_json::Value> {
        resource
            .resource
            .properties
            .redrive_policy
            .as_deref()
            .map(|policy| serde_json::from_str(policy).unwrap())
    }

    #[test]
    fn test_main_queue_points_at_dlq() {
        let settings = Settings::default();
        let context = context_for(json!({ "name": "orders" }), &settings);

        let main = context.queue_resource(QueueRole::Main).unwrap();
        assert_eq!(main.name, "OrdersQueue");
        assert_eq!(main.resource.depends_on, Some(vec!["OrdersDLQ".to_string()]));
        assert_eq!(
            redrive(&main).unwrap(),
            json!({ "maxReceiveCount": 5, "deadLetterTargetArn": context.arns.dlq })
        );
        assert_eq!(
            main.resource.properties.queue_name,
            "${self:custom.serviceName}OrdersQueue"
        );
        assert!(main.resource.properties.fifo_queue.is_none());
    }

    #[test]
    fn test_redrive_policy_is_encoded_string() {
        let settings = Settings::default();
        let context = context_for(json!({ "name": "orders" }), &settings);

        let main = context.queue_resource(QueueRole::Main).unwrap();
        let policy = main.resource.properties.redrive_policy.unwrap();
        assert!(policy.starts_with(r#"{"maxReceiveCount":5,"deadLetterTargetArn":"#));
    }

    #[test]
    fn test_delay_chain() {
        let settings = Settings::default();
        let context = context_for(
            json!({ "name": "orders", "delayQueueProperties": { "delaySeconds": 300 } }),
            &settings,
        );

        let main = context.queue_resource(QueueRole::Main).unwrap();
        assert_eq!(redrive(&main).unwrap()["deadLetterTargetArn"], context.arns.delay_queue);
        assert_eq!(main.resource.depends_on, Some(vec!["OrdersDelayQueue".to_string()]));

        let delay = context.queue_resource(QueueRole::Delay).unwrap();
        assert_eq!(redrive(&delay).unwrap()["deadLetterTargetArn"], context.arns.dlq);
        assert_eq!(delay.resource.properties.delay_seconds, Some(json!(300)));
        assert_eq!(delay.resource.properties.visibility_timeout, Some(json!(60)));
    }

    #[test]
    fn test_dlq_is_terminal() {
        let settings = Settings::default();
        let context = context_for(json!({ "name": "orders" }), &settings);

        let dlq = context.queue_resource(QueueRole::Dlq).unwrap();
        assert!(dlq.resource.properties.redrive_policy.is_none());
        assert!(dlq.resource.depends_on.is_none());
        assert_eq!(dlq.resource.properties.message_retention_period, Some(json!(1_209_600)));
    }

    #[test]
    fn test_tags_order() {
        let settings = Settings::default();
        let context = context_for(
            json!({
                "name": "orders",
                "dlqQueueProperties": { "addTags": [{ "Key": "Team", "Value": "core" }] }
            }),
            &settings,
        );

        let dlq = context.queue_resource(QueueRole::Dlq).unwrap();
        let tags = &dlq.resource.properties.tags;
        let defaults = settings.default_tags.len();

        for (tag, default) in tags.iter().zip(&settings.default_tags) {
            assert_eq!(tag, &json!({ "Key": default.key, "Value": default.value }));
        }
        assert_eq!(tags[defaults], json!({ "Key": "SQSConstruct", "Value": "Orders" }));
        assert_eq!(tags[defaults + 1], json!({ "Key": "IsDLQ", "Value": "true" }));
        assert_eq!(tags[defaults + 2], json!({ "Key": "Team", "Value": "core" }));
        assert_eq!(tags.len(), defaults + 3);

        let main = context.queue_resource(QueueRole::Main).unwrap();
        assert_eq!(main.resource.properties.tags.len(), defaults + 1);
    }

    #[test]
    fn test_fifo_fields_only_when_requested() {
        let settings = Settings::default();
        let context = context_for(
            json!({
                "name": "orders",
                "mainQueueProperties": {
                    "fifoQueue": true,
                    "contentBasedDeduplication": true,
                    "deduplicationScope": "messageGroup"
                }
            }),
            &settings,
        );

        let main = context.queue_resource(QueueRole::Main).unwrap();
        let properties = &main.resource.properties;
        assert_eq!(properties.queue_name, "${self:custom.serviceName}OrdersQueue.fifo");
        assert_eq!(properties.fifo_queue, Some(true));
        assert_eq!(properties.content_based_deduplication, Some(true));
        assert_eq!(properties.deduplication_scope, Some(json!("messageGroup")));
        assert!(properties.fifo_throughput_limit.is_none());

        let dlq = context.queue_resource(QueueRole::Dlq).unwrap();
        assert_eq!(dlq.resource.properties.fifo_queue, Some(true));
        assert!(dlq.resource.properties.queue_name.ends_with("OrdersDLQ.fifo"));
        assert!(dlq.resource.properties.deduplication_scope.is_none());
    }

    #[test]
    fn test_fifo_fields_dropped_without_fifo() {
        let settings = Settings::default();
        let context = context_for(
            json!({
                "name": "orders",
                "mainQueueProperties": { "fifoThroughputLimit": "perMessageGroupId" }
            }),
            &settings,
        );

        let main = context.queue_resource(QueueRole::Main).unwrap();
        assert!(main.resource.properties.fifo_throughput_limit.is_none());
        assert!(main.resource.properties.fifo_queue.is_none());
    }

    #[test]
    fn test_values_are_forwarded_as_given() {
        let settings = Settings::default();
        let context = context_for(
            json!({
                "name": "orders",
                "mainQueueProperties": {
                    "visibilityTimeout": "${self:custom.visibilityTimeout}",
                    "maxReceiveCount": "${self:custom.maxReceiveCount}",
                    "addTags": [{ "Key": "Team", "Value": "${self:custom.team}" }]
                }
            }),
            &settings,
        );

        let main = context.queue_resource(QueueRole::Main).unwrap();
        let properties = &main.resource.properties;
        assert_eq!(
            properties.visibility_timeout,
            Some(json!("${self:custom.visibilityTimeout}"))
        );
        assert_eq!(
            redrive(&main).unwrap()["maxReceiveCount"],
            "${self:custom.maxReceiveCount}"
        );
        assert_eq!(
            properties.tags.last(),
            Some(&json!({ "Key": "Team", "Value": "${self:custom.team}" }))
        );
    }

    #[test]
    fn test_falsy_optional_attributes_are_left_out() {
        let settings = Settings::default();
        let context = context_for(
            json!({
                "name": "orders",
                "mainQueueProperties": {
                    "fifoQueue": 1,
                    "contentBasedDeduplication": 0,
                    "fifoThroughputLimit": ""
                },
                "delayQueueProperties": { "delaySeconds": 0 },
                "dlqQueueProperties": { "messageRetentionPeriod": 0 }
            }),
            &settings,
        );

        let main = context.queue_resource(QueueRole::Main).unwrap();
        assert_eq!(main.resource.properties.fifo_queue, Some(true));
        assert!(main.resource.properties.content_based_deduplication.is_none());
        assert!(main.resource.properties.fifo_throughput_limit.is_none());

        let delay = context.queue_resource(QueueRole::Delay).unwrap();
        assert!(delay.resource.properties.delay_seconds.is_none());

        let dlq = context.queue_resource(QueueRole::Dlq).unwrap();
        let json = serde_json::to_value(&dlq).unwrap();
        assert!(json["resource"]["Properties"].get("MessageRetentionPeriod").is_none());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let settings = Settings::default();
        let context = context_for(
            json!({
                "name": "orders",
                "mainQueueProperties": { "KmsMasterKeyId": "alias/aws/sqs" }
            }),
            &settings,
        );

        let main = context.queue_resource(QueueRole::Main).unwrap();
        let json = serde_json::to_value(&main).unwrap();
        assert_eq!(json["resource"]["Properties"]["KmsMasterKeyId"], "alias/aws/sqs");
    }

    #[test]
    fn test_env_vars() {
        let settings = Settings::default();
        let context = context_for(json!({ "name": "orders" }), &settings);
        assert!(context.queue_url_env_vars().is_none());

        let context = context_for(
            json!({
                "name": "order-created",
                "mainQueueProperties": { "generateEnvVars": true },
                "dlqQueueProperties": { "generateEnvVars": true }
            }),
            &settings,
        );
        let vars = context.queue_url_env_vars().unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(
            vars["ORDER_CREATED_SQS_QUEUE_URL"],
            "https://sqs.${aws:region}.amazonaws.com/${aws:accountId}/${self:custom.serviceName}OrderCreatedQueue"
        );
        assert!(vars["ORDER_CREATED_DLQ_QUEUE_URL"].ends_with("OrderCreatedDLQ"));
    }

    #[test]
    fn test_delay_env_var() {
        let settings = Settings::default();
        let context = context_for(
            json!({ "name": "orders", "delayQueueProperties": { "generateEnvVars": true } }),
            &settings,
        );
        let vars = context.queue_url_env_vars().unwrap();
        assert_eq!(vars.keys().collect::<Vec<_>>(), vec!["ORDERS_DELAY_QUEUE_URL"]);
    }
}
