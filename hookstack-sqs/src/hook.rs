//! Descriptor tuples handed to the deployment orchestrator
//!
//! A [`Hook`] serializes as a two element array `[kind, payload]`. Payloads
//! with user pass-through keys serialize as objects where those keys
//! override the generated ones.

use serde::ser::{Error as _, SerializeTuple};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Resource type of every queue resource
pub const SQS_QUEUE_TYPE: &str = "AWS::SQS::Queue";

/// Consumers report partial batch failures instead of failing the whole batch
pub const REPORT_BATCH_ITEM_FAILURES: &str = "ReportBatchItemFailures";

/// One descriptor tuple
#[derive(Debug, Clone, PartialEq)]
pub enum Hook {
    IamStatement(IamStatement),
    /// Environment variable name to interpolated queue URL
    EnvVars(BTreeMap<String, String>),
    Function(FunctionHook),
    Resource(ResourceHook),
}

impl Hook {
    /// Kind tag of the tuple
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IamStatement(_) => "iamStatement",
            Self::EnvVars(_) => "envVars",
            Self::Function(_) => "function",
            Self::Resource(_) => "resource",
        }
    }

    pub fn as_function(&self) -> Option<&FunctionHook> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceHook> {
        match self {
            Self::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn as_env_vars(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::EnvVars(vars) => Some(vars),
            _ => None,
        }
    }
}

impl Serialize for Hook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.kind())?;
        match self {
            Self::IamStatement(statement) => tuple.serialize_element(statement)?,
            Self::EnvVars(vars) => tuple.serialize_element(vars)?,
            Self::Function(function) => tuple.serialize_element(function)?,
            Self::Resource(resource) => tuple.serialize_element(resource)?,
        }
        tuple.end()
    }
}

/// IAM permission required by the functions of the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IamStatement {
    pub action: Vec<String>,
    pub resource: String,
}

/// A consumer function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHook {
    pub function_name: String,
    pub handler: Value,
    pub description: Value,
    pub timeout: Option<Value>,
    /// Always carries `dependsOn`
    pub raw_properties: Map<String, Value>,
    pub events: Vec<EventSource>,
    /// Pass-through keys, override the generated ones
    pub extra: Map<String, Value>,
}

impl FunctionHook {
    /// Queue ARNs this function consumes from, own queue first
    pub fn event_arns(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.sqs.arn.as_str()).collect()
    }

    pub fn depends_on(&self) -> Vec<&str> {
        self.raw_properties
            .get("dependsOn")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl Serialize for FunctionHook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Fields<'a> {
            function_name: &'a str,
            handler: &'a Value,
            description: &'a Value,
            #[serde(skip_serializing_if = "Option::is_none")]
            timeout: Option<&'a Value>,
            raw_properties: &'a Map<String, Value>,
            events: &'a [EventSource],
        }

        let fields = Fields {
            function_name: &self.function_name,
            handler: &self.handler,
            description: &self.description,
            timeout: self.timeout.as_ref(),
            raw_properties: &self.raw_properties,
            events: &self.events,
        };

        with_overrides(serializer, &fields, &self.extra)
    }
}

/// Binding of a queue to a consumer function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSource {
    pub sqs: SqsEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqsEvent {
    pub arn: String,
    pub function_response_type: String,
    /// Only set when truthy
    pub batch_size: Option<Value>,
    /// Only set when truthy
    pub maximum_batching_window: Option<Value>,
    pub extra: Map<String, Value>,
}

impl Serialize for SqsEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Fields<'a> {
            arn: &'a str,
            function_response_type: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            batch_size: Option<&'a Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            maximum_batching_window: Option<&'a Value>,
        }

        let fields = Fields {
            arn: &self.arn,
            function_response_type: &self.function_response_type,
            batch_size: self.batch_size.as_ref(),
            maximum_batching_window: self.maximum_batching_window.as_ref(),
        };

        with_overrides(serializer, &fields, &self.extra)
    }
}

/// A queue resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceHook {
    /// Logical resource name
    pub name: String,
    pub resource: QueueResource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: QueueResourceProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueResourceProperties {
    pub queue_name: String,
    pub receive_message_wait_time_seconds: Option<Value>,
    pub visibility_timeout: Option<Value>,
    /// JSON encoded, the queue API does not accept a nested object
    pub redrive_policy: Option<String>,
    pub message_retention_period: Option<Value>,
    pub delay_seconds: Option<Value>,
    pub fifo_queue: Option<bool>,
    pub fifo_throughput_limit: Option<Value>,
    pub deduplication_scope: Option<Value>,
    pub content_based_deduplication: Option<bool>,
    /// `{Key, Value}` objects, user tags are forwarded as given
    pub tags: Vec<Value>,
    pub extra: Map<String, Value>,
}

impl Serialize for QueueResourceProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct Fields<'a> {
            queue_name: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            receive_message_wait_time_seconds: Option<&'a Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            visibility_timeout: Option<&'a Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            redrive_policy: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            message_retention_period: Option<&'a Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            delay_seconds: Option<&'a Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            fifo_queue: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            fifo_throughput_limit: Option<&'a Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            deduplication_scope: Option<&'a Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            content_based_deduplication: Option<bool>,
            tags: &'a [Value],
        }

        let fields = Fields {
            queue_name: &self.queue_name,
            receive_message_wait_time_seconds: self.receive_message_wait_time_seconds.as_ref(),
            visibility_timeout: self.visibility_timeout.as_ref(),
            redrive_policy: self.redrive_policy.as_deref(),
            message_retention_period: self.message_retention_period.as_ref(),
            delay_seconds: self.delay_seconds.as_ref(),
            fifo_queue: self.fifo_queue,
            fifo_throughput_limit: self.fifo_throughput_limit.as_ref(),
            deduplication_scope: self.deduplication_scope.as_ref(),
            content_based_deduplication: self.content_based_deduplication,
            tags: &self.tags,
        };

        with_overrides(serializer, &fields, &self.extra)
    }
}

/// Serialize `fields` as an object, then let `extra` override its keys
fn with_overrides<S: Serializer, T: Serialize>(
    serializer: S,
    fields: &T,
    extra: &Map<String, Value>,
) -> Result<S::Ok, S::Error> {
    let mut payload = match serde_json::to_value(fields).map_err(S::Error::custom)? {
        Value::Object(map) => map,
        _ => return Err(S::Error::custom("payload must serialize as an object")),
    };

    payload.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    payload.serialize(serializer)
}
