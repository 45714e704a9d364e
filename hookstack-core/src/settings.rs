//! Deployment settings shared by every generated hook
//!
//! The defaults are interpolation strings resolved by the deployment
//! orchestrator, so the generated descriptors stay account and stage agnostic.

use serde::{Deserialize, Serialize};

/// A resource tag as emitted in CloudFormation `Tags` lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    #[serde(alias = "key")]
    pub key: String,
    #[serde(alias = "value")]
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Settings applied on top of every hook configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Prefix prepended to every queue name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_account_id")]
    pub account_id: String,

    /// Directory holding the consumer handlers
    #[serde(default = "default_handler_dir")]
    pub handler_dir: String,

    /// Tags placed first on every queue resource
    #[serde(default = "default_tags")]
    pub default_tags: Vec<Tag>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            region: default_region(),
            account_id: default_account_id(),
            handler_dir: default_handler_dir(),
            default_tags: default_tags(),
        }
    }
}

fn default_service_name() -> String {
    "${self:custom.serviceName}".to_string()
}

fn default_region() -> String {
    "${aws:region}".to_string()
}

fn default_account_id() -> String {
    "${aws:accountId}".to_string()
}

fn default_handler_dir() -> String {
    "src/sqs-consumer".to_string()
}

fn default_tags() -> Vec<Tag> {
    vec![
        Tag::new("Owner", "${self:custom.owner, 'platform'}"),
        Tag::new("Microservice", "${self:custom.serviceName}"),
        Tag::new("Stage", "${self:custom.stage}"),
    ]
}

impl Settings {
    /// ARN prefix shared by every queue of the account and region
    pub fn queue_arn_prefix(&self) -> String {
        format!("arn:aws:sqs:{}:{}", self.region, self.account_id)
    }

    /// URL prefix shared by every queue of the account and region
    pub fn queue_url_prefix(&self) -> String {
        format!(
            "https://sqs.{}.amazonaws.com/{}/",
            self.region, self.account_id
        )
    }

    /// Full deployed queue name for an already suffixed logical name
    pub fn queue_name(&self, name: &str) -> String {
        format!("{}{}", self.service_name, name)
    }
}
