//! Queue ARN derivation

use crate::error::HookError;
use crate::names::{apply_fifo_suffix, DerivedNames};
use crate::settings::Settings;

/// ARNs of the three queues a family can declare
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedArns {
    pub main_queue: String,
    pub delay_queue: String,
    pub dlq: String,
}

/// Build the ARN of every queue role from the derived names
pub fn derive_arns(
    names: &DerivedNames,
    is_fifo: bool,
    settings: &Settings,
) -> Result<DerivedArns, HookError> {
    let prefix = settings.queue_arn_prefix();

    let arn = |role: &str, name: &str| -> Result<String, HookError> {
        if name.is_empty() {
            return Err(HookError::invalid_name(format!(
                "Cannot derive ARN for {role}: queue name is empty"
            ))
            .with_field(role));
        }
        Ok(format!(
            "{prefix}:{}",
            settings.queue_name(&apply_fifo_suffix(name, is_fifo))
        ))
    };

    Ok(DerivedArns {
        main_queue: arn("mainQueue", &names.main_queue)?,
        delay_queue: arn("delayQueue", &names.delay_queue)?,
        dlq: arn("dlq", &names.dlq)?,
    })
}
