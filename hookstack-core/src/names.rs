//! Name derivation for a queue family
//!
//! Every identifier of a family (queues, consumer function title, handler
//! file stem, environment-variable prefix) comes from one normalized base
//! name, so two roles of the same family can never collide.

use crate::error::HookError;
use tracing::debug;

/// Reserved suffix of FIFO queue names
pub const FIFO_SUFFIX: &str = ".fifo";

/// Names derived from the family base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub main_queue: String,
    pub delay_queue: String,
    pub dlq: String,
    /// UpperCamelCase family title, e.g. `OrderCreated`
    pub title_name: String,
    /// kebab-case handler file stem, e.g. `order-created`
    pub filename: String,
    /// UPPER_SNAKE_CASE prefix, e.g. `ORDER_CREATED`
    pub env_var_name: String,
}

/// Derive every role name of the family identified by `base_name`
pub fn derive_names(base_name: &str) -> Result<DerivedNames, HookError> {
    let words = split_words(base_name);

    if words.is_empty() {
        return Err(HookError::invalid_name(format!(
            "Name `{base_name}` has no alphanumeric characters to derive queue names from"
        ))
        .with_field("name"));
    }

    if words[0].starts_with(|c: char| c.is_ascii_digit()) {
        return Err(HookError::invalid_name(format!(
            "Name `{base_name}` must start with a letter"
        ))
        .with_field("name"));
    }

    let title_name: String = words.iter().map(|w| capitalize(w)).collect();
    let filename = words
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    let env_var_name = words
        .iter()
        .map(|w| w.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("_");

    let names = DerivedNames {
        main_queue: format!("{title_name}Queue"),
        delay_queue: format!("{title_name}DelayQueue"),
        dlq: format!("{title_name}DLQ"),
        title_name,
        filename,
        env_var_name,
    };

    debug!(base = %base_name, title = %names.title_name, "Derived queue family names");
    Ok(names)
}

/// Append the FIFO suffix when `is_fifo`, never twice
pub fn apply_fifo_suffix(name: &str, is_fifo: bool) -> String {
    if is_fifo && !name.ends_with(FIFO_SUFFIX) {
        format!("{name}{FIFO_SUFFIX}")
    } else {
        name.to_string()
    }
}

/// Split on non-alphanumeric characters and on case boundaries.
///
/// `orderCreated` and `order_created` give the same words; an acronym run
/// ends before the capital that starts the next word (`DLQHandler`).
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();

    for chunk in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut start = 0;

        for i in 1..chars.len() {
            let prev = chars[i - 1];
            let current = chars[i];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);

            let boundary = (prev.is_ascii_lowercase() && current.is_ascii_uppercase())
                || (prev.is_ascii_digit() && current.is_ascii_uppercase())
                || (prev.is_ascii_uppercase() && current.is_ascii_uppercase() && next_is_lower);

            if boundary {
                words.push(chars[start..i].iter().collect());
                start = i;
            }
        }

        if start < chars.len() {
            words.push(chars[start..].iter().collect());
        }
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.push(first.to_ascii_uppercase());
            out.extend(chars.map(|c| c.to_ascii_lowercase()));
            out
        }
        None => String::new(),
    }
}
