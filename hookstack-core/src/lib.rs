//! Core types for hookstack
//!
//! This crate provides the pieces shared by every hook generator:
//! error types, derived naming for a queue family, ARN derivation and
//! the deployment settings that feed interpolation strings.

pub mod arn;
pub mod error;
pub mod names;
pub mod settings;

pub use arn::{derive_arns, DerivedArns};
pub use error::{ErrorCode, HookError};
pub use names::{apply_fifo_suffix, derive_names, DerivedNames, FIFO_SUFFIX};
pub use settings::{Settings, Tag};
