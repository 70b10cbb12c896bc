//! Test doubles for the service traits.

mod services;

pub use services::{MockAssistant, MockExecutor, MockIllustrator, MockResult};
