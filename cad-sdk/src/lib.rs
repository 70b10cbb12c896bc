pub mod anthropic;
pub mod cad_sdk_test;
mod client_utils;
mod errors;
pub mod google;
pub mod opentelemetry;
pub mod proxy;
pub mod scene;
mod service;
mod types;
mod types_ext;

pub use errors::*;
pub use service::{AssistantService, ExecutionService, IllustrationService};
pub use types::*;
