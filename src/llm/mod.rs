pub mod client;
pub mod infer;

pub use client::{CompletionParams, LlmClient, LlmError, TextGeneration};
pub use infer::{infer_plan, AuxiliaryConstruct, InferredPlan};
