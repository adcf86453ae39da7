pub mod features;
pub mod generate;
pub mod prompts;
pub mod tech_stack;

use serde::{Deserialize, Serialize};

/// Validated input for one pipeline run. Constructed per call, consumed
/// entirely within one execution, never persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub app_type: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub design_style: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// One generated unit of implementation-instruction text, with a fixed
/// position in the overall build sequence. The response of the assembly
/// pipeline is an order-sorted sequence of these.
#[derive(Debug, Clone, Serialize)]
pub struct PromptSection {
    pub title: String,
    pub description: String,
    pub prompt: String,
    pub order: i32,
}
