//! Feature research: one structured LLM call that turns `(appType, domain)`
//! into a tiered list of candidate features.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::llm::{CompletionRequest, TextGenerator, TokenUsage};
use crate::validation::require_non_empty;

use super::prompts;

/// Output ceiling for the research reply.
const MAX_TOKENS: u32 = 1500;

const TEMPERATURE: f32 = 0.7;

/// Priority tier for a suggested feature. Models occasionally stray from
/// the requested labels, so unknown tiers are preserved as-is instead of
/// failing the whole reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeatureTier {
    Essential,
    Common,
    Advanced,
    Other(String),
}

impl From<String> for FeatureTier {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Essential" => FeatureTier::Essential,
            "Common" => FeatureTier::Common,
            "Advanced" => FeatureTier::Advanced,
            _ => FeatureTier::Other(value),
        }
    }
}

impl From<FeatureTier> for String {
    fn from(tier: FeatureTier) -> Self {
        match tier {
            FeatureTier::Essential => "Essential".into(),
            FeatureTier::Common => "Common".into(),
            FeatureTier::Advanced => "Advanced".into(),
            FeatureTier::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSuggestion {
    pub name: String,
    pub description: String,
    pub category: FeatureTier,
}

/// Ask the LLM for 10-15 feature suggestions for `(app_type, domain)`.
/// Intentionally not quota-gated: research costs one upstream call but
/// produces no billable artifact.
pub async fn suggest(
    llm: &dyn TextGenerator,
    app_type: &str,
    domain: &str,
) -> Result<(Vec<FeatureSuggestion>, Option<TokenUsage>), AppError> {
    require_non_empty("Application type", app_type)?;
    require_non_empty("Domain", domain)?;

    let completion = llm
        .generate(CompletionRequest {
            system: prompts::RESEARCH_SYSTEM.to_string(),
            prompt: prompts::research_prompt(app_type, domain),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            json_mode: true,
        })
        .await?;

    let features = parse_reply(&completion.text)?;
    Ok((features, completion.usage))
}

/// Parse the structured reply, tolerating the shapes models actually
/// produce, in fixed priority order: a bare array, an object with a
/// `features` array, an object with a `suggestions` array. Anything else,
/// or an empty list, is an upstream parse failure.
pub fn parse_reply(text: &str) -> Result<Vec<FeatureSuggestion>, AppError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| AppError::UpstreamParse(format!("reply is not JSON: {e}")))?;

    let list = if value.is_array() {
        value
    } else if let Some(features) = value.get("features").filter(|v| v.is_array()) {
        features.clone()
    } else if let Some(suggestions) = value.get("suggestions").filter(|v| v.is_array()) {
        suggestions.clone()
    } else {
        return Err(AppError::UpstreamParse(
            "no feature list found in reply".into(),
        ));
    };

    let features: Vec<FeatureSuggestion> = serde_json::from_value(list)
        .map_err(|e| AppError::UpstreamParse(format!("malformed feature entries: {e}")))?;

    if features.is_empty() {
        return Err(AppError::UpstreamParse("feature list is empty".into()));
    }
    Ok(features)
}
