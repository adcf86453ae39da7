//! The prompt assembly pipeline: an ordered, mutually-referential sequence
//! of implementation prompts built from strictly sequential LLM calls.

use std::time::Duration;

use crate::error::AppError;
use crate::llm::{CompletionRequest, TextGenerator};
use crate::validation::require_non_empty;

use super::tech_stack::{self, Platform};
use super::{prompts, GenerationRequest, PromptSection};

/// Sampling temperature for every assembly sub-call. Moderate/exploratory
/// on purpose; prompts benefit from some variety.
const TEMPERATURE: f32 = 0.7;

/// Output ceiling per generated prompt.
const MAX_TOKENS: u32 = 2000;

/// Hard deadline for one whole pipeline run. The run is a chain of
/// sequential round trips, so without a cap a slow upstream means
/// unbounded request latency. Expiry cancels the in-flight sub-call.
const PIPELINE_DEADLINE: Duration = Duration::from_secs(300);

/// Pure plan of `(order, title)` pairs for a feature list: overview at 1,
/// landing page at 2, one section per feature from 3 on.
pub fn section_titles(features: &[String]) -> Vec<(i32, String)> {
    let mut titles = vec![
        (1, "Project Overview & Context".to_string()),
        (2, "Landing Page, Navbar & Footer".to_string()),
    ];
    for (i, feature) in features.iter().enumerate() {
        titles.push((3 + i as i32, format!("Feature: {feature}")));
    }
    titles
}

/// Run the full pipeline: validate, derive the tech stack, then generate
/// overview -> landing page -> one prompt per feature, feeding the overview
/// text and the prior-feature count forward as an explicit accumulator.
///
/// All-or-nothing: any sub-call failure aborts the run with no partial
/// result. Quota accounting is the caller's job (charge only on success).
pub async fn run(
    llm: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<Vec<PromptSection>, AppError> {
    require_non_empty("Application type", &request.app_type)?;
    require_non_empty("Domain", &request.domain)?;

    tokio::time::timeout(PIPELINE_DEADLINE, run_inner(llm, request))
        .await
        .map_err(|_| {
            AppError::Upstream(format!(
                "prompt generation exceeded the {}s deadline",
                PIPELINE_DEADLINE.as_secs()
            ))
        })?
}

async fn run_inner(
    llm: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<Vec<PromptSection>, AppError> {
    let platform = Platform::from_label(&request.platform);
    let stack = tech_stack::for_platform(platform);

    let mut sections: Vec<PromptSection> = Vec::with_capacity(request.features.len() + 2);

    // Section 1: context brief. Every later request embeds its text verbatim.
    let overview_text = generate_text(llm, prompts::overview_context(request, &stack)).await?;
    sections.push(section("Project Overview & Context", overview_text.clone(), 1));

    // Section 2: first implementation prompt, grounded on the overview.
    let landing_text = generate_text(
        llm,
        prompts::landing_page_context(request, &stack, &overview_text),
    )
    .await?;
    sections.push(section("Landing Page, Navbar & Footer", landing_text, 2));

    // Sections 3..: one per feature, in caller order. The accumulator is
    // (overview_text, prior-feature count); each prompt only carries a
    // rolling note of cumulative scope, not every prior prompt's text.
    for (i, feature) in request.features.iter().enumerate() {
        let context =
            prompts::feature_context(request, &stack, platform, &overview_text, feature, i);
        let feature_text = generate_text(llm, context).await?;
        sections.push(section(
            &format!("Feature: {feature}"),
            feature_text,
            3 + i as i32,
        ));
    }

    // A no-op given construction order, but the order-sorted output is an
    // explicit invariant callers rely on.
    sections.sort_by_key(|s| s.order);
    Ok(sections)
}

async fn generate_text(llm: &dyn TextGenerator, context: String) -> Result<String, AppError> {
    let completion = llm
        .generate(CompletionRequest {
            system: prompts::ARCHITECT_SYSTEM.to_string(),
            prompt: context,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            json_mode: false,
        })
        .await?;
    Ok(completion.text)
}

fn section(title: &str, prompt: String, order: i32) -> PromptSection {
    PromptSection {
        title: title.to_string(),
        description: format!("Comprehensive prompt for: {title}"),
        prompt,
        order,
    }
}
