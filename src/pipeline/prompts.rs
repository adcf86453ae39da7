//! Prompt-template assembly. Pure string builders so every template can be
//! unit tested without touching the network.

use super::tech_stack::{auth_hint, TechStack};
use super::GenerationRequest;
use crate::pipeline::tech_stack::Platform;

/// System instruction for every assembly sub-call: frames the assistant as
/// a senior technical architect writing prompts for AI coding assistants.
pub const ARCHITECT_SYSTEM: &str = "You are a senior software engineer and technical architect \
working in a big tech company. Your task is to write comprehensive, actionable prompts that AI \
coding assistants can use to generate high-quality code. Write prompts that include all necessary \
context, best practices, system design considerations, and implementation details.";

/// System instruction for the feature research step.
pub const RESEARCH_SYSTEM: &str = "You are a senior software architect who specializes in \
analyzing application requirements. Your task is to research and suggest comprehensive features \
and functionalities for different types of applications. Be specific and practical, considering \
the specific industry or niche.";

/// Render the feature list as bullet lines, or a placeholder when empty.
pub fn features_list(features: &[String]) -> String {
    if features.is_empty() {
        "- None specified".to_string()
    } else {
        features
            .iter()
            .map(|f| format!("- {f}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Rolling note of cumulative prior scope, threaded through the feature
/// fold so each feature prompt knows how much is already built without
/// re-embedding every prior prompt's full text.
pub fn previous_work_note(prior_features: usize) -> String {
    if prior_features == 0 {
        "Previous work: Landing page with navbar and footer is already built.".to_string()
    } else {
        format!(
            "Previous work: Landing page and {prior_features} feature(s) already implemented."
        )
    }
}

/// Instruction for PromptSection #1 "Project Overview & Context" — a
/// context-setting brief, not an implementation prompt.
pub fn overview_context(request: &GenerationRequest, stack: &TechStack) -> String {
    let GenerationRequest {
        app_type,
        domain,
        design_style,
        platform,
        additional_info,
        features,
    } = request;

    let additional = match additional_info.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(info) => format!("Additional Requirements:\n{info}\n\n"),
        None => String::new(),
    };

    format!(
        "Create a comprehensive overview prompt that provides complete context about the \
application we're building. This is NOT an implementation prompt - it's context for the AI \
assistant to understand what we're building.

Application Details:
- Type: {app_type}
- Domain/Industry: {domain}
- Platform: {platform}
- Design Style: {design_style}
- Tech Stack: {stack_names}

Tech Stack Details:
{stack_details}

Features to Implement:
{feature_lines}

{additional}Write a prompt that:
1. Clearly describes what application we're building and who it's for ({domain})
2. Lists all the features that need to be implemented
3. Specifies the exact tech stack to use ({stack_names})
4. Outlines the overall architecture and structure
5. Sets coding standards and best practices for this tech stack
6. Provides any domain-specific considerations for {domain}

This prompt should give the AI complete context about the project before we start building \
individual components. Write it as a clear, comprehensive briefing.",
        stack_names = stack.stack,
        stack_details = stack.details,
        feature_lines = features_list(features),
    )
}

/// Instruction for PromptSection #2 "Landing Page, Navbar & Footer" — the
/// first implementation prompt, grounded on the generated overview text.
pub fn landing_page_context(
    request: &GenerationRequest,
    stack: &TechStack,
    overview_text: &str,
) -> String {
    let GenerationRequest {
        app_type,
        domain,
        design_style,
        platform,
        ..
    } = request;

    format!(
        "Generate a comprehensive implementation prompt for building the landing page with \
navbar and footer for a {app_type} targeting {domain}.

Reference the Project Overview:
{overview_text}

Tech Stack to Use:
{stack_details}

Design Requirements:
- Design Style: {design_style}
- Platform: {platform}
- Domain: {domain}

Create a comprehensive prompt that the AI assistant will use to BUILD the landing page. The \
prompt should cover:

1. Project setup (if needed for {platform})
2. Landing page structure and sections:
   - Hero section with compelling headline for {domain}
   - Features section highlighting key capabilities
   - Call-to-action sections
   - Any industry-specific sections for {domain}
3. Responsive navbar with proper navigation
4. Professional footer with relevant sections
5. Styling with {design_style} design style
6. Mobile responsiveness
7. SEO optimization
8. Accessibility (ARIA labels, semantic HTML)
9. Integration with {stack_names}

The prompt should be actionable and ready for an AI coding assistant to implement. Build on \
the context provided in the Project Overview.",
        stack_details = stack.details,
        stack_names = stack.stack,
    )
}

/// Instruction for one "Feature: {name}" PromptSection. Embeds the overview
/// text, the tech stack, and the rolling prior-work note.
pub fn feature_context(
    request: &GenerationRequest,
    stack: &TechStack,
    platform: Platform,
    overview_text: &str,
    feature: &str,
    prior_features: usize,
) -> String {
    let GenerationRequest {
        app_type,
        domain,
        design_style,
        platform: platform_label,
        ..
    } = request;

    format!(
        "Generate a comprehensive implementation prompt for adding the \"{feature}\" feature \
to our {app_type} for {domain}.

Project Overview (for context):
{overview_text}

Tech Stack:
{stack_details}

Context:
{previous_work}

Technical Requirements:
- Application Type: {app_type}
- Domain: {domain}
- Platform: {platform_label}
- Design Style: {design_style}

Create a comprehensive prompt that the AI assistant will use to IMPLEMENT this feature. The \
prompt should cover:

1. Feature requirements and user stories for {domain}
2. Database schema changes (using {database_hint}) if needed
3. API endpoints needed (if applicable)
4. Frontend implementation:
   - Components and UI
   - State management
   - Integration with existing pages
5. Backend logic and validation
6. Security considerations (authentication, authorization using {auth})
7. Error handling
8. Integration with {stack_names}
9. Industry-specific requirements for {domain}

The prompt should be actionable and build upon the existing codebase. Ensure it integrates \
smoothly with the already-built components.",
        stack_details = stack.details,
        previous_work = previous_work_note(prior_features),
        database_hint = stack.database_hint,
        auth = auth_hint(platform),
        stack_names = stack.stack,
    )
}

/// User instruction for the feature research step: 10-15 features, each
/// with name, one-sentence description, and a category tier, returned as
/// a JSON array.
pub fn research_prompt(app_type: &str, domain: &str) -> String {
    format!(
        "Research and list the most important features and functionalities for a {app_type} \
specifically for {domain}.

Context: This is a {app_type} targeting the {domain} industry/niche. Consider the specific \
needs, workflows, and pain points of {domain}.

Please provide:
1. Core essential features (must-have for {domain})
2. Common additional features (nice-to-have for {domain})
3. Advanced features (optional but valuable for {domain})

For each feature, provide:
- Feature name (short, 2-4 words, relevant to {domain})
- Brief description (one sentence explaining what it does and why it matters for {domain})

Format your response as a JSON array with this structure:
[
  {{
    \"name\": \"Feature Name\",
    \"description\": \"Brief description of what this feature does\",
    \"category\": \"Essential\" | \"Common\" | \"Advanced\"
  }}
]

Provide 10-15 features in total. Be specific to {app_type} for {domain}."
    )
}
