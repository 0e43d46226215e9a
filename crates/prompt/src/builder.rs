//! Prompt rendering for retrieval-augmented answers.

use crate::types::{PromptTemplate, CONTEXT_VAR, QUESTION_VAR};
use handlebars::Handlebars;
use std::collections::HashMap;
use vrag_core::{AppError, AppResult};

/// Render a template with the retrieval context and the user's question.
///
/// Both values are substituted verbatim; HTML escaping is disabled.
///
/// # Example
/// ```
/// use vrag_prompt::{render_prompt, PromptTemplate};
///
/// let template = PromptTemplate::new("t", "T", "{{context}} | {{question}}");
/// let prompt = render_prompt(&template, "A & B", "Why?").unwrap();
/// assert_eq!(prompt, "A & B | Why?");
/// ```
pub fn render_prompt(template: &PromptTemplate, context: &str, question: &str) -> AppResult<String> {
    tracing::debug!("Rendering prompt: {}", template.id);

    let mut variables = HashMap::new();
    variables.insert(CONTEXT_VAR, context);
    variables.insert(QUESTION_VAR, question);

    render_template(&template.template, &variables)
}

fn render_template(template: &str, variables: &HashMap<&str, &str>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompts, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
