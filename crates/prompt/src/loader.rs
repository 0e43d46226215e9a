//! Prompt template loading.

use crate::types::{PromptTemplate, CONTEXT_VAR, QUESTION_VAR};
use vrag_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the built-in template.
pub const DEFAULT_TEMPLATE_ID: &str = "rag.answer.default";

const DEFAULT_TEMPLATE: &str = r#"You are a chatbot named Aero Space. Your users are systems engineers researching systems engineering principles and best practices. If no answer is found in the context, respond with "I was not able to find the answer based on the provided context.":

{{context}}

---

Answer the question as a systems engineer would, based on the above context: {{question}}
"#;

/// The built-in RAG answering template.
pub fn default_template() -> PromptTemplate {
    PromptTemplate::new(
        DEFAULT_TEMPLATE_ID,
        "Grounded answer (systems engineering)",
        DEFAULT_TEMPLATE,
    )
}

/// Load the configured template, falling back to the built-in one.
pub fn load_or_default(path: Option<&Path>) -> AppResult<PromptTemplate> {
    match path {
        Some(path) => load_template(path),
        None => {
            tracing::debug!("Using built-in prompt template {}", DEFAULT_TEMPLATE_ID);
            Ok(default_template())
        }
    }
}

/// Load a prompt template from a YAML file.
///
/// # Example
/// ```no_run
/// use vrag_prompt::load_template;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let template = load_template(Path::new(".vrag/prompt.yml"))?;
/// println!("Loaded prompt: {}", template.title);
/// # Ok(())
/// # }
/// ```
pub fn load_template(path: &Path) -> AppResult<PromptTemplate> {
    tracing::debug!("Loading prompt from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!("Prompt file not found: {:?}", path)));
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e)))?;

    let template: PromptTemplate = serde_yaml::from_str(&contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e)))?;

    validate_template(&template)?;

    tracing::info!("Loaded prompt: {} ({})", template.id, template.title);

    Ok(template)
}

/// Check that a template is usable for RAG answering.
pub fn validate_template(template: &PromptTemplate) -> AppResult<()> {
    if template.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if template.template.trim().is_empty() {
        return Err(AppError::Prompt("Prompt template cannot be empty".to_string()));
    }

    for var in [CONTEXT_VAR, QUESTION_VAR] {
        if !references(&template.template, var) {
            return Err(AppError::Prompt(format!(
                "Prompt template '{}' must reference {{{{{}}}}}",
                template.id, var
            )));
        }
    }

    Ok(())
}

fn references(template: &str, var: &str) -> bool {
    template.contains(&format!("{{{{{}}}}}", var))
        || template.contains(&format!("{{{{ {} }}}}", var))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_template_is_valid() {
        let template = default_template();
        assert!(validate_template(&template).is_ok());
        assert!(template.template.contains("not able to find the answer"));
    }

    #[test]
    fn test_load_valid_template() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prompt.yml");
        fs::write(
            &path,
            r#"
id: terse
title: "Terse"
apiVersion: "1.0"
template: "{{context}}\n\nQ: {{ question }}"
"#,
        )
        .unwrap();

        let template = load_template(&path).unwrap();
        assert_eq!(template.id, "terse");
        assert_eq!(template.title, "Terse");
    }

    #[test]
    fn test_load_or_default_without_path() {
        let template = load_or_default(None).unwrap();
        assert_eq!(template.id, DEFAULT_TEMPLATE_ID);
    }

    #[test]
    fn test_load_nonexistent_template() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_template(&temp_dir.path().join("missing.yml"));
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yml");
        fs::write(&path, "invalid: yaml: content:").unwrap();

        assert!(load_template(&path).is_err());
    }

    #[test]
    fn test_template_without_question_rejected() {
        let template = PromptTemplate::new("no-q", "No question", "Context only: {{context}}");
        match validate_template(&template) {
            Err(AppError::Prompt(msg)) => assert!(msg.contains("{{question}}")),
            other => panic!("Expected prompt error, got {:?}", other),
        }
    }
}
