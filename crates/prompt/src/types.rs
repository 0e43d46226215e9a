//! Prompt template types.

use serde::{Deserialize, Serialize};

/// Placeholder receiving the joined retrieval context.
pub const CONTEXT_VAR: &str = "context";

/// Placeholder receiving the user's question.
pub const QUESTION_VAR: &str = "question";

/// A RAG prompt template, loaded from YAML or built in.
///
/// `template` is a Handlebars string that must reference both `{{context}}`
/// and `{{question}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Unique template identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,

    /// Template string with Handlebars syntax
    pub template: String,
}

fn default_api_version() -> String {
    "1.0".to_string()
}

impl PromptTemplate {
    /// Create a template from its parts.
    pub fn new(id: impl Into<String>, title: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            api_version: default_api_version(),
            template: template.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_deserialization() {
        let yaml = r#"
id: support.answer
title: Support answer
template: "Context: {{context}} Question: {{question}}"
"#;

        let def: PromptTemplate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "support.answer");
        assert_eq!(def.api_version, "1.0");
        assert!(def.template.contains("{{question}}"));
    }
}
