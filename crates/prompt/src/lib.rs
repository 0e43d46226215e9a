//! Prompt templates for vrag.
//!
//! A RAG prompt is a Handlebars template with two placeholders: `{{context}}`
//! receives the joined retrieved chunks and `{{question}}` the user's query.
//! Templates are either built in or loaded from a YAML file.

pub mod builder;
pub mod loader;
pub mod types;

pub use builder::render_prompt;
pub use loader::{default_template, load_or_default, load_template, validate_template};
pub use types::PromptTemplate;
