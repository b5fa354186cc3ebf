//! Rename-template rendering.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("unbalanced brace in template")]
    UnbalancedBrace,
}

/// Substitute `{placeholder}` fields from the lookup. Unknown placeholders
/// and unbalanced braces are errors so the caller can fall back to the
/// original filename.
pub fn render(template: &str, fields: &HashMap<&str, &str>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return Err(TemplateError::UnbalancedBrace),
                        Some(other) => name.push(other),
                    }
                }
                let value = fields
                    .get(name.as_str())
                    .ok_or(TemplateError::UnknownPlaceholder(name))?;
                out.push_str(value);
            }
            '}' => return Err(TemplateError::UnbalancedBrace),
            other => out.push(other),
        }
    }

    Ok(out)
}
