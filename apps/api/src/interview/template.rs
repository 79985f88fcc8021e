//! Prompt templates with named placeholders and conditional sections.
//!
//! Syntax:
//! - `{name}` is replaced by the value bound to `name`.
//! - `{?name}...{/name}` is kept only when `name` is bound to a non-blank value.
//! - Any other brace, such as a JSON example, is literal text.
//!
//! Templates are parsed once into segments, so rendering is a single pass and a
//! bound value is never scanned for placeholders. A job description containing
//! `{interview_question}` is copied verbatim.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("section '{0}' is never closed")]
    UnclosedSection(String),

    #[error("closing tag '{found}' does not match open section '{expected}'")]
    MismatchedSection { expected: String, found: String },

    #[error("closing tag '{0}' has no open section")]
    StrayClose(String),

    #[error("no value bound for placeholder '{0}'")]
    MissingVariable(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Var(String),
    Section { name: String, body: Vec<Segment> },
}

enum Tag<'a> {
    Var(&'a str),
    Open(&'a str),
    Close(&'a str),
}

/// A parsed template. Construction fails on unbalanced sections.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

/// Values bound to placeholder names for one render.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    values: HashMap<&'static str, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    /// Binds `name` only when a value is present.
    pub fn set_opt(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.set(name, v),
            None => self,
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }
}

impl PromptTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut stack: Vec<(String, Vec<Segment>)> = Vec::new();
        let mut current: Vec<Segment> = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find('{') {
            text.push_str(&rest[..pos]);
            let after = &rest[pos..];

            let Some((tag, len)) = parse_tag(after) else {
                text.push('{');
                rest = &after[1..];
                continue;
            };

            if !text.is_empty() {
                current.push(Segment::Text(std::mem::take(&mut text)));
            }

            match tag {
                Tag::Var(name) => current.push(Segment::Var(name.to_string())),
                Tag::Open(name) => {
                    stack.push((name.to_string(), std::mem::take(&mut current)));
                }
                Tag::Close(name) => {
                    let (open, parent) = stack
                        .pop()
                        .ok_or_else(|| TemplateError::StrayClose(name.to_string()))?;
                    if open != name {
                        return Err(TemplateError::MismatchedSection {
                            expected: open,
                            found: name.to_string(),
                        });
                    }
                    let body = std::mem::replace(&mut current, parent);
                    current.push(Segment::Section { name: open, body });
                }
            }

            rest = &after[len..];
        }

        text.push_str(rest);
        if !text.is_empty() {
            current.push(Segment::Text(text));
        }

        if let Some((open, _)) = stack.pop() {
            return Err(TemplateError::UnclosedSection(open));
        }

        Ok(Self { segments: current })
    }

    pub fn render(&self, vars: &TemplateVars) -> Result<String, TemplateError> {
        let mut out = String::new();
        render_into(&self.segments, vars, &mut out)?;
        Ok(out)
    }
}

fn render_into(
    segments: &[Segment],
    vars: &TemplateVars,
    out: &mut String,
) -> Result<(), TemplateError> {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Var(name) => {
                let value = vars
                    .get(name)
                    .ok_or_else(|| TemplateError::MissingVariable(name.clone()))?;
                out.push_str(value);
            }
            Segment::Section { name, body } => {
                if vars.is_truthy(name) {
                    render_into(body, vars, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Recognises `{name}`, `{?name}` and `{/name}` at the start of `input`.
/// Returns the tag and its byte length.
fn parse_tag(input: &str) -> Option<(Tag<'_>, usize)> {
    let close = input.find('}')?;
    let inner = &input[1..close];
    let tag = if let Some(name) = inner.strip_prefix('?') {
        Tag::Open(is_identifier(name)?)
    } else if let Some(name) = inner.strip_prefix('/') {
        Tag::Close(is_identifier(name)?)
    } else {
        Tag::Var(is_identifier(inner)?)
    };
    Some((tag, close + 1))
}

fn is_identifier(name: &str) -> Option<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_lowercase());
    valid.then_some(name)
}
