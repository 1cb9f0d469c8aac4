//! Query templates: text with embedded `#{...}` expressions evaluated at execution time.
//!
//! ```
//! use spanner_query::{StandardEvaluationContext, TemplateParser};
//!
//! let context = StandardEvaluationContext::new();
//! context.set_variable("table", "trades");
//!
//! let template = TemplateParser::default()
//!     .parse("SELECT * FROM #{#table} WHERE action = @action")
//!     .unwrap();
//! assert_eq!(
//!     template.evaluate(&context).unwrap(),
//!     "SELECT * FROM trades WHERE action = @action"
//! );
//! ```

use log::trace;

use crate::Error;

pub use context::{EvaluationContext, Function, StandardEvaluationContext};

use ast::Node;
use parser::parse_expression;

mod ast;
mod context;
mod parser;

/// The delimiters surrounding expressions within a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserContext {
    prefix: String,
    suffix: String,
}

impl ParserContext {
    /// Returns [`Error::Config`] if either delimiter is empty.
    pub fn new(prefix: &str, suffix: &str) -> Result<Self, Error> {
        if prefix.is_empty() || suffix.is_empty() {
            return Err(Error::Config(format!(
                "template delimiters cannot be empty, got prefix '{}' and suffix '{}'",
                prefix, suffix
            )));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for ParserContext {
    fn default() -> Self {
        Self {
            prefix: "#{".to_string(),
            suffix: "}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Expression(Node),
}

/// A parsed query template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    text: String,
    parts: Vec<Part>,
}

impl Template {
    /// Returns `true` when the template has no expression, i.e.: it always evaluates to its text.
    pub fn is_literal(&self) -> bool {
        !self
            .parts
            .iter()
            .any(|part| matches!(part, Part::Expression(_)))
    }

    /// The original template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Evaluates every expression against `context` and splices the results into the text.
    ///
    /// An expression evaluating to null fails with [`Error::Evaluation`] rather than
    /// contributing nothing, unlike SpEL templates.
    pub fn evaluate(&self, context: &dyn EvaluationContext) -> Result<String, Error> {
        if self.is_literal() {
            return Ok(self.text.clone());
        }
        let mut evaluated = String::with_capacity(self.text.len());
        for part in &self.parts {
            match part {
                Part::Text(text) => evaluated.push_str(text),
                Part::Expression(node) => {
                    evaluated.push_str(&node.evaluate(context)?.try_to_text()?)
                }
            }
        }
        trace!("evaluated template '{}' to '{}'", self.text, evaluated);
        Ok(evaluated)
    }
}

/// Parses query templates, splitting literal text from delimited expressions.
#[derive(Debug, Clone, Default)]
pub struct TemplateParser {
    context: ParserContext,
}

impl TemplateParser {
    pub fn new(context: ParserContext) -> Self {
        Self { context }
    }

    pub fn parse(&self, text: &str) -> Result<Template, Error> {
        let prefix = self.context.prefix();
        let suffix = self.context.suffix();
        let mut parts = Vec::new();
        let mut start = 0;

        while let Some(offset) = text[start..].find(prefix) {
            let prefix_idx = start + offset;
            if prefix_idx > start {
                parts.push(Part::Text(text[start..prefix_idx].to_string()));
            }
            let expression_start = prefix_idx + prefix.len();
            let suffix_idx = find_suffix(text, expression_start, suffix)?.ok_or_else(|| {
                Error::Parse(format!(
                    "no ending suffix '{}' for expression starting at character {}: {}",
                    suffix,
                    prefix_idx,
                    &text[prefix_idx..]
                ))
            })?;
            let expression = text[expression_start..suffix_idx].trim();
            if expression.is_empty() {
                return Err(Error::Parse(format!(
                    "no expression defined within delimiter '{}{}' at character {}",
                    prefix, suffix, prefix_idx
                )));
            }
            parts.push(Part::Expression(parse_expression(expression)?));
            start = suffix_idx + suffix.len();
        }
        if start < text.len() {
            parts.push(Part::Text(text[start..].to_string()));
        }

        Ok(Template {
            text: text.to_string(),
            parts,
        })
    }
}

// Finds the byte offset of the suffix closing the expression starting at `from`, skipping
// over quoted strings and balanced brackets inside the expression.
fn find_suffix(text: &str, from: usize, suffix: &str) -> Result<Option<usize>, Error> {
    let mut brackets: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;

    for (offset, c) in text[from..].char_indices() {
        let idx = from + offset;
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if brackets.is_empty() && text[idx..].starts_with(suffix) {
            return Ok(Some(idx));
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => brackets.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if brackets.pop() != Some(expected) {
                    return Err(Error::Parse(format!(
                        "found closing '{}' at character {} without an opening '{}'",
                        c, idx, expected
                    )));
                }
            }
            _ => {}
        }
    }
    Ok(None)
}
