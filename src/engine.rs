// ABOUTME: Minimal template engine for {{ .Field.Path }} expressions
// ABOUTME: Provides action parsing, strict field lookup, helper dispatch, and rendering

use serde_json::Value;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use crate::error::{Result, TemplateError};
use crate::helpers;
use crate::template::Fields;

/// Helper function signature: positional string arguments in, rendered text out.
pub type Helper = Arc<dyn Fn(&[String]) -> Result<String> + Send + Sync>;

/// Renders template strings against a field set.
///
/// The grammar is literal text interleaved with `{{ ... }}` actions. An
/// action is a pipeline of stages separated by `|`; a stage is either a
/// dotted field reference (`.Env.HOME`), a quoted string, or a helper call
/// with arguments. Piping appends the previous stage's result as the final
/// argument of the next helper. Referencing an absent field is an error,
/// never an empty substitution.
#[derive(Clone)]
pub struct TemplateEngine {
    helpers: HashMap<String, Helper>,
}

impl TemplateEngine {
    /// Create a new template engine with all built-in helpers.
    pub fn new() -> Self {
        let mut engine = Self {
            helpers: HashMap::new(),
        };
        helpers::register_helpers(&mut engine);
        engine
    }

    /// Register a custom helper, replacing any existing one with the same name.
    pub fn register_helper<F>(&mut self, name: &str, helper: F)
    where
        F: Fn(&[String]) -> Result<String> + Send + Sync + 'static,
    {
        self.helpers.insert(name.to_string(), Arc::new(helper));
    }

    /// Render a template string against the given fields.
    pub fn render(&self, template: &str, fields: &Fields) -> Result<String> {
        let segments = parse(template)?;
        let mut out = String::with_capacity(template.len());
        for segment in &segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Action { pipeline, source } => {
                    let value = self.eval_pipeline(pipeline, source, fields)?;
                    out.push_str(&render_scalar(&value, source)?);
                }
            }
        }
        Ok(out)
    }

    /// Validate template syntax without rendering.
    pub fn validate_template(&self, template: &str) -> Result<()> {
        parse(template).map(|_| ())
    }

    /// Check if a string contains template expressions.
    pub fn has_templates(&self, text: &str) -> bool {
        text.contains("{{") && text.contains("}}")
    }

    fn eval_pipeline(&self, pipeline: &Pipeline, source: &str, fields: &Fields) -> Result<Value> {
        let mut value = self.eval_stage(&pipeline.stages[0], None, source, fields)?;
        for stage in &pipeline.stages[1..] {
            value = self.eval_stage(stage, Some(value), source, fields)?;
        }
        Ok(value)
    }

    fn eval_stage(
        &self,
        stage: &Stage,
        piped: Option<Value>,
        source: &str,
        fields: &Fields,
    ) -> Result<Value> {
        match &stage.operands[0] {
            Operand::Field(path) => lookup(fields, path),
            Operand::Str(text) => Ok(Value::String(text.clone())),
            Operand::Ident(name) => {
                let helper = self
                    .helpers
                    .get(name)
                    .ok_or_else(|| TemplateError::InvalidFunction(name.clone()))?;
                let mut args = Vec::with_capacity(stage.operands.len());
                for operand in &stage.operands[1..] {
                    let value = self.eval_operand(operand, fields)?;
                    args.push(render_scalar(&value, source)?);
                }
                if let Some(value) = piped {
                    args.push(render_scalar(&value, source)?);
                }
                let rendered = helper.as_ref()(&args)?;
                Ok(Value::String(rendered))
            }
        }
    }

    fn eval_operand(&self, operand: &Operand, fields: &Fields) -> Result<Value> {
        match operand {
            Operand::Field(path) => lookup(fields, path),
            Operand::Str(text) => Ok(Value::String(text.clone())),
            Operand::Ident(name) => Err(TemplateError::SyntaxError(format!(
                "function {name:?} cannot be used as an argument"
            ))),
        }
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

enum Segment {
    Literal(String),
    Action { pipeline: Pipeline, source: String },
}

struct Pipeline {
    stages: Vec<Stage>,
}

struct Stage {
    operands: Vec<Operand>,
}

enum Operand {
    Field(Vec<String>),
    Str(String),
    Ident(String),
}

enum Token {
    Field(Vec<String>),
    Str(String),
    Ident(String),
    Pipe,
}

fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let body = &rest[start + 2..];
        let end = action_end(body)?;
        segments.push(Segment::Action {
            pipeline: parse_pipeline(&body[..end])?,
            source: body[..end].trim().to_string(),
        });
        rest = &body[end + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}

// Offset of the closing `}}`, skipping over quoted strings.
fn action_end(body: &str) -> Result<usize> {
    let bytes = body.as_bytes();
    let mut i = 0;
    let mut in_string = false;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'\\' if in_string => i += 1,
            b'}' if !in_string && bytes.get(i + 1) == Some(&b'}') => return Ok(i),
            _ => {}
        }
        i += 1;
    }
    Err(TemplateError::SyntaxError("unclosed action".to_string()))
}

fn parse_pipeline(body: &str) -> Result<Pipeline> {
    let tokens = tokenize(body)?;
    if tokens.is_empty() {
        return Err(TemplateError::SyntaxError("empty action".to_string()));
    }

    let mut stages = Vec::new();
    let mut operands = Vec::new();
    for token in tokens {
        match token {
            Token::Pipe => stages.push(close_stage(std::mem::take(&mut operands))?),
            Token::Field(path) => operands.push(Operand::Field(path)),
            Token::Str(text) => operands.push(Operand::Str(text)),
            Token::Ident(name) => operands.push(Operand::Ident(name)),
        }
    }
    stages.push(close_stage(operands)?);
    validate_stages(&stages)?;
    Ok(Pipeline { stages })
}

fn close_stage(operands: Vec<Operand>) -> Result<Stage> {
    if operands.is_empty() {
        return Err(TemplateError::SyntaxError(
            "missing operand in pipeline".to_string(),
        ));
    }
    Ok(Stage { operands })
}

// Only helper calls take arguments or receive piped input.
fn validate_stages(stages: &[Stage]) -> Result<()> {
    for (index, stage) in stages.iter().enumerate() {
        let head_is_function = matches!(stage.operands[0], Operand::Ident(_));
        if index > 0 && !head_is_function {
            return Err(TemplateError::SyntaxError(
                "pipe target must be a function".to_string(),
            ));
        }
        if stage.operands.len() > 1 && !head_is_function {
            return Err(TemplateError::SyntaxError(
                "only functions accept arguments".to_string(),
            ));
        }
        for operand in &stage.operands[1..] {
            if let Operand::Ident(name) = operand {
                return Err(TemplateError::SyntaxError(format!(
                    "function {name:?} cannot be used as an argument"
                )));
            }
        }
    }
    Ok(())
}

fn tokenize(body: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = body.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '|' {
            chars.next();
            tokens.push(Token::Pipe);
        } else if c == '.' {
            tokens.push(Token::Field(scan_field(&mut chars)?));
        } else if c == '"' {
            tokens.push(Token::Str(scan_string(&mut chars)?));
        } else if c.is_alphabetic() || c == '_' {
            tokens.push(Token::Ident(scan_ident(&mut chars)));
        } else {
            return Err(TemplateError::SyntaxError(format!(
                "unexpected character {c:?} in action"
            )));
        }
    }
    Ok(tokens)
}

fn scan_field(chars: &mut Peekable<Chars<'_>>) -> Result<Vec<String>> {
    let mut path = Vec::new();
    while chars.peek() == Some(&'.') {
        chars.next();
        let mut segment = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                segment.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if segment.is_empty() {
            return Err(TemplateError::SyntaxError("empty field name".to_string()));
        }
        path.push(segment);
    }
    Ok(path)
}

fn scan_string(chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    chars.next();
    let mut text = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(text),
            Some('\\') => match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some(c @ ('"' | '\\')) => text.push(c),
                Some(c) => {
                    return Err(TemplateError::SyntaxError(format!(
                        "unsupported escape \\{c} in string literal"
                    )))
                }
                None => {
                    return Err(TemplateError::SyntaxError(
                        "unterminated string literal".to_string(),
                    ))
                }
            },
            Some(c) => text.push(c),
            None => {
                return Err(TemplateError::SyntaxError(
                    "unterminated string literal".to_string(),
                ))
            }
        }
    }
}

fn scan_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn lookup(fields: &Fields, path: &[String]) -> Result<Value> {
    let mut value = fields.get(&path[0]).ok_or_else(|| missing(path))?;
    for segment in &path[1..] {
        value = value
            .as_object()
            .and_then(|object| object.get(segment))
            .ok_or_else(|| missing(path))?;
    }
    Ok(value.clone())
}

fn missing(path: &[String]) -> TemplateError {
    TemplateError::MissingField(format!(".{}", path.join(".")))
}

fn render_scalar(value: &Value, source: &str) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(TemplateError::RenderError(format!(
            "{source} does not resolve to a printable value"
        ))),
    }
}
