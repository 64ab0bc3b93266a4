// ABOUTME: Built-in helper functions for template rendering
// ABOUTME: Implements the string, time, and path helpers registered with every engine

use chrono::Utc;
use std::path::Path;

use crate::engine::TemplateEngine;
use crate::error::{Result, TemplateError};

/// Register all built-in helpers with a template engine.
pub fn register_helpers(engine: &mut TemplateEngine) {
    engine.register_helper("replace", replace);
    engine.register_helper("time", time);
    engine.register_helper("tolower", tolower);
    engine.register_helper("toupper", toupper);
    engine.register_helper("trim", trim);
    engine.register_helper("trimprefix", trimprefix);
    engine.register_helper("dir", dir);
    engine.register_helper("abs", abs);
}

fn expect_args<'a>(function: &str, args: &'a [String], count: usize) -> Result<&'a [String]> {
    if args.len() == count {
        Ok(args)
    } else {
        Err(TemplateError::FunctionError {
            function: function.to_string(),
            reason: format!("expected {} arguments, got {}", count, args.len()),
        })
    }
}

/// Replace helper - replaces all occurrences of `old` with `new` in the subject.
pub fn replace(args: &[String]) -> Result<String> {
    let args = expect_args("replace", args, 3)?;
    Ok(args[2].replace(&args[0], &args[1]))
}

/// Time helper - formats the current UTC wall-clock time with the given layout.
pub fn time(args: &[String]) -> Result<String> {
    let args = expect_args("time", args, 1)?;
    Ok(Utc::now().format(&args[0]).to_string())
}

pub fn tolower(args: &[String]) -> Result<String> {
    let args = expect_args("tolower", args, 1)?;
    Ok(args[0].to_lowercase())
}

pub fn toupper(args: &[String]) -> Result<String> {
    let args = expect_args("toupper", args, 1)?;
    Ok(args[0].to_uppercase())
}

/// Trim helper - strips leading and trailing whitespace.
pub fn trim(args: &[String]) -> Result<String> {
    let args = expect_args("trim", args, 1)?;
    Ok(args[0].trim().to_string())
}

/// Trimprefix helper - removes `prefix` from the start of the subject if present.
pub fn trimprefix(args: &[String]) -> Result<String> {
    let args = expect_args("trimprefix", args, 2)?;
    Ok(args[1]
        .strip_prefix(args[0].as_str())
        .unwrap_or(args[1].as_str())
        .to_string())
}

/// Dir helper - parent directory of a path, `.` when there is none.
pub fn dir(args: &[String]) -> Result<String> {
    let args = expect_args("dir", args, 1)?;
    match Path::new(&args[0]).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.display().to_string()),
        Some(_) => Ok(".".to_string()),
        None if args[0].is_empty() => Ok(".".to_string()),
        None => Ok(args[0].clone()),
    }
}

/// Abs helper - resolves a path against the process working directory.
pub fn abs(args: &[String]) -> Result<String> {
    let args = expect_args("abs", args, 1)?;
    let path = Path::new(&args[0]);
    if path.is_absolute() {
        return Ok(args[0].clone());
    }
    let resolved = std::env::current_dir()?.join(path);
    Ok(resolved.display().to_string())
}
