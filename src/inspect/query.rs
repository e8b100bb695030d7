use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::args::{InspectArgs, InspectMode};
use crate::error::InspectError;

use super::{HelpRegistry, Predicate, ReplContext, is, lookup, prop, submissions};

/// Executes one `inspect` invocation and writes the result to `out`.
///
/// Without `--path`, the submissions list is filtered by every `--where`
/// pair and optionally projected through `--select`.
///
/// # Errors
///
/// Returns an error when the snapshot cannot be loaded, a path or helper is
/// unknown, or writing fails.
pub fn run_inspect<W: Write>(args: &InspectArgs, out: &mut W) -> Result<(), InspectError> {
    if let Some(topic) = args.help_topic.as_deref() {
        return HelpRegistry::builtin().print(Some(topic), out);
    }
    let Some(state) = args.state.as_deref() else {
        return HelpRegistry::builtin().print(None, out);
    };
    let context = ReplContext::load(Path::new(state))?;

    if let Some(path) = args.path.as_deref() {
        let value = lookup(&context, path).ok_or_else(|| InspectError::PathNotFound {
            path: path.to_owned(),
        })?;
        return render_value(value, args.mode, out);
    }

    let selected = query_submissions(&context, &args.filters, args.select.as_deref());
    tracing::debug!("{} submissions matched.", selected.len());
    match args.mode {
        InspectMode::Inspect => {
            for value in &selected {
                write_inspect(value, out)?;
            }
        }
        InspectMode::Json => {
            serde_json::to_writer(&mut *out, &selected)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Submissions matching every filter, projected through `select` when set.
/// A snapshot whose submissions are `null` yields nothing; a non-list value
/// is treated as a single entry.
#[must_use]
pub(crate) fn query_submissions(
    context: &ReplContext,
    filters: &[(String, Value)],
    select: Option<&str>,
) -> Vec<Value> {
    let predicates: Vec<Predicate> = filters
        .iter()
        .map(|(key, value)| is(key.as_str())(value.clone()))
        .collect();
    let items: Vec<&Value> = match submissions(context) {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let matching = items
        .into_iter()
        .filter(|item| predicates.iter().all(|predicate| predicate(*item)));

    match select {
        Some(key) => {
            let pick = prop(key);
            matching.map(|item| pick(item).unwrap_or(Value::Null)).collect()
        }
        None => matching.cloned().collect(),
    }
}

fn render_value<W: Write>(value: &Value, mode: InspectMode, out: &mut W) -> Result<(), InspectError> {
    match mode {
        InspectMode::Inspect => write_inspect(value, out)?,
        InspectMode::Json => {
            serde_json::to_writer(&mut *out, value)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

// Strings print raw, everything else as compact JSON.
fn write_inspect<W: Write>(value: &Value, out: &mut W) -> Result<(), InspectError> {
    match value {
        Value::String(text) => writeln!(out, "{}", text)?,
        other => writeln!(out, "{}", other)?,
    }
    Ok(())
}
