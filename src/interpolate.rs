//! Parameter Interpolation
//!
//! Replaces `${dotted.path}` placeholders in template strings with values looked up in a
//! nested JSON object. Placeholders are resolved left to right with an explicit cursor, so
//! templates with many placeholders never recurse. There is no escape for a literal `${`.

use crate::error::MissingParameterError;
use serde_json::Value;

const PLACEHOLDER_OPEN: &str = "${";
const PLACEHOLDER_CLOSE: char = '}';

/// Substitute every `${path}` in `template` with the value found at `path` in `values`.
///
/// A path segment that is absent or falsy (`null`, `false`, `0`, `""`) makes the placeholder
/// unresolvable. With `ignore_missing` the placeholder text is kept as-is and scanning continues
/// after it; otherwise the first unresolvable placeholder fails the whole call.
pub fn interpolate(
    template: &str,
    values: &Value,
    ignore_missing: bool,
) -> Result<String, MissingParameterError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
        output.push_str(&rest[..start]);
        let body = &rest[start + PLACEHOLDER_OPEN.len()..];
        let Some(end) = body.find(PLACEHOLDER_CLOSE) else {
            // Unterminated placeholder: nothing left to resolve.
            output.push_str(&rest[start..]);
            return Ok(output);
        };

        let path = &body[..end];
        match resolve(values, path) {
            Some(value) => output.push_str(&render(value)),
            None if ignore_missing => {
                output.push_str(&rest[start..start + PLACEHOLDER_OPEN.len() + end + 1]);
            }
            None => {
                tracing::error!(path, "Fail to find property in parameters");
                return Err(MissingParameterError {
                    path: path.to_string(),
                });
            }
        }
        rest = &body[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Interpolate every string leaf of a JSON document. Object keys are left untouched.
pub fn interpolate_value(
    template: &Value,
    values: &Value,
    ignore_missing: bool,
) -> Result<Value, MissingParameterError> {
    Ok(match template {
        Value::String(s) => Value::String(interpolate(s, values, ignore_missing)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_value(item, values, ignore_missing))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), interpolate_value(item, values, ignore_missing)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn resolve<'a>(values: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = values;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }?;
        if is_falsy(next) {
            return None;
        }
        current = next;
    }
    Some(current)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
