use serde_json::{Map, Value};

use super::{ClassLabel, ClassifyError, Verdict};

/// Finds the first balanced `{...}` span in `text` that parses as a JSON
/// object. Model replies often wrap the object in prose or code fences, so
/// the whole body is never parsed directly.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(|(start, _)| {
            let end = matching_brace(&text[start..])?;
            match serde_json::from_str::<Value>(&text[start..start + end]) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            }
        })
        .next()
}

/// Byte length of the balanced object starting at `text[0] == '{'`.
/// Braces inside string literals don't count.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses the model's reply into a verdict. `digit` and `confidence` are
/// required; `reasoning` is optional.
pub fn parse_verdict(text: &str) -> Result<Verdict, ClassifyError> {
    let object = extract_json_object(text)
        .ok_or_else(|| ClassifyError::MalformedResponse("no JSON object in reply".into()))?;

    let digit = object
        .get("digit")
        .and_then(integer_field)
        .ok_or_else(|| ClassifyError::MalformedResponse("missing or non-integer `digit`".into()))?;
    let label = ClassLabel::try_from(digit)
        .map_err(|err| ClassifyError::MalformedResponse(err.to_string()))?;

    let confidence = object
        .get("confidence")
        .and_then(number_field)
        .ok_or_else(|| ClassifyError::MalformedResponse("missing or non-numeric `confidence`".into()))?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ClassifyError::MalformedResponse(format!(
            "confidence {confidence} outside [0, 1]"
        )));
    }

    let reasoning = object
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    Ok(Verdict {
        label,
        confidence,
        reasoning,
    })
}

fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_field(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
