//! Form schemas and typed access to answer sets
//!
//! Answers arrive as a JSON object. Each document kind declares the fields it
//! accepts; `validate` runs before any file is written.

use serde_json::{Map, Value};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text (numbers are accepted and rendered as text)
    Text,
    /// Number or numeric string
    Number,
    /// Array of strings, or one string split on newlines / commas
    List,
    /// Object of name -> text
    Map,
    /// Object of name -> number
    NumberMap,
    /// Object of name -> one of the listed values
    ChoiceMap(&'static [&'static str]),
    /// Object of name -> nested object
    Sections,
    /// One of the listed values (case-insensitive)
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    pub const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

fn in_choices(value: &str, choices: &[&str]) -> bool {
    choices.iter().any(|c| c.eq_ignore_ascii_case(value.trim()))
}

fn check_field(spec: &FieldSpec, value: &Value) -> Result<(), String> {
    match spec.kind {
        FieldKind::Text => match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
            _ => Err("expected text".to_string()),
        },
        FieldKind::Number => as_number(value)
            .map(|_| ())
            .ok_or_else(|| "expected a number".to_string()),
        FieldKind::List => match value {
            Value::String(_) => Ok(()),
            Value::Array(items) if items.iter().all(|v| v.is_string() || v.is_number()) => Ok(()),
            _ => Err("expected a list of text".to_string()),
        },
        FieldKind::Map => match value {
            Value::Object(map) if map.values().all(|v| v.is_string() || v.is_number()) => Ok(()),
            _ => Err("expected an object of text values".to_string()),
        },
        FieldKind::NumberMap => match value {
            Value::Object(map) => match map.iter().find(|(_, v)| as_number(v).is_none()) {
                Some((name, _)) => Err(format!("'{}' is not a number", name)),
                None => Ok(()),
            },
            _ => Err("expected an object of numbers".to_string()),
        },
        FieldKind::ChoiceMap(choices) => match value {
            Value::Object(map) => {
                for (name, v) in map {
                    let ok = v.as_str().map(|s| in_choices(s, choices)).unwrap_or(false);
                    if !ok {
                        return Err(format!("'{}' must be one of {}", name, choices.join(", ")));
                    }
                }
                Ok(())
            }
            _ => Err("expected an object".to_string()),
        },
        FieldKind::Sections => match value {
            Value::Object(map) if map.values().all(Value::is_object) => Ok(()),
            _ => Err("expected an object of sections".to_string()),
        },
        FieldKind::Choice(choices) => match value.as_str() {
            Some(s) if in_choices(s, choices) => Ok(()),
            _ => Err(format!("must be one of {}", choices.join(", "))),
        },
    }
}

/// Check an answer set against `fields`. Unknown keys are refused.
pub fn validate(fields: &[FieldSpec], answers: &Value) -> Result<(), AppError> {
    let empty = Map::new();
    let map = match answers {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(AppError::Validation(
                "answers must be a JSON object".to_string(),
            ))
        }
    };

    let mut problems = Vec::new();
    for key in map.keys() {
        if !fields.iter().any(|f| f.key == key) {
            problems.push(format!("unknown field '{}'", key));
        }
    }

    for spec in fields {
        match map.get(spec.key) {
            Some(value) if !is_blank(value) => {
                if let Err(reason) = check_field(spec, value) {
                    problems.push(format!("{} ({}): {}", spec.label, spec.key, reason));
                }
            }
            _ if spec.required => {
                problems.push(format!("{} ({}) is required", spec.label, spec.key));
            }
            _ => {}
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

/// Read-only view over a validated answer set
#[derive(Debug, Clone, Copy)]
pub struct Answers<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Answers<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            map: value.as_object(),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key)).filter(|v| !is_blank(v))
    }

    /// Trimmed text, empty when absent
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(scalar_text).unwrap_or_default()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(as_number)
    }

    /// Array items, or a string split on newlines (and commas when on one line)
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key).map(list_items).unwrap_or_default()
    }

    /// Non-empty trimmed lines of a text field
    pub fn lines(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect(),
            Some(value) => split_lines(&scalar_text(value)),
            None => Vec::new(),
        }
    }

    /// (name, text) pairs of an object field, in the order given
    pub fn entries(&self, key: &str) -> Vec<(String, String)> {
        match self.get(key) {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (k.clone(), scalar_text(v)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// (name, number) pairs of an object field; non-numeric values read as 0
    pub fn number_entries(&self, key: &str) -> Vec<(String, f64)> {
        match self.get(key) {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (k.clone(), as_number(v).unwrap_or(0.0)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every (key, text) pair of this answer set; used on nested sections
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.map
            .map(|m| {
                m.iter()
                    .filter(|(_, v)| !is_blank(v))
                    .map(|(k, v)| (k.clone(), scalar_text(v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// (name, nested answers) pairs of a `Sections` field
    pub fn sections(&self, key: &str) -> Vec<(String, Answers<'a>)> {
        match self.get(key) {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (k.clone(), Answers::new(v)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn list_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect(),
        other => {
            let text = scalar_text(other);
            if text.contains('\n') {
                split_lines(&text)
            } else {
                text.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("meta", "Meta", FieldKind::Number),
        FieldSpec::required("tipos", "Tipos", FieldKind::List),
        FieldSpec::optional("nivel", "Nivel", FieldKind::Choice(&["Bajo", "Alto"])),
    ];

    #[test]
    fn missing_required_fields_are_listed() {
        let err = validate(FIELDS, &json!({ "tipos": [] })).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Meta (meta) is required"));
        assert!(msg.contains("Tipos (tipos) is required"));
    }

    #[test]
    fn wrong_types_and_unknown_keys_are_refused() {
        let answers = json!({ "meta": "muchas", "tipos": "a, b", "nivel": "Medio", "extra": 1 });
        let msg = validate(FIELDS, &answers).unwrap_err().to_string();
        assert!(msg.contains("expected a number"));
        assert!(msg.contains("must be one of Bajo, Alto"));
        assert!(msg.contains("unknown field 'extra'"));
    }

    #[test]
    fn valid_answers_pass_and_read_back() {
        let answers = json!({ "meta": "20", "tipos": "Reclutadores, Pares del sector", "nivel": "alto" });
        validate(FIELDS, &answers).unwrap();

        let a = Answers::new(&answers);
        assert_eq!(a.number("meta"), Some(20.0));
        assert_eq!(a.list("tipos"), vec!["Reclutadores", "Pares del sector"]);
        assert_eq!(a.text("missing"), "");
    }

    #[test]
    fn entries_keep_input_order() {
        let answers = json!({ "fases": { "Entrevista RRHH": {}, "Assessment": {}, "Oferta": {} } });
        let names: Vec<_> = Answers::new(&answers)
            .sections("fases")
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["Entrevista RRHH", "Assessment", "Oferta"]);
    }
}
