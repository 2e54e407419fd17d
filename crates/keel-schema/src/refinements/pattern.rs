use crate::errors::ParseError;
use crate::json::JsonWriter;
use crate::node::Meta;
use crate::value::Value;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Flags accepted on a pattern. Only `i`, `m` and `s` change matching;
/// the rest are recorded in the id.
const VALID_FLAGS: &str = "dgimsuy";

#[derive(Clone, Debug)]
pub struct PatternInner {
    pub source: Arc<str>,
    pub flags: Arc<str>,
    regex: Regex,
}

impl PatternInner {
    pub fn new(source: &str, flags: &str) -> Result<Self, ParseError> {
        let mut normalized: Vec<char> = Vec::new();
        for flag in flags.chars() {
            if !VALID_FLAGS.contains(flag) {
                return Err(ParseError::new(format!(
                    "'{flag}' is not a valid pattern flag (expected one of {VALID_FLAGS})"
                )));
            }
            if !normalized.contains(&flag) {
                normalized.push(flag);
            }
        }
        normalized.sort_unstable();
        let inline: String = normalized
            .iter()
            .filter(|f| matches!(f, 'i' | 'm' | 's'))
            .collect();
        let compiled = if inline.is_empty() {
            source.to_string()
        } else {
            format!("(?{inline}){source}")
        };
        let regex = Regex::new(&compiled).map_err(|err| {
            ParseError::new(format!("/{source}/ is not a valid pattern: {err}"))
        })?;
        Ok(Self {
            source: Arc::from(source),
            flags: Arc::from(normalized.into_iter().collect::<String>()),
            regex,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The pattern in regex literal form, `/source/flags`.
    pub fn literal(&self) -> String {
        format!("/{}/{}", self.source, self.flags)
    }

    pub(crate) fn describe(&self) -> String {
        format!("matched by {}", self.literal())
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let source = JsonValue::String(self.source.to_string());
        let mut fields = Map::new();
        fields.insert("pattern".into(), source.clone());
        if !self.flags.is_empty() {
            fields.insert("flags".into(), JsonValue::String(self.flags.to_string()));
        }
        let collapsed = self.flags.is_empty().then_some(source);
        w.finish(collapsed, fields, meta)
    }

    pub(crate) fn condition(&self, arg: &str) -> String {
        format!("{}.test({arg})", self.literal())
    }

    pub(crate) fn allows(&self, data: &Value) -> bool {
        data.as_str().is_some_and(|s| self.regex.is_match(s))
    }
}
