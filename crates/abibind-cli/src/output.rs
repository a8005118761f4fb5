//! Output formatting

use serde_json::{Map, Value};

/// Output builder: a JSON object in `--json` mode, text lines otherwise
pub struct Output {
    json_mode: bool,
    fields: Map<String, Value>,
    lines: Vec<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: Map::new(),
            lines: Vec::new(),
        }
    }

    /// Add a string field
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a JSON value field
    pub fn field_value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Add a line of human-readable text
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    /// Add several lines of human-readable text
    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Rendered output, without a trailing newline
    pub fn render(&self) -> String {
        if self.json_mode {
            serde_json::to_string_pretty(&Value::Object(self.fields.clone())).unwrap_or_default()
        } else {
            self.lines.join("\n")
        }
    }

    /// Print the output
    pub fn print(self) {
        let text = self.render();
        if !text.is_empty() {
            println!("{}", text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_mode() {
        let out = Output::new(false)
            .field("status", "ok")
            .line("first")
            .lines(["second", "third"]);
        assert_eq!(out.render(), "first\nsecond\nthird");
    }

    #[test]
    fn test_json_mode() {
        let out = Output::new(true)
            .field("status", "ok")
            .field_value("count", Value::from(2))
            .line("ignored");
        let parsed: Value = serde_json::from_str(&out.render()).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["count"], 2);
    }
}
