//! Purpose: Render pretty JSON with optional ANSI colorization for CLI output.
//! Exports: colorize_json.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals serde_json::to_string_pretty.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use serde_json::{Map, Value};

const INDENT: &str = "  ";

// 8/16-color codes only.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_PLAIN: &str = "39";

pub fn colorize_json(value: &Value, use_color: bool) -> String {
    let mut painter = Painter {
        out: String::new(),
        use_color,
    };
    painter.value(value, 0);
    painter.out
}

struct Painter {
    out: String,
    use_color: bool,
}

impl Painter {
    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.paint("null", COLOR_PLAIN),
            Value::Bool(flag) => self.paint(if *flag { "true" } else { "false" }, COLOR_BOOL),
            Value::Number(number) => self.paint(&number.to_string(), COLOR_NUMBER),
            Value::String(text) => self.paint(&quote(text), COLOR_STRING),
            Value::Array(items) => self.array(items, depth),
            Value::Object(map) => self.object(map, depth),
        }
    }

    fn array(&mut self, items: &[Value], depth: usize) {
        if items.is_empty() {
            self.paint("[]", COLOR_PLAIN);
            return;
        }
        self.paint("[", COLOR_PLAIN);
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.paint(",", COLOR_PLAIN);
            }
            self.newline(depth + 1);
            self.value(item, depth + 1);
        }
        self.newline(depth);
        self.paint("]", COLOR_PLAIN);
    }

    fn object(&mut self, map: &Map<String, Value>, depth: usize) {
        if map.is_empty() {
            self.paint("{}", COLOR_PLAIN);
            return;
        }
        self.paint("{", COLOR_PLAIN);
        for (idx, (key, item)) in map.iter().enumerate() {
            if idx > 0 {
                self.paint(",", COLOR_PLAIN);
            }
            self.newline(depth + 1);
            self.paint(&quote(key), COLOR_KEY);
            self.paint(":", COLOR_PLAIN);
            self.out.push(' ');
            self.value(item, depth + 1);
        }
        self.newline(depth);
        self.paint("}", COLOR_PLAIN);
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        self.out.push_str(&INDENT.repeat(depth));
    }

    fn paint(&mut self, text: &str, color: &str) {
        if self.use_color {
            self.out.push_str(&format!("\u{1b}[{color}m{text}\u{1b}[0m"));
        } else {
            self.out.push_str(text);
        }
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
