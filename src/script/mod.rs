//! Runtime-init script rendering and per-mode cache
//!
//! A rendered script is the mode header, the toolchain family's bootstrap
//! payload, and a short glue snippet that instantiates the compiled module.
//! Output is normalized so repeated renders are byte-identical.

mod header;

pub use header::{encode_header, parse_header, read_header};

use std::collections::BTreeMap;

use crate::mode::ModeKind;

/// Glue code that loads `output_file_name` with the bootstrap's `Go` class
pub fn glue_code(output_file_name: &str) -> String {
    format!(
        "const go = new Go();\n\
         WebAssembly.instantiateStreaming(fetch(\"{}\"), go.importObject).then((result) => {{\n\
         \x20   go.run(result.instance);\n\
         }});\n",
        output_file_name
    )
}

/// Normalize line endings and whitespace.
///
/// `\r\n` and lone `\r` become `\n`, trailing whitespace is removed from
/// every line, and the result ends with exactly one `\n`.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len() + 1);
    for line in unified.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    if out.is_empty() {
        out.push('\n');
    }
    out
}

/// Render the full script for one mode
pub fn render(marker: &str, token: &str, payload: &str, output_file_name: &str) -> String {
    let mut text = encode_header(marker, token);
    text.push('\n');
    text.push_str(payload);
    text.push('\n');
    text.push_str(&glue_code(output_file_name));
    normalize(&text)
}

/// One slot per mode; slots are only emptied by [`ScriptCache::clear`]
#[derive(Debug, Clone, Default)]
pub struct ScriptCache {
    slots: BTreeMap<ModeKind, String>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ModeKind) -> Option<&str> {
        self.slots.get(&kind).map(String::as_str)
    }

    pub fn store(&mut self, kind: ModeKind, script: String) {
        self.slots.insert(kind, script);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_normalize_trailing_whitespace() {
        assert_eq!(normalize("a  \nb\t\n\n\n"), "a\nb\n");
        assert_eq!(normalize("no newline"), "no newline\n");
        assert_eq!(normalize(""), "\n");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("x \r\n\r\ny\r");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_render_layout() {
        let script = render("// wasmlane", "M", "payload();\r\n", "main.wasm");
        let mut lines = script.lines();
        assert_eq!(lines.next(), Some("// wasmlane: mode=M"));
        assert_eq!(lines.next(), Some("payload();"));
        assert!(script.contains("fetch(\"main.wasm\")"));
        assert!(script.ends_with("});\n"));
        assert!(!script.contains('\r'));
    }

    #[test]
    fn test_glue_code_indentation() {
        let glue = glue_code("app.wasm");
        assert!(glue.contains("\n    go.run(result.instance);\n"));
    }

    #[test]
    fn test_cache_slots_are_independent() {
        let mut cache = ScriptCache::new();
        cache.store(ModeKind::Large, "large".to_string());
        cache.store(ModeKind::Small, "small".to_string());

        assert_eq!(cache.get(ModeKind::Large), Some("large"));
        assert_eq!(cache.get(ModeKind::Medium), None);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
