//! YAML writer for calendar and summary files.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::output::write_atomic;

/// Regex matching a single-quoted YAML scalar value on a key line.
/// Captures: (1) prefix including key and colon-space, (2) the unquoted value.
#[allow(clippy::expect_used)]
static QUOTED_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*(?:- )?[a-zA-Z_$][a-zA-Z_$0-9]*: )'([^']*)'$").expect("valid regex")
});

/// Regex matching a plain (unquoted) YAML scalar value on a key line.
/// Captures: (1) prefix including key and colon-space, (2) the value.
#[allow(clippy::expect_used)]
static PLAIN_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\s*(?:- )?[a-zA-Z_$][a-zA-Z_$0-9]*: )([^'"|>\s].*)$"#).expect("valid regex")
});

/// Indent YAML sequences to comply with `indent-sequences: true`.
///
/// The serializer places sequence items (`- `) at the same indent as their parent key.
/// This function adds 2 spaces so items are indented under their parent, e.g.:
///
/// ```yaml
/// # Before:          # After:
/// holidays:          holidays:
/// - date: x            - date: x
///   name: y              name: y
/// ```
fn indent_yaml_sequences(yaml: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    // Stack of indent levels where sequences start
    let mut seq_indents: Vec<usize> = Vec::new();

    for line in yaml.lines() {
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            result.push(line.to_string());
            continue;
        }

        let indent = line.len() - trimmed.len();

        // Pop sequences we've exited: either moved to a shallower indent,
        // or returned to the same indent but not as a sequence continuation.
        while let Some(&seq_indent) = seq_indents.last() {
            if indent < seq_indent || (indent == seq_indent && !trimmed.starts_with("- ")) {
                seq_indents.pop();
            } else {
                break;
            }
        }

        if trimmed.starts_with("- ") {
            let is_continuation = seq_indents.last().is_some_and(|&si| si == indent);
            if !is_continuation {
                seq_indents.push(indent);
            }
        }

        let extra = seq_indents.len() * 2;
        if extra > 0 {
            result.push(format!("{}{}", " ".repeat(indent + extra), trimmed));
        } else {
            result.push(line.to_string());
        }
    }

    result.join("\n")
}

/// Whether a value starts with a `YYYY-MM-DD` date.
///
/// YAML 1.1 readers turn such plain scalars into timestamps, so dates and
/// `generated_at` stamps are kept quoted.
fn looks_like_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[8..10].iter().all(u8::is_ascii_digit)
        && (bytes.len() == 10 || bytes[10] == b' ' || bytes[10] == b'T')
}

/// Check if a plain YAML scalar would be parsed as a non-string type.
///
/// Returns `true` if the value needs single quotes to remain a string
/// (integers, floats, dates, booleans, null, or values with special characters).
fn needs_yaml_quoting(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }

    match value.to_lowercase().as_str() {
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~" => return true,
        _ => {}
    }

    if let Some(&first) = value.as_bytes().first() {
        if b"{}[],&*#?|-<>=!%@:\"`' ".contains(&first) {
            return true;
        }
    }

    if value.contains(": ") || value.contains(" #") || value.ends_with(':') || value.ends_with(' ')
    {
        return true;
    }

    let num_part = value.strip_prefix('-').unwrap_or(value);

    // Pure integer
    if !num_part.is_empty() && num_part.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }

    // Float: digits.digits
    if let Some(dot_pos) = num_part.find('.') {
        let (before, after_with_dot) = num_part.split_at(dot_pos);
        let after = &after_with_dot[1..];
        if !before.is_empty()
            && !after.is_empty()
            && before.bytes().all(|b| b.is_ascii_digit())
            && after.bytes().all(|b| b.is_ascii_digit())
        {
            return true;
        }
    }

    looks_like_timestamp(value)
}

/// Normalize scalar quoting on key lines.
///
/// Removes single quotes from values that YAML would parse as strings anyway,
/// matching yamllint's `quoted-strings: {required: only-when-needed}` rule,
/// and adds them to plain date-like values.
fn normalize_quotes(yaml: &str) -> String {
    yaml.lines()
        .map(|line| {
            if let Some(caps) = QUOTED_VALUE_RE.captures(line) {
                let (Some(prefix), Some(value)) = (caps.get(1), caps.get(2)) else {
                    return line.to_string();
                };
                let value = value.as_str();
                if needs_yaml_quoting(value) {
                    line.to_string()
                } else {
                    format!("{}{value}", prefix.as_str())
                }
            } else if let Some(caps) = PLAIN_VALUE_RE.captures(line) {
                let (Some(prefix), Some(value)) = (caps.get(1), caps.get(2)) else {
                    return line.to_string();
                };
                if looks_like_timestamp(value.as_str()) {
                    format!("{}'{}'", prefix.as_str(), value.as_str())
                } else {
                    line.to_string()
                }
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize `value` as a yamllint-friendly YAML document.
///
/// The output starts with a `---` marker, indents sequences under their
/// keys, and has no trailing whitespace.
pub fn generate_yaml<T: Serialize>(value: &T) -> Result<String> {
    let yaml_string = serde_yaml::to_string(value)?;

    let yaml_string = normalize_quotes(&yaml_string);
    let yaml_string = indent_yaml_sequences(&yaml_string);

    let lines: Vec<&str> = yaml_string.lines().map(|l| l.trim_end()).collect();
    Ok(format!("---\n{}\n", lines.join("\n")))
}

/// Serialize `value` and write it atomically to `path`.
pub fn save_yaml<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = generate_yaml(value)?;
    write_atomic(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Entry {
        date: String,
        weekday: String,
        holiday: u8,
        name: String,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        year: i32,
        generated_at: String,
        holidays: Vec<Entry>,
    }

    fn sample() -> Doc {
        Doc {
            year: 2024,
            generated_at: "2024-06-01 10:00:00".to_string(),
            holidays: vec![Entry {
                date: "2024-01-01".to_string(),
                weekday: "星期一".to_string(),
                holiday: 1,
                name: "元旦".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_yaml_layout() {
        let yaml = generate_yaml(&sample()).unwrap();

        assert!(yaml.starts_with("---\n"));
        assert!(yaml.contains("year: 2024\n"));
        assert!(yaml.contains("generated_at: '2024-06-01 10:00:00'"));
        assert!(
            yaml.contains("holidays:\n  - date: '2024-01-01'\n    weekday: 星期一\n    holiday: 1\n    name: 元旦"),
            "unexpected layout:\n{yaml}"
        );
    }

    #[test]
    fn test_generate_yaml_round_trips() {
        let yaml = generate_yaml(&sample()).unwrap();
        let parsed: Doc = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_save_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taiwan_holidays_2024.yml");
        save_yaml(&sample(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("---\n"));
    }

    #[test]
    fn test_needs_yaml_quoting() {
        assert!(needs_yaml_quoting("1.1"));
        assert!(needs_yaml_quoting("42"));
        assert!(needs_yaml_quoting("2024-10-16"));
        assert!(needs_yaml_quoting("2024-10-16 08:00:00"));
        assert!(needs_yaml_quoting("true"));
        assert!(needs_yaml_quoting("null"));
        assert!(needs_yaml_quoting(""));
        assert!(needs_yaml_quoting("foo: bar"));
        assert!(needs_yaml_quoting("end:"));

        assert!(!needs_yaml_quoting("元旦"));
        assert!(!needs_yaml_quoting("taiwan_holidays_2024.yml"));
        assert!(!needs_yaml_quoting("調整放假"));
        assert!(!needs_yaml_quoting("hello"));
    }

    #[test]
    fn test_looks_like_timestamp() {
        assert!(looks_like_timestamp("2024-01-01"));
        assert!(looks_like_timestamp("2024-01-01 10:00:00"));
        assert!(!looks_like_timestamp("2024-1-1"));
        assert!(!looks_like_timestamp("20240101"));
        assert!(!looks_like_timestamp("2024-01-01x"));
    }

    #[test]
    fn test_indent_yaml_sequences() {
        let input =
            "top: val\nitems:\n- name: a\n  val: 1\n- name: b\n  nested:\n  - id: x\n    v: 1";
        let result = indent_yaml_sequences(input);
        assert_eq!(
            result,
            "top: val\nitems:\n  - name: a\n    val: 1\n  - name: b\n    nested:\n      - id: x\n        v: 1"
        );
    }

    #[test]
    fn test_normalize_quotes() {
        let input = "file: 'a.yml'\ndate: 2024-10-16\ncount: '1'\n- date: 2024-01-01\nname: 元旦";
        let result = normalize_quotes(input);
        assert_eq!(
            result,
            "file: a.yml\ndate: '2024-10-16'\ncount: '1'\n- date: '2024-01-01'\nname: 元旦"
        );
    }
}
