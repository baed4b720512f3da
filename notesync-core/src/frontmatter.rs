//! YAML frontmatter splitting and typed accessors.
//!
//! A frontmatter block is a `---` line at the very start of the file, YAML,
//! and a closing `---` line. Files without a complete block have empty
//! frontmatter and the whole text as body.

use std::collections::BTreeMap;

use serde_yaml::Value;

/// Frontmatter key listing URLs rendered above the note body.
pub const URLS_KEY: &str = "urls";

/// Parsed frontmatter: unique string keys, order irrelevant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter(BTreeMap<String, Value>);

impl Frontmatter {
    /// Parse a YAML document into a frontmatter mapping.
    ///
    /// Blank documents and `null` give an empty mapping; any other
    /// non-mapping document is an error.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(mapping) => {
                let mut map = BTreeMap::new();
                for (key, value) in mapping {
                    let Some(key) = scalar_to_string(&key) else {
                        return Err("frontmatter keys must be scalars".to_string());
                    };
                    map.insert(key, value);
                }
                Ok(Self(map))
            }
            _ => Err("frontmatter must be a YAML mapping".to_string()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values under `key` as strings.
    ///
    /// A sequence yields its scalar items; a lone scalar yields one item;
    /// anything else (missing, null, mapping) yields nothing.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(value) => scalar_to_string(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Entries of the `urls` list.
    pub fn urls(&self) -> Vec<String> {
        self.string_list(URLS_KEY)
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split raw file text into frontmatter and body.
///
/// The body starts on the line after the closing fence.
pub fn split(raw: &str) -> Result<(Frontmatter, &str), String> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some(after_open) = strip_fence_line(text) else {
        return Ok((Frontmatter::default(), raw));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok((Frontmatter::from_yaml(yaml)?, body));
        }
        offset += line.len();
    }

    // No closing fence: not frontmatter.
    Ok((Frontmatter::default(), raw))
}

fn strip_fence_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_frontmatter_returns_whole_text() {
        let (fm, body) = split("# Title\n\ntext").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "# Title\n\ntext");
    }

    #[test]
    fn unclosed_fence_is_body() {
        let raw = "---\nhubs: [a]\n# Title";
        let (fm, body) = split(raw).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn horizontal_rule_later_in_file_is_not_frontmatter() {
        let raw = "intro\n---\nmore";
        let (fm, body) = split(raw).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn empty_block_gives_empty_mapping() {
        let (fm, body) = split("---\n---\nbody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn crlf_fences_are_accepted() {
        let (fm, body) = split("---\r\nhubs: [a]\r\n---\r\nbody").unwrap();
        assert_eq!(fm.string_list("hubs"), vec!["a"]);
        assert_eq!(body, "body");
    }

    #[test]
    fn non_mapping_yaml_is_rejected() {
        assert!(split("---\n- a\n- b\n---\nbody").is_err());
        assert!(split("---\nkey: [unclosed\n---\nbody").is_err());
    }

    #[test]
    fn string_list_accepts_scalar_and_sequence() {
        let (fm, _) = split("---\nhubs: macos\ntags: [a, 2, true]\nnested: {x: 1}\n---\n").unwrap();
        assert_eq!(fm.string_list("hubs"), vec!["macos"]);
        assert_eq!(fm.string_list("tags"), vec!["a", "2", "true"]);
        assert!(fm.string_list("nested").is_empty());
        assert!(fm.string_list("missing").is_empty());
    }

    #[test]
    fn urls_are_trimmed_and_blank_entries_dropped() {
        let (fm, _) =
            split("---\nurls:\n  - \" https://a.example \"\n  - \"\"\n  - https://b.example\n---\n")
                .unwrap();
        assert_eq!(fm.urls(), vec!["https://a.example", "https://b.example"]);
    }
}
