//! Directive option blocks (`:name: value` lines).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::DirectiveError;
use crate::source::SourceLine;

static OPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:([^:\s][^:]*):(?: +(.*))?$").expect("valid option line pattern")
});

/// How an option value is converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    /// Value kept as written (continuation lines joined with `\n`).
    Unchanged,
    /// No value allowed; presence is the value.
    Flag,
    /// Whitespace-separated class names, normalized through `make_id`.
    Class,
}

/// Parsed directive options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, String>,
}

impl Options {
    /// Value of option `name`, if given. Flags map to an empty string.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Classes given through a [`OptionKind::Class`] option.
    #[must_use]
    pub fn classes(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|v| v.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(super) fn parse(
        block: &[SourceLine],
        spec: &[(&'static str, OptionKind)],
    ) -> Result<Self, DirectiveError> {
        let mut fields: Vec<(String, Vec<String>)> = Vec::new();
        for line in block {
            if let Some(caps) = OPTION_LINE.captures(&line.text) {
                let value = caps.get(2).map_or("", |m| m.as_str());
                let mut lines = Vec::new();
                if !value.is_empty() {
                    lines.push(value.to_owned());
                }
                fields.push((caps[1].to_owned(), lines));
            } else if let Some((_, lines)) = fields.last_mut().filter(|_| line.indent() > 0) {
                lines.push(line.text.trim().to_owned());
            } else {
                return Err(DirectiveError::Invalid("invalid option block".to_owned()));
            }
        }

        let mut values = BTreeMap::new();
        for (name, lines) in fields {
            let name = name.to_lowercase();
            let Some(&(_, kind)) = spec.iter().find(|(known, _)| *known == name) else {
                return Err(DirectiveError::Invalid(format!("unknown option: \"{name}\"")));
            };
            let value = convert(kind, &name, &lines.join("\n"))?;
            if values.insert(name.clone(), value).is_some() {
                return Err(DirectiveError::Invalid(format!("duplicate option \"{name}\"")));
            }
        }
        Ok(Self { values })
    }
}

fn convert(kind: OptionKind, name: &str, raw: &str) -> Result<String, DirectiveError> {
    match kind {
        OptionKind::Unchanged => Ok(raw.to_owned()),
        OptionKind::Flag if raw.is_empty() => Ok(String::new()),
        OptionKind::Flag => Err(DirectiveError::Invalid(format!(
            "invalid option value: (option: \"{name}\"; value: '{raw}')\nno argument is allowed"
        ))),
        OptionKind::Class => {
            let classes: Vec<String> = raw.split_whitespace().map(crate::make_id).collect();
            if classes.is_empty() || classes.iter().any(String::is_empty) {
                return Err(DirectiveError::Invalid(format!(
                    "invalid option value: (option: \"{name}\"; value: '{raw}')\ncannot make \"{raw}\" into a class name"
                )));
            }
            Ok(classes.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SPEC: &[(&str, OptionKind)] = &[
        ("options", OptionKind::Unchanged),
        ("class", OptionKind::Class),
        ("open", OptionKind::Flag),
    ];

    fn block(texts: &[&str]) -> Vec<SourceLine> {
        texts.iter().map(|t| SourceLine::new(*t, 1)).collect()
    }

    #[test]
    fn test_parse_values() {
        let opts = Options::parse(
            &block(&[":options: linenums:4 lang-py", ":class: Wide  Box", ":open:"]),
            SPEC,
        )
        .unwrap();
        assert_eq!(opts.get("options"), Some("linenums:4 lang-py"));
        assert_eq!(opts.classes("class"), vec!["wide", "box"]);
        assert!(opts.contains("open"));
        assert_eq!(opts.get("missing"), None);
    }

    #[test]
    fn test_continuation_lines() {
        let opts = Options::parse(&block(&[":options: a", "   b"]), SPEC).unwrap();
        assert_eq!(opts.get("options"), Some("a\nb"));
    }

    #[test]
    fn test_unknown_option() {
        let err = Options::parse(&block(&[":language: rust"]), SPEC).unwrap_err();
        assert_eq!(err.to_string(), "unknown option: \"language\"");
    }

    #[test]
    fn test_duplicate_option() {
        let err = Options::parse(&block(&[":options: a", ":options: b"]), SPEC).unwrap_err();
        assert!(err.to_string().starts_with("duplicate option"));
    }

    #[test]
    fn test_invalid_block() {
        let err = Options::parse(&block(&[":options: a", "code"]), SPEC).unwrap_err();
        assert_eq!(err.to_string(), "invalid option block");
    }

    #[test]
    fn test_flag_rejects_value() {
        assert!(Options::parse(&block(&[":open: yes"]), SPEC).is_err());
    }
}
