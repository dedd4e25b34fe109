//! TOML descriptions of data-only provider chains
//!
//! A chainfile declares a chain as a root-first list of providers, each with
//! an id and a table of plain entries. Callables cannot be expressed in a
//! chainfile; those chains come from code.
//!
//! ```toml
//! [[providers]]
//! id = "base"
//! entries = { greeting = "hello", main = "hello page" }
//!
//! [[providers]]
//! id = "site"
//! entries = { greeting = "welcome" }
//! ```
//!
//! Each provider's parent is the one declared before it, so the last
//! provider is the chain head.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::provider::Provider;
use crate::value::Value;

/// Errors that can occur when loading or parsing chainfiles
#[derive(Error, Debug)]
pub enum ChainFileError {
    #[error("failed to read chainfile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse chainfile TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("chainfile declares no providers")]
    Empty,
}

/// A parsed chainfile: providers in declaration (root-first) order, not yet
/// linked into a chain.
#[derive(Debug)]
pub struct ChainFile {
    providers: Vec<Provider>,
}

/// TOML structure for deserializing chainfiles
#[derive(Deserialize)]
struct TomlChain {
    providers: Vec<TomlProvider>,
}

#[derive(Deserialize)]
struct TomlProvider {
    id: String,
    #[serde(default)]
    entries: toml::Table,
}

impl ChainFile {
    /// Load a chainfile from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ChainFileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a chainfile from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ChainFileError> {
        let parsed: TomlChain = toml::from_str(content)?;

        let providers = parsed
            .providers
            .into_iter()
            .map(|p| {
                p.entries
                    .into_iter()
                    .fold(Provider::new(p.id), |provider, (name, value)| {
                        provider.value(name, convert(value))
                    })
            })
            .collect();

        Ok(ChainFile { providers })
    }

    /// Link the declared providers into a chain and return its head.
    pub fn into_chain(self) -> Result<Provider, ChainFileError> {
        let mut providers = self.providers.into_iter();
        let mut head = providers.next().ok_or(ChainFileError::Empty)?;
        for provider in providers {
            head = provider.with_parent(head);
        }
        Ok(head)
    }

    /// Number of providers declared in the file.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn convert(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(n) => Value::Number(n as f64),
        toml::Value::Float(n) => Value::Number(n),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(convert).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(name, value)| (name, convert(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_provider() {
        let toml_str = r#"
[[providers]]
id = "base"
entries = { greeting = "hello" }
"#;
        let chainfile = ChainFile::from_str(toml_str).expect("Should parse");
        assert_eq!(chainfile.len(), 1);

        let head = chainfile.into_chain().expect("Should link");
        assert_eq!(head.id(), "base");
        assert_eq!(head.entry("greeting"), Some(&Value::from("hello")));
        assert!(head.parent().is_none());
    }

    #[test]
    fn test_last_provider_is_chain_head() {
        let toml_str = r#"
[[providers]]
id = "base"
entries = { greeting = "hello" }

[[providers]]
id = "site"
entries = { greeting = "welcome" }
"#;
        let head = ChainFile::from_str(toml_str)
            .expect("Should parse")
            .into_chain()
            .expect("Should link");
        assert_eq!(head.id(), "site");
        assert_eq!(head.parent().map(Provider::id), Some("base"));
    }

    #[test]
    fn test_converts_toml_types() {
        let toml_str = r#"
[[providers]]
id = "base"

[providers.entries]
count = 3
ratio = 0.5
flag = true
tags = ["a", "b"]
nested = { x = 1 }
"#;
        let head = ChainFile::from_str(toml_str)
            .expect("Should parse")
            .into_chain()
            .expect("Should link");
        assert_eq!(head.entry("count"), Some(&Value::Number(3.0)));
        assert_eq!(head.entry("ratio"), Some(&Value::Number(0.5)));
        assert_eq!(head.entry("flag"), Some(&Value::Bool(true)));
        assert_eq!(head.entry("tags"), Some(&Value::from(vec!["a", "b"])));
        match head.entry("nested") {
            Some(Value::Object(map)) => assert_eq!(map.get("x"), Some(&Value::Number(1.0))),
            other => panic!("Expected Object, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_without_entries() {
        let toml_str = r#"
[[providers]]
id = "bare"
"#;
        let head = ChainFile::from_str(toml_str)
            .expect("Should parse")
            .into_chain()
            .expect("Should link");
        assert_eq!(head.id(), "bare");
    }

    #[test]
    fn test_empty_chainfile_error() {
        let chainfile = ChainFile::from_str("providers = []").expect("Should parse");
        assert!(matches!(
            chainfile.into_chain(),
            Err(ChainFileError::Empty)
        ));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = ChainFile::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(ChainFileError::Parse(_))));
    }
}
