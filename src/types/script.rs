use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::expr::{normalize_label, OptionExpr, ValueExpr};
use super::rule::Rule;

/// Named parameters a script's expressions can refer to.
///
/// Entries are kept as raw document values and decoded into whichever
/// expression kind the referring site expects. Names are whitespace-normalized
/// like every other label.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct Setup {
    entries: BTreeMap<String, Value>,
}

impl Setup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, raw: Value) -> Self {
        self.insert(name, raw);
        self
    }

    pub fn insert(&mut self, name: &str, raw: Value) {
        self.entries.insert(normalize_label(name), raw);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` over this setup; `other` wins on conflict.
    pub fn overlay(&mut self, other: Setup) {
        self.entries.extend(other.entries);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, Value>> for Setup {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let mut setup = Self::new();
        for (name, value) in raw {
            setup.insert(&name, value);
        }
        setup
    }
}

/// A parsed script: metadata, parameters, and the ordered rules to run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub require_moderator: Option<OptionExpr>,
    #[serde(default)]
    pub min_members: Option<ValueExpr>,
    #[serde(default)]
    pub max_members: Option<ValueExpr>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub import: Vec<String>,
    #[serde(default)]
    pub setup: Setup,
}

impl Script {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse script text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`](crate::ParseError) if the text is not a valid script.
    pub fn from_text(text: &str) -> Result<Self, crate::ParseError> {
        crate::parse::parse(text)
    }

    #[must_use]
    pub fn with_event(mut self, event: &str) -> Self {
        self.event = Some(event.to_owned());
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: Setup) -> Self {
        self.setup = setup;
        self
    }
}
