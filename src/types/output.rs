use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// One name/value entry of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }

    /// Same name and value, displayed inline.
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            inline: true,
            ..Self::new(name, value)
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// A titled block of fields, the unit of transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub fields: Vec<Field>,
}

/// Everything a script run produced, ready for transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[must_use]
pub struct Output {
    channel: Vec<Embed>,
    direct: BTreeMap<String, Vec<Embed>>,
}

impl Output {
    pub(crate) fn new(channel: Vec<Embed>, direct: BTreeMap<String, Vec<Embed>>) -> Self {
        Self { channel, direct }
    }

    /// Embeds visible to everyone in the channel.
    #[must_use]
    pub fn channel(&self) -> &[Embed] {
        &self.channel
    }

    /// Private embeds keyed by recipient.
    #[must_use]
    pub fn direct(&self) -> &BTreeMap<String, Vec<Embed>> {
        &self.direct
    }

    /// Private embeds for one recipient; empty if they received nothing.
    #[must_use]
    pub fn direct_for(&self, recipient: &str) -> &[Embed] {
        self.direct.get(recipient).map_or(&[], Vec::as_slice)
    }

    /// Every channel field, across embeds, in display order.
    pub fn channel_fields(&self) -> impl Iterator<Item = &Field> {
        self.channel.iter().flat_map(|e| e.fields.iter())
    }

    /// Every private field for one recipient, in display order.
    pub fn direct_fields<'a>(&'a self, recipient: &str) -> impl Iterator<Item = &'a Field> {
        self.direct_for(recipient).iter().flat_map(|e| e.fields.iter())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty() && self.direct.is_empty()
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Output({} channel embeds, {} recipients)",
            self.channel.len(),
            self.direct.len()
        )
    }
}
