//! Limits imposed by whoever transports the output.

use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of imports a script may list.
    pub max_imports: usize,

    /// Maximum fields per embed.
    pub max_fields: usize,

    /// Maximum embeds per message. The last field slot of the last embed is
    /// given over to an overflow notice when there is more to show.
    pub max_embeds: usize,

    /// Longest embed title, in characters.
    pub max_title_len: usize,

    /// Longest field name, in characters.
    pub max_field_name_len: usize,

    /// Longest field value, in characters.
    pub max_field_value_len: usize,

    /// Embed title used when the script has no `event`.
    pub default_title: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_imports: 5,
            max_fields: 25,
            max_embeds: 10,
            max_title_len: 256,
            max_field_name_len: 256,
            max_field_value_len: 1024,
            default_title: "Script".to_owned(),
        }
    }
}

impl EngineConfig {
    pub fn with_max_imports(mut self, n: usize) -> Self {
        self.max_imports = n;
        self
    }

    pub fn with_max_fields(mut self, n: usize) -> Self {
        self.max_fields = n;
        self
    }

    pub fn with_max_embeds(mut self, n: usize) -> Self {
        self.max_embeds = n;
        self
    }

    /// Set the title, field name and field value length limits together.
    pub fn with_text_limits(mut self, title: usize, name: usize, value: usize) -> Self {
        self.max_title_len = title;
        self.max_field_name_len = name;
        self.max_field_value_len = value;
        self
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Fields that fit in one message, never less than one.
    pub(crate) fn capacity(&self) -> usize {
        self.max_fields.max(1) * self.max_embeds.max(1)
    }
}

/// Cut `text` to at most `max` characters, ending in an ellipsis when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    if max == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push('…');
    cut
}
