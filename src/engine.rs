//! The entry point tying admission, rule processing and output together.

use std::collections::BTreeMap;

use crate::admission::{admit, Table};
use crate::config::{truncate, EngineConfig};
use crate::evaluate::Env;
use crate::import::{merge_imports, FetchText};
use crate::process::process;
use crate::{Embed, Field, ImportError, Output, Script, ScriptError, ScriptRng};

/// Name of the field that stands in for fields that did not fit.
pub const OVERFLOW: &str = "Too many to show";

/// Runs scripts under one configuration.
///
/// # Example
///
/// ```
/// use dealscript::{Engine, EngineConfig, Script, ScriptRng, Table};
///
/// let script = Script::from_text(r#"{
///     event: "Night one",
///     rules: [{deal: ["Wolf", "Seer", "Villager"]}],
/// }"#).unwrap();
///
/// let engine = Engine::new(EngineConfig::default());
/// let table = Table::new(["ann", "bo", "cy"]);
/// let output = engine.run(&script, &table, &mut ScriptRng::new(7)).unwrap();
///
/// assert_eq!(output.channel()[0].title, "Night one");
/// assert_eq!(output.direct().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch and merge the script's imports.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Import`] when an import cannot be merged.
    pub async fn prepare(
        &self,
        script: Script,
        fetcher: &dyn FetchText,
    ) -> Result<Script, ScriptError> {
        merge_imports(script, fetcher, self.config.max_imports).await
    }

    /// Run a prepared script for the people at `table`.
    ///
    /// Either every rule runs and the full output is returned, or nothing is.
    ///
    /// # Errors
    ///
    /// Fails when the table does not meet the script's requirements, when a
    /// rule cannot be evaluated, or when no rule produced anything.
    pub fn run(
        &self,
        script: &Script,
        table: &Table,
        rng: &mut ScriptRng,
    ) -> Result<Output, ScriptError> {
        if !script.import.is_empty() {
            return Err(ImportError::Unmerged {
                count: script.import.len(),
            }
            .into());
        }

        let mut env = Env::new(&script.setup);
        let members = admit(script, table, &mut env)?;
        let transcript = process(&script.rules, &members, table.moderator(), &mut env, rng)?;
        if transcript.is_empty() {
            return Err(ScriptError::EmptyOutput);
        }

        let title = script
            .event
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(self.config.default_title.as_str());
        let channel = self.paginate(title, transcript.channel);
        let direct: BTreeMap<String, Vec<Embed>> = transcript
            .direct
            .into_iter()
            .map(|(recipient, fields)| (recipient, self.paginate(title, fields)))
            .collect();

        tracing::info!(
            rules = script.rules.len(),
            channel_embeds = channel.len(),
            recipients = direct.len(),
            "script run complete"
        );
        Ok(Output::new(channel, direct))
    }

    /// Merge imports, then run.
    ///
    /// # Errors
    ///
    /// See [`Engine::prepare`] and [`Engine::run`].
    pub async fn execute(
        &self,
        script: Script,
        table: &Table,
        fetcher: &dyn FetchText,
        rng: &mut ScriptRng,
    ) -> Result<Output, ScriptError> {
        let script = self.prepare(script, fetcher).await?;
        self.run(&script, table, rng)
    }

    /// Parse script text, merge its imports, then run.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Parse`] for malformed text, otherwise see [`Engine::execute`].
    pub async fn execute_text(
        &self,
        text: &str,
        table: &Table,
        fetcher: &dyn FetchText,
        rng: &mut ScriptRng,
    ) -> Result<Output, ScriptError> {
        let script = Script::from_text(text)?;
        self.execute(script, table, fetcher, rng).await
    }

    /// Split fields into embeds, truncating text and replacing the last slot
    /// with an overflow notice when there are more fields than fit.
    fn paginate(&self, title: &str, mut fields: Vec<Field>) -> Vec<Embed> {
        let capacity = self.config.capacity();
        if fields.len() > capacity {
            let hidden = fields.len() - (capacity - 1);
            fields.truncate(capacity - 1);
            fields.push(Field::new(OVERFLOW, format!("…and {hidden} more")));
        }

        let title = truncate(title, self.config.max_title_len);
        let per_embed = self.config.max_fields.max(1);
        fields
            .chunks(per_embed)
            .map(|chunk| Embed {
                title: title.clone(),
                fields: chunk
                    .iter()
                    .map(|f| Field {
                        name: truncate(&f.name, self.config.max_field_name_len),
                        value: truncate(&f.value, self.config.max_field_value_len),
                        inline: f.inline,
                    })
                    .collect(),
            })
            .collect()
    }
}
