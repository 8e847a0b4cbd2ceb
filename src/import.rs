//! Fetching and folding script fragments into a base script.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::deck::DEFAULT_SEPARATOR;
use crate::evaluate::{resolve_flag, resolve_value, Env};
use crate::{EvalError, FetchError, ImportError, OptionExpr, Script, ScriptError, ValueExpr};

/// Capability to load the text of an imported fragment.
#[async_trait]
pub trait FetchText: Send + Sync {
    async fn fetch_text(&self, address: &str) -> Result<String, FetchError>;
}

/// In-memory fragments keyed by address.
#[derive(Debug, Clone, Default)]
pub struct MapFetcher {
    documents: HashMap<String, String>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, address: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(address, text);
        self
    }

    pub fn insert(&mut self, address: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(address.into(), text.into());
    }
}

#[async_trait]
impl FetchText for MapFetcher {
    async fn fetch_text(&self, address: &str) -> Result<String, FetchError> {
        self.documents
            .get(address)
            .cloned()
            .ok_or_else(|| FetchError::new(format!("nothing found at '{address}'")))
    }
}

/// Membership bounds and moderator requirement, each resolved in its own script's setup.
struct Bounds {
    require_moderator: Option<bool>,
    min: Option<f64>,
    max: Option<f64>,
}

impl Bounds {
    fn of(script: &Script) -> Result<Self, EvalError> {
        let mut env = Env::new(&script.setup);
        let require_moderator = match &script.require_moderator {
            Some(expr) => Some(resolve_flag(Some(expr), false, &mut env)?),
            None => None,
        };
        let min = script
            .min_members
            .as_ref()
            .map(|e| resolve_value(e, &mut env))
            .transpose()?;
        let max = script
            .max_members
            .as_ref()
            .map(|e| resolve_value(e, &mut env))
            .transpose()?;
        Ok(Self {
            require_moderator,
            min,
            max,
        })
    }
}

/// Fetch every import of `script`, in order, and fold each into it.
///
/// The result has no imports of its own. Membership bounds and the moderator
/// requirement come back as plain values since fragments may define the
/// parameters they referred to differently. The script's own bounds resolve
/// in its own setup before anything is fetched.
///
/// # Errors
///
/// Fails when too many imports are listed, when a fragment cannot be fetched
/// or parsed, when a fragment imports further fragments, or when a fragment
/// disagrees with the script about needing a moderator.
#[tracing::instrument(skip_all, fields(imports = script.import.len()))]
pub async fn merge_imports(
    mut script: Script,
    fetcher: &dyn FetchText,
    max_imports: usize,
) -> Result<Script, ScriptError> {
    let addresses = std::mem::take(&mut script.import);
    if addresses.is_empty() {
        return Ok(script);
    }
    if addresses.len() > max_imports {
        return Err(ImportError::TooMany {
            count: addresses.len(),
            max: max_imports,
        }
        .into());
    }

    let base = Bounds::of(&script)?;
    let moderated = base.require_moderator.unwrap_or(false);
    let mut min = base.min;
    let mut max = base.max;

    for address in addresses {
        let fragment = fetch_fragment(&address, fetcher).await?;
        if !fragment.import.is_empty() {
            return Err(ImportError::Nested { address }.into());
        }
        let bounds = Bounds::of(&fragment).map_err(|source| ImportError::Evaluate {
            address: address.clone(),
            source,
        })?;
        if let Some(found) = bounds.require_moderator {
            if found != moderated {
                return Err(ImportError::ModeratorMismatch {
                    address,
                    expected: moderated,
                    found,
                }
                .into());
            }
        }
        min = loosen(min, bounds.min, f64::min);
        max = loosen(max, bounds.max, f64::max);

        tracing::debug!(
            address = %address,
            rules = fragment.rules.len(),
            parameters = fragment.setup.len(),
            "merged import"
        );
        script.event = join_events(script.event.take(), fragment.event);
        script.setup.overlay(fragment.setup);
        script.rules.extend(fragment.rules);
    }

    script.require_moderator = base.require_moderator.map(OptionExpr::Flag);
    script.min_members = min.map(ValueExpr::Number);
    script.max_members = max.map(ValueExpr::Number);
    Ok(script)
}

async fn fetch_fragment(address: &str, fetcher: &dyn FetchText) -> Result<Script, ImportError> {
    let text = fetcher.fetch_text(address).await.map_err(|source| {
        tracing::warn!(address, error = %source, "import fetch failed");
        ImportError::Fetch {
            address: address.to_owned(),
            source,
        }
    })?;
    crate::parse::parse(&text).map_err(|source| {
        tracing::warn!(address, error = %source, "import parse failed");
        ImportError::Parse {
            address: address.to_owned(),
            source,
        }
    })
}

fn loosen(current: Option<f64>, next: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (current, next) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

fn join_events(base: Option<String>, next: Option<String>) -> Option<String> {
    let parts: Vec<String> = base
        .into_iter()
        .chain(next)
        .filter(|e| !e.trim().is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(DEFAULT_SEPARATOR))
    }
}
