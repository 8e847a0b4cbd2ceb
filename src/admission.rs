//! Who may take part in a run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::evaluate::{resolve_flag, resolve_value, to_count, Env};
use crate::{EvalError, MembershipError, Script, ScriptError};

/// The caller's view of who is playing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub participants: Vec<String>,
    #[serde(default)]
    pub moderator: Option<String>,
}

impl Table {
    pub fn new<I, S>(participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            participants: participants.into_iter().map(Into::into).collect(),
            moderator: None,
        }
    }

    #[must_use]
    pub fn with_moderator(mut self, moderator: impl Into<String>) -> Self {
        self.moderator = Some(moderator.into());
        self
    }

    pub fn moderator(&self) -> Option<&str> {
        self.moderator.as_deref()
    }

    /// Participants in first-seen order, without duplicates or the moderator.
    #[must_use]
    pub fn eligible(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.participants
            .iter()
            .filter(|p| Some(p.as_str()) != self.moderator())
            .filter(|p| seen.insert(p.as_str()))
            .cloned()
            .collect()
    }
}

/// Check the script's membership requirements and return who is dealt to.
///
/// # Errors
///
/// [`MembershipError`] when the table does not satisfy the script, or an
/// evaluation error when a bound cannot be resolved.
pub fn admit(script: &Script, table: &Table, env: &mut Env<'_>) -> Result<Vec<String>, ScriptError> {
    let members = table.eligible();
    check_moderator(script, table, env)?;
    check_min(script, members.len(), env)?;
    check_max(script, members.len(), env)?;
    tracing::debug!(
        members = members.len(),
        moderated = table.moderator.is_some(),
        "admitted table"
    );
    Ok(members)
}

fn check_moderator(script: &Script, table: &Table, env: &mut Env<'_>) -> Result<(), ScriptError> {
    let required = resolve_flag(script.require_moderator.as_ref(), false, env)?;
    if required && table.moderator.is_none() {
        return Err(MembershipError::ModeratorRequired.into());
    }
    Ok(())
}

fn check_min(script: &Script, count: usize, env: &mut Env<'_>) -> Result<(), ScriptError> {
    if let Some(expr) = &script.min_members {
        let min = bound(resolve_value(expr, env)?, "minMembers")?;
        if count < min {
            return Err(MembershipError::TooFew { count, min }.into());
        }
    }
    Ok(())
}

fn check_max(script: &Script, count: usize, env: &mut Env<'_>) -> Result<(), ScriptError> {
    if let Some(expr) = &script.max_members {
        let max = bound(resolve_value(expr, env)?, "maxMembers")?;
        if count > max {
            return Err(MembershipError::TooMany { count, max }.into());
        }
    }
    Ok(())
}

fn bound(value: f64, what: &'static str) -> Result<usize, EvalError> {
    Ok(to_count(value, what)?)
}
