use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::deck::build_deck;
use crate::{
    normalize_label, DomainError, EvalError, ItemsExpr, OptionExpr, OptionOp, ReferenceError,
    ScriptRng, SetExpr, SetOp, Setup, ValueExpr, ValueOp,
};

/// Largest count any single quantity may resolve to.
pub const MAX_COUNT: usize = 10_000;

/// A setup parameter after its first resolution.
#[derive(Debug, Clone, PartialEq)]
enum Resolved {
    Number(f64),
    Flag(bool),
    Labels(Vec<String>),
}

/// Resolution context for one script run.
///
/// Holds the setup being read, the cache of parameters already resolved,
/// and the chain of parameters currently being resolved. A name that shows
/// up twice in that chain is a recursive definition.
#[derive(Debug)]
pub struct Env<'s> {
    setup: &'s Setup,
    resolved: HashMap<String, Resolved>,
    resolving: Vec<String>,
    patterns: HashMap<String, Regex>,
}

impl<'s> Env<'s> {
    #[must_use]
    pub fn new(setup: &'s Setup) -> Self {
        Self {
            setup,
            resolved: HashMap::new(),
            resolving: Vec::new(),
            patterns: HashMap::new(),
        }
    }

    #[must_use]
    pub fn setup(&self) -> &'s Setup {
        self.setup
    }

    /// Whether `name` refers to a setup parameter.
    #[must_use]
    pub fn is_param(&self, name: &str) -> bool {
        self.setup.contains(name)
    }

    /// Resolve a parameter once and cache the result.
    ///
    /// Returns `Ok(None)` when the setup has no such name.
    fn param<T: DeserializeOwned>(
        &mut self,
        name: &str,
        expected: &'static str,
        resolve: impl FnOnce(&mut Self, T) -> Result<Resolved, EvalError>,
    ) -> Result<Option<Resolved>, EvalError> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(Some(done.clone()));
        }
        if let Some(start) = self.resolving.iter().position(|n| n == name) {
            let mut path = self.resolving[start..].to_vec();
            path.push(name.to_owned());
            return Err(ReferenceError::Recursive { path }.into());
        }
        let Some(raw) = self.setup.get(name) else {
            return Ok(None);
        };
        let expr: T =
            serde_json::from_value(raw.clone()).map_err(|_| ReferenceError::KindMismatch {
                name: name.to_owned(),
                expected,
            })?;

        self.resolving.push(name.to_owned());
        let result = resolve(self, expr);
        self.resolving.pop();

        let value = result?;
        tracing::trace!(parameter = name, "resolved setup parameter");
        self.resolved.insert(name.to_owned(), value.clone());
        Ok(Some(value))
    }

    /// Compile a regular expression once per run.
    pub(crate) fn pattern(&mut self, source: &str) -> Result<&Regex, DomainError> {
        if !self.patterns.contains_key(source) {
            let regex = Regex::new(source).map_err(|e| DomainError::InvalidPattern {
                pattern: source.to_owned(),
                reason: e.to_string(),
            })?;
            self.patterns.insert(source.to_owned(), regex);
        }
        Ok(&self.patterns[source])
    }
}

/// Resolve a numeric expression.
///
/// # Errors
///
/// Fails on undefined or recursive parameters and on empty operand lists.
pub fn resolve_value(expr: &ValueExpr, env: &mut Env<'_>) -> Result<f64, EvalError> {
    match expr {
        ValueExpr::Number(n) => Ok(*n),
        ValueExpr::Param(name) => {
            let name = normalize_label(name);
            let found = env.param::<ValueExpr>(&name, "number", |env, e| {
                resolve_value(&e, env).map(Resolved::Number)
            })?;
            match found {
                Some(Resolved::Number(n)) => Ok(n),
                Some(_) => Err(ReferenceError::KindMismatch {
                    name,
                    expected: "number",
                }
                .into()),
                None => Err(ReferenceError::Undefined { name }.into()),
            }
        }
        ValueExpr::Op(op) => {
            let Some((head, tail)) = op.operands().split_first() else {
                return Err(DomainError::EmptyOperands { op: op.name() }.into());
            };
            let mut acc = resolve_value(head, env)?;
            for operand in tail {
                let next = resolve_value(operand, env)?;
                acc = match op {
                    ValueOp::Plus(_) => acc + next,
                    ValueOp::Minus(_) => acc - next,
                    ValueOp::Times(_) => acc * next,
                    ValueOp::Max(_) => acc.max(next),
                    ValueOp::Min(_) => acc.min(next),
                };
            }
            Ok(acc)
        }
    }
}

/// Resolve a boolean expression. `and`/`or` short-circuit.
///
/// # Errors
///
/// Fails on undefined or recursive parameters.
pub fn resolve_option(expr: &OptionExpr, env: &mut Env<'_>) -> Result<bool, EvalError> {
    match expr {
        OptionExpr::Flag(b) => Ok(*b),
        OptionExpr::Param(name) => {
            let name = normalize_label(name);
            let found = env.param::<OptionExpr>(&name, "option", |env, e| {
                resolve_option(&e, env).map(Resolved::Flag)
            })?;
            match found {
                Some(Resolved::Flag(b)) => Ok(b),
                Some(_) => Err(ReferenceError::KindMismatch {
                    name,
                    expected: "option",
                }
                .into()),
                None => Err(ReferenceError::Undefined { name }.into()),
            }
        }
        OptionExpr::Op(OptionOp::And(all)) => {
            for e in all {
                if !resolve_option(e, env)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        OptionExpr::Op(OptionOp::Or(any)) => {
            for e in any {
                if resolve_option(e, env)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        OptionExpr::Op(OptionOp::Not(inner)) => Ok(!resolve_option(inner, env)?),
    }
}

/// Resolve an optional boolean, using `default` when absent.
pub(crate) fn resolve_flag(
    expr: Option<&OptionExpr>,
    default: bool,
    env: &mut Env<'_>,
) -> Result<bool, EvalError> {
    expr.map_or(Ok(default), |e| resolve_option(e, env))
}

/// Resolve a set expression into distinct labels in first-seen order.
///
/// # Errors
///
/// Fails when a referenced parameter cannot be built as a deck.
pub fn resolve_set(
    expr: &SetExpr,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<Vec<String>, EvalError> {
    match expr {
        SetExpr::Label(label) => Ok(distinct(label_or_param(label, env, rng)?)),
        SetExpr::List(list) => {
            let mut acc = Vec::new();
            for e in list {
                acc = union(acc, resolve_set(e, env, rng)?);
            }
            Ok(acc)
        }
        SetExpr::Op(op) => resolve_set_op(op, env, rng),
    }
}

/// Apply `union`, `intersect` or `except` pairwise, left to right.
///
/// # Errors
///
/// Propagates failures from resolving the operands.
pub fn resolve_set_op(
    op: &SetOp,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<Vec<String>, EvalError> {
    let (operands, combine): (&[SetExpr], fn(Vec<String>, Vec<String>) -> Vec<String>) = match op
    {
        SetOp::Union(v) => (v, union),
        SetOp::Intersect(v) => (v, intersect),
        SetOp::Except(v) => (v, except),
    };
    let Some((head, tail)) = operands.split_first() else {
        return Ok(Vec::new());
    };
    let mut acc = resolve_set(head, env, rng)?;
    for operand in tail {
        let next = resolve_set(operand, env, rng)?;
        acc = combine(acc, next);
    }
    Ok(acc)
}

/// The built deck of setup parameter `name`, or `None` if there is no such parameter.
pub(crate) fn named_deck(
    name: &str,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<Option<Vec<String>>, EvalError> {
    let found = env.param::<ItemsExpr>(name, "deck", |env, e| {
        build_deck(&e, env, rng).map(Resolved::Labels)
    })?;
    match found {
        Some(Resolved::Labels(labels)) => Ok(Some(labels)),
        Some(_) => Err(ReferenceError::KindMismatch {
            name: name.to_owned(),
            expected: "deck",
        }
        .into()),
        None => Ok(None),
    }
}

/// Like [`named_deck`], but a parameter of another kind counts as absent.
pub(crate) fn try_named_deck(
    name: &str,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<Option<Vec<String>>, EvalError> {
    match named_deck(name, env, rng) {
        Err(EvalError::Reference(ReferenceError::KindMismatch { name: found, .. }))
            if found == name =>
        {
            Ok(None)
        }
        other => other,
    }
}

/// A parameter's deck when `label` names one, otherwise the literal label.
pub(crate) fn label_or_param(
    label: &str,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<Vec<String>, EvalError> {
    let label = normalize_label(label);
    match named_deck(&label, env, rng)? {
        Some(deck) => Ok(deck),
        None => Ok(vec![label]),
    }
}

/// Resolve a quantity that must be a whole, bounded count.
pub(crate) fn resolve_count(
    expr: &ValueExpr,
    what: &'static str,
    env: &mut Env<'_>,
) -> Result<usize, EvalError> {
    Ok(to_count(resolve_value(expr, env)?, what)?)
}

/// Convert a resolved number into a count.
///
/// # Errors
///
/// Rejects non-finite, negative, fractional and oversized values.
pub fn to_count(value: f64, what: &'static str) -> Result<usize, DomainError> {
    if !value.is_finite() {
        return Err(DomainError::NonFinite { what });
    }
    if value < 0.0 || value.fract() != 0.0 {
        return Err(DomainError::NotACount { what, value });
    }
    #[allow(clippy::cast_precision_loss)]
    let max = MAX_COUNT as f64;
    if value > max {
        return Err(DomainError::TooLarge {
            what,
            value,
            max: MAX_COUNT,
        });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = value as usize;
    Ok(count)
}

pub(crate) fn distinct(labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .filter(|l| seen.insert(l.clone()))
        .collect()
}

fn union(mut acc: Vec<String>, next: Vec<String>) -> Vec<String> {
    acc.extend(next);
    distinct(acc)
}

fn intersect(acc: Vec<String>, next: Vec<String>) -> Vec<String> {
    let keep: HashSet<String> = next.into_iter().collect();
    acc.into_iter().filter(|l| keep.contains(l)).collect()
}

fn except(acc: Vec<String>, next: Vec<String>) -> Vec<String> {
    let drop: HashSet<String> = next.into_iter().collect();
    acc.into_iter().filter(|l| !drop.contains(l)).collect()
}
