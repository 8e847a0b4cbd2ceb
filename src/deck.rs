//! Building concrete decks from [`ItemsExpr`] trees.
//!
//! Quantities are strict here: asking `choose`, `first` or `last` for more
//! items than the source deck holds is a [`DomainError::Oversized`]. Only
//! rule limits clamp to what is available, through [`sample_fit`].

use crate::evaluate::{
    label_or_param, resolve_count, resolve_option, resolve_set_op, Env, MAX_COUNT,
};
use crate::{DomainError, EvalError, ItemsExpr, ScriptRng, ValueExpr};

/// Joins the two halves of a `cross` or `zip` pair when no `using` is given.
pub const DEFAULT_SEPARATOR: &str = " • ";

/// Build the deck an items expression describes.
///
/// # Errors
///
/// Fails on reference errors and on quantities the source decks cannot satisfy.
pub fn build_deck(
    items: &ItemsExpr,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<Vec<String>, EvalError> {
    let deck = match items {
        ItemsExpr::Label(label) => label_or_param(label, env, rng)?,
        ItemsExpr::Concat(parts) => {
            let mut deck = Vec::new();
            for part in parts {
                deck.extend(build_deck(part, env, rng)?);
                ensure_size(deck.len())?;
            }
            deck
        }
        ItemsExpr::Choose { choose, from } => {
            let n = resolve_count(choose, "choose", env)?;
            let source = build_deck(from, env, rng)?;
            choose_exact(&source, n, "items", rng)?
        }
        ItemsExpr::ChooseGroups { choose, grouping } => {
            let n = resolve_count(choose, "choose", env)?;
            if n > grouping.len() {
                return Err(DomainError::Oversized {
                    what: "groups",
                    requested: n,
                    available: grouping.len(),
                }
                .into());
            }
            let mut deck = Vec::new();
            for i in rng.sample_indices(grouping.len(), n) {
                deck.extend(build_deck(&grouping[i], env, rng)?);
                ensure_size(deck.len())?;
            }
            deck
        }
        ItemsExpr::Repeat { repeat, from } => {
            let n = resolve_count(repeat, "repeat", env)?;
            let source = build_deck(from, env, rng)?;
            draw_with_replacement(&source, n, "repeat", rng)?
        }
        ItemsExpr::RepeatGroups { repeat, grouping } => {
            let n = resolve_count(repeat, "repeat", env)?;
            let mut deck = Vec::new();
            for _ in 0..n {
                let i = rng
                    .pick_index(grouping.len())
                    .ok_or(DomainError::EmptySource { what: "repeat" })?;
                deck.extend(build_deck(&grouping[i], env, rng)?);
                ensure_size(deck.len())?;
            }
            deck
        }
        ItemsExpr::Duplicate {
            duplicate,
            of,
            from,
        } => {
            let n = resolve_count(duplicate, "duplicate", env)?;
            let of = match of {
                Some(of) => resolve_count(of, "of", env)?,
                None => 1,
            };
            let source = build_deck(from, env, rng)?;
            let sample = choose_exact(&source, of, "items", rng)?;
            draw_with_replacement(&sample, n, "duplicate", rng)?
        }
        ItemsExpr::First { first, from } => {
            let (n, source) = count_and_source(first, "first", from, env, rng)?;
            source[..n].to_vec()
        }
        ItemsExpr::Last { last, from } => {
            let (n, source) = count_and_source(last, "last", from, env, rng)?;
            source[source.len() - n..].to_vec()
        }
        ItemsExpr::Cross { cross, with, using } => {
            let left = build_deck(cross, env, rng)?;
            let right = build_deck(with, env, rng)?;
            let size = left.len().saturating_mul(right.len());
            if size > MAX_COUNT {
                #[allow(clippy::cast_precision_loss)]
                let value = size as f64;
                return Err(DomainError::TooLarge {
                    what: "cross product",
                    value,
                    max: MAX_COUNT,
                }
                .into());
            }
            let sep = using.as_deref().unwrap_or(DEFAULT_SEPARATOR);
            let mut deck: Vec<String> = left
                .iter()
                .flat_map(|a| right.iter().map(move |b| format!("{a}{sep}{b}")))
                .collect();
            rng.shuffle(&mut deck);
            deck
        }
        ItemsExpr::Zip { zip, with, using } => {
            let mut left = build_deck(zip, env, rng)?;
            let mut right = build_deck(with, env, rng)?;
            rng.shuffle(&mut left);
            rng.shuffle(&mut right);
            zip_pairs(left, right, using.as_deref().unwrap_or(DEFAULT_SEPARATOR))
        }
        ItemsExpr::If {
            condition,
            then,
            otherwise,
        } => {
            if resolve_option(condition, env)? {
                build_deck(then, env, rng)?
            } else if let Some(otherwise) = otherwise {
                build_deck(otherwise, env, rng)?
            } else {
                Vec::new()
            }
        }
        ItemsExpr::Set(op) => resolve_set_op(op, env, rng)?,
    };
    Ok(deck)
}

/// Uniform sample of `n` distinct positions of `source`.
///
/// # Errors
///
/// [`DomainError::Oversized`] when `n` exceeds the deck.
pub fn choose_exact(
    source: &[String],
    n: usize,
    what: &'static str,
    rng: &mut ScriptRng,
) -> Result<Vec<String>, DomainError> {
    if n > source.len() {
        return Err(DomainError::Oversized {
            what,
            requested: n,
            available: source.len(),
        });
    }
    Ok(rng.sample(source, n))
}

/// Uniform sample of up to `n` distinct positions, clamped to what is available.
pub fn sample_fit<T: Clone>(source: &[T], n: usize, rng: &mut ScriptRng) -> Vec<T> {
    rng.sample(source, n.min(source.len()))
}

fn draw_with_replacement(
    source: &[String],
    n: usize,
    what: &'static str,
    rng: &mut ScriptRng,
) -> Result<Vec<String>, DomainError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if source.is_empty() {
        return Err(DomainError::EmptySource { what });
    }
    Ok((0..n)
        .filter_map(|_| rng.pick_index(source.len()))
        .map(|i| source[i].clone())
        .collect())
}

fn count_and_source(
    count: &ValueExpr,
    what: &'static str,
    from: &ItemsExpr,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<(usize, Vec<String>), EvalError> {
    let n = resolve_count(count, what, env)?;
    let source = build_deck(from, env, rng)?;
    if n > source.len() {
        return Err(DomainError::Oversized {
            what: "items",
            requested: n,
            available: source.len(),
        }
        .into());
    }
    Ok((n, source))
}

fn zip_pairs(left: Vec<String>, right: Vec<String>, sep: &str) -> Vec<String> {
    let paired = left.len().min(right.len());
    let mut deck: Vec<String> = left
        .iter()
        .zip(&right)
        .map(|(a, b)| format!("{a}{sep}{b}"))
        .collect();
    deck.extend(left.into_iter().skip(paired));
    deck.extend(right.into_iter().skip(paired));
    deck
}

fn ensure_size(len: usize) -> Result<(), DomainError> {
    if len > MAX_COUNT {
        #[allow(clippy::cast_precision_loss)]
        let value = len as f64;
        return Err(DomainError::TooLarge {
            what: "deck",
            value,
            max: MAX_COUNT,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ReferenceError, Setup};

    fn build(items: serde_json::Value, setup: serde_json::Value, seed: u64) -> Result<Vec<String>, EvalError> {
        let setup: Setup = serde_json::from_value(setup).unwrap();
        let items: ItemsExpr = serde_json::from_value(items).unwrap();
        let mut env = Env::new(&setup);
        let mut rng = ScriptRng::new(seed);
        build_deck(&items, &mut env, &mut rng)
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn literal_is_normalized() {
        assert_eq!(build(json!("  Big   Bad Wolf "), json!({}), 0).unwrap(), vec!["Big Bad Wolf"]);
    }

    #[test]
    fn concat_keeps_duplicates_and_order() {
        let deck = build(json!(["a", ["b", "a"], "c"]), json!({}), 0).unwrap();
        assert_eq!(deck, vec!["a", "b", "a", "c"]);
    }

    #[test]
    fn parameter_deck() {
        let deck = build(json!(["town", "Wolf"]), json!({"town": ["Seer", "Villager"]}), 0).unwrap();
        assert_eq!(deck, vec!["Seer", "Villager", "Wolf"]);
    }

    #[test]
    fn choose_distinct_positions() {
        for seed in 0..20 {
            let deck = build(json!({"choose": 3, "from": ["a", "b", "c", "d", "e"]}), json!({}), seed).unwrap();
            assert_eq!(deck.len(), 3);
            let mut unique = deck.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn choose_too_many_is_domain_error() {
        let err = build(json!({"choose": 4, "from": ["a", "b"]}), json!({}), 0).unwrap_err();
        assert_eq!(
            err,
            DomainError::Oversized {
                what: "items",
                requested: 4,
                available: 2
            }
            .into()
        );
    }

    #[test]
    fn negative_choose_is_domain_error() {
        let err = build(json!({"choose": -1, "from": ["a"]}), json!({}), 0).unwrap_err();
        assert!(matches!(err, EvalError::Domain(DomainError::NotACount { .. })));
    }

    #[test]
    fn choose_groups_keeps_groups_whole() {
        let items = json!({"choose": 1, "grouping": [["Wolf", "Wolf"], ["Seer", "Witch"]]});
        for seed in 0..10 {
            let deck = build(items.clone(), json!({}), seed).unwrap();
            assert!(deck == vec!["Wolf", "Wolf"] || deck == vec!["Seer", "Witch"], "{deck:?}");
        }
        assert!(build(json!({"choose": 3, "grouping": ["a", "b"]}), json!({}), 0).is_err());
    }

    #[test]
    fn repeat_draws_with_replacement() {
        let deck = build(json!({"repeat": 7, "from": ["a", "b"]}), json!({}), 3).unwrap();
        assert_eq!(deck.len(), 7);
        assert!(deck.iter().all(|l| l == "a" || l == "b"));
    }

    #[test]
    fn repeat_from_empty() {
        assert_eq!(build(json!({"repeat": 0, "from": []}), json!({}), 0).unwrap(), Vec::<String>::new());
        assert_eq!(
            build(json!({"repeat": 2, "from": []}), json!({}), 0).unwrap_err(),
            DomainError::EmptySource { what: "repeat" }.into()
        );
    }

    #[test]
    fn repeat_groups() {
        let deck = build(json!({"repeat": 3, "grouping": [["x", "y"]]}), json!({}), 0).unwrap();
        assert_eq!(deck, vec!["x", "y", "x", "y", "x", "y"]);
    }

    #[test]
    fn duplicate_draws_from_one_sample() {
        for seed in 0..10 {
            let deck = build(json!({"duplicate": 5, "of": 2, "from": ["a", "b", "c", "d"]}), json!({}), seed).unwrap();
            assert_eq!(deck.len(), 5);
            let mut kinds = deck.clone();
            kinds.sort();
            kinds.dedup();
            assert!(kinds.len() <= 2);
        }
        let single = build(json!({"duplicate": 4, "from": ["a", "b", "c"]}), json!({}), 1).unwrap();
        assert!(single.iter().all(|l| l == &single[0]));
    }

    #[test]
    fn first_and_last_are_deterministic() {
        let from = json!(["a", "b", "c", "d"]);
        assert_eq!(build(json!({"first": 2, "from": from.clone()}), json!({}), 9).unwrap(), vec!["a", "b"]);
        assert_eq!(build(json!({"last": 2, "from": from.clone()}), json!({}), 9).unwrap(), vec!["c", "d"]);
        assert!(build(json!({"last": 5, "from": from}), json!({}), 9).is_err());
    }

    #[test]
    fn cross_pairs_everything() {
        let deck = build(json!({"cross": ["1", "2"], "with": ["a", "b", "c"]}), json!({}), 4).unwrap();
        assert_eq!(
            sorted(deck),
            vec!["1 • a", "1 • b", "1 • c", "2 • a", "2 • b", "2 • c"]
        );
        let custom = build(json!({"cross": ["1"], "with": ["a"], "using": " of "}), json!({}), 4).unwrap();
        assert_eq!(custom, vec!["1 of a"]);
    }

    #[test]
    fn cross_size_is_bounded() {
        let big = json!({"repeat": 200, "from": ["x"]});
        let err = build(json!({"cross": big.clone(), "with": big}), json!({}), 0).unwrap_err();
        assert!(matches!(err, EvalError::Domain(DomainError::TooLarge { .. })));
    }

    #[test]
    fn zip_pairs_then_appends_remainder() {
        let deck = build(json!({"zip": ["1", "2", "3"], "with": ["a"], "using": "/"}), json!({}), 2).unwrap();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.iter().filter(|l| l.ends_with("/a")).count(), 1);
        assert_eq!(deck.iter().filter(|l| !l.contains('/')).count(), 2);
    }

    #[test]
    fn if_branches() {
        let items = json!({"if": "big", "then": ["x", "y"], "else": "z"});
        assert_eq!(build(items.clone(), json!({"big": true}), 0).unwrap(), vec!["x", "y"]);
        assert_eq!(build(items, json!({"big": false}), 0).unwrap(), vec!["z"]);
        let no_else = json!({"if": false, "then": "x"});
        assert!(build(no_else, json!({}), 0).unwrap().is_empty());
    }

    #[test]
    fn set_reference_is_verbatim() {
        let deck = build(json!({"except": [["a", "b", "a", "c"], "b"]}), json!({}), 0).unwrap();
        assert_eq!(deck, vec!["a", "c"]);
    }

    #[test]
    fn undefined_condition_is_reference_error() {
        let err = build(json!({"if": "ghost", "then": "x"}), json!({}), 0).unwrap_err();
        assert_eq!(err, ReferenceError::Undefined { name: "ghost".into() }.into());
    }

    #[test]
    fn sample_fit_clamps() {
        let mut rng = ScriptRng::new(0);
        assert_eq!(sample_fit(&[1, 2, 3], 10, &mut rng).len(), 3);
        assert_eq!(sample_fit(&[1, 2, 3], 2, &mut rng).len(), 2);
    }
}
