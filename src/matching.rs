use crate::evaluate::{resolve_set_op, try_named_deck, Env};
use crate::{normalize_label, EvalError, LabelTest, Matcher, ScriptRng};

/// Test an item label against a matcher.
///
/// A bare string matches by membership when it names a deck in the setup and
/// by substring containment otherwise.
///
/// # Errors
///
/// Fails when a referenced parameter cannot be resolved or a `matches`
/// pattern is not a valid regular expression.
pub fn matches(
    label: &str,
    matcher: &Matcher,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<bool, EvalError> {
    match matcher {
        Matcher::Text(text) => {
            let text = normalize_label(text);
            match try_named_deck(&text, env, rng)? {
                Some(deck) => Ok(deck.iter().any(|l| l == label)),
                None => Ok(label.contains(text.as_str())),
            }
        }
        Matcher::Any(list) => {
            for m in list {
                if matches(label, m, env, rng)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Matcher::Test(test) => test_label(label, test, env, rng),
        Matcher::Set(op) => Ok(resolve_set_op(op, env, rng)?.iter().any(|l| l == label)),
    }
}

fn test_label(
    label: &str,
    test: &LabelTest,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<bool, EvalError> {
    let result = match test {
        LabelTest::Is(s) => label == normalize_label(s),
        LabelTest::IsNot(s) => label != normalize_label(s),
        LabelTest::StartsWith(s) => label.starts_with(normalize_label(s).as_str()),
        LabelTest::StartsWithout(s) => !label.starts_with(normalize_label(s).as_str()),
        LabelTest::EndsWith(s) => label.ends_with(normalize_label(s).as_str()),
        LabelTest::EndsWithout(s) => !label.ends_with(normalize_label(s).as_str()),
        LabelTest::Includes(s) => label.contains(normalize_label(s).as_str()),
        LabelTest::Excludes(s) => !label.contains(normalize_label(s).as_str()),
        LabelTest::Matches(pattern) => env.pattern(pattern)?.is_match(label),
        LabelTest::All(_) => true,
        LabelTest::Not(inner) => !matches(label, inner, env, rng)?,
    };
    Ok(result)
}

/// Whether any label in `labels` matches.
pub(crate) fn any_matches(
    labels: &[String],
    matcher: &Matcher,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<bool, EvalError> {
    for label in labels {
        if matches(label, matcher, env, rng)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{DomainError, ReferenceError, Setup};

    fn check(label: &str, matcher: serde_json::Value, setup: serde_json::Value) -> Result<bool, EvalError> {
        let setup: Setup = serde_json::from_value(setup).unwrap();
        let matcher: Matcher = serde_json::from_value(matcher).unwrap();
        let mut env = Env::new(&setup);
        let mut rng = ScriptRng::new(0);
        matches(label, &matcher, &mut env, &mut rng)
    }

    #[test]
    fn text_is_substring_without_parameter() {
        assert_eq!(check("Alpha Wolf", json!("Wolf"), json!({})), Ok(true));
        assert_eq!(check("Alpha Wolf", json!("  Alpha   W "), json!({})), Ok(true));
        assert_eq!(check("Seer", json!("Wolf"), json!({})), Ok(false));
    }

    #[test]
    fn text_is_membership_with_parameter() {
        let setup = json!({"evil": ["Wolf", "Minion"]});
        assert_eq!(check("Minion", json!("evil"), setup.clone()), Ok(true));
        assert_eq!(check("Alpha Wolf", json!("evil"), setup), Ok(false));
    }

    #[test]
    fn text_naming_other_kind_is_substring() {
        assert_eq!(check("Alpha Wolf", json!("Wolf"), json!({"Wolf": 2})), Ok(true));
        assert_eq!(check("Seer", json!("Wolf"), json!({"Wolf": {"not": true}})), Ok(false));
    }

    #[test]
    fn nested_kind_mismatch_still_fails() {
        let setup = json!({"evil": [{"repeat": "count", "from": "Wolf"}], "count": ["x"]});
        assert_eq!(
            check("Wolf", json!("evil"), setup),
            Err(EvalError::Reference(ReferenceError::KindMismatch {
                name: "count".to_owned(),
                expected: "number",
            }))
        );
    }

    #[test]
    fn structured_predicates() {
        let cases = [
            (json!({"is": "Seer"}), true),
            (json!({"isNot": "Seer"}), false),
            (json!({"startsWith": "Se"}), true),
            (json!({"startsWithout": "Se"}), false),
            (json!({"endsWith": "er"}), true),
            (json!({"endsWithout": "er"}), false),
            (json!({"includes": "ee"}), true),
            (json!({"excludes": "ee"}), false),
            (json!({"matches": "^S.*r$"}), true),
            (json!({"all": true}), true),
            (json!({"not": {"is": "Seer"}}), false),
        ];
        for (matcher, expected) in cases {
            assert_eq!(check("Seer", matcher.clone(), json!({})), Ok(expected), "{matcher}");
        }
    }

    #[test]
    fn list_is_logical_or() {
        assert_eq!(check("Seer", json!(["Wolf", {"is": "Seer"}]), json!({})), Ok(true));
        assert_eq!(check("Seer", json!(["Wolf", "Witch"]), json!({})), Ok(false));
        assert_eq!(check("Seer", json!([]), json!({})), Ok(false));
    }

    #[test]
    fn set_membership() {
        let setup = json!({"town": ["Seer", "Villager"]});
        assert_eq!(check("Seer", json!({"except": ["town", "Villager"]}), setup.clone()), Ok(true));
        assert_eq!(check("Villager", json!({"except": ["town", "Villager"]}), setup), Ok(false));
    }

    #[test]
    fn bad_pattern_is_domain_error() {
        assert!(matches!(
            check("Seer", json!({"matches": "("}), json!({})),
            Err(EvalError::Domain(DomainError::InvalidPattern { .. }))
        ));
    }
}
