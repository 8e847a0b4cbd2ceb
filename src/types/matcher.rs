use serde::Deserialize;

use super::expr::SetOp;

/// A test applied to an item label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Matcher {
    /// Membership in a named parameter's deck, or substring containment
    /// when no such parameter exists.
    Text(String),
    /// Matches when any element matches.
    Any(Vec<Matcher>),
    Test(LabelTest),
    /// Membership in a resolved set.
    Set(SetOp),
}

/// Structured string predicates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelTest {
    Is(String),
    IsNot(String),
    StartsWith(String),
    StartsWithout(String),
    EndsWith(String),
    EndsWithout(String),
    Includes(String),
    Excludes(String),
    /// Regular expression search.
    Matches(String),
    /// Always true; the attached value is ignored.
    All(serde_json::Value),
    Not(Box<Matcher>),
}

impl Matcher {
    /// Matcher that accepts every label.
    #[must_use]
    pub fn all() -> Self {
        Matcher::Test(LabelTest::All(serde_json::Value::Bool(true)))
    }

    /// Split into the targets an announcement is made for: each element of
    /// a list matcher, or the matcher itself.
    #[must_use]
    pub fn targets(&self) -> Vec<&Matcher> {
        match self {
            Matcher::Any(list) => list.iter().collect(),
            other => vec![other],
        }
    }
}

impl From<&str> for Matcher {
    fn from(v: &str) -> Self {
        Matcher::Text(v.to_owned())
    }
}

impl From<LabelTest> for Matcher {
    fn from(v: LabelTest) -> Self {
        Matcher::Test(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_shapes() {
        let m: Matcher = serde_json::from_value(json!("Wolf")).unwrap();
        assert_eq!(m, Matcher::Text("Wolf".into()));

        let m: Matcher = serde_json::from_value(json!({"startsWith": "W"})).unwrap();
        assert_eq!(m, Matcher::Test(LabelTest::StartsWith("W".into())));

        let m: Matcher = serde_json::from_value(json!(["a", {"isNot": "b"}])).unwrap();
        assert!(matches!(m, Matcher::Any(ref v) if v.len() == 2));

        let m: Matcher = serde_json::from_value(json!({"not": {"all": true}})).unwrap();
        assert!(matches!(m, Matcher::Test(LabelTest::Not(_))));

        let m: Matcher = serde_json::from_value(json!({"union": ["a", "b"]})).unwrap();
        assert!(matches!(m, Matcher::Set(SetOp::Union(_))));
    }

    #[test]
    fn targets_split_lists() {
        let single = Matcher::from("x");
        assert_eq!(single.targets().len(), 1);
        let list = Matcher::Any(vec!["x".into(), "y".into(), "z".into()]);
        assert_eq!(list.targets().len(), 3);
    }
}
