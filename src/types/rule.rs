use serde::Deserialize;
use serde_json::Value;

use super::expr::{ItemsExpr, OptionExpr, ValueExpr};
use super::matcher::Matcher;

/// Guard shared by every rule kind except [`ExplainRule`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditional {
    /// Skip the rule when this resolves false.
    #[serde(default, rename = "if")]
    pub condition: Option<OptionExpr>,
    /// Skip the rule unless some dealt label matches.
    #[serde(default)]
    pub when_dealt: Option<Matcher>,
}

/// Shuffle a deck and deal it round-robin to participants.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRule {
    pub deal: ItemsExpr,
    /// Only deal to participants already holding a matching item.
    #[serde(default, rename = "for")]
    pub recipients: Option<Matcher>,
    /// Maximum number of round-robin cycles.
    #[serde(default)]
    pub limit: Option<ValueExpr>,
    #[serde(default)]
    pub cumulative: Option<OptionExpr>,
    #[serde(flatten)]
    pub when: Conditional,
}

/// Privately reveal other participants' items to holders of matching items.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRule {
    pub show: Matcher,
    pub to: Matcher,
    #[serde(default, rename = "as")]
    pub label: Option<String>,
    #[serde(default)]
    pub limit: Option<ValueExpr>,
    #[serde(default)]
    pub hide_same: Option<OptionExpr>,
    #[serde(default)]
    pub cumulative: Option<OptionExpr>,
    #[serde(flatten)]
    pub when: Conditional,
}

/// Publicly announce who holds matching items.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnounceRule {
    pub announce: Matcher,
    #[serde(default, rename = "as")]
    pub label: Option<String>,
    #[serde(default)]
    pub limit: Option<ValueExpr>,
    #[serde(default)]
    pub cumulative: Option<OptionExpr>,
    #[serde(flatten)]
    pub when: Conditional,
}

/// A static explanation posted to the channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplainRule {
    pub explain: String,
    #[serde(rename = "as")]
    pub text: String,
}

/// One step of a script, selected by its tag key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Rule {
    Deal(DealRule),
    Show(ShowRule),
    Announce(AnnounceRule),
    Explain(ExplainRule),
}

const TAGS: [&str; 4] = ["deal", "show", "announce", "explain"];

impl Rule {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Deal(_) => "deal",
            Rule::Show(_) => "show",
            Rule::Announce(_) => "announce",
            Rule::Explain(_) => "explain",
        }
    }
}

impl TryFrom<Value> for Rule {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = &value else {
            return Err(format!("a rule must be an object, found {value}"));
        };
        let present: Vec<&str> = TAGS
            .into_iter()
            .filter(|tag| map.contains_key(*tag))
            .collect();
        let tag = match present.as_slice() {
            [tag] => *tag,
            [] => return Err(format!("a rule needs one of: {}", TAGS.join(", "))),
            many => return Err(format!("a rule cannot combine {}", many.join(" and "))),
        };
        let decoded = match tag {
            "deal" => serde_json::from_value(value).map(Rule::Deal),
            "show" => serde_json::from_value(value).map(Rule::Show),
            "announce" => serde_json::from_value(value).map(Rule::Announce),
            _ => serde_json::from_value(value).map(Rule::Explain),
        };
        decoded.map_err(|e| format!("invalid {tag} rule: {e}"))
    }
}
