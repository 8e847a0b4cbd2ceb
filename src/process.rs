//! Walks a script's rules and collects the fields they produce.

use std::collections::BTreeMap;

use crate::deal::{buckets, deal_round_robin, dedup_pairs, DealState};
use crate::deck::{build_deck, sample_fit};
use crate::evaluate::{resolve_count, resolve_flag, Env};
use crate::matching::{any_matches, matches};
use crate::{
    AnnounceRule, Conditional, DealRule, DomainError, EvalError, ExplainRule, Field, Rule,
    ScriptRng, ShowRule, ValueExpr,
};

/// Name of the field that reports items nobody received.
pub const UNDEALT: &str = "Undealt";
/// Name of the field that tells a recipient what they were dealt.
pub const YOU_WERE_DEALT: &str = "You were dealt";

/// Fields produced by one run, before they are paginated into embeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub channel: Vec<Field>,
    pub direct: BTreeMap<String, Vec<Field>>,
}

impl Transcript {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty() && self.direct.values().all(Vec::is_empty)
    }

    fn send(&mut self, recipient: &str, fields: impl IntoIterator<Item = Field>) {
        let mut fields = fields.into_iter().peekable();
        if fields.peek().is_some() {
            self.direct
                .entry(recipient.to_owned())
                .or_default()
                .extend(fields);
        }
    }
}

/// Sequential rule processor for one run.
///
/// Owns the deal state; borrows the resolution context and the generator so
/// the caller can share them with admission.
pub struct Processor<'r, 's> {
    env: &'r mut Env<'s>,
    rng: &'r mut ScriptRng,
    members: &'r [String],
    moderator: Option<&'r str>,
    state: DealState,
    transcript: Transcript,
}

impl<'r, 's> Processor<'r, 's> {
    pub fn new(
        env: &'r mut Env<'s>,
        rng: &'r mut ScriptRng,
        members: &'r [String],
        moderator: Option<&'r str>,
    ) -> Self {
        Self {
            env,
            rng,
            members,
            moderator,
            state: DealState::new(),
            transcript: Transcript::default(),
        }
    }

    /// Process every rule in order.
    ///
    /// # Errors
    ///
    /// Stops at the first rule that fails to evaluate; nothing collected so far is returned.
    pub fn run(mut self, rules: &[Rule]) -> Result<Transcript, EvalError> {
        for (index, rule) in rules.iter().enumerate() {
            if !self.should_run(rule)? {
                tracing::debug!(index, kind = rule.kind(), "rule skipped");
                continue;
            }
            tracing::debug!(index, kind = rule.kind(), "processing rule");
            match rule {
                Rule::Deal(r) => self.deal(r)?,
                Rule::Show(r) => self.show(r)?,
                Rule::Announce(r) => self.announce(r)?,
                Rule::Explain(r) => self.explain(r),
            }
        }
        Ok(self.transcript)
    }

    fn should_run(&mut self, rule: &Rule) -> Result<bool, EvalError> {
        let (when, cumulative) = match rule {
            Rule::Deal(r) => (&r.when, r.cumulative.as_ref()),
            Rule::Show(r) => (&r.when, r.cumulative.as_ref()),
            Rule::Announce(r) => (&r.when, r.cumulative.as_ref()),
            Rule::Explain(_) => return Ok(true),
        };
        let Conditional {
            condition,
            when_dealt,
        } = when;
        if !resolve_flag(condition.as_ref(), true, self.env)? {
            return Ok(false);
        }
        match when_dealt {
            Some(matcher) => {
                let cumulative = resolve_flag(cumulative, false, self.env)?;
                let used = self.state.used(cumulative).to_vec();
                any_matches(&used, matcher, self.env, self.rng)
            }
            None => Ok(true),
        }
    }

    fn limit(&mut self, limit: Option<&ValueExpr>) -> Result<Option<usize>, EvalError> {
        let Some(expr) = limit else {
            return Ok(None);
        };
        match resolve_count(expr, "limit", self.env)? {
            0 => Err(DomainError::ZeroLimit.into()),
            n => Ok(Some(n)),
        }
    }

    fn deal(&mut self, rule: &DealRule) -> Result<(), EvalError> {
        let mut pile = build_deck(&rule.deal, self.env, self.rng)?;
        self.rng.shuffle(&mut pile);

        let mut recipients = match &rule.recipients {
            Some(matcher) => {
                let mut eligible = Vec::new();
                for member in self.members {
                    let held = self.state.holdings(member).to_vec();
                    if any_matches(&held, matcher, self.env, self.rng)? {
                        eligible.push(member.clone());
                    }
                }
                eligible
            }
            None => self.members.to_vec(),
        };
        self.rng.shuffle(&mut recipients);
        let limit = self.limit(rule.limit.as_ref())?;

        let outcome = deal_round_robin(pile, &recipients, limit);
        tracing::debug!(
            recipients = recipients.len(),
            dealt = outcome.dealt(),
            leftover = outcome.leftover.len(),
            "dealt pile"
        );
        tracing::trace!(hands = ?outcome.hands, leftover = ?outcome.leftover, "deal detail");
        self.state.record(&outcome);

        for (count, mut holders) in buckets(&outcome) {
            self.rng.shuffle(&mut holders);
            self.transcript
                .channel
                .push(Field::new(item_count(count), holders.join(", ")));
        }

        for (member, items) in &outcome.hands {
            if !items.is_empty() {
                self.transcript
                    .send(member, [Field::new(YOU_WERE_DEALT, items.join("\n"))]);
            }
        }

        match self.moderator {
            Some(moderator) => {
                let mut rollup: Vec<Field> = outcome
                    .hands
                    .iter()
                    .map(|(member, items)| Field::new(member.as_str(), listing(items)))
                    .collect();
                if !outcome.leftover.is_empty() {
                    rollup.push(Field::new(UNDEALT, outcome.leftover.join("\n")));
                }
                self.transcript.send(moderator, rollup);
            }
            None if !outcome.leftover.is_empty() => {
                self.transcript
                    .channel
                    .push(Field::new(UNDEALT, item_count(outcome.leftover.len())));
            }
            None => {}
        }
        Ok(())
    }

    fn show(&mut self, rule: &ShowRule) -> Result<(), EvalError> {
        let cumulative = resolve_flag(rule.cumulative.as_ref(), false, self.env)?;
        let hide_same = resolve_flag(rule.hide_same.as_ref(), false, self.env)?;
        let limit = self.limit(rule.limit.as_ref())?;
        let hands: Vec<(String, Vec<String>)> = self
            .state
            .hands(cumulative)
            .iter()
            .map(|(m, items)| (m.clone(), items.clone()))
            .collect();

        for (recipient, own) in &hands {
            let mut entries = Vec::new();
            for item in own {
                if !matches(item, &rule.to, self.env, self.rng)? {
                    continue;
                }
                for (other, theirs) in &hands {
                    if other == recipient {
                        continue;
                    }
                    for other_item in theirs {
                        if hide_same && other_item == item {
                            continue;
                        }
                        if matches(other_item, &rule.show, self.env, self.rng)? {
                            let shown = rule.label.as_ref().unwrap_or(other_item);
                            entries.push((other.clone(), shown.clone()));
                        }
                    }
                }
            }
            let entries = self.fit(dedup_pairs(entries), limit);
            tracing::debug!(entries = entries.len(), "revealed to recipient");
            self.transcript.send(recipient, to_fields(entries));
        }
        Ok(())
    }

    fn announce(&mut self, rule: &AnnounceRule) -> Result<(), EvalError> {
        let cumulative = resolve_flag(rule.cumulative.as_ref(), false, self.env)?;
        let limit = self.limit(rule.limit.as_ref())?;
        let pairs: Vec<(String, String)> = self
            .state
            .hands(cumulative)
            .iter()
            .flat_map(|(m, items)| items.iter().map(move |i| (m.clone(), i.clone())))
            .collect();

        let mut announced = Vec::new();
        for target in rule.announce.targets() {
            let mut found = Vec::new();
            for (member, item) in &pairs {
                if matches(item, target, self.env, self.rng)? {
                    let shown = rule.label.as_ref().unwrap_or(item);
                    found.push((member.clone(), shown.clone()));
                }
            }
            announced.extend(self.fit(dedup_pairs(found), limit));
        }
        self.rng.shuffle(&mut announced);
        tracing::debug!(entries = announced.len(), "announced");
        self.transcript.channel.extend(to_fields(announced));
        Ok(())
    }

    fn explain(&mut self, rule: &ExplainRule) {
        self.transcript
            .channel
            .push(Field::new(rule.explain.as_str(), rule.text.as_str()));
    }

    /// Apply an optional limit as a clamped sample, then shuffle.
    fn fit(&mut self, entries: Vec<(String, String)>, limit: Option<usize>) -> Vec<(String, String)> {
        let mut kept = match limit {
            Some(n) => sample_fit(&entries, n, self.rng),
            None => entries,
        };
        self.rng.shuffle(&mut kept);
        kept
    }
}

/// Process `rules` for `members`.
///
/// # Errors
///
/// See [`Processor::run`].
pub fn process(
    rules: &[Rule],
    members: &[String],
    moderator: Option<&str>,
    env: &mut Env<'_>,
    rng: &mut ScriptRng,
) -> Result<Transcript, EvalError> {
    Processor::new(env, rng, members, moderator).run(rules)
}

fn to_fields(entries: Vec<(String, String)>) -> impl Iterator<Item = Field> {
    entries.into_iter().map(|(name, value)| Field::new(name, value))
}

fn item_count(n: usize) -> String {
    if n == 1 {
        "1 item".to_owned()
    } else {
        format!("{n} items")
    }
}

fn listing(items: &[String]) -> String {
    if items.is_empty() {
        "nothing".to_owned()
    } else {
        items.join("\n")
    }
}
