//! Round-robin dealing and the deal state it feeds.

use std::collections::{BTreeMap, HashSet};

/// Result of dealing one pile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealOutcome {
    /// Every participant dealt to, in dealing order, with what they received.
    pub hands: Vec<(String, Vec<String>)>,
    /// Pile items nobody received.
    pub leftover: Vec<String>,
}

impl DealOutcome {
    /// Number of items handed out.
    #[must_use]
    pub fn dealt(&self) -> usize {
        self.hands.iter().map(|(_, items)| items.len()).sum()
    }
}

/// Deal `pile` front to back across `members` in capped round-robin cycles.
///
/// Both inputs are expected to be shuffled already. The number of cycles is
/// the smaller of `limit` and the cycles needed to empty the pile.
#[must_use]
pub fn deal_round_robin(pile: Vec<String>, members: &[String], limit: Option<usize>) -> DealOutcome {
    let mut hands: Vec<(String, Vec<String>)> =
        members.iter().map(|m| (m.clone(), Vec::new())).collect();
    if members.is_empty() {
        return DealOutcome {
            hands,
            leftover: pile,
        };
    }

    let needed = pile.len().div_ceil(members.len());
    let cycles = limit.map_or(needed, |l| l.min(needed));
    let mut pile = pile.into_iter();

    'cycles: for _ in 0..cycles {
        for (_, hand) in &mut hands {
            match pile.next() {
                Some(item) => hand.push(item),
                None => break 'cycles,
            }
        }
    }

    DealOutcome {
        hands,
        leftover: pile.collect(),
    }
}

/// Group participants by how many items they received, largest group size first.
#[must_use]
pub fn buckets(outcome: &DealOutcome) -> Vec<(usize, Vec<String>)> {
    let mut by_count: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (member, items) in &outcome.hands {
        by_count.entry(items.len()).or_default().push(member.clone());
    }
    by_count.into_iter().rev().collect()
}

/// What has been dealt so far in one run.
///
/// `recent` covers the latest deal rule only and is replaced wholesale by
/// each deal; `cumulative` only grows.
#[derive(Debug, Clone, Default)]
pub struct DealState {
    recent: BTreeMap<String, Vec<String>>,
    cumulative: BTreeMap<String, Vec<String>>,
    recent_used: Vec<String>,
    cumulative_used: Vec<String>,
}

impl DealState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recent state with `outcome` and fold it into the cumulative state.
    pub fn record(&mut self, outcome: &DealOutcome) {
        self.recent.clear();
        self.recent_used.clear();
        for (member, items) in &outcome.hands {
            if items.is_empty() {
                continue;
            }
            self.recent
                .entry(member.clone())
                .or_default()
                .extend(items.iter().cloned());
            self.cumulative
                .entry(member.clone())
                .or_default()
                .extend(items.iter().cloned());
            for item in items {
                push_distinct(&mut self.recent_used, item);
                push_distinct(&mut self.cumulative_used, item);
            }
        }
    }

    /// Per-member items of the chosen scope.
    #[must_use]
    pub fn hands(&self, cumulative: bool) -> &BTreeMap<String, Vec<String>> {
        if cumulative {
            &self.cumulative
        } else {
            &self.recent
        }
    }

    /// Distinct labels dealt in the chosen scope, in first-dealt order.
    #[must_use]
    pub fn used(&self, cumulative: bool) -> &[String] {
        if cumulative {
            &self.cumulative_used
        } else {
            &self.recent_used
        }
    }

    /// Everything `member` has been dealt this run.
    #[must_use]
    pub fn holdings(&self, member: &str) -> &[String] {
        self.cumulative.get(member).map_or(&[], Vec::as_slice)
    }
}

fn push_distinct(used: &mut Vec<String>, item: &str) {
    if !used.iter().any(|u| u == item) {
        used.push(item.to_owned());
    }
}

/// Distinct `(title, value)` pairs, first occurrence kept.
pub(crate) fn dedup_pairs(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    pairs.into_iter().filter(|p| seen.insert(p.clone())).collect()
}
