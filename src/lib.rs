mod admission;
mod config;
mod deal;
mod deck;
mod engine;
mod error;
mod evaluate;
mod import;
mod matching;
mod process;
mod rng;
mod types;

pub mod parse;

pub use admission::{admit, Table};
pub use config::EngineConfig;
pub use deal::{buckets, deal_round_robin, DealOutcome, DealState};
pub use deck::{build_deck, choose_exact, sample_fit, DEFAULT_SEPARATOR};
pub use engine::{Engine, OVERFLOW};
pub use error::ScriptError;
pub use evaluate::{resolve_option, resolve_set, resolve_value, to_count, Env, MAX_COUNT};
pub use import::{merge_imports, FetchText, MapFetcher};
pub use matching::matches;
pub use parse::ParseError;
pub use process::{process, Processor, Transcript, UNDEALT, YOU_WERE_DEALT};
pub use rng::ScriptRng;
pub use types::{
    normalize_label, AnnounceRule, Conditional, DealRule, DomainError, Embed, EvalError,
    ExplainRule, FetchError, Field, ImportError, ItemsExpr, LabelTest, Matcher, MembershipError,
    OptionExpr, OptionOp, Output, ReferenceError, Rule, Script, SetExpr, SetOp, Setup, ShowRule,
    ValueExpr, ValueOp,
};
