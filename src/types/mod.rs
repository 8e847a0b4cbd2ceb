mod error;
mod expr;
mod matcher;
mod output;
mod rule;
mod script;

pub use error::{DomainError, EvalError, FetchError, ImportError, MembershipError, ReferenceError};
pub use expr::{normalize_label, ItemsExpr, OptionExpr, OptionOp, SetExpr, SetOp, ValueExpr, ValueOp};
pub use matcher::{LabelTest, Matcher};
pub use output::{Embed, Field, Output};
pub use rule::{AnnounceRule, Conditional, DealRule, ExplainRule, Rule, ShowRule};
pub use script::{Script, Setup};
