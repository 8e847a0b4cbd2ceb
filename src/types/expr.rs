use serde::Deserialize;

/// Numeric expression: a literal, a setup parameter, or an arithmetic fold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ValueExpr {
    Number(f64),
    Param(String),
    Op(ValueOp),
}

/// Arithmetic over a non-empty operand list, reduced left to right.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueOp {
    Plus(Vec<ValueExpr>),
    Minus(Vec<ValueExpr>),
    Times(Vec<ValueExpr>),
    Max(Vec<ValueExpr>),
    Min(Vec<ValueExpr>),
}

impl ValueOp {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ValueOp::Plus(_) => "plus",
            ValueOp::Minus(_) => "minus",
            ValueOp::Times(_) => "times",
            ValueOp::Max(_) => "max",
            ValueOp::Min(_) => "min",
        }
    }

    pub(crate) fn operands(&self) -> &[ValueExpr] {
        match self {
            ValueOp::Plus(v)
            | ValueOp::Minus(v)
            | ValueOp::Times(v)
            | ValueOp::Max(v)
            | ValueOp::Min(v) => v,
        }
    }
}

/// Boolean expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionExpr {
    Flag(bool),
    Param(String),
    Op(OptionOp),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionOp {
    And(Vec<OptionExpr>),
    Or(Vec<OptionExpr>),
    Not(Box<OptionExpr>),
}

/// Expression producing an ordered list of distinct labels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SetExpr {
    /// A parameter name, or a literal label when no such parameter exists.
    Label(String),
    List(Vec<SetExpr>),
    Op(SetOp),
}

/// Set algebra, reduced pairwise left to right.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetOp {
    Union(Vec<SetExpr>),
    Intersect(Vec<SetExpr>),
    Except(Vec<SetExpr>),
}

/// Deck expression producing an ordered list of labels, duplicates allowed.
///
/// Variants are distinguished by which keys are present: `{choose, from}`,
/// `{choose, grouping}`, `{cross, with}` and so on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ItemsExpr {
    /// A parameter name, or a literal label when no such parameter exists.
    Label(String),
    Concat(Vec<ItemsExpr>),
    Choose {
        choose: ValueExpr,
        from: Box<ItemsExpr>,
    },
    ChooseGroups {
        choose: ValueExpr,
        grouping: Vec<ItemsExpr>,
    },
    Repeat {
        repeat: ValueExpr,
        from: Box<ItemsExpr>,
    },
    RepeatGroups {
        repeat: ValueExpr,
        grouping: Vec<ItemsExpr>,
    },
    Duplicate {
        duplicate: ValueExpr,
        #[serde(default)]
        of: Option<ValueExpr>,
        from: Box<ItemsExpr>,
    },
    First {
        first: ValueExpr,
        from: Box<ItemsExpr>,
    },
    Last {
        last: ValueExpr,
        from: Box<ItemsExpr>,
    },
    Cross {
        cross: Box<ItemsExpr>,
        with: Box<ItemsExpr>,
        #[serde(default)]
        using: Option<String>,
    },
    Zip {
        zip: Box<ItemsExpr>,
        with: Box<ItemsExpr>,
        #[serde(default)]
        using: Option<String>,
    },
    If {
        #[serde(rename = "if")]
        condition: OptionExpr,
        then: Box<ItemsExpr>,
        #[serde(default, rename = "else")]
        otherwise: Option<Box<ItemsExpr>>,
    },
    Set(SetOp),
}

impl From<f64> for ValueExpr {
    fn from(v: f64) -> Self {
        ValueExpr::Number(v)
    }
}

impl From<i64> for ValueExpr {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        ValueExpr::Number(v as f64)
    }
}

impl From<&str> for ValueExpr {
    fn from(v: &str) -> Self {
        ValueExpr::Param(v.to_owned())
    }
}

impl From<bool> for OptionExpr {
    fn from(v: bool) -> Self {
        OptionExpr::Flag(v)
    }
}

impl From<&str> for OptionExpr {
    fn from(v: &str) -> Self {
        OptionExpr::Param(v.to_owned())
    }
}

impl From<&str> for SetExpr {
    fn from(v: &str) -> Self {
        SetExpr::Label(v.to_owned())
    }
}

impl From<&str> for ItemsExpr {
    fn from(v: &str) -> Self {
        ItemsExpr::Label(v.to_owned())
    }
}

impl<T: Into<ItemsExpr>> From<Vec<T>> for ItemsExpr {
    fn from(v: Vec<T>) -> Self {
        ItemsExpr::Concat(v.into_iter().map(Into::into).collect())
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}
