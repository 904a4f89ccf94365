use arcstr::ArcStr;
use indexmap::IndexMap;

use super::types::Type;

/// A descriptor of a dynamically-typed program value, the subject of a
/// membership query. Callables carry the argument types a call site
/// supplies and the result types it expects, not executable code.
#[derive(Clone, Debug)]
pub enum Value {
    Number(f64),
    String(ArcStr),
    Unit,
    /// Tuples and lists are both ordered sequences at runtime.
    Sequence(Vec<Value>),
    Record(IndexMap<ArcStr, Value>),
    Tagged(ArcStr, Vec<Value>),
    Callable {
        inputs: Vec<Type>,
        outputs: Vec<Type>,
    },
}

#[allow(unused)]
impl Value {
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    pub fn string(value: &str) -> Self {
        Self::String(ArcStr::from(value))
    }

    pub fn sequence(items: Vec<Self>) -> Self {
        Self::Sequence(items)
    }

    pub fn numbers(items: &[f64]) -> Self {
        Self::Sequence(items.iter().map(|&v| Self::Number(v)).collect())
    }

    pub fn record(fields: Vec<(&str, Self)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, value)| (ArcStr::from(name), value))
                .collect(),
        )
    }

    pub fn tagged(tag: &str, fields: Vec<Self>) -> Self {
        Self::Tagged(ArcStr::from(tag), fields)
    }

    pub fn callable(inputs: Vec<Type>, outputs: Vec<Type>) -> Self {
        Self::Callable { inputs, outputs }
    }
}
