use arcstr::ArcStr;
use indexmap::IndexMap;

use super::super::language::{GlobalName, LocalName};
use crate::location::{Span, Spanning};

/// Suffix on a function parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Suffix {
    None,
    Optional,
    Variadic,
}

/// One positional input of a function type.
#[derive(Clone, Debug)]
pub struct Param {
    pub typ: Type,
    pub suffix: Suffix,
}

/// One constructor of a tagged union, with its positional field types.
#[derive(Clone, Debug)]
pub struct Variant {
    pub tag: LocalName,
    pub fields: Vec<Type>,
}

#[derive(Clone, Debug)]
pub enum Type {
    /// An exact numeric value; covers `+infinity`, `-infinity` and `nan`.
    Number(Span, f64),
    /// `base ^ exponent`, kept symbolic until resolution.
    Exponential(Span, Box<Self>, Box<Self>),
    /// Half-open range `[low, high)`.
    Interval(Span, Box<Self>, Box<Self>),
    /// `void`.
    Unit(Span),
    /// `#[a, b, c]`: fixed arity, ordered.
    Tuple(Span, Vec<Self>),
    /// `[a, b]`: any length, every element in the union of the members.
    List(Span, Vec<Self>),
    /// `{ x: a, y: b }`: unordered unique fields.
    Record(Span, IndexMap<LocalName, Self>),
    /// `a, b? -> c`: positional inputs with suffixes, ordered outputs.
    Function(Span, Vec<Param>, Vec<Self>),
    /// `base <| t, u`: fallback chain for member lookup.
    Delegation(Span, Box<Self>, Vec<Self>),
    /// `constraint => body`: body admissible only for bindings
    /// satisfying the constraint.
    Predicate(Span, Box<Self>, Box<Self>),
    /// `leaf | node a b`: ordered constructors.
    Tagged(Span, Vec<Variant>),
    /// `a + b`: set union.
    Union(Span, Box<Self>, Box<Self>),
    /// `a \ b`: set complement.
    Complement(Span, Box<Self>, Box<Self>),
    /// `name arg*`: a registry reference, possibly parametric.
    Name(Span, GlobalName, Vec<Self>),
    /// A type variable, scoped to the enclosing declaration.
    Var(Span, LocalName),
}

#[allow(unused)]
impl Type {
    pub fn number(value: f64) -> Self {
        Self::Number(Span::None, value)
    }

    pub fn exponential(base: f64, exponent: f64) -> Self {
        Self::Exponential(
            Span::None,
            Box::new(Self::number(base)),
            Box::new(Self::number(exponent)),
        )
    }

    pub fn interval(low: Self, high: Self) -> Self {
        Self::Interval(Span::None, Box::new(low), Box::new(high))
    }

    pub fn range(low: f64, high: f64) -> Self {
        Self::interval(Self::number(low), Self::number(high))
    }

    pub fn unit() -> Self {
        Self::Unit(Span::None)
    }

    pub fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(Span::None, items)
    }

    pub fn list(members: Vec<Self>) -> Self {
        Self::List(Span::None, members)
    }

    pub fn record(fields: Vec<(&'static str, Self)>) -> Self {
        Self::Record(
            Span::None,
            fields
                .into_iter()
                .map(|(name, typ)| (LocalName::external(name), typ))
                .collect(),
        )
    }

    pub fn function(inputs: Vec<Param>, outputs: Vec<Self>) -> Self {
        Self::Function(Span::None, inputs, outputs)
    }

    pub fn param(typ: Self) -> Param {
        Param {
            typ,
            suffix: Suffix::None,
        }
    }

    pub fn optional(typ: Self) -> Param {
        Param {
            typ,
            suffix: Suffix::Optional,
        }
    }

    pub fn variadic(typ: Self) -> Param {
        Param {
            typ,
            suffix: Suffix::Variadic,
        }
    }

    pub fn delegation(base: Self, targets: Vec<Self>) -> Self {
        Self::Delegation(Span::None, Box::new(base), targets)
    }

    pub fn predicate(constraint: Self, body: Self) -> Self {
        Self::Predicate(Span::None, Box::new(constraint), Box::new(body))
    }

    pub fn tagged(variants: Vec<(&'static str, Vec<Self>)>) -> Self {
        Self::Tagged(
            Span::None,
            variants
                .into_iter()
                .map(|(tag, fields)| Variant {
                    tag: LocalName::external(tag),
                    fields,
                })
                .collect(),
        )
    }

    pub fn union(left: Self, right: Self) -> Self {
        Self::Union(Span::None, Box::new(left), Box::new(right))
    }

    pub fn complement(left: Self, right: Self) -> Self {
        Self::Complement(Span::None, Box::new(left), Box::new(right))
    }

    pub fn name(name: &'static str, args: Vec<Self>) -> Self {
        Self::Name(Span::None, GlobalName::external(name), args)
    }

    pub fn var(letter: &'static str) -> Self {
        Self::Var(Span::None, LocalName::external(letter))
    }
}

impl Type {
    /// The numeric value of this expression, if it is a number or a tower
    /// of exponentials over numbers.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            Self::Number(_, value) => Some(*value),
            Self::Exponential(_, base, exponent) => {
                Some(base.numeric_value()?.powf(exponent.numeric_value()?))
            }
            _ => None,
        }
    }
}

impl Param {
    pub fn new(typ: Type, suffix: Suffix) -> Self {
        Self { typ, suffix }
    }
}

/// Minimum and maximum (`None` = unbounded) positional arity accepted by a
/// function's input list.
pub fn arity_range(inputs: &[Param]) -> (usize, Option<usize>) {
    let mut min = 0;
    let mut max = Some(0);
    for param in inputs {
        match param.suffix {
            Suffix::None => {
                min += 1;
                max = max.map(|m| m + 1);
            }
            Suffix::Optional => {
                max = max.map(|m| m + 1);
            }
            Suffix::Variadic => {
                max = None;
            }
        }
    }
    (min, max)
}

/// The declared input type at position `i`; a trailing variadic parameter
/// covers every position past the end.
pub fn input_type_at(inputs: &[Param], i: usize) -> Option<&Type> {
    if i < inputs.len() {
        return Some(&inputs[i].typ);
    }
    match inputs.last() {
        Some(last) if last.suffix == Suffix::Variadic => Some(&last.typ),
        _ => None,
    }
}

impl Variant {
    pub fn new(tag: impl Into<ArcStr>, fields: Vec<Type>) -> Self {
        Self {
            tag: LocalName::from(tag.into()),
            fields,
        }
    }
}

impl Spanning for Type {
    fn span(&self) -> Span {
        match self {
            Self::Number(span, _)
            | Self::Exponential(span, _, _)
            | Self::Interval(span, _, _)
            | Self::Unit(span)
            | Self::Tuple(span, _)
            | Self::List(span, _)
            | Self::Record(span, _)
            | Self::Function(span, _, _)
            | Self::Delegation(span, _, _)
            | Self::Predicate(span, _, _)
            | Self::Tagged(span, _)
            | Self::Union(span, _, _)
            | Self::Complement(span, _, _)
            | Self::Name(span, _, _)
            | Self::Var(span, _) => span.clone(),
        }
    }
}
