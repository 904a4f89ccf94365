use std::collections::BTreeMap;

use super::super::language::LocalName;
use super::core::{Param, Type, Variant};
use super::error::TypeError;

impl Type {
    /// Positional parametric substitution: replaces every occurrence of a
    /// mapped variable with its binding. Unmapped variables stay symbolic.
    pub fn substitute(self, map: &BTreeMap<&LocalName, &Type>) -> Result<Self, TypeError> {
        Ok(match self {
            Self::Number(span, value) => Self::Number(span, value),
            Self::Exponential(span, base, exponent) => Self::Exponential(
                span,
                Box::new(base.substitute(map)?),
                Box::new(exponent.substitute(map)?),
            ),
            Self::Interval(span, low, high) => Self::Interval(
                span,
                Box::new(low.substitute(map)?),
                Box::new(high.substitute(map)?),
            ),
            Self::Unit(span) => Self::Unit(span),
            Self::Tuple(span, items) => Self::Tuple(
                span,
                items
                    .into_iter()
                    .map(|item| item.substitute(map))
                    .collect::<Result<_, _>>()?,
            ),
            Self::List(span, members) => Self::List(
                span,
                members
                    .into_iter()
                    .map(|member| member.substitute(map))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Record(span, fields) => Self::Record(
                span,
                fields
                    .into_iter()
                    .map(|(field, typ)| Ok((field, typ.substitute(map)?)))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Function(span, inputs, outputs) => Self::Function(
                span,
                inputs
                    .into_iter()
                    .map(|param| {
                        Ok(Param {
                            typ: param.typ.substitute(map)?,
                            suffix: param.suffix,
                        })
                    })
                    .collect::<Result<_, _>>()?,
                outputs
                    .into_iter()
                    .map(|output| output.substitute(map))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Delegation(span, base, targets) => Self::Delegation(
                span,
                Box::new(base.substitute(map)?),
                targets
                    .into_iter()
                    .map(|target| target.substitute(map))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Predicate(span, constraint, body) => Self::Predicate(
                span,
                Box::new(constraint.substitute(map)?),
                Box::new(body.substitute(map)?),
            ),
            Self::Tagged(span, variants) => Self::Tagged(
                span,
                variants
                    .into_iter()
                    .map(|variant| {
                        Ok(Variant {
                            tag: variant.tag,
                            fields: variant
                                .fields
                                .into_iter()
                                .map(|field| field.substitute(map))
                                .collect::<Result<_, _>>()?,
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Self::Union(span, left, right) => Self::Union(
                span,
                Box::new(left.substitute(map)?),
                Box::new(right.substitute(map)?),
            ),
            Self::Complement(span, left, right) => Self::Complement(
                span,
                Box::new(left.substitute(map)?),
                Box::new(right.substitute(map)?),
            ),
            Self::Name(span, name, args) => Self::Name(
                span,
                name,
                args.into_iter()
                    .map(|arg| arg.substitute(map))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Var(span, name) => {
                if let Some(&typ) = map.get(&name) {
                    typ.clone()
                } else {
                    Self::Var(span, name)
                }
            }
        })
    }

    pub fn contains_var(&self, var: &LocalName) -> bool {
        match self {
            Self::Number(_, _) | Self::Unit(_) => false,
            Self::Exponential(_, base, exponent) => {
                base.contains_var(var) || exponent.contains_var(var)
            }
            Self::Interval(_, low, high) => low.contains_var(var) || high.contains_var(var),
            Self::Tuple(_, items) => items.iter().any(|item| item.contains_var(var)),
            Self::List(_, members) => members.iter().any(|member| member.contains_var(var)),
            Self::Record(_, fields) => fields.values().any(|typ| typ.contains_var(var)),
            Self::Function(_, inputs, outputs) => {
                inputs.iter().any(|param| param.typ.contains_var(var))
                    || outputs.iter().any(|output| output.contains_var(var))
            }
            Self::Delegation(_, base, targets) => {
                base.contains_var(var) || targets.iter().any(|target| target.contains_var(var))
            }
            Self::Predicate(_, constraint, body) => {
                constraint.contains_var(var) || body.contains_var(var)
            }
            Self::Tagged(_, variants) => variants
                .iter()
                .any(|variant| variant.fields.iter().any(|field| field.contains_var(var))),
            Self::Union(_, left, right) | Self::Complement(_, left, right) => {
                left.contains_var(var) || right.contains_var(var)
            }
            Self::Name(_, _, args) => args.iter().any(|arg| arg.contains_var(var)),
            Self::Var(_, name) => name == var,
        }
    }

    /// Whether any type variable occurs anywhere in this expression.
    pub fn has_variables(&self) -> bool {
        match self {
            Self::Number(_, _) | Self::Unit(_) => false,
            Self::Exponential(_, base, exponent) => {
                base.has_variables() || exponent.has_variables()
            }
            Self::Interval(_, low, high) => low.has_variables() || high.has_variables(),
            Self::Tuple(_, items) => items.iter().any(Self::has_variables),
            Self::List(_, members) => members.iter().any(Self::has_variables),
            Self::Record(_, fields) => fields.values().any(Self::has_variables),
            Self::Function(_, inputs, outputs) => {
                inputs.iter().any(|param| param.typ.has_variables())
                    || outputs.iter().any(Self::has_variables)
            }
            Self::Delegation(_, base, targets) => {
                base.has_variables() || targets.iter().any(Self::has_variables)
            }
            Self::Predicate(_, constraint, body) => {
                constraint.has_variables() || body.has_variables()
            }
            Self::Tagged(_, variants) => variants
                .iter()
                .any(|variant| variant.fields.iter().any(Self::has_variables)),
            Self::Union(_, left, right) | Self::Complement(_, left, right) => {
                left.has_variables() || right.has_variables()
            }
            Self::Name(_, _, args) => args.iter().any(Self::has_variables),
            Self::Var(_, _) => true,
        }
    }

    /// Structural equality, ignoring spans. Record fields compare as an
    /// unordered set; everything else is positional. `nan` equals `nan`.
    pub fn syntactically_equal(&self, other: &Self) -> bool {
        fn number_eq(a: f64, b: f64) -> bool {
            a == b || (a.is_nan() && b.is_nan())
        }
        match (self, other) {
            (Type::Number(_, a), Type::Number(_, b)) => number_eq(*a, *b),
            (Type::Exponential(_, b1, e1), Type::Exponential(_, b2, e2)) => {
                b1.syntactically_equal(b2) && e1.syntactically_equal(e2)
            }
            (Type::Interval(_, l1, h1), Type::Interval(_, l2, h2)) => {
                l1.syntactically_equal(l2) && h1.syntactically_equal(h2)
            }
            (Type::Unit(_), Type::Unit(_)) => true,
            (Type::Tuple(_, xs), Type::Tuple(_, ys)) | (Type::List(_, xs), Type::List(_, ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|(x, y)| x.syntactically_equal(y))
            }
            (Type::Record(_, xs), Type::Record(_, ys)) => {
                xs.len() == ys.len()
                    && xs.iter().all(|(field, x)| {
                        ys.get(field)
                            .is_some_and(|y| x.syntactically_equal(y))
                    })
            }
            (Type::Function(_, xi, xo), Type::Function(_, yi, yo)) => {
                xi.len() == yi.len()
                    && xo.len() == yo.len()
                    && xi.iter().zip(yi).all(|(x, y)| {
                        x.suffix == y.suffix && x.typ.syntactically_equal(&y.typ)
                    })
                    && xo.iter().zip(yo).all(|(x, y)| x.syntactically_equal(y))
            }
            (Type::Delegation(_, xb, xt), Type::Delegation(_, yb, yt)) => {
                xb.syntactically_equal(yb)
                    && xt.len() == yt.len()
                    && xt.iter().zip(yt).all(|(x, y)| x.syntactically_equal(y))
            }
            (Type::Predicate(_, xc, xb), Type::Predicate(_, yc, yb)) => {
                xc.syntactically_equal(yc) && xb.syntactically_equal(yb)
            }
            (Type::Tagged(_, xs), Type::Tagged(_, ys)) => {
                xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(x, y)| {
                        x.tag == y.tag
                            && x.fields.len() == y.fields.len()
                            && x.fields
                                .iter()
                                .zip(&y.fields)
                                .all(|(a, b)| a.syntactically_equal(b))
                    })
            }
            (Type::Union(_, xl, xr), Type::Union(_, yl, yr))
            | (Type::Complement(_, xl, xr), Type::Complement(_, yl, yr)) => {
                xl.syntactically_equal(yl) && xr.syntactically_equal(yr)
            }
            (Type::Name(_, xn, xa), Type::Name(_, yn, ya)) => {
                xn == yn
                    && xa.len() == ya.len()
                    && xa.iter().zip(ya).all(|(x, y)| x.syntactically_equal(y))
            }
            (Type::Var(_, x), Type::Var(_, y)) => x == y,
            _ => false,
        }
    }
}
