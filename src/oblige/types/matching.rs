use tracing::trace;

use super::super::language::LocalName;
use super::super::value::Value;
use super::core::{arity_range, input_type_at, Type};
use crate::location::Spanning;

/// Policies the notation leaves open.
#[derive(Clone, Copy, Debug)]
pub struct MatchOptions {
    /// Reject record values carrying keys the type does not declare.
    /// Off by default: matching is width-open.
    pub exact_records: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            exact_records: false,
        }
    }
}

/// Does `value` belong to the domain of `typ`? `typ` is expected in
/// normal form; this never fails, a leftover unexpanded reference simply
/// matches nothing.
pub fn matches_value(value: &Value, typ: &Type, options: &MatchOptions) -> bool {
    let result = matches(value, typ, options);
    trace!(matched = result, span = ?typ.span(), "membership query");
    result
}

fn matches(value: &Value, typ: &Type, options: &MatchOptions) -> bool {
    match typ {
        Type::Number(_, _) | Type::Exponential(_, _, _) => match (value, typ.numeric_value()) {
            (Value::Number(v), Some(n)) => (n.is_nan() && v.is_nan()) || *v == n,
            _ => false,
        },
        Type::Interval(_, low, high) => match value {
            Value::Number(v) => match (low.numeric_value(), high.numeric_value()) {
                (Some(l), Some(h)) => !v.is_nan() && l <= *v && *v < h,
                _ => false,
            },
            _ => false,
        },
        Type::Unit(_) => matches!(value, Value::Unit),

        Type::Tuple(_, items) => match value {
            Value::Sequence(values) => {
                values.len() == items.len()
                    && values
                        .iter()
                        .zip(items)
                        .all(|(v, t)| matches(v, t, options))
            }
            _ => false,
        },
        Type::List(_, members) => match value {
            Value::Sequence(values) => values
                .iter()
                .all(|v| members.iter().any(|member| matches(v, member, options))),
            _ => false,
        },
        Type::Record(_, fields) => match value {
            Value::Record(entries) => {
                let declared = fields.iter().all(|(field, typ)| {
                    entries
                        .get(field.string.as_str())
                        .is_some_and(|v| matches(v, typ, options))
                });
                if !declared {
                    return false;
                }
                if options.exact_records {
                    entries
                        .keys()
                        .all(|key| fields.keys().any(|field| field.string == *key))
                } else {
                    true
                }
            }
            _ => false,
        },

        Type::Function(_, inputs, outputs) => match value {
            Value::Callable {
                inputs: supplied,
                outputs: expected,
            } => {
                let (min, max) = arity_range(inputs);
                if supplied.len() < min || max.is_some_and(|m| supplied.len() > m) {
                    return false;
                }
                for (i, arg) in supplied.iter().enumerate() {
                    match input_type_at(inputs, i) {
                        Some(declared) => {
                            if !arg.is_subtype_of(declared) {
                                return false;
                            }
                        }
                        None => return false,
                    }
                }
                // an empty expectation leaves the outputs unconstrained
                expected.is_empty()
                    || (expected.len() == outputs.len()
                        && outputs
                            .iter()
                            .zip(expected)
                            .all(|(out, want)| out.is_subtype_of(want)))
            }
            _ => false,
        },

        Type::Tagged(_, variants) => match value {
            Value::Tagged(tag, values) => variants.iter().any(|variant| {
                variant.tag.string == *tag
                    && variant.fields.len() == values.len()
                    && values
                        .iter()
                        .zip(&variant.fields)
                        .all(|(v, t)| matches(v, t, options))
            }),
            _ => false,
        },

        Type::Union(_, left, right) => {
            matches(value, left, options) || matches(value, right, options)
        }
        Type::Complement(_, left, right) => {
            matches(value, left, options) && !matches(value, right, options)
        }

        // member lookups fall through to targets; plain membership is
        // decided by the base alone
        Type::Delegation(_, base, _) => matches(value, base, options),
        Type::Predicate(_, _, body) => matches(value, body, options),

        // an unbound variable is universally quantified at first use
        Type::Var(_, _) => true,
        Type::Name(_, _, _) => false,
    }
}

impl Type {
    /// Looks up a named member. Records consult their fields; a
    /// delegation chain tries its base first, then each target left to
    /// right, returning the first hit.
    pub fn member(&self, name: &LocalName) -> Option<&Type> {
        match self {
            Self::Record(_, fields) => fields.get(name),
            Self::Delegation(_, base, targets) => base
                .member(name)
                .or_else(|| targets.iter().find_map(|target| target.member(name))),
            Self::Predicate(_, _, body) => body.member(name),
            _ => None,
        }
    }
}
