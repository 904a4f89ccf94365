use std::collections::BTreeMap;
use std::fmt::Write;

use indexmap::IndexSet;
use tracing::trace;

use super::super::language::{GlobalName, LocalName};
use super::core::{Param, Type, Variant};
use super::definitions::TypeDefs;
use super::error::TypeError;
use crate::location::Spanning;

fn signature(name: &GlobalName, args: &[Type]) -> String {
    let mut sig = String::new();
    write!(&mut sig, "{}", name).unwrap();
    for arg in args {
        write!(&mut sig, " ").unwrap();
        arg.pretty_atom(&mut sig, 0).unwrap();
    }
    sig
}

impl TypeDefs {
    /// Resolves a type expression to its normal form: every reference
    /// expanded, exponentials evaluated, intervals validated. Set
    /// combinators stay structural; the matcher evaluates them lazily.
    pub fn resolve(
        &self,
        typ: &Type,
        bindings: &BTreeMap<LocalName, Type>,
    ) -> Result<Type, TypeError> {
        let map: BTreeMap<&LocalName, &Type> = bindings.iter().collect();
        let typ = typ.clone().substitute(&map)?;
        let mut steps = 0;
        self.expand(typ, &IndexSet::new(), &mut steps)
    }

    fn expand(
        &self,
        typ: Type,
        path: &IndexSet<(GlobalName, String)>,
        steps: &mut usize,
    ) -> Result<Type, TypeError> {
        *steps += 1;
        if *steps > self.expansion_limit() {
            return Err(TypeError::ExpansionLimitExceeded(
                typ.span(),
                self.expansion_limit(),
            ));
        }
        Ok(match typ {
            Type::Number(span, value) => Type::Number(span, value),
            Type::Unit(span) => Type::Unit(span),
            Type::Var(span, name) => Type::Var(span, name),

            Type::Exponential(span, base, exponent) => {
                let base = self.expand(*base, path, steps)?;
                let exponent = self.expand(*exponent, path, steps)?;
                match (base.numeric_value(), exponent.numeric_value()) {
                    (Some(b), Some(e)) => Type::Number(span, b.powf(e)),
                    _ => Type::Exponential(span, Box::new(base), Box::new(exponent)),
                }
            }
            Type::Interval(span, low, high) => {
                let low = self.expand(*low, path, steps)?;
                let high = self.expand(*high, path, steps)?;
                if let (Some(l), Some(h)) = (low.numeric_value(), high.numeric_value()) {
                    if !(l < h) {
                        return Err(TypeError::EmptyInterval(span, l, h));
                    }
                }
                Type::Interval(span, Box::new(low), Box::new(high))
            }

            Type::Tuple(span, items) => Type::Tuple(
                span,
                items
                    .into_iter()
                    .map(|item| self.expand(item, path, steps))
                    .collect::<Result<_, _>>()?,
            ),
            Type::List(span, members) => Type::List(
                span,
                members
                    .into_iter()
                    .map(|member| self.expand(member, path, steps))
                    .collect::<Result<_, _>>()?,
            ),
            Type::Record(span, fields) => Type::Record(
                span,
                fields
                    .into_iter()
                    .map(|(field, typ)| Ok((field, self.expand(typ, path, steps)?)))
                    .collect::<Result<_, _>>()?,
            ),
            Type::Function(span, inputs, outputs) => Type::Function(
                span,
                inputs
                    .into_iter()
                    .map(|param| {
                        Ok(Param {
                            typ: self.expand(param.typ, path, steps)?,
                            suffix: param.suffix,
                        })
                    })
                    .collect::<Result<_, _>>()?,
                outputs
                    .into_iter()
                    .map(|output| self.expand(output, path, steps))
                    .collect::<Result<_, _>>()?,
            ),
            Type::Delegation(span, base, targets) => Type::Delegation(
                span,
                Box::new(self.expand(*base, path, steps)?),
                targets
                    .into_iter()
                    .map(|target| self.expand(target, path, steps))
                    .collect::<Result<_, _>>()?,
            ),
            Type::Predicate(span, constraint, body) => Type::Predicate(
                span,
                Box::new(self.expand(*constraint, path, steps)?),
                Box::new(self.expand(*body, path, steps)?),
            ),
            Type::Tagged(span, variants) => Type::Tagged(
                span,
                variants
                    .into_iter()
                    .map(|variant| {
                        Ok(Variant {
                            tag: variant.tag,
                            fields: variant
                                .fields
                                .into_iter()
                                .map(|field| self.expand(field, path, steps))
                                .collect::<Result<_, _>>()?,
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Type::Union(span, left, right) => Type::Union(
                span,
                Box::new(self.expand(*left, path, steps)?),
                Box::new(self.expand(*right, path, steps)?),
            ),
            Type::Complement(span, left, right) => Type::Complement(
                span,
                Box::new(self.expand(*left, path, steps)?),
                Box::new(self.expand(*right, path, steps)?),
            ),

            Type::Name(span, name, args) => {
                let args = args
                    .into_iter()
                    .map(|arg| self.expand(arg, path, steps))
                    .collect::<Result<Vec<_>, _>>()?;
                let sig = signature(&name, &args);
                trace!(signature = %sig, "expanding reference");

                let concrete = args.iter().all(|arg| !arg.has_variables());
                if concrete {
                    if let Some(memoized) = self.memo_get(&sig) {
                        return Ok(memoized);
                    }
                }

                let key = (name.clone(), sig.clone());
                if path.contains(&key) {
                    let chain = path
                        .iter()
                        .map(|(dep, _)| dep.clone())
                        .skip_while(|dep| dep != &name)
                        .collect();
                    return Err(TypeError::DependencyCycle(span, chain));
                }
                let mut path = path.clone();
                path.insert(key);

                let body = self.get(&span, &name, &args)?;
                let expanded = match body {
                    // A parametric declaration guarded by a predicate:
                    // every supplied argument must satisfy the constraint.
                    Type::Predicate(pred_span, constraint, inner) if !args.is_empty() => {
                        let constraint = self.expand(*constraint, &path, steps)?;
                        for arg in &args {
                            if !arg.is_subtype_of(&constraint) {
                                return Err(TypeError::UnsatisfiedPredicate(
                                    pred_span.clone(),
                                    arg.clone(),
                                    constraint.clone(),
                                ));
                            }
                        }
                        self.expand(*inner, &path, steps)?
                    }
                    body => self.expand(body, &path, steps)?,
                };

                if concrete {
                    self.memo_insert(sig, expanded.clone());
                }
                expanded
            }
        })
    }
}
