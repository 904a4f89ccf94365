use std::fmt::Write;
use std::sync::Arc;

use miette::LabeledSpan;

use super::super::language::GlobalName;
use super::Type;
use crate::location::Span;

#[derive(Clone, Debug)]
pub enum TypeError {
    TypeNameAlreadyDefined(Span, Span, GlobalName),
    TypeNameNotDefined(Span, GlobalName),
    WrongNumberOfTypeArgs(Span, GlobalName, usize, usize),
    DependencyCycle(Span, Vec<GlobalName>),
    ExpansionLimitExceeded(Span, usize),
    UnsatisfiedPredicate(Span, Type, Type),
    EmptyInterval(Span, f64, f64),
}

pub fn labels_from_span(span: &Span) -> Vec<LabeledSpan> {
    match span.points() {
        Some((start, end)) => vec![LabeledSpan::underline(
            start.offset as usize..end.offset as usize,
        )],
        None => vec![],
    }
}

fn two_labels_from_two_spans(
    span1: &Span,
    span2: &Span,
    label1: impl Into<Option<String>>,
    label2: impl Into<Option<String>>,
) -> Vec<LabeledSpan> {
    let mut labels = labels_from_span(span1);
    let label1 = label1.into();
    let label2 = label2.into();
    labels.iter_mut().for_each(|x| x.set_label(label1.clone()));
    let mut labels2 = labels_from_span(span2);
    labels2.iter_mut().for_each(|x| x.set_label(label2.clone()));
    labels.extend(labels2);
    labels
}

impl TypeError {
    pub fn to_report(&self, source_code: Arc<str>) -> miette::Report {
        match self {
            Self::TypeNameAlreadyDefined(span1, span2, name) => {
                miette::miette!(
                    labels = two_labels_from_two_spans(
                        span1,
                        span2,
                        "this".to_owned(),
                        "is already defined here".to_owned()
                    ),
                    "Type `{}` is already defined with a different body.",
                    name
                )
            }
            Self::TypeNameNotDefined(span, name) => {
                let labels = labels_from_span(span);
                miette::miette!(labels = labels, "Type `{}` is not defined.", name)
            }
            Self::WrongNumberOfTypeArgs(span, name, required_number, provided_number) => {
                let labels = labels_from_span(span);
                miette::miette!(
                    labels = labels,
                    "Type `{}` has {} type arguments, but {} were provided.",
                    name,
                    required_number,
                    provided_number
                )
            }
            Self::DependencyCycle(span, deps) => {
                let labels = labels_from_span(span);
                let mut deps_str = String::new();
                for (i, dep) in deps.iter().enumerate() {
                    if i > 0 {
                        write!(&mut deps_str, " -> ").unwrap();
                    }
                    write!(&mut deps_str, "{}", dep).unwrap();
                }
                miette::miette!(
                    labels = labels,
                    "Expanding this type never terminates:\n\n  {}\n\nSelf-referential expansion is not allowed.",
                    deps_str
                )
            }
            Self::ExpansionLimitExceeded(span, limit) => {
                let labels = labels_from_span(span);
                miette::miette!(
                    labels = labels,
                    "Expanding this type exceeded the budget of {} steps.",
                    limit
                )
            }
            Self::UnsatisfiedPredicate(span, binding, constraint) => {
                let labels = labels_from_span(span);
                let (mut binding_str, mut constraint_str) = (String::new(), String::new());
                binding.pretty(&mut binding_str, 1).unwrap();
                constraint.pretty(&mut constraint_str, 1).unwrap();
                miette::miette!(
                    labels = labels,
                    "This predicate requires:\n\n  {}\n\nBut the bound type does not satisfy it:\n\n  {}\n",
                    constraint_str,
                    binding_str,
                )
            }
            Self::EmptyInterval(span, low, high) => {
                let labels = labels_from_span(span);
                miette::miette!(
                    labels = labels,
                    "The interval `{} ... {}` is empty; the low endpoint must be below the high one.",
                    low,
                    high
                )
            }
        }
        .with_source_code(source_code)
    }
}

impl TypeError {
    pub fn spans(&self) -> (Span, Option<Span>) {
        match self {
            Self::TypeNameAlreadyDefined(span1, span2, _) => (span1.clone(), Some(span2.clone())),

            Self::TypeNameNotDefined(span, _)
            | Self::WrongNumberOfTypeArgs(span, _, _, _)
            | Self::DependencyCycle(span, _)
            | Self::ExpansionLimitExceeded(span, _)
            | Self::UnsatisfiedPredicate(span, _, _)
            | Self::EmptyInterval(span, _, _) => (span.clone(), None),
        }
    }
}
