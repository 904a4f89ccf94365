use std::fmt;
use std::fmt::Write;

use super::core::{Suffix, Type};

fn write_number(f: &mut impl Write, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "nan")
    } else if value == f64::INFINITY {
        write!(f, "+infinity")
    } else if value == f64::NEG_INFINITY {
        write!(f, "-infinity")
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{}", value)
    }
}

impl Type {
    /// Renders this type back to notation text. The output re-parses to a
    /// syntactically equal expression; operands are parenthesized wherever
    /// a looser-binding form sits inside a tighter one.
    pub fn pretty(&self, f: &mut impl Write, indent: usize) -> fmt::Result {
        match self {
            Self::Number(_, value) => write_number(f, *value),
            Self::Exponential(_, base, exponent) => {
                match base.as_ref() {
                    Self::Number(_, value) => write_number(f, *value)?,
                    base => {
                        write!(f, "(")?;
                        base.pretty(f, indent)?;
                        write!(f, ")")?;
                    }
                }
                write!(f, "^")?;
                match exponent.as_ref() {
                    Self::Number(_, value) => write_number(f, *value),
                    exponent @ Self::Exponential(_, _, _) => exponent.pretty(f, indent),
                    exponent => {
                        write!(f, "(")?;
                        exponent.pretty(f, indent)?;
                        write!(f, ")")
                    }
                }
            }
            Self::Interval(_, low, high) => {
                low.pretty(f, indent)?;
                write!(f, " ... ")?;
                high.pretty(f, indent)
            }
            Self::Unit(_) => write!(f, "void"),

            Self::Tuple(_, items) => {
                write!(f, "#[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.pretty(f, indent)?;
                }
                write!(f, "]")
            }
            Self::List(_, members) => {
                write!(f, "[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    member.pretty(f, indent)?;
                }
                write!(f, "]")
            }
            Self::Record(_, fields) => {
                if fields.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (field, typ)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", field)?;
                    typ.pretty(f, indent)?;
                }
                write!(f, " }}")
            }

            Self::Function(_, inputs, outputs) => {
                for (i, param) in inputs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match &param.typ {
                        typ @ (Self::Function(_, _, _) | Self::Predicate(_, _, _)) => {
                            write!(f, "(")?;
                            typ.pretty(f, indent)?;
                            write!(f, ")")?;
                        }
                        typ => typ.pretty(f, indent)?,
                    }
                    match param.suffix {
                        Suffix::None => {}
                        Suffix::Optional => write!(f, "?")?,
                        Suffix::Variadic => write!(f, "...")?,
                    }
                }
                write!(f, " -> ")?;
                let curried = outputs.len() == 1;
                for (i, output) in outputs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match output {
                        // a sole function output is a curried chain
                        typ @ Self::Function(_, _, _) if curried => typ.pretty(f, indent)?,
                        typ @ (Self::Function(_, _, _) | Self::Predicate(_, _, _)) => {
                            write!(f, "(")?;
                            typ.pretty(f, indent)?;
                            write!(f, ")")?;
                        }
                        typ => typ.pretty(f, indent)?,
                    }
                }
                Ok(())
            }

            Self::Delegation(_, base, targets) => {
                match base.as_ref() {
                    typ @ (Self::Function(_, _, _)
                    | Self::Predicate(_, _, _)
                    | Self::Tagged(_, _)
                    | Self::Union(_, _, _)
                    | Self::Complement(_, _, _)) => {
                        write!(f, "(")?;
                        typ.pretty(f, indent)?;
                        write!(f, ")")?;
                    }
                    typ => typ.pretty(f, indent)?,
                }
                write!(f, " <| ")?;
                for (i, target) in targets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match target {
                        typ @ (Self::Function(_, _, _)
                        | Self::Predicate(_, _, _)
                        | Self::Tagged(_, _)
                        | Self::Union(_, _, _)
                        | Self::Complement(_, _, _)
                        | Self::Delegation(_, _, _)) => {
                            write!(f, "(")?;
                            typ.pretty(f, indent)?;
                            write!(f, ")")?;
                        }
                        typ => typ.pretty(f, indent)?,
                    }
                }
                Ok(())
            }

            Self::Predicate(_, constraint, body) => {
                match constraint.as_ref() {
                    typ @ Self::Predicate(_, _, _) => {
                        write!(f, "(")?;
                        typ.pretty(f, indent)?;
                        write!(f, ")")?;
                    }
                    typ => typ.pretty(f, indent)?,
                }
                write!(f, " => ")?;
                body.pretty(f, indent)
            }

            Self::Tagged(_, variants) => {
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", variant.tag)?;
                    for field in &variant.fields {
                        write!(f, " ")?;
                        field.pretty_atom(f, indent)?;
                    }
                }
                Ok(())
            }

            Self::Union(_, left, right) => {
                match left.as_ref() {
                    typ @ (Self::Function(_, _, _)
                    | Self::Predicate(_, _, _)
                    | Self::Tagged(_, _)) => {
                        write!(f, "(")?;
                        typ.pretty(f, indent)?;
                        write!(f, ")")?;
                    }
                    typ => typ.pretty(f, indent)?,
                }
                write!(f, " + ")?;
                match right.as_ref() {
                    typ @ (Self::Function(_, _, _)
                    | Self::Predicate(_, _, _)
                    | Self::Tagged(_, _)
                    | Self::Union(_, _, _)) => {
                        write!(f, "(")?;
                        typ.pretty(f, indent)?;
                        write!(f, ")")?;
                    }
                    typ => typ.pretty(f, indent)?,
                }
                Ok(())
            }

            Self::Complement(_, left, right) => {
                match left.as_ref() {
                    typ @ (Self::Function(_, _, _)
                    | Self::Predicate(_, _, _)
                    | Self::Tagged(_, _)
                    | Self::Union(_, _, _)) => {
                        write!(f, "(")?;
                        typ.pretty(f, indent)?;
                        write!(f, ")")?;
                    }
                    typ => typ.pretty(f, indent)?,
                }
                write!(f, " \\ ")?;
                match right.as_ref() {
                    typ @ (Self::Function(_, _, _)
                    | Self::Predicate(_, _, _)
                    | Self::Tagged(_, _)
                    | Self::Union(_, _, _)
                    | Self::Complement(_, _, _)) => {
                        write!(f, "(")?;
                        typ.pretty(f, indent)?;
                        write!(f, ")")?;
                    }
                    typ => typ.pretty(f, indent)?,
                }
                Ok(())
            }

            Self::Name(_, name, args) => {
                write!(f, "{}", name)?;
                for arg in args {
                    write!(f, " ")?;
                    arg.pretty_atom(f, indent)?;
                }
                Ok(())
            }
            Self::Var(_, name) => write!(f, "{}", name),
        }
    }

    /// Like [`Type::pretty`], parenthesized unless the expression is
    /// already an atom.
    pub fn pretty_atom(&self, f: &mut impl Write, indent: usize) -> fmt::Result {
        match self {
            Self::Number(_, _)
            | Self::Unit(_)
            | Self::Tuple(_, _)
            | Self::List(_, _)
            | Self::Record(_, _)
            | Self::Var(_, _) => self.pretty(f, indent),
            Self::Name(_, _, args) if args.is_empty() => self.pretty(f, indent),
            _ => {
                write!(f, "(")?;
                self.pretty(f, indent)?;
                write!(f, ")")
            }
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        self.pretty(f, 0)
    }
}
