use super::core::{arity_range, input_type_at, Type};

impl Type {
    /// Structural subtyping: is every value of `self` also a value of
    /// `other`? Both sides are expected in normal form. The relation is
    /// sound but conservative: pairs the structural recursion cannot
    /// decide (an interval against a union of adjacent intervals, say)
    /// report `false`.
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        if let (Some(x), Some(y)) = (self.numeric_value(), other.numeric_value()) {
            return x == y || (x.is_nan() && y.is_nan());
        }
        match (self, other) {
            (Self::Union(_, left, right), _) => {
                left.is_subtype_of(other) && right.is_subtype_of(other)
            }
            (_, Self::Union(_, left, right)) => {
                self.is_subtype_of(left) || self.is_subtype_of(right)
            }

            // Everything in `a \ b` is in `a`.
            (Self::Complement(_, left, _), _) => left.is_subtype_of(other),
            (_, Self::Complement(_, left, right)) => {
                self.is_subtype_of(left) && self.is_disjoint_from(right)
            }

            (Self::Predicate(_, _, body), _) => body.is_subtype_of(other),
            (_, Self::Predicate(_, _, body)) => self.is_subtype_of(body),

            (Self::Delegation(_, base, _), _) => base.is_subtype_of(other),
            (_, Self::Delegation(_, base, _)) => self.is_subtype_of(base),

            (t, Self::Interval(_, low, high)) if t.numeric_value().is_some() => {
                let v = t.numeric_value().unwrap();
                match (low.numeric_value(), high.numeric_value()) {
                    (Some(l), Some(h)) => !v.is_nan() && l <= v && v < h,
                    _ => false,
                }
            }
            (Self::Interval(_, l1, h1), Self::Interval(_, l2, h2)) => {
                match (
                    l1.numeric_value(),
                    h1.numeric_value(),
                    l2.numeric_value(),
                    h2.numeric_value(),
                ) {
                    (Some(a1), Some(a2), Some(b1), Some(b2)) => b1 <= a1 && a2 <= b2,
                    _ => false,
                }
            }

            (Self::Unit(_), Self::Unit(_)) => true,

            (Self::Tuple(_, xs), Self::Tuple(_, ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.is_subtype_of(y))
            }
            // A tuple's values are sequences, so a tuple fits a list domain
            // when every component fits some member of it.
            (Self::Tuple(_, xs), Self::List(_, members)) => xs
                .iter()
                .all(|x| members.iter().any(|member| x.is_subtype_of(member))),
            (Self::List(_, xs), Self::List(_, ys)) => xs
                .iter()
                .all(|x| ys.iter().any(|y| x.is_subtype_of(y))),

            (Self::Record(_, xs), Self::Record(_, ys)) => ys.iter().all(|(field, y)| {
                xs.get(field).is_some_and(|x| x.is_subtype_of(y))
            }),

            (Self::Function(_, xi, xo), Self::Function(_, yi, yo)) => {
                let (xmin, xmax) = arity_range(xi);
                let (ymin, ymax) = arity_range(yi);
                // self must accept every call shape other admits
                if xmin > ymin {
                    return false;
                }
                match (xmax, ymax) {
                    (Some(_), None) => return false,
                    (Some(xm), Some(ym)) if xm < ym => return false,
                    _ => {}
                }
                // inputs are contravariant
                for i in 0..xi.len().max(yi.len()) {
                    match (input_type_at(xi, i), input_type_at(yi, i)) {
                        (Some(x), Some(y)) => {
                            if !y.is_subtype_of(x) {
                                return false;
                            }
                        }
                        (None, Some(_)) => return false,
                        _ => {}
                    }
                }
                // outputs are covariant
                xo.len() == yo.len() && xo.iter().zip(yo).all(|(x, y)| x.is_subtype_of(y))
            }

            (Self::Tagged(_, xs), Self::Tagged(_, ys)) => xs.iter().all(|x| {
                ys.iter().any(|y| {
                    x.tag == y.tag
                        && x.fields.len() == y.fields.len()
                        && x.fields
                            .iter()
                            .zip(&y.fields)
                            .all(|(a, b)| a.is_subtype_of(b))
                })
            }),

            // an unbound variable is universally quantified; either side
            // can instantiate it to fit
            (Self::Var(_, _), _) | (_, Self::Var(_, _)) => true,
            (Self::Name(_, xn, xa), Self::Name(_, yn, ya)) => {
                xn == yn
                    && xa.len() == ya.len()
                    && xa.iter().zip(ya).all(|(x, y)| x.is_subtype_of(y))
            }

            _ => false,
        }
    }

    /// Do `self` and `other` share no values? Precise for numbers,
    /// intervals, tagged unions and structurally distinct shapes;
    /// `false` (unknown) otherwise.
    pub fn is_disjoint_from(&self, other: &Self) -> bool {
        if let (Some(x), Some(y)) = (self.numeric_value(), other.numeric_value()) {
            if x.is_nan() && y.is_nan() {
                return false;
            }
            return x != y;
        }
        match (self, other) {
            (Self::Union(_, left, right), _) => {
                left.is_disjoint_from(other) && right.is_disjoint_from(other)
            }
            (_, Self::Union(_, left, right)) => {
                self.is_disjoint_from(left) && self.is_disjoint_from(right)
            }

            (t, Self::Interval(_, low, high)) | (Self::Interval(_, low, high), t)
                if t.numeric_value().is_some() =>
            {
                let v = t.numeric_value().unwrap();
                match (low.numeric_value(), high.numeric_value()) {
                    (Some(l), Some(h)) => v.is_nan() || v < l || v >= h,
                    _ => false,
                }
            }
            (Self::Interval(_, l1, h1), Self::Interval(_, l2, h2)) => {
                match (
                    l1.numeric_value(),
                    h1.numeric_value(),
                    l2.numeric_value(),
                    h2.numeric_value(),
                ) {
                    (Some(a1), Some(a2), Some(b1), Some(b2)) => a2 <= b1 || b2 <= a1,
                    _ => false,
                }
            }

            (Self::Tagged(_, xs), Self::Tagged(_, ys)) => {
                xs.iter().all(|x| ys.iter().all(|y| x.tag != y.tag))
            }

            _ => match (self.shape(), other.shape()) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            },
        }
    }

    fn shape(&self) -> Option<Shape> {
        match self {
            Self::Number(_, _) | Self::Exponential(_, _, _) | Self::Interval(_, _, _) => {
                Some(Shape::Numeric)
            }
            Self::Unit(_) => Some(Shape::Unit),
            Self::Tuple(_, _) | Self::List(_, _) => Some(Shape::Sequence),
            Self::Record(_, _) => Some(Shape::Record),
            Self::Function(_, _, _) => Some(Shape::Function),
            Self::Tagged(_, _) => Some(Shape::Tagged),
            Self::Delegation(_, base, _) => base.shape(),
            Self::Predicate(_, _, body) => body.shape(),
            Self::Union(_, _, _)
            | Self::Complement(_, _, _)
            | Self::Name(_, _, _)
            | Self::Var(_, _) => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Numeric,
    Unit,
    Sequence,
    Record,
    Function,
    Tagged,
}
