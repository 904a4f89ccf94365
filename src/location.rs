use arcstr::ArcStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    // 0-based
    pub offset: u32,
    // 0-based
    pub row: u32,
    // 0-based
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Span {
    None,
    At {
        start: Point,
        end: Point,
        file: FileName,
    },
}

impl Default for Span {
    fn default() -> Self {
        Self::None
    }
}

pub trait Spanning {
    fn span(&self) -> Span;
}

impl Span {
    pub fn points(&self) -> Option<(Point, Point)> {
        match self {
            Self::None => None,
            Self::At { start, end, .. } => Some((*start, *end)),
        }
    }

    pub fn start(&self) -> Option<Point> {
        self.points().map(|(s, _)| s)
    }

    pub fn only_end(&self) -> Self {
        match self.clone() {
            Self::None => Self::None,
            Self::At { end, file, .. } => Self::At {
                start: end,
                end,
                file,
            },
        }
    }

    pub fn join(&self, other: Self) -> Self {
        match (self.clone(), other) {
            (Self::None, span) | (span, Self::None) => span,
            (
                Self::At {
                    start: start1,
                    end: end1,
                    file: file1,
                },
                Self::At {
                    start: start2,
                    end: end2,
                    file: file2,
                },
            ) => {
                assert_eq!(file1, file2, "can't join spans from different files");
                Self::At {
                    start: if start1.offset < start2.offset {
                        start1
                    } else {
                        start2
                    },
                    end: if end1.offset > end2.offset {
                        end1
                    } else {
                        end2
                    },
                    file: file1,
                }
            }
        }
    }
}

impl Point {
    pub fn point_span(&self, file: FileName) -> Span {
        Span::At {
            start: *self,
            end: *self,
            file,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(pub ArcStr);

impl FileName {
    pub const UNKNOWN: Self = FileName(arcstr::literal!("oblige:unknown"));
}

impl From<&str> for FileName {
    fn from(name: &str) -> Self {
        FileName(name.into())
    }
}

impl From<String> for FileName {
    fn from(name: String) -> Self {
        FileName(name.into())
    }
}

impl From<&FileName> for FileName {
    fn from(file: &FileName) -> Self {
        file.clone()
    }
}
