mod location;
pub mod oblige;

pub use location::{FileName, Point, Span, Spanning};
pub use oblige::language::{GlobalName, LocalName};
pub use oblige::parse::{parse_module, SyntaxError};
pub use oblige::program::Module;
pub use oblige::types::{
    matches_value, MatchOptions, Param, Suffix, Type, TypeDef, TypeDefs, TypeError, Variant,
};
pub use oblige::value::Value;
