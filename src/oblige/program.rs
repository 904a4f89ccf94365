use tracing::debug;

use super::parse::{parse_module, SyntaxError};
use super::types::definitions::{TypeDef, TypeDefs};
use super::types::error::TypeError;
use crate::location::FileName;

/// An ordered sequence of parsed declarations, as they appeared in one
/// notation source.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub type_defs: Vec<TypeDef>,
}

impl Module {
    pub fn parse(source: &str, file: FileName) -> Result<Self, SyntaxError> {
        parse_module(source, file)
    }

    /// Concatenates another parsed source onto this one. Duplicates are
    /// caught at load time, not here.
    pub fn import(&mut self, mut module: Self) {
        self.type_defs.append(&mut module.type_defs);
    }

    /// Builds a fresh registry from these declarations.
    pub fn load(&self) -> Result<TypeDefs, TypeError> {
        let mut defs = TypeDefs::new();
        self.load_into(&mut defs)?;
        Ok(defs)
    }

    /// Declares everything into an existing registry, in source order.
    /// Forward references between declarations are fine; nothing is
    /// resolved here.
    pub fn load_into(&self, defs: &mut TypeDefs) -> Result<(), TypeError> {
        debug!(declarations = self.type_defs.len(), "loading module");
        for def in &self.type_defs {
            defs.declare(def.clone())?;
        }
        Ok(())
    }
}
