use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use tracing::debug;

use super::super::language::{GlobalName, LocalName};
use super::core::Type;
use super::error::TypeError;
use crate::location::Span;

pub const DEFAULT_EXPANSION_LIMIT: usize = 10_000;

/// One parsed declaration: `name param* : body`. Immutable once inserted
/// into the registry.
#[derive(Clone, Debug)]
pub struct TypeDef {
    pub span: Span,
    pub name: GlobalName,
    pub params: Vec<LocalName>,
    pub typ: Type,
}

impl TypeDef {
    pub fn external(name: &'static str, params: &[&'static str], typ: Type) -> Self {
        Self {
            span: Span::None,
            name: GlobalName::external(name),
            params: params.iter().map(|&var| LocalName::external(var)).collect(),
            typ,
        }
    }
}

/// The type registry. Declarations are raw AST; resolution happens lazily
/// through [`TypeDefs::resolve`], with fully concrete instantiations
/// memoized across clones.
#[derive(Clone, Debug)]
pub struct TypeDefs {
    pub globals: Arc<IndexMap<GlobalName, TypeDef>>,
    memo: Arc<Mutex<HashMap<String, Type>>>,
    expansion_limit: usize,
}

impl Default for TypeDefs {
    fn default() -> Self {
        Self {
            globals: Default::default(),
            memo: Default::default(),
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
        }
    }
}

impl TypeDefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = limit;
        self
    }

    pub fn expansion_limit(&self) -> usize {
        self.expansion_limit
    }

    /// Inserts a declaration. Forward references are fine; nothing is
    /// resolved here. Re-declaring a name with a syntactically identical
    /// body and parameters is a no-op; a differing body is an error.
    pub fn declare(&mut self, def: TypeDef) -> Result<(), TypeError> {
        if let Some(existing) = self.globals.get(&def.name) {
            if existing.params == def.params && existing.typ.syntactically_equal(&def.typ) {
                return Ok(());
            }
            return Err(TypeError::TypeNameAlreadyDefined(
                def.span,
                existing.span.clone(),
                def.name,
            ));
        }
        debug!(name = %def.name, params = def.params.len(), "declaring type");
        Arc::make_mut(&mut self.globals).insert(def.name.clone(), def);
        // clones may share the old cache; a mutated registry starts fresh
        self.memo = Arc::new(Mutex::new(HashMap::new()));
        Ok(())
    }

    pub fn lookup(&self, name: &GlobalName) -> Option<&TypeDef> {
        self.globals.get(name)
    }

    /// Instantiates a named type: arity-checks the arguments and
    /// substitutes them for the declared parameters. The result is the
    /// referent's body, not yet a normal form.
    pub fn get(&self, span: &Span, name: &GlobalName, args: &[Type]) -> Result<Type, TypeError> {
        match self.globals.get(name) {
            Some(def) => {
                if def.params.len() != args.len() {
                    return Err(TypeError::WrongNumberOfTypeArgs(
                        span.clone(),
                        name.clone(),
                        def.params.len(),
                        args.len(),
                    ));
                }
                let map: BTreeMap<&LocalName, &Type> = def.params.iter().zip(args).collect();
                def.typ.clone().substitute(&map)
            }
            None => Err(TypeError::TypeNameNotDefined(span.clone(), name.clone())),
        }
    }

    pub(super) fn memo_get(&self, signature: &str) -> Option<Type> {
        self.memo.lock().unwrap().get(signature).cloned()
    }

    pub(super) fn memo_insert(&self, signature: String, typ: Type) {
        self.memo.lock().unwrap().insert(signature, typ);
    }
}
