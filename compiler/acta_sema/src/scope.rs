//! Scope tree for name resolution.
//!
//! Scopes live in a flat arena and point at their parent by index. The tree
//! mirrors the program's nesting during one analysis and is discarded
//! afterwards; the evaluator keeps its own runtime environment.

use crate::types::TypeInfo;
use crate::visibility::Operation;
use acta_ir::Span;
use rustc_hash::FxHashMap;

/// Index of a scope in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What introduced a scope. Drives `break`/`continue`/`fallthrough`/`return`
/// placement checks and row-column resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum ScopeKind {
    Global,
    Block,
    Function { return_type: Option<TypeInfo> },
    Loop,
    Switch,
    Case,
    /// Row expressions of a relational statement. `open` rows come from
    /// tables whose columns are unknown statically; unresolved names in them
    /// are typed `any` instead of reported.
    Row {
        table: String,
        operation: Operation,
        open: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SymbolKind {
    Variable,
    Function,
    Struct,
    Type,
    Parameter,
    Table,
    /// A column visible as a bare name inside a row scope.
    Column { table: String },
    /// The row itself, visible under the table name or its alias.
    RowAlias { table: String },
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: TypeInfo,
    /// Span of the defining node.
    pub span: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: TypeInfo, span: Span) -> Self {
        Symbol {
            name: name.into(),
            kind,
            ty,
            span,
        }
    }
}

#[derive(Clone, Debug)]
struct ScopeData {
    parent: Option<ScopeId>,
    kind: ScopeKind,
    symbols: FxHashMap<String, Symbol>,
}

/// Arena of all scopes created during one analysis.
#[derive(Clone, Debug)]
pub struct Scopes {
    scopes: Vec<ScopeData>,
    current: ScopeId,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes {
            scopes: vec![ScopeData {
                parent: None,
                kind: ScopeKind::Global,
                symbols: FxHashMap::default(),
            }],
            current: ScopeId::GLOBAL,
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Enter a new child scope of the current one.
    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(ScopeData {
            parent: Some(self.current),
            kind,
            symbols: FxHashMap::default(),
        });
        self.current = id;
        id
    }

    /// Return to the parent scope.
    pub fn pop(&mut self) {
        if let Some(parent) = self.data(self.current).parent {
            self.current = parent;
        }
    }

    fn data(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id.index()]
    }

    /// Define (or replace) a symbol in the current scope.
    pub fn define(&mut self, symbol: Symbol) {
        let current = self.current.index();
        self.scopes[current]
            .symbols
            .insert(symbol.name.clone(), symbol);
    }

    /// Walk the chain from the current scope outwards.
    fn chain(&self) -> impl Iterator<Item = &ScopeData> {
        std::iter::successors(Some(self.data(self.current)), |scope| {
            scope.parent.map(|p| self.data(p))
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.chain().find_map(|scope| scope.symbols.get(name))
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.data(self.current).symbols.get(name)
    }

    /// Mutable access to the innermost symbol named `name`.
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let mut id = Some(self.current);
        while let Some(scope_id) = id {
            if self.scopes[scope_id.index()].symbols.contains_key(name) {
                return self.scopes[scope_id.index()].symbols.get_mut(name);
            }
            id = self.scopes[scope_id.index()].parent;
        }
        None
    }

    /// Innermost enclosing scope kinds, stopping after the nearest function.
    pub fn enclosing(&self) -> impl Iterator<Item = &ScopeKind> {
        let mut done = false;
        self.chain().map(|scope| &scope.kind).take_while(move |kind| {
            if done {
                return false;
            }
            done = matches!(kind, ScopeKind::Function { .. });
            true
        })
    }

    /// Declared return type of the enclosing function, if any.
    pub fn function_return(&self) -> Option<Option<&TypeInfo>> {
        self.enclosing().find_map(|kind| match kind {
            ScopeKind::Function { return_type } => Some(return_type.as_ref()),
            _ => None,
        })
    }

    /// The nearest row scope, if expressions are currently row-relative.
    pub fn row(&self) -> Option<(&str, Operation, bool)> {
        self.chain().find_map(|scope| match &scope.kind {
            ScopeKind::Row {
                table,
                operation,
                open,
            } => Some((table.as_str(), *operation, *open)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.len() <= 1
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}
