use crate::lexer::Pos;
use crate::symbol::Universe;
use log::trace;
use std::collections::HashMap;

/// What a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Runtime-provided function taking `arity` arguments.
    Builtin { arity: usize },
    Func { arity: usize },
    Global,
    Const,
    Local,
    Param,
}

impl ObjectKind {
    /// Argument count when the object can be called.
    #[must_use]
    pub fn arity(self) -> Option<usize> {
        match self {
            ObjectKind::Builtin { arity } | ObjectKind::Func { arity } => Some(arity),
            _ => None,
        }
    }

    /// Whether the object names a stack or global slot that can be loaded.
    #[must_use]
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            ObjectKind::Global | ObjectKind::Const | ObjectKind::Local | ObjectKind::Param
        )
    }
}

/// Symbol information
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    /// IR identifier including its sigil, e.g. `@ugo_main_main` or `%local_x.pos.12`.
    pub mangled_name: String,
    pub kind: ObjectKind,
    /// Declaration site; `None` for builtins.
    pub pos: Option<Pos>,
}

impl Object {
    pub fn new(
        name: impl Into<String>,
        mangled_name: impl Into<String>,
        kind: ObjectKind,
        pos: Option<Pos>,
    ) -> Self {
        Self {
            name: name.into(),
            mangled_name: mangled_name.into(),
            kind,
            pos,
        }
    }
}

/// Index of a scope inside its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Default)]
pub struct Scope {
    parent: Option<ScopeId>,
    objects: HashMap<String, Object>,
}

impl Scope {
    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Arena of lexical scopes. Scopes are never removed, so a `ScopeId` stays
/// valid for the lifetime of the tree; leaving a scope just moves the
/// cursor back to its parent.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// A tree whose root scope holds a copy of the builtins.
    #[must_use]
    pub fn new(universe: &Universe) -> Self {
        let root = Scope {
            parent: None,
            objects: universe
                .objects()
                .map(|obj| (obj.name.clone(), obj.clone()))
                .collect(),
        };
        Self {
            scopes: vec![root],
            current: ScopeId(0),
        }
    }

    #[must_use]
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    #[must_use]
    pub fn current(&self) -> ScopeId {
        self.current
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Open a child of the current scope and make it current.
    pub fn enter(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(self.current),
            objects: HashMap::new(),
        });
        trace!("enter scope {} (parent {})", id.0, self.current.0);
        self.current = id;
        id
    }

    /// Return to the parent of the current scope. The root is never left.
    pub fn leave(&mut self) {
        if let Some(parent) = self.scope(self.current).parent {
            trace!("leave scope {}", self.current.0);
            self.current = parent;
        }
    }

    /// Resolve `name` from the current scope outward.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.lookup_from(self.current, name)
    }

    /// Resolve `name` starting at `from` and walking parent links.
    #[must_use]
    pub fn lookup_from(&self, from: ScopeId, name: &str) -> Option<&Object> {
        let mut id = Some(from);
        while let Some(scope_id) = id {
            let scope = self.scope(scope_id);
            if let Some(obj) = scope.objects.get(name) {
                return Some(obj);
            }
            id = scope.parent;
        }
        None
    }

    /// Whether the current scope itself declares `name`.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.scope(self.current).objects.contains_key(name)
    }

    /// Declare `obj` in the current scope.
    ///
    /// If the name is already declared in this scope the existing object is
    /// kept and returned, and `obj` is dropped.
    pub fn insert(&mut self, obj: Object) -> Option<&Object> {
        let current = self.current.0;
        if self.scopes[current].objects.contains_key(&obj.name) {
            return self.scopes[current].objects.get(&obj.name);
        }
        trace!("scope {current}: declare {} as {}", obj.name, obj.mangled_name);
        self.scopes[current].objects.insert(obj.name.clone(), obj);
        None
    }
}
