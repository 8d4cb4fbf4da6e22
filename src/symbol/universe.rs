use crate::symbol::{Object, ObjectKind};
use std::sync::OnceLock;

/// Symbol names defined by the builtin runtime module.
pub const BUILTIN_PRINTLN: &str = "@ugo_builtin_println";
pub const BUILTIN_EXIT: &str = "@ugo_builtin_exit";

/// Immutable table of predeclared names, built once and shared by every compilation.
#[derive(Debug, Clone)]
pub struct Universe {
    objects: Vec<Object>,
}

impl Universe {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: vec![
                Object::new("println", BUILTIN_PRINTLN, ObjectKind::Builtin { arity: 1 }, None),
                Object::new("exit", BUILTIN_EXIT, ObjectKind::Builtin { arity: 1 }, None),
            ],
        }
    }

    /// The process-wide instance.
    pub fn global() -> &'static Universe {
        static UNIVERSE: OnceLock<Universe> = OnceLock::new();
        UNIVERSE.get_or_init(Universe::new)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|obj| obj.name == name)
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}
