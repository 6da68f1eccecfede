//! Rust stand-in for "callable handle" identity.
//!
//! The original implementation fingerprints a Python callable by its
//! qualified name plus, when the host can surface it, its source text. Rust
//! has no stable runtime API to recover a `fn`/`Fn` value's source or even
//! its declared name, so the caller supplies both explicitly through
//! [`CallableId`]. `source` defaults to `None` and is only non-`None` when a
//! caller opts in (for example via `include_str!` of the defining file) —
//! the crate never fabricates a reflection capability Rust doesn't have.

use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallableId {
    /// A name that uniquely identifies the callable within the process,
    /// e.g. `"my_crate::module::function"`.
    pub fullname: Cow<'static, str>,
    /// Literal source text, if the caller chooses to supply it. Folded into
    /// the fingerprint so that two distinct function bodies sharing a name
    /// don't collide.
    pub source: Option<Cow<'static, str>>,
}

impl CallableId {
    pub fn new(fullname: impl Into<Cow<'static, str>>) -> Self {
        Self {
            fullname: fullname.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Builds a [`CallableId`] from the enclosing module path plus an
/// identifier, e.g. `callable_id!(fetch_user)` inside `crate::handlers`
/// yields `fullname = "crate::handlers::fetch_user"`.
#[macro_export]
macro_rules! callable_id {
    ($name:ident) => {
        $crate::callable::CallableId::new(concat!(module_path!(), "::", stringify!($name)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_leaves_source_empty() {
        let id = CallableId::new("crate::foo");
        assert_eq!(id.fullname, "crate::foo");
        assert!(id.source.is_none());
    }

    #[test]
    fn with_source_attaches_text() {
        let id = CallableId::new("crate::foo").with_source("fn foo() {}");
        assert_eq!(id.source.as_deref(), Some("fn foo() {}"));
    }

    #[test]
    fn macro_builds_qualified_name() {
        fn probe() -> CallableId {
            callable_id!(probe)
        }
        assert!(probe().fullname.ends_with("::probe"));
    }
}
