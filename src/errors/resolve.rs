use alloc::{boxed::Box, fmt, string::String};
use core::fmt::{Display, Formatter};

use super::InstantiateErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Dependency '{key}' not found")]
    NotFound { key: String },
    #[error("Circular dependency detected: {path}")]
    CircularDependency { path: CyclePath },
    #[error("Incorrect type of dependency '{key}'. Actual: {actual}, expected: {expected}")]
    IncorrectType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Provider of '{key}' failed: {source}")]
    Provider {
        key: String,
        #[source]
        source: InstantiateErrorKind,
    },
    #[error("Post-construct hook of '{key}' failed: {source}")]
    PostConstruct {
        key: String,
        #[source]
        source: InstantiateErrorKind,
    },
}

impl ResolveErrorKind {
    /// Unwraps errors of nested resolutions, so they reach the outermost caller unchanged
    pub(crate) fn from_provider(key: &str, err: InstantiateErrorKind) -> Self {
        match err {
            InstantiateErrorKind::Resolve(err) => *err,
            source => Self::Provider { key: key.into(), source },
        }
    }

    pub(crate) fn from_post_construct(key: &str, err: InstantiateErrorKind) -> Self {
        match err {
            InstantiateErrorKind::Resolve(err) => *err,
            source => Self::PostConstruct { key: key.into(), source },
        }
    }
}

/// Keys of a dependency cycle in traversal order.
/// The first and the last keys are the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePath(pub(crate) Box<[String]>);

impl CyclePath {
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.0
    }
}

impl Display for CyclePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = self.0.iter();
        if let Some(key) = keys.next() {
            write!(f, "{key}")?;
        }
        for key in keys {
            write!(f, " -> {key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CyclePath, InstantiateErrorKind, ResolveErrorKind};

    use alloc::{boxed::Box, string::ToString as _, vec};

    #[test]
    fn test_cycle_path_display() {
        let path = CyclePath(vec!["a".into(), "b".into(), "c".into(), "a".into()].into_boxed_slice());
        assert_eq!(path.to_string(), "a -> b -> c -> a");

        let err = ResolveErrorKind::CircularDependency { path };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> c -> a");
    }

    #[test]
    fn test_from_provider_passes_nested_resolve_errors() {
        let nested = InstantiateErrorKind::from(ResolveErrorKind::NotFound { key: "db".into() });
        assert!(matches!(
            ResolveErrorKind::from_provider("app", nested),
            ResolveErrorKind::NotFound { key } if key == "db",
        ));

        let custom = InstantiateErrorKind::Custom(anyhow::anyhow!("boom"));
        assert!(matches!(
            ResolveErrorKind::from_provider("app", custom),
            ResolveErrorKind::Provider { key, .. } if key == "app",
        ));

        let custom = InstantiateErrorKind::Resolve(Box::new(ResolveErrorKind::NotFound { key: "x".into() }));
        assert!(matches!(
            ResolveErrorKind::from_post_construct("app", custom),
            ResolveErrorKind::NotFound { .. },
        ));
    }
}
