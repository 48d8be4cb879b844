use alloc::boxed::Box;

use super::ResolveErrorKind;

/// Error returned by providers, post-construct hooks and registration scripts
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    /// A nested [`crate::Registry::get`] failed.
    /// The registry passes it through as is, so the caller of the outermost `get` sees the original failure.
    #[error(transparent)]
    Resolve(Box<ResolveErrorKind>),
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    #[inline]
    fn from(err: ResolveErrorKind) -> Self {
        Self::Resolve(Box::new(err))
    }
}
