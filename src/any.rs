use alloc::sync::Arc;
use core::{
    any::{type_name, Any, TypeId},
    fmt::{self, Debug, Formatter},
};

/// Type-erased value stored for a resolved key
pub type Value = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TypeInfo {
    pub(crate) name: &'static str,
    pub(crate) id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub(crate) fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn short_name(&self) -> &'static str {
        let name = self.name.split_once('<').map_or(self.name, |(name, _)| name);
        name.rsplit_once("::").map_or(name, |(_, name)| name)
    }
}

/// A value together with the type it was produced as.
/// The type is kept to report readable mismatches, because `dyn Any` can only tell its [`TypeId`].
#[derive(Clone)]
pub(crate) struct TypedValue {
    pub(crate) type_info: TypeInfo,
    pub(crate) value: Value,
}

impl TypedValue {
    #[inline]
    #[must_use]
    pub(crate) fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_rc(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub(crate) fn from_rc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            value,
        }
    }

    /// Returns the value back if it isn't a `T`
    #[inline]
    pub(crate) fn downcast<T: Send + Sync + 'static>(self) -> Result<Arc<T>, Self> {
        let type_info = self.type_info;
        self.value.downcast::<T>().map_err(|value| Self { type_info, value })
    }
}

impl Debug for TypedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedValue").field(&self.type_info.name).finish()
    }
}
