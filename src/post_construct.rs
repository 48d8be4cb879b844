use alloc::{boxed::Box, sync::Arc};
use core::any::type_name;

use crate::{any::TypedValue, errors::InstantiateErrorKind, Registry, ResolveErrorKind};

/// Callback run once right after the provider of a key produced its value,
/// before the value is returned to any caller, including the one that triggered the resolution.
pub trait PostConstruct<Dep>: 'static {
    fn post_construct(&mut self, dependency: Arc<Dep>, registry: &Registry) -> Result<(), InstantiateErrorKind>;
}

impl<F, Dep> PostConstruct<Dep> for F
where
    F: FnMut(Arc<Dep>, &Registry) -> Result<(), InstantiateErrorKind> + 'static,
{
    #[inline]
    fn post_construct(&mut self, dependency: Arc<Dep>, registry: &Registry) -> Result<(), InstantiateErrorKind> {
        self(dependency, registry)
    }
}

/// Hook with the dependency type erased, called with the key it was added for
pub(crate) type BoxedHook = Box<dyn FnMut(&str, TypedValue, &Registry) -> Result<(), ResolveErrorKind> + Send + Sync>;

#[must_use]
pub(crate) fn boxed_hook_factory<Dep, Hook>(mut hook: Hook) -> BoxedHook
where
    Dep: Send + Sync + 'static,
    Hook: PostConstruct<Dep> + Send + Sync,
{
    Box::new(move |key: &str, value: TypedValue, registry: &Registry| {
        let dependency = value.downcast::<Dep>().map_err(|value| ResolveErrorKind::IncorrectType {
            key: key.into(),
            expected: type_name::<Dep>(),
            actual: value.type_info.name,
        })?;

        hook.post_construct(dependency, registry)
            .map_err(|err| ResolveErrorKind::from_post_construct(key, err))
    })
}
