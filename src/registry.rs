use alloc::{string::String, sync::Arc};
use core::{
    any::type_name,
    cell::RefCell,
    fmt::{self, Debug, Formatter},
};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, error, info_span};

use crate::{
    any::{TypedValue, Value},
    entry::{ClaimedProvider, Entry, Lookup, State},
    errors::{InstantiateErrorKind, ResolveErrorKind},
    post_construct::{boxed_hook_factory, PostConstruct},
    provider::{boxed_provider_factory, Provider},
    resolution::{Frame, ResolutionStack},
};

/// Lazy dependency registry with string keys.
///
/// Values are registered either as providers, which run on the first [`Self::get`] of their key,
/// or as already built values with [`Self::publish`].
/// The first registration of a key wins, later ones are ignored.
///
/// The registry is a handle, clones share the same entries.
#[derive(Clone, Default)]
pub struct Registry {
    pub(crate) inner: Arc<RegistryInner>,
}

#[derive(Default)]
pub(crate) struct RegistryInner {
    state: Mutex<State>,
    // Held by the thread resolving a provided key for the whole resolution chain.
    // Re-entrant, because providers and hooks get their dependencies through the same registry.
    resolution: ReentrantMutex<RefCell<ResolutionStack>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider of the key.
    /// The provider runs on the first [`Self::get`] of the key and its result is cached.
    ///
    /// Does nothing if the key is already provided or published.
    /// A closure that can't be a provider, for example one taking other arguments, is rejected at compile time.
    pub fn provide<Prov, Args>(&self, key: impl Into<String>, provider: Prov) -> &Self
    where
        Prov: Provider<Args, Error = InstantiateErrorKind> + Send + Sync,
        Prov::Provides: Send + Sync,
    {
        let key = key.into();

        let span = info_span!("provide", key = key.as_str(), dependency = type_name::<Prov::Provides>());
        let _guard = span.enter();

        if self
            .inner
            .state
            .lock()
            .insert_if_vacant(key, Entry::Provided(boxed_provider_factory(provider)))
        {
            debug!("Provided");
        } else {
            debug!("Already registered, skipped");
        }

        self
    }

    /// Registers an already built value of the key.
    ///
    /// Does nothing if the key is already provided or published.
    pub fn publish<Dep: Send + Sync + 'static>(&self, key: impl Into<String>, value: Dep) -> &Self {
        let key = key.into();

        let span = info_span!("publish", key = key.as_str(), dependency = type_name::<Dep>());
        let _guard = span.enter();

        if self
            .inner
            .state
            .lock()
            .insert_if_vacant(key, Entry::Resolved(TypedValue::new(value)))
        {
            debug!("Published");
        } else {
            debug!("Already registered, skipped");
        }

        self
    }

    /// Adds a hook called with the value of the key right after its provider produced it.
    /// Hooks of a key are called in order of their registration.
    ///
    /// # Warning
    /// Hooks added after the key was resolved are never called and aren't kept,
    /// they are a construction step and not an observer of the key.
    pub fn post_construct<Dep, Hook>(&self, key: impl Into<String>, hook: Hook)
    where
        Dep: Send + Sync + 'static,
        Hook: PostConstruct<Dep> + Send + Sync,
    {
        let key = key.into();

        let span = info_span!("post_construct", key = key.as_str(), dependency = type_name::<Dep>());
        let _guard = span.enter();

        let mut state = self.inner.state.lock();
        if state.is_resolved(&key) {
            debug!("Already resolved, hook won't be called");
            return;
        }
        state.add_hook(key, boxed_hook_factory(hook));
    }

    /// Gets a dependency of the key, running its provider if it isn't resolved yet.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotFound`] if the key isn't registered
    /// - Returns [`ResolveErrorKind::CircularDependency`] if the provider of the key requires the key itself
    /// - Returns [`ResolveErrorKind::IncorrectType`] if the value of the key isn't a `Dep`
    /// - Returns [`ResolveErrorKind::Provider`] and [`ResolveErrorKind::PostConstruct`] on failures of user code.
    ///   Failures of nested [`Self::get`] calls are returned unchanged.
    pub fn get<Dep: Send + Sync + 'static>(&self, key: &str) -> Result<Arc<Dep>, ResolveErrorKind> {
        self.get_typed(key)?.downcast::<Dep>().map_err(|value| {
            let err = ResolveErrorKind::IncorrectType {
                key: key.into(),
                expected: type_name::<Dep>(),
                actual: value.type_info.name,
            };
            error!("{}", err);
            err
        })
    }

    /// Type-erased version of [`Self::get`]
    ///
    /// # Errors
    /// Same as [`Self::get`], except [`ResolveErrorKind::IncorrectType`] of the key itself
    pub fn get_any(&self, key: &str) -> Result<Value, ResolveErrorKind> {
        self.get_typed(key).map(|value| value.value)
    }

    /// Returns `true` if the key is provided or published
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.state.lock().contains(key)
    }

    /// Returns `true` if the key is published or its provider already produced a value
    #[must_use]
    pub fn is_resolved(&self, key: &str) -> bool {
        self.inner.state.lock().is_resolved(key)
    }
}

impl Registry {
    fn get_typed(&self, key: &str) -> Result<TypedValue, ResolveErrorKind> {
        let span = info_span!("get", key);
        let _guard = span.enter();

        let lookup = self.inner.state.lock().lookup(key);
        match lookup {
            Lookup::Resolved(value) => {
                debug!("Found resolved");
                return Ok(value);
            }
            Lookup::Missing => return Err(not_found(key)),
            Lookup::Pending => {}
        }

        let resolution = self.inner.resolution.lock();

        let cycle_path = resolution.borrow().cycle_path(key);
        if let Some(path) = cycle_path {
            let err = ResolveErrorKind::CircularDependency { path };
            error!("{}", err);
            return Err(err);
        }

        // Another thread could resolve the key while this one was waiting for the resolution lock
        let Some(mut provider) = ClaimedProvider::claim(&self.inner.state, key) else {
            let lookup = self.inner.state.lock().lookup(key);
            return match lookup {
                Lookup::Resolved(value) => {
                    debug!("Resolved by another thread");
                    Ok(value)
                }
                // Keys aren't removed, and a resolving key is on the stack of this thread, checked above
                Lookup::Pending | Lookup::Missing => Err(not_found(key)),
            };
        };

        let _frame = Frame::push(&resolution, key);

        let value = match provider.call(self.clone()) {
            Ok(value) => value,
            Err(err) => {
                let err = ResolveErrorKind::from_provider(key, err);
                error!("{}", err);
                return Err(err);
            }
        };

        let hooks = self.inner.state.lock().resolve(key, value.clone());
        drop(provider);
        debug!("Resolved");

        for mut hook in hooks {
            if let Err(err) = hook(key, value.clone(), self) {
                error!("{}", err);
                return Err(err);
            }
            debug!("Post-construct hook called");
        }

        Ok(value)
    }
}

fn not_found(key: &str) -> ResolveErrorKind {
    let err = ResolveErrorKind::NotFound { key: key.into() };
    error!("{}", err);
    err
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        struct EntryState<'a>(&'a Entry);

        impl Debug for EntryState<'_> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                match self.0 {
                    Entry::Provided(_) => f.write_str("Provided"),
                    Entry::Resolving => f.write_str("Resolving"),
                    Entry::Resolved(value) => write!(f, "Resolved({})", value.type_info.short_name()),
                }
            }
        }

        let state = self.inner.state.lock();
        f.debug_map()
            .entries(state.entries().map(|(key, entry)| (key, EntryState(entry))))
            .finish()
    }
}
