use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::mem;
use parking_lot::Mutex;

use crate::{
    any::TypedValue,
    errors::InstantiateErrorKind,
    post_construct::BoxedHook,
    provider::BoxedProvider,
    service::Service as _,
    Registry,
};

pub(crate) enum Entry {
    Provided(BoxedProvider),
    /// The provider is taken out of the entry and running
    Resolving,
    Resolved(TypedValue),
}

pub(crate) enum Lookup {
    Missing,
    /// Provided or resolving
    Pending,
    Resolved(TypedValue),
}

/// Entries and post-construct hooks of a registry.
/// An absent key is unregistered.
#[derive(Default)]
pub(crate) struct State {
    entries: BTreeMap<String, Entry>,
    hooks: BTreeMap<String, Vec<BoxedHook>>,
}

impl State {
    /// Registers the entry if the key is unregistered.
    /// Returns `false` if the key was already provided or resolved.
    pub(crate) fn insert_if_vacant(&mut self, key: String, entry: Entry) -> bool {
        use alloc::collections::btree_map::Entry::{Occupied, Vacant};

        match self.entries.entry(key) {
            Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
            Occupied(_) => false,
        }
    }

    #[must_use]
    pub(crate) fn lookup(&self, key: &str) -> Lookup {
        match self.entries.get(key) {
            None => Lookup::Missing,
            Some(Entry::Provided(_) | Entry::Resolving) => Lookup::Pending,
            Some(Entry::Resolved(value)) => Lookup::Resolved(value.clone()),
        }
    }

    #[must_use]
    pub(crate) fn is_resolved(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(Entry::Resolved(_)))
    }

    #[must_use]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn add_hook(&mut self, key: String, hook: BoxedHook) {
        self.hooks.entry(key).or_default().push(hook);
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn hooks_count(&self, key: &str) -> usize {
        self.hooks.get(key).map_or(0, Vec::len)
    }

    /// Takes the provider out of a provided entry, leaving the entry resolving
    #[must_use]
    fn take_provider(&mut self, key: &str) -> Option<BoxedProvider> {
        let entry = self.entries.get_mut(key)?;
        match mem::replace(entry, Entry::Resolving) {
            Entry::Provided(provider) => Some(provider),
            other => {
                *entry = other;
                None
            }
        }
    }

    /// Puts the provider back if its entry is still resolving
    fn restore_provider(&mut self, key: &str, provider: BoxedProvider) {
        if let Some(entry) = self.entries.get_mut(key) {
            if matches!(entry, Entry::Resolving) {
                *entry = Entry::Provided(provider);
            }
        }
    }

    /// Moves the key to resolved state and takes its hooks in registration order
    #[must_use]
    pub(crate) fn resolve(&mut self, key: &str, value: TypedValue) -> Vec<BoxedHook> {
        if let Some(entry) = self.entries.get_mut(key) {
            *entry = Entry::Resolved(value);
        }
        self.hooks.remove(key).unwrap_or_default()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

/// Provider taken out of its entry for the time it runs.
///
/// Dropping it puts the provider back unless the key got resolved,
/// so a provider that failed or panicked runs again on the next get, with the state it mutated.
pub(crate) struct ClaimedProvider<'a> {
    state: &'a Mutex<State>,
    key: &'a str,
    provider: Option<BoxedProvider>,
}

impl<'a> ClaimedProvider<'a> {
    /// Returns `None` if the key isn't provided
    #[must_use]
    pub(crate) fn claim(state: &'a Mutex<State>, key: &'a str) -> Option<Self> {
        let provider = state.lock().take_provider(key)?;
        Some(Self {
            state,
            key,
            provider: Some(provider),
        })
    }

    pub(crate) fn call(&mut self, registry: Registry) -> Result<TypedValue, InstantiateErrorKind> {
        match &mut self.provider {
            Some(provider) => provider.call(registry),
            None => unreachable!("Provider is taken only on drop"),
        }
    }
}

impl Drop for ClaimedProvider<'_> {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            self.state.lock().restore_provider(self.key, provider);
        }
    }
}
