/// Creates a [`crate::Registry`] from a list of registrations.
///
/// # Syntax
/// ```text
/// registry! {
///     provide(key, provider),
///     publish(key, value),
///     post_construct(key, hook),
/// }
/// ```
///
/// # Examples
/// ```rust
/// use lazyreg::{registry, Registry};
/// use std::sync::Arc;
///
/// struct Pool(Arc<String>);
///
/// let registry = registry! {
///     publish("app.db.url", String::from("postgres://localhost")),
///     provide("app.db.pool", |registry: &Registry| Ok(Pool(registry.get("app.db.url")?))),
///     post_construct("app.db.pool", |pool: Arc<Pool>, _: &Registry| {
///         assert_eq!(*pool.0, "postgres://localhost");
///         Ok(())
///     }),
/// };
///
/// let _ = registry.get::<Pool>("app.db.pool")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[macro_export]
macro_rules! registry {
    ( $( $method:ident ( $($args:tt)* ) ),* $(,)? ) => {{
        let registry = $crate::Registry::new();
        $(
            $crate::registry_internal! { @entry registry, $method ( $($args)* ) }
        )*
        registry
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! registry_internal {
    // === Provider ===
    // Example: registry_internal! { @entry registry, provide("key", || Ok(1)) }
    (@entry $registry:ident, provide ( $($args:tt)* )) => {
        $registry.provide($($args)*);
    };

    // === Published value ===
    // Example: registry_internal! { @entry registry, publish("key", 1) }
    (@entry $registry:ident, publish ( $($args:tt)* )) => {
        $registry.publish($($args)*);
    };

    // === Post-construct hook ===
    // Example: registry_internal! { @entry registry, post_construct("key", |_: Arc<i32>, _: &Registry| Ok(())) }
    (@entry $registry:ident, post_construct ( $($args:tt)* )) => {
        $registry.post_construct($($args)*);
    };
}

#[cfg(test)]
mod tests {
    use crate::Registry;

    use alloc::{string::String, sync::Arc};
    use core::sync::atomic::{AtomicU8, Ordering};

    #[test]
    fn test_registry_macro() {
        let hook_call_count = Arc::new(AtomicU8::new(0));

        let registry = registry! {
            provide("key1", || Ok(1u8)),
            provide("key1", || Ok(2u8)),
            publish("key2", String::from("val")),
            provide("key3", |registry: &Registry| Ok(*registry.get::<u8>("key1")? + 1)),
            post_construct("key3", {
                let hook_call_count = hook_call_count.clone();
                move |_: Arc<u8>, _: &Registry| {
                    hook_call_count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        };

        assert_eq!(*registry.get::<u8>("key1").unwrap(), 1);
        assert_eq!(*registry.get::<String>("key2").unwrap(), "val");
        assert_eq!(*registry.get::<u8>("key3").unwrap(), 2);
        assert_eq!(hook_call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registry_macro_empty() {
        let registry = registry! {};
        assert!(!registry.contains("key"));
    }
}
