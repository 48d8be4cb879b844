use tracing::debug;

use crate::{
    any::TypedValue,
    errors::InstantiateErrorKind,
    service::{service_fn, BoxService},
    Registry,
};

/// Producer of a value for a key.
///
/// Implemented for closures without arguments and for closures taking the [`Registry`],
/// which they can use to get further dependencies:
/// ```rust
/// use lazyreg::Registry;
///
/// let registry = Registry::new();
/// registry
///     .provide("app.db.url", || Ok(String::from("postgres://localhost")))
///     .provide("app.db", |registry: &Registry| {
///         let url = registry.get::<String>("app.db.url")?;
///         Ok(format!("connection to {url}"))
///     });
///
/// assert_eq!(*registry.get::<String>("app.db")?, "connection to postgres://localhost");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// A failed provider is called again on the next get of its key, with the state it mutated so far.
pub trait Provider<Args>: 'static {
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    fn provide(&mut self, registry: &Registry) -> Result<Self::Provides, Self::Error>;
}

impl<F, Response, Err> Provider<()> for F
where
    F: FnMut() -> Result<Response, Err> + 'static,
    Response: 'static,
    Err: Into<InstantiateErrorKind>,
{
    type Provides = Response;
    type Error = Err;

    #[inline]
    fn provide(&mut self, _registry: &Registry) -> Result<Self::Provides, Self::Error> {
        self()
    }
}

impl<F, Response, Err> Provider<(Registry,)> for F
where
    F: FnMut(&Registry) -> Result<Response, Err> + 'static,
    Response: 'static,
    Err: Into<InstantiateErrorKind>,
{
    type Provides = Response;
    type Error = Err;

    #[inline]
    fn provide(&mut self, registry: &Registry) -> Result<Self::Provides, Self::Error> {
        self(registry)
    }
}

pub(crate) type BoxedProvider = BoxService<Registry, TypedValue, InstantiateErrorKind>;

#[must_use]
pub(crate) fn boxed_provider_factory<Prov, Args>(mut provider: Prov) -> BoxedProvider
where
    Prov: Provider<Args> + Send + Sync,
    Prov::Provides: Send + Sync,
{
    BoxService::new(service_fn({
        move |registry: Registry| {
            let dependency = match provider.provide(&registry) {
                Ok(dependency) => dependency,
                Err(err) => return Err(err.into()),
            };

            debug!("Provided");

            Ok::<_, InstantiateErrorKind>(TypedValue::new(dependency))
        }
    }))
}
