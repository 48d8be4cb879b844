use alloc::{boxed::Box, collections::BTreeMap, string::String, vec::Vec};
use tracing::{debug, error, info_span};

use crate::{
    errors::{InstantiateErrorKind, LoadErrorKind},
    Config, Registry,
};

/// Source of registration scripts run against a registry on its construction
pub trait ScriptLoader {
    /// Lists scripts found by the relative path, in order of their execution
    fn list_files(&self, relative_path: &str) -> Vec<String>;

    /// Runs the script listed by the relative path to completion, it registers its entries in the passed registry
    ///
    /// # Errors
    /// Returns an error if the script can't be run or fails
    fn execute(&self, relative_path: &str, file: &str, registry: &Registry) -> Result<(), InstantiateErrorKind>;
}

/// Registration script, usually a closure calling [`Registry::provide`], [`Registry::publish`] and [`Registry::post_construct`]
pub trait Script: 'static {
    /// # Errors
    /// Returns an error if a registration fails
    fn run(&self, registry: &Registry) -> Result<(), InstantiateErrorKind>;
}

impl<F> Script for F
where
    F: Fn(&Registry) -> Result<(), InstantiateErrorKind> + 'static,
{
    #[inline]
    fn run(&self, registry: &Registry) -> Result<(), InstantiateErrorKind> {
        self(registry)
    }
}

/// Loader of scripts kept in memory.
/// Several scripts can be found by the same relative path, for example when they come from different modules.
/// Scripts are looked up by both the relative path and the file, so the same file name can be used under different paths.
///
/// ```rust
/// use lazyreg::{MemoryLoader, Registry};
///
/// let loader = MemoryLoader::new()
///     .script("deps/test/default", "app/deps/test/default", |registry: &Registry| {
///         registry.publish("app.db.url", "sqlite::memory:");
///         Ok(())
///     })
///     .script("deps/default", "app/deps/default", |registry: &Registry| {
///         registry.publish("app.db.url", "postgres://localhost");
///         Ok(())
///     });
///
/// let registry = Registry::load(&loader, Some("test"))?;
/// assert_eq!(*registry.get::<&str>("app.db.url")?, "sqlite::memory:");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Default)]
pub struct MemoryLoader {
    scripts: BTreeMap<String, Vec<(String, Box<dyn Script>)>>,
}

impl MemoryLoader {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a script found by the relative path under the file name.
    /// Scripts of the same relative path are executed in order of their addition.
    #[must_use]
    pub fn script(mut self, relative_path: impl Into<String>, file: impl Into<String>, script: impl Script) -> Self {
        self.scripts
            .entry(relative_path.into())
            .or_default()
            .push((file.into(), Box::new(script)));
        self
    }
}

impl ScriptLoader for MemoryLoader {
    fn list_files(&self, relative_path: &str) -> Vec<String> {
        self.scripts
            .get(relative_path)
            .map(|scripts| scripts.iter().map(|(file, _)| file.clone()).collect())
            .unwrap_or_default()
    }

    fn execute(&self, relative_path: &str, file: &str, registry: &Registry) -> Result<(), InstantiateErrorKind> {
        let script = self
            .scripts
            .get(relative_path)
            .and_then(|scripts| scripts.iter().find(|(name, _)| name == file));
        match script {
            Some((_, script)) => script.run(registry),
            None => Err(anyhow::anyhow!("Script {file} not found in {relative_path}").into()),
        }
    }
}

impl Registry {
    /// Creates a registry and runs registration scripts of the loader against it.
    /// Scripts of the environment (if any) run first, then the default ones,
    /// so entries of the environment take priority over default entries of the same keys.
    ///
    /// # Errors
    /// Returns [`LoadErrorKind::Script`] on the first failed script, later scripts aren't run
    #[inline]
    pub fn load<L: ScriptLoader + ?Sized>(loader: &L, environment: Option<&str>) -> Result<Self, LoadErrorKind> {
        Self::load_with_config(loader, environment, Config::default())
    }

    /// Same as [`Self::load`], with scripts looked up by the config
    ///
    /// # Errors
    /// Returns [`LoadErrorKind::Script`] on the first failed script, later scripts aren't run
    pub fn load_with_config<L: ScriptLoader + ?Sized>(
        loader: &L,
        environment: Option<&str>,
        config: Config,
    ) -> Result<Self, LoadErrorKind> {
        let span = info_span!("load", ?environment);
        let _guard = span.enter();

        let registry = Self::new();
        if let Some(environment) = environment {
            registry.run_scripts(loader, &config.environment_path(environment))?;
        }
        registry.run_scripts(loader, &config.default_path())?;

        debug!("Loaded");
        Ok(registry)
    }

    fn run_scripts<L: ScriptLoader + ?Sized>(&self, loader: &L, relative_path: &str) -> Result<(), LoadErrorKind> {
        let files = loader.list_files(relative_path);
        debug!(relative_path, count = files.len(), "Scripts found");

        for file in files {
            if let Err(source) = loader.execute(relative_path, &file, self) {
                let err = LoadErrorKind::Script { file, source };
                error!("{}", err);
                return Err(err);
            }
            debug!(file = file.as_str(), "Script executed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{MemoryLoader, ScriptLoader};
    use crate::{Config, InstantiateErrorKind, LoadErrorKind, Registry};

    use alloc::{
        format,
        string::{String, ToString as _},
        vec,
        vec::Vec,
    };
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    /// Records looked up paths and executed files
    struct RecordingLoader {
        inner: MemoryLoader,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptLoader for RecordingLoader {
        fn list_files(&self, relative_path: &str) -> Vec<String> {
            self.calls.lock().push(format!("list {relative_path}"));
            self.inner.list_files(relative_path)
        }

        fn execute(&self, relative_path: &str, file: &str, registry: &Registry) -> Result<(), InstantiateErrorKind> {
            self.calls.lock().push(format!("execute {file}"));
            self.inner.execute(relative_path, file, registry)
        }
    }

    fn key_script(entries: &'static [(&'static str, &'static str)]) -> impl Fn(&Registry) -> Result<(), InstantiateErrorKind> {
        move |registry: &Registry| {
            for (key, value) in entries {
                registry.publish(*key, *value);
            }
            Ok(())
        }
    }

    fn loader() -> MemoryLoader {
        MemoryLoader::new()
            .script("deps/env/default", "env-dep1", key_script(&[("key1", "key1-env1")]))
            .script("deps/env/default", "env-dep2", key_script(&[("key2", "key2-env2")]))
            .script("deps/default", "dep1", key_script(&[("key1", "key1-dep1"), ("key2", "key2-dep1")]))
            .script("deps/default", "dep2", key_script(&[("key3", "key3-dep2")]))
    }

    #[test]
    #[traced_test]
    fn test_load() {
        let loader = RecordingLoader {
            inner: loader(),
            calls: Mutex::new(Vec::new()),
        };
        let registry = Registry::load(&loader, None).unwrap();

        assert_eq!(*registry.get::<&str>("key1").unwrap(), "key1-dep1");
        assert_eq!(*registry.get::<&str>("key2").unwrap(), "key2-dep1");
        assert_eq!(*registry.get::<&str>("key3").unwrap(), "key3-dep2");
        assert_eq!(*loader.calls.lock(), ["list deps/default", "execute dep1", "execute dep2"]);
    }

    #[test]
    #[traced_test]
    fn test_environment_load() {
        let loader = RecordingLoader {
            inner: loader(),
            calls: Mutex::new(Vec::new()),
        };
        let registry = Registry::load(&loader, Some("env")).unwrap();

        assert_eq!(*registry.get::<&str>("key1").unwrap(), "key1-env1");
        assert_eq!(*registry.get::<&str>("key2").unwrap(), "key2-env2");
        assert_eq!(*registry.get::<&str>("key3").unwrap(), "key3-dep2");
        assert_eq!(
            *loader.calls.lock(),
            vec![
                "list deps/env/default",
                "execute env-dep1",
                "execute env-dep2",
                "list deps/default",
                "execute dep1",
                "execute dep2",
            ]
        );
    }

    #[test]
    #[traced_test]
    fn test_load_with_config() {
        let loader = MemoryLoader::new().script("registry/main", "main", key_script(&[("key", "main")]));

        let registry = Registry::load_with_config(
            &loader,
            Some("missing"),
            Config {
                scripts_dir: "registry",
                script_name: "main",
            },
        )
        .unwrap();

        assert_eq!(*registry.get::<&str>("key").unwrap(), "main");
    }

    #[test]
    #[traced_test]
    fn test_load_same_file_names() {
        let loader = MemoryLoader::new()
            .script("deps/env/default", "default", key_script(&[("key", "env")]))
            .script("deps/default", "default", key_script(&[("key", "default"), ("other", "default")]));

        let registry = Registry::load(&loader, Some("env")).unwrap();
        assert_eq!(*registry.get::<&str>("key").unwrap(), "env");
        assert_eq!(*registry.get::<&str>("other").unwrap(), "default");

        let registry = Registry::load(&loader, None).unwrap();
        assert_eq!(*registry.get::<&str>("key").unwrap(), "default");
    }

    #[test]
    #[traced_test]
    fn test_load_script_error() {
        let loader = MemoryLoader::new()
            .script("deps/default", "bad", |registry: &Registry| {
                let _ = registry.get::<u8>("missing")?;
                Ok(())
            })
            .script("deps/default", "never", |_: &Registry| -> Result<(), InstantiateErrorKind> {
                panic!("scripts after a failed one shouldn't run")
            });

        let err = Registry::load(&loader, None).unwrap_err();
        assert!(matches!(
            &err,
            LoadErrorKind::Script {
                file,
                source: InstantiateErrorKind::Resolve(_),
            } if file == "bad",
        ));
        assert_eq!(err.to_string(), "Registration script bad failed: Dependency 'missing' not found");
    }

    #[test]
    fn test_execute_unknown_file() {
        let loader = MemoryLoader::new().script("deps/default", "dep", key_script(&[]));

        assert!(loader.list_files("deps/env/default").is_empty());
        assert!(loader.execute("deps/env/default", "dep", &Registry::new()).is_err());
        assert!(loader.execute("deps/default", "unknown", &Registry::new()).is_err());
        assert!(loader.execute("deps/default", "dep", &Registry::new()).is_ok());
    }
}
