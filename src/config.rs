use alloc::{format, string::String};

/// Config of registration scripts lookup
/// ## Fields
/// - `scripts_dir`:
///   Relative directory with registration scripts.
/// - `script_name`:
///   Name of the scripts to look up.
///   Default scripts are looked up by `{scripts_dir}/{script_name}`,
///   scripts of an environment by `{scripts_dir}/{environment}/{script_name}`.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub scripts_dir: &'static str,
    pub script_name: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scripts_dir: "deps",
            script_name: "default",
        }
    }
}

impl Config {
    #[inline]
    #[must_use]
    pub fn default_path(&self) -> String {
        format!("{}/{}", self.scripts_dir, self.script_name)
    }

    #[inline]
    #[must_use]
    pub fn environment_path(&self, environment: &str) -> String {
        format!("{}/{environment}/{}", self.scripts_dir, self.script_name)
    }
}
