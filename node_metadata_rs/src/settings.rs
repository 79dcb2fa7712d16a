use config::{Config, ConfigError, Environment, File};

use crate::metadata::LabelScheme;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub label_scheme: LabelScheme,
}

impl Settings {
    /// Load the settings from the config files in order first then the environment.
    ///
    /// Environment overrides use the `NODE_METADATA_` prefix, e.g.
    /// `NODE_METADATA_LABEL_SCHEME=plain`.
    pub fn with_env_and_config_files(filenames: &[String]) -> Result<Self, ConfigError> {
        let mut s = Config::builder()
            .set_default("debug", false)?
            .set_default("label_scheme", "eksctl")?;

        // Merge the configs from the files
        for filename in filenames {
            s = s.add_source(File::with_name(filename));
        }

        // Merge the environment overrides
        s.add_source(Environment::with_prefix("node_metadata"))
            .build()?
            .try_deserialize()
    }
}
