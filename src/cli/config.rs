// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use netrender::RendererConfig;

use crate::error::CliError;

/// Content of `netrender.conf`, example:
///
/// ```toml
/// [renderer]
/// priority = ["freebsd", "openbsd"]
/// postcmds = false
/// netrules_path = ""
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) renderer: RendererSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RendererSection {
    #[serde(default)]
    pub(crate) priority: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) postcmds: Option<bool>,
    // Empty string disables the persistent naming rules
    #[serde(default)]
    pub(crate) netrules_path: Option<String>,
}

impl Config {
    pub(crate) const DEFAULT_CONFIG_PATH: &'static str =
        "/etc/netrender/netrender.conf";

    pub(crate) fn load(path: &str) -> Result<Self, CliError> {
        let path = std::path::Path::new(path);
        if !path.exists() {
            log::debug!("{} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        log::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        log::info!("Configuration loaded:\n{content}");
        Ok(config)
    }

    pub(crate) fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str::<Config>(content)?)
    }

    pub(crate) fn renderer_config(&self) -> RendererConfig {
        let mut ret = RendererConfig::default();
        if let Some(postcmds) = self.renderer.postcmds {
            ret.postcmds = postcmds;
        }
        if let Some(netrules_path) = self.renderer.netrules_path.as_ref() {
            ret.netrules_path = if netrules_path.is_empty() {
                None
            } else {
                Some(netrules_path.to_string())
            };
        }
        ret
    }
}
