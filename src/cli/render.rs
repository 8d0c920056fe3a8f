// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use netrender::{
    gen_persistent_net_rules, search_renderers, select_renderer,
    RendererConfig, SystemProbe,
};

use crate::{config::Config, error::CliError, state::state_from_file};

pub(crate) const ARG_STATE_FILE: &str = "STATE_FILE";
pub(crate) const ARG_ROOT: &str = "ROOT";
pub(crate) const ARG_RENDERER: &str = "RENDERER";
pub(crate) const ARG_NO_POSTCMDS: &str = "NO_POSTCMDS";
pub(crate) const ARG_CONFIG: &str = "CONFIG";

fn load_config(matches: &clap::ArgMatches) -> Result<Config, CliError> {
    Config::load(
        matches
            .value_of(ARG_CONFIG)
            .unwrap_or(Config::DEFAULT_CONFIG_PATH),
    )
}

// Renderer names from command line take precedence over configuration
fn priority_of(matches: &clap::ArgMatches, config: &Config) -> Vec<String> {
    if let Some(names) = matches.values_of(ARG_RENDERER) {
        names
            .flat_map(|n| n.split(','))
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect()
    } else {
        config.renderer.priority.clone().unwrap_or_default()
    }
}

fn as_priority(names: &[String]) -> Option<Vec<&str>> {
    if names.is_empty() {
        None
    } else {
        Some(names.iter().map(|n| n.as_str()).collect())
    }
}

pub(crate) fn render(matches: &clap::ArgMatches) -> Result<String, CliError> {
    let file_path = match matches.value_of(ARG_STATE_FILE) {
        Some(f) => f,
        None => return Err("Please define STATE_FILE".into()),
    };
    let net_state = state_from_file(file_path)?;
    let config = load_config(matches)?;
    let mut renderer_config: RendererConfig = config.renderer_config();
    if matches.is_present(ARG_NO_POSTCMDS) {
        renderer_config.postcmds = false;
    }
    let names = priority_of(matches, &config);
    let priority = as_priority(&names);
    let root = matches.value_of(ARG_ROOT).map(Path::new);

    let probe = SystemProbe::retrieve()?;
    log::debug!("Running on {} {}", probe.sysname, probe.release);
    let renderer =
        select_renderer(priority.as_deref(), &probe, root, &renderer_config)?;
    renderer.render_network_state(&net_state, None, root)?;
    Ok(format!("Network state rendered by {}", renderer.name()))
}

pub(crate) fn persistent_net(
    matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let file_path = match matches.value_of(ARG_STATE_FILE) {
        Some(f) => f,
        None => return Err("Please define STATE_FILE".into()),
    };
    let net_state = state_from_file(file_path)?;
    Ok(gen_persistent_net_rules(&net_state))
}

pub(crate) fn list(matches: &clap::ArgMatches) -> Result<String, CliError> {
    let config = load_config(matches)?;
    let names = priority_of(matches, &config);
    let priority = as_priority(&names);
    let root = matches.value_of(ARG_ROOT).map(Path::new);
    let probe = SystemProbe::retrieve()?;

    let found = search_renderers(priority.as_deref(), &probe, root)?;
    if found.is_empty() {
        Err(CliError {
            code: crate::error::DEFAULT_ERROR_CODE,
            error_msg: format!(
                "No available renderer found on {} {}",
                probe.sysname, probe.release
            ),
        })
    } else {
        Ok(found.join("\n"))
    }
}
