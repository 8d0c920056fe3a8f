// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    bsd::{BsdRenderer, FreeBsdPlatform, NetBsdPlatform, OpenBsdPlatform},
    gentoo::GentooRenderer,
    udev::generate_udev_rule,
    ErrorKind, InterfaceType, NetRenderError, NetworkState,
};

/// Template name to template content. None of current renderers
/// consumes templates, they are accepted for interface compatibility.
pub type Templates = HashMap<String, String>;

pub(crate) const DEFAULT_NETRULES_PATH: &str =
    "etc/udev/rules.d/70-persistent-net.rules";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct RendererConfig {
    /// Whether to run OS commands activating the new configuration.
    /// When false, only files are written.
    pub postcmds: bool,
    /// Path relative to target root for persistent interface naming udev
    /// rules. `None` disables it.
    pub netrules_path: Option<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            postcmds: true,
            netrules_path: Some(DEFAULT_NETRULES_PATH.to_string()),
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Translator of [NetworkState] into native configuration of an OS.
pub trait Renderer {
    fn name(&self) -> &'static str;

    /// Write configuration files under `target` (`/` when `None`) and
    /// optionally run OS commands to activate them.
    fn render_network_state(
        &self,
        net_state: &NetworkState,
        templates: Option<&Templates>,
        target: Option<&Path>,
    ) -> Result<(), NetRenderError>;

    /// udev rules pinning name of every physical interface holding both
    /// name and MAC address.
    fn render_persistent_net(&self, net_state: &NetworkState) -> String {
        gen_persistent_net_rules(net_state)
    }
}

pub fn gen_persistent_net_rules(net_state: &NetworkState) -> String {
    let mut content = String::new();
    for iface in net_state.interfaces() {
        if iface.iface_type != InterfaceType::Physical || iface.is_loopback() {
            continue;
        }
        if let (true, Some(mac)) = (iface.has_name(), iface.mac_address()) {
            content.push_str(
                generate_udev_rule(
                    iface.name(),
                    mac,
                    iface.driver.as_deref(),
                )
                .as_str(),
            );
        }
    }
    content
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
/// Identity of running OS used for choosing renderer.
pub struct SystemProbe {
    /// Kernel name, e.g. `FreeBSD`, `OpenBSD`, `Linux`.
    pub sysname: String,
    /// Kernel release, e.g. `7.4` or `14.0-RELEASE`.
    pub release: String,
}

impl SystemProbe {
    pub fn new(sysname: &str, release: &str) -> Self {
        Self {
            sysname: sysname.to_string(),
            release: release.to_string(),
        }
    }

    /// Probe current system via `uname(2)`.
    pub fn retrieve() -> Result<Self, NetRenderError> {
        let uts = nix::sys::utsname::uname().map_err(|e| {
            NetRenderError::new(
                ErrorKind::Bug,
                format!("Failed to invoke uname(): {e}"),
            )
        })?;
        Ok(Self {
            sysname: uts.sysname().to_string_lossy().to_string(),
            release: uts.release().to_string_lossy().to_string(),
        })
    }

    pub fn is_freebsd(&self) -> bool {
        self.sysname == "FreeBSD"
    }

    pub fn is_dragonflybsd(&self) -> bool {
        self.sysname == "DragonFly"
    }

    pub fn is_netbsd(&self) -> bool {
        self.sysname == "NetBSD"
    }

    pub fn is_openbsd(&self) -> bool {
        self.sysname == "OpenBSD"
    }

    /// Leading integer of release, e.g. `7` for `7.4`.
    pub fn release_major(&self) -> Option<u32> {
        self.release
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .and_then(|s| s.parse::<u32>().ok())
    }
}

/// Registry entry pairing availability probe with renderer constructor.
pub struct RendererEntry {
    pub name: &'static str,
    pub available: fn(&SystemProbe, Option<&Path>) -> bool,
    pub build: fn(&RendererConfig, &SystemProbe) -> Box<dyn Renderer>,
}

pub const DEFAULT_PRIORITY: [&str; 4] =
    ["gentoo", "freebsd", "netbsd", "openbsd"];

pub fn renderer_registry() -> Vec<RendererEntry> {
    vec![
        RendererEntry {
            name: "gentoo",
            available: GentooRenderer::available,
            build: |config, _| Box::new(GentooRenderer::new(config.clone())),
        },
        RendererEntry {
            name: "freebsd",
            available: |probe, _| {
                probe.is_freebsd() || probe.is_dragonflybsd()
            },
            build: |config, _| {
                Box::new(BsdRenderer::new(
                    Box::new(FreeBsdPlatform::new()),
                    config.clone(),
                ))
            },
        },
        RendererEntry {
            name: "netbsd",
            available: |probe, _| probe.is_netbsd(),
            build: |config, _| {
                Box::new(BsdRenderer::new(
                    Box::new(NetBsdPlatform::new()),
                    config.clone(),
                ))
            },
        },
        RendererEntry {
            name: "openbsd",
            available: |probe, _| probe.is_openbsd(),
            build: |config, probe| {
                Box::new(BsdRenderer::new(
                    Box::new(OpenBsdPlatform::new(probe)),
                    config.clone(),
                ))
            },
        },
    ]
}

fn entries_by_priority(
    priority: Option<&[&str]>,
) -> Result<Vec<RendererEntry>, NetRenderError> {
    let priority = priority.unwrap_or(&DEFAULT_PRIORITY);
    let mut registry = renderer_registry();
    let mut ret: Vec<RendererEntry> = Vec::new();
    for name in priority {
        if ret.iter().any(|e| e.name == *name) {
            log::debug!("Ignoring duplicate renderer {name} in priority");
            continue;
        }
        match registry.iter().position(|e| e.name == *name) {
            Some(index) => ret.push(registry.remove(index)),
            None => {
                return Err(NetRenderError::new(
                    ErrorKind::InvalidArgument,
                    format!(
                        "Unknown renderer {name}, supported: {}",
                        DEFAULT_PRIORITY.join(", ")
                    ),
                ));
            }
        }
    }
    Ok(ret)
}

/// Names of all available renderers in priority order.
pub fn search_renderers(
    priority: Option<&[&str]>,
    probe: &SystemProbe,
    target: Option<&Path>,
) -> Result<Vec<&'static str>, NetRenderError> {
    Ok(entries_by_priority(priority)?
        .into_iter()
        .filter(|e| (e.available)(probe, target))
        .map(|e| e.name)
        .collect())
}

/// Build the first available renderer in priority order.
pub fn select_renderer(
    priority: Option<&[&str]>,
    probe: &SystemProbe,
    target: Option<&Path>,
    config: &RendererConfig,
) -> Result<Box<dyn Renderer>, NetRenderError> {
    for entry in entries_by_priority(priority)? {
        if (entry.available)(probe, target) {
            log::info!("Selected renderer {}", entry.name);
            return Ok((entry.build)(config, probe));
        }
        log::debug!("Renderer {} is not available", entry.name);
    }
    Err(NetRenderError::new(
        ErrorKind::InvalidArgument,
        format!(
            "No available network renderers found in {}",
            priority.unwrap_or(&DEFAULT_PRIORITY).join(", ")
        ),
    ))
}
