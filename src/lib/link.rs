// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::{command::EXIT_SUCCESS_ONLY, CommandRunner, NetRenderError};

// FreeBSD uses `ether`, OpenBSD uses `lladdr`, NetBSD uses `address:`.
const MAC_KEYWORDS: [&str; 3] = ["ether", "lladdr", "address:"];

/// Source of interfaces currently present in running system.
pub trait LinkLister {
    /// Map of lower case MAC address to current kernel interface name.
    fn ifname_by_mac(&self) -> Result<HashMap<String, String>, NetRenderError>;
}

/// [LinkLister] parsing `ifconfig -a` output of BSD systems.
pub struct IfconfigLinkLister<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> IfconfigLinkLister<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl LinkLister for IfconfigLinkLister<'_> {
    fn ifname_by_mac(&self) -> Result<HashMap<String, String>, NetRenderError> {
        let output = self.runner.run(&["ifconfig", "-a"], EXIT_SUCCESS_ONLY)?;
        Ok(parse_ifconfig_output(&output))
    }
}

pub(crate) fn normalize_mac(mac: &str) -> String {
    mac.trim().to_lowercase()
}

pub(crate) fn parse_ifconfig_output(output: &str) -> HashMap<String, String> {
    let mut ret = HashMap::new();
    let mut cur_iface: Option<&str> = None;
    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            cur_iface = line.split_once(':').map(|(name, _)| name);
            continue;
        }
        let iface_name = match cur_iface {
            Some(n) => n,
            None => continue,
        };
        let mut tokens = line.split_whitespace();
        if let (Some(keyword), Some(mac)) = (tokens.next(), tokens.next()) {
            if MAC_KEYWORDS.contains(&keyword) {
                let mac = normalize_mac(mac);
                if ret.contains_key(&mac) {
                    log::debug!(
                        "Duplicate MAC address {mac} found on {iface_name}, \
                        keeping the first one"
                    );
                } else {
                    ret.insert(mac, iface_name.to_string());
                }
            }
        }
    }
    ret
}
