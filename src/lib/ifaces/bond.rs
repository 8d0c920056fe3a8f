// SPDX-License-Identifier: Apache-2.0

use crate::{Interface, InterfaceType};

const BOND_PARAM_PREFIX: &str = "bond-";
const BOND_MASTER_PARAM: &str = "bond-master";

/// Bond options understood by the kernel bonding driver, without the
/// `bond-` prefix.
pub(crate) const SUPPORTED_BOND_OPTIONS: [&str; 16] = [
    "mode",
    "xmit-hash-policy",
    "miimon",
    "min-links",
    "arp-interval",
    "arp-ip-target",
    "arp-validate",
    "ad-select",
    "num-grat-arp",
    "downdelay",
    "updelay",
    "lacp-rate",
    "fail-over-mac",
    "primary",
    "primary-reselect",
    "all-slaves-active",
];

impl Interface {
    pub fn is_bond(&self) -> bool {
        self.iface_type == InterfaceType::Bond
    }

    /// The bond this interface is attached to, taken from the
    /// `bond-master` parameter.
    pub fn bond_master(&self) -> Option<String> {
        self.param_as_string(BOND_MASTER_PARAM)
            .filter(|m| !m.is_empty())
    }

    /// Supported bond options in definition order as
    /// `(option name without prefix, value)`.
    pub(crate) fn bond_options(&self) -> Vec<(&str, String)> {
        let mut ret = Vec::new();
        for (key, value) in self.params.iter() {
            let opt_name = match key.strip_prefix(BOND_PARAM_PREFIX) {
                Some(n) => n,
                None => continue,
            };
            if opt_name == "master" {
                continue;
            }
            if !SUPPORTED_BOND_OPTIONS.contains(&opt_name) {
                log::debug!(
                    "Ignoring unsupported bond option {key} of {}",
                    self.name
                );
                continue;
            }
            if let Some(value) = super::base::json_value_to_string(value)
            {
                ret.push((opt_name, value));
            }
        }
        ret
    }
}
