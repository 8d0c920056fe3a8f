// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::ip::{ipv4_netmask_to_prefix, is_ipv6_addr};

const IPV4_DEFAULT_NETWORK: &str = "0.0.0.0";
const IPV6_DEFAULT_NETWORK: &str = "::";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(deny_unknown_fields)]
/// Static route. Example yaml:
/// ```yaml
/// routes:
/// - network: 192.0.2.0
///   netmask: 255.255.255.0
///   gateway: 10.0.0.254
///   metric: 100
/// ```
pub struct RouteEntry {
    #[serde(default)]
    /// Destination network address without prefix length.
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// IPv4 netmask of the destination.
    pub netmask: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::deserializer::option_u8_or_string"
    )]
    /// Prefix length of the destination, used when `netmask` is not set.
    pub prefix: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::deserializer::option_u32_or_string"
    )]
    pub metric: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Interface the route belongs to. Only consumed by renderers storing
    /// routes per interface.
    pub interface: Option<String>,
}

impl RouteEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_default_v4(gateway: &str) -> Self {
        Self {
            network: IPV4_DEFAULT_NETWORK.to_string(),
            netmask: Some(IPV4_DEFAULT_NETWORK.to_string()),
            gateway: Some(gateway.to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn new_default_v6(gateway: &str) -> Self {
        Self {
            network: IPV6_DEFAULT_NETWORK.to_string(),
            prefix: Some(0),
            gateway: Some(gateway.to_string()),
            ..Default::default()
        }
    }

    pub fn is_ipv6(&self) -> bool {
        is_ipv6_addr(self.network.as_str())
    }

    /// The netmask if defined, otherwise the prefix length as string.
    pub fn netmask_or_prefix(&self) -> Option<String> {
        match self.netmask.as_deref() {
            Some(m) if !m.is_empty() => Some(m.to_string()),
            _ => self.prefix.map(|p| p.to_string()),
        }
    }

    /// Prefix length of destination converted from netmask when required.
    pub fn prefix_length(&self) -> Option<u8> {
        if let Some(prefix) = self.prefix {
            return Some(prefix);
        }
        match self.netmask.as_deref() {
            Some(m) if !m.is_empty() => match ipv4_netmask_to_prefix(m) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!(
                        "Ignoring invalid netmask of route {self:?}: {e}"
                    );
                    None
                }
            },
            _ => None,
        }
    }

    /// Whether this route is `0.0.0.0/0` or `::/0`.
    pub fn is_default(&self) -> bool {
        let zero_network = self.network == IPV4_DEFAULT_NETWORK
            || self.network == IPV6_DEFAULT_NETWORK;
        zero_network && self.prefix_length().unwrap_or(0) == 0
    }
}
