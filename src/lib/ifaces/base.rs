// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{
    ip::{is_dotted_quad, is_ipv6_addr, split_ip_prefix},
    RouteEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum InterfaceType {
    Physical,
    Vlan,
    Bond,
    Bridge,
}

impl Default for InterfaceType {
    fn default() -> Self {
        Self::Physical
    }
}

impl std::fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Physical => "physical",
                Self::Vlan => "vlan",
                Self::Bond => "bond",
                Self::Bridge => "bridge",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SubnetType {
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "static6")]
    Static6,
    #[serde(rename = "dhcp")]
    Dhcp,
    #[serde(rename = "dhcp4")]
    Dhcp4,
    #[serde(rename = "dhcp6")]
    Dhcp6,
    #[serde(rename = "ipv6_slaac")]
    Ipv6Slaac,
    #[serde(rename = "ipv6_dhcpv6-stateful")]
    Ipv6Dhcpv6Stateful,
    #[serde(rename = "ipv6_dhcpv6-stateless")]
    Ipv6Dhcpv6Stateless,
    #[serde(rename = "manual")]
    Manual,
}

impl Default for SubnetType {
    fn default() -> Self {
        Self::Manual
    }
}

impl SubnetType {
    pub fn is_dhcp4(&self) -> bool {
        matches!(self, Self::Dhcp | Self::Dhcp4)
    }

    // SLAAC is handled by the same DHCPv6 capable client.
    pub fn is_dhcp6(&self) -> bool {
        matches!(
            self,
            Self::Dhcp6
                | Self::Ipv6Slaac
                | Self::Ipv6Dhcpv6Stateful
                | Self::Ipv6Dhcpv6Stateless
        )
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static | Self::Static6)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(deny_unknown_fields)]
/// Layer 3 configuration of an interface. Example yaml:
/// ```yaml
/// subnets:
/// - type: static
///   address: 192.0.2.5
///   netmask: 255.255.255.0
///   gateway: 192.0.2.1
///   dns_nameservers:
///   - 192.0.2.2
/// - type: dhcp6
/// ```
pub struct Subnet {
    #[serde(rename = "type", default)]
    pub subnet_type: SubnetType,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// IP address, optionally suffixed with `/<prefix length>`.
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::deserializer::option_u8_or_string"
    )]
    pub prefix: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::deserializer::option_u64_or_string"
    )]
    pub mtu: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_nameservers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_search: Vec<String>,
}

impl Subnet {
    pub fn new(subnet_type: SubnetType) -> Self {
        Self {
            subnet_type,
            ..Default::default()
        }
    }

    /// Address without the `/<prefix length>` suffix.
    pub fn ip(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(|a| a.split_once('/').map(|(ip, _)| ip).unwrap_or(a))
    }

    /// Default route via `gateway` of static subnet when the gateway is of
    /// the same address family.
    pub(crate) fn default_route(&self) -> Option<RouteEntry> {
        let gateway = self.gateway.as_deref().filter(|g| !g.is_empty())?;
        match self.subnet_type {
            SubnetType::Static if is_dotted_quad(gateway) => {
                Some(RouteEntry::new_default_v4(gateway))
            }
            SubnetType::Static6 if is_ipv6_addr(gateway) => {
                Some(RouteEntry::new_default_v6(gateway))
            }
            _ => None,
        }
    }

    /// Prefix length from `prefix`, `netmask` or the address suffix.
    pub fn prefix_length(&self) -> Option<u8> {
        if let Some(prefix) = self.prefix {
            return Some(prefix);
        }
        if let Some(netmask) = self.netmask.as_deref() {
            match crate::ip::ipv4_netmask_to_prefix(netmask) {
                Ok(p) => return Some(p),
                Err(e) => {
                    log::debug!("Ignoring invalid netmask {netmask}: {e}");
                }
            }
        }
        self.address
            .as_deref()
            .and_then(|a| split_ip_prefix(a).ok())
            .and_then(|(_, p)| p)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
/// Tweaks to what DHCP client accepts from server.
pub struct DhcpOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_dns: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_routes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ntp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_hostname: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_domains: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Network interface. Example yaml:
/// ```yaml
/// interfaces:
/// - name: eth0
///   type: physical
///   mac_address: "52:54:00:12:34:00"
///   mtu: 1500
///   subnets:
///   - type: dhcp
/// ```
pub struct Interface {
    #[serde(default)]
    /// Interface name. Empty means unknown, some renderers resolve it from
    /// `mac_address`.
    pub name: String,
    #[serde(rename = "type", default)]
    pub iface_type: InterfaceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::deserializer::option_u64_or_string"
    )]
    pub mtu: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Kernel driver, used by persistent naming rules.
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<Subnet>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::deserializer::option_u16_or_string"
    )]
    pub vlan_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Parent interface of VLAN.
    pub vlan_link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bond_interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bridge_interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    /// Type specific parameters like `bond-mode`, `bond-master` or
    /// `bridge_stp`.
    pub params: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp4_overrides: Option<DhcpOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp6_overrides: Option<DhcpOverrides>,
}

impl Interface {
    pub fn new(name: &str, iface_type: InterfaceType) -> Self {
        Self {
            name: name.to_string(),
            iface_type,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Whether name matches `lo`, `lo0`, `lo1` and etc.
    pub fn is_loopback(&self) -> bool {
        is_loopback_name(self.name.as_str())
    }

    pub fn mac_address(&self) -> Option<&str> {
        self.mac_address.as_deref().filter(|m| !m.is_empty())
    }

    pub(crate) fn param_as_string(&self, key: &str) -> Option<String> {
        self.params.get(key).and_then(json_value_to_string)
    }
}

pub(crate) fn is_loopback_name(name: &str) -> bool {
    name.strip_prefix("lo")
        .map(|suffix| suffix.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

// Render scalar or list parameter values the way shell variables expect.
pub(crate) fn json_value_to_string(
    value: &serde_json::Value,
) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.to_string()),
        serde_json::Value::Bool(b) => Some(if *b { "1" } else { "0" }.into()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(json_value_to_string)
                .collect::<Vec<String>>()
                .join(" "),
        ),
        serde_json::Value::Object(_) => None,
    }
}
