// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{
    dns::append_unique, DnsConfig, Interface, NetRenderError, RouteEntry,
};

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[non_exhaustive]
#[serde(deny_unknown_fields)]
/// The [NetworkState] is the renderer-agnostic description of desired
/// network configuration. Renderers only read it.
///
/// Example yaml:
///
/// ```yaml
/// dns:
///   nameservers:
///   - 8.8.8.8
///   search:
///   - example.org
/// routes:
/// - network: 192.0.2.0
///   netmask: 255.255.255.0
///   gateway: 10.0.0.254
/// interfaces:
/// - name: eth0
///   type: physical
///   mac_address: "52:54:00:12:34:00"
///   subnets:
///   - type: static
///     address: 10.0.0.5
///     netmask: 255.255.255.0
///     gateway: 10.0.0.1
/// ```
pub struct NetworkState {
    #[serde(default, skip_serializing_if = "DnsConfig::is_empty")]
    /// Global DNS resolver configuration.
    pub dns: DnsConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Routes not bound to any subnet.
    pub routes: Vec<RouteEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Network interfaces in definition order.
    pub interfaces: Vec<Interface>,
}

impl NetworkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrapping function of [serde_yaml::from_str()] with error mapped to
    /// [NetRenderError].
    pub fn new_from_yaml(net_state_yaml: &str) -> Result<Self, NetRenderError> {
        Ok(serde_yaml::from_str(net_state_yaml)?)
    }

    /// Wrapping function of [serde_json::from_str()] with error mapped to
    /// [NetRenderError].
    pub fn new_from_json(net_state_json: &str) -> Result<Self, NetRenderError> {
        Ok(serde_json::from_str(net_state_json)?)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.iter()
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    pub fn get_iface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn dns_nameservers(&self) -> &[String] {
        self.dns.nameservers.as_slice()
    }

    pub fn dns_searchdomains(&self) -> &[String] {
        self.dns.search.as_slice()
    }

    /// Global name servers followed by the ones of every subnet,
    /// duplicates removed.
    pub fn all_nameservers(&self) -> Vec<String> {
        let mut ret = Vec::new();
        append_unique(&mut ret, self.dns_nameservers());
        for iface in self.interfaces() {
            for subnet in iface.subnets.iter() {
                append_unique(&mut ret, subnet.dns_nameservers.as_slice());
            }
        }
        ret
    }

    /// Global search domains followed by the ones of every subnet,
    /// duplicates removed.
    pub fn all_searchdomains(&self) -> Vec<String> {
        let mut ret = Vec::new();
        append_unique(&mut ret, self.dns_searchdomains());
        for iface in self.interfaces() {
            for subnet in iface.subnets.iter() {
                append_unique(&mut ret, subnet.dns_search.as_slice());
            }
        }
        ret
    }
}
