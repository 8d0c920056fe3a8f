// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(deny_unknown_fields)]
/// Global DNS resolver configuration. Example partial yaml of
/// [crate::NetworkState]:
/// ```yaml
/// ---
/// dns:
///   nameservers:
///   - 2001:db8:1::250
///   - 192.0.2.250
///   search:
///   - example.org
///   - example.net
/// ```
pub struct DnsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Name server IP address list.
    pub nameservers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Search list for host-name lookup.
    pub search: Vec<String>,
}

impl DnsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nameservers.is_empty() && self.search.is_empty()
    }
}

// Order preserving merge which skips duplicate entries.
pub(crate) fn append_unique(dst: &mut Vec<String>, src: &[String]) {
    for item in src {
        if !dst.contains(item) {
            dst.push(item.clone());
        }
    }
}
