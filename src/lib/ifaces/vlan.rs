// SPDX-License-Identifier: Apache-2.0

use crate::{Interface, InterfaceType};

impl Interface {
    pub fn is_vlan(&self) -> bool {
        self.iface_type == InterfaceType::Vlan
    }

    /// The parent interface and VLAN ID, `None` if either is missing.
    pub fn vlan_parent(&self) -> Option<(&str, u16)> {
        if !self.is_vlan() {
            return None;
        }
        match (self.vlan_link.as_deref(), self.vlan_id) {
            (Some(link), Some(id)) if !link.is_empty() => Some((link, id)),
            _ => {
                log::warn!(
                    "VLAN interface {} has no vlan_link or vlan_id",
                    self.name
                );
                None
            }
        }
    }
}
