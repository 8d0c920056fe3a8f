// SPDX-License-Identifier: Apache-2.0

mod base;
mod bond;
mod linux_bridge;
mod vlan;

pub use base::{DhcpOverrides, Interface, InterfaceType, Subnet, SubnetType};
pub use linux_bridge::BridgeOptions;
