// SPDX-License-Identifier: Apache-2.0

//! Compile a renderer-agnostic [NetworkState] into the native network
//! configuration of the running OS.
//!
//! ```no_run
//! use netrender::{select_renderer, NetworkState, RendererConfig, SystemProbe};
//!
//! let net_state = NetworkState::new_from_yaml(
//!     r#"---
//! interfaces:
//! - name: eth0
//!   subnets:
//!   - type: dhcp
//! "#,
//! )?;
//! let probe = SystemProbe::retrieve()?;
//! let renderer =
//!     select_renderer(None, &probe, None, &RendererConfig::default())?;
//! renderer.render_network_state(&net_state, None, None)?;
//! # Ok::<(), netrender::NetRenderError>(())
//! ```

mod bsd;
mod command;
mod deserializer;
mod dns;
mod error;
mod file;
mod gentoo;
mod ifaces;
mod ip;
mod link;
mod net_state;
mod rc_conf;
mod renderer;
mod resolv_conf;
mod route;
mod udev;


pub use crate::bsd::{
    BsdIpv4Config, BsdIpv6Config, BsdNetConfig, BsdPlatform, BsdRenderContext,
    BsdRenderer, FreeBsdPlatform, NetBsdPlatform, OpenBsdPlatform,
};
pub use crate::command::{CommandRunner, SystemCommandRunner};
pub use crate::dns::DnsConfig;
pub use crate::error::{ErrorKind, NetRenderError};
pub use crate::gentoo::GentooRenderer;
pub use crate::ifaces::{
    BridgeOptions, DhcpOverrides, Interface, InterfaceType, Subnet, SubnetType,
};
pub use crate::ip::ipv4_netmask_to_prefix;
pub use crate::link::{IfconfigLinkLister, LinkLister};
pub use crate::net_state::NetworkState;
pub use crate::rc_conf::RcConf;
pub use crate::renderer::{
    gen_persistent_net_rules, renderer_registry, search_renderers,
    select_renderer, Renderer, RendererConfig, RendererEntry, SystemProbe,
    Templates, DEFAULT_PRIORITY,
};
pub use crate::resolv_conf::ResolvConf;
pub use crate::route::RouteEntry;
pub use crate::udev::{
    compose_udev_attr_equality, compose_udev_equality, compose_udev_setting,
    generate_udev_rule, UdevAssignKey, UdevAttr, UdevMatchKey,
};
