// SPDX-License-Identifier: Apache-2.0

//! Rendering pipeline shared by BSD family operating systems.
//!
//! The pipeline is:
//!  1. Resolve interface names against MAC addresses of running system,
//!     renaming interfaces when platform supports it.
//!  2. Classify subnets into per-interface IPv4/IPv6 configuration.
//!  3. Synthesize routes and hand them to [BsdPlatform::set_route].
//!  4. Merge DNS into `etc/resolv.conf`.
//!
//! Then [BsdPlatform::write_config] and [BsdPlatform::start_services] are
//! invoked. Every intermediate structure lives in a single render call.

mod freebsd;
mod netbsd;
mod openbsd;

use std::path::{Path, PathBuf};

use crate::{
    file::{target_path, write_file, DEFAULT_FILE_MODE},
    ip::ipv4_prefix_to_netmask,
    link::normalize_mac,
    resolv_conf::load_resolv_conf,
    CommandRunner, ErrorKind, IfconfigLinkLister, Interface, LinkLister,
    NetRenderError, NetworkState, RcConf, Renderer, RendererConfig,
    RouteEntry, Subnet, SubnetType, SystemCommandRunner,
    Templates,
};

pub use self::freebsd::FreeBsdPlatform;
pub use self::netbsd::NetBsdPlatform;
pub use self::openbsd::OpenBsdPlatform;

pub(crate) const RC_CONF_PATH: &str = "etc/rc.conf";
pub(crate) const RESOLV_CONF_PATH: &str = "etc/resolv.conf";

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BsdIpv4Config {
    Dhcp,
    Static {
        address: String,
        netmask: String,
        mtu: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct BsdIpv6Config {
    pub address: String,
    pub prefix: u8,
    pub mtu: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
/// Per-interface configuration in interface definition order. A later
/// subnet of the same interface replaces the earlier one.
pub struct BsdNetConfig {
    pub ipv4: Vec<(String, BsdIpv4Config)>,
    pub ipv6: Vec<(String, BsdIpv6Config)>,
}

fn insert_or_replace<T>(list: &mut Vec<(String, T)>, name: &str, value: T) {
    if let Some((_, v)) = list.iter_mut().find(|(n, _)| n == name) {
        *v = value;
    } else {
        list.push((name.to_string(), value));
    }
}

impl BsdNetConfig {
    pub fn ipv4_config(&self, iface_name: &str) -> Option<&BsdIpv4Config> {
        self.ipv4
            .iter()
            .find(|(n, _)| n == iface_name)
            .map(|(_, c)| c)
    }

    pub fn ipv6_config(&self, iface_name: &str) -> Option<&BsdIpv6Config> {
        self.ipv6
            .iter()
            .find(|(n, _)| n == iface_name)
            .map(|(_, c)| c)
    }

    pub fn dhcp_interfaces(&self) -> Vec<&str> {
        self.ipv4
            .iter()
            .filter(|(_, c)| c == &BsdIpv4Config::Dhcp)
            .map(|(n, _)| n.as_str())
            .collect()
    }
}

/// Files pending to be written by a single render call.
pub struct BsdRenderContext {
    target: Option<PathBuf>,
    rc_conf: Option<RcConf>,
    files: Vec<(String, String)>,
    pub(crate) static_routes: Vec<String>,
    pub(crate) ipv6_static_routes: Vec<String>,
    // Latest default gateway of each address family
    pub(crate) default_gateway: Option<String>,
    pub(crate) ipv6_default_gateway: Option<String>,
}

impl BsdRenderContext {
    pub(crate) fn new(target: Option<&Path>) -> Self {
        Self {
            target: target.map(|t| t.to_path_buf()),
            rc_conf: None,
            files: Vec::new(),
            static_routes: Vec::new(),
            ipv6_static_routes: Vec::new(),
            default_gateway: None,
            ipv6_default_gateway: None,
        }
    }

    pub fn target_path(&self, rel_path: &str) -> PathBuf {
        target_path(self.target.as_deref(), rel_path)
    }

    /// The `etc/rc.conf` loaded on first use.
    pub fn rc_conf_mut(&mut self) -> Result<&mut RcConf, NetRenderError> {
        if self.rc_conf.is_none() {
            self.rc_conf =
                Some(RcConf::load(&self.target_path(RC_CONF_PATH))?);
        }
        match self.rc_conf.as_mut() {
            Some(c) => Ok(c),
            None => Err(NetRenderError::new(
                ErrorKind::Bug,
                "rc.conf not loaded".to_string(),
            )),
        }
    }

    pub fn set_rc_config_value(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), NetRenderError> {
        log::debug!("Setting rc.conf {key}={value}");
        self.rc_conf_mut()?.set(key, value);
        Ok(())
    }

    /// Append content to a file pending to write, relative to target root.
    pub fn append_file(&mut self, rel_path: &str, content: &str) {
        if let Some((_, c)) = self.files.iter_mut().find(|(p, _)| p == rel_path)
        {
            c.push_str(content);
        } else {
            self.files.push((rel_path.to_string(), content.to_string()));
        }
    }

    fn commit(&self) -> Result<(), NetRenderError> {
        if let Some(rc_conf) = self.rc_conf.as_ref() {
            rc_conf.save(&self.target_path(RC_CONF_PATH))?;
        }
        for (rel_path, content) in self.files.iter() {
            write_file(
                &self.target_path(rel_path),
                content.as_str(),
                DEFAULT_FILE_MODE,
            )?;
        }
        Ok(())
    }
}

/// Hooks implemented by each BSD operating system.
pub trait BsdPlatform {
    fn name(&self) -> &'static str;

    /// Rename interface from `cur_name` to `new_name` on next network
    /// start.
    fn rename_interface(
        &self,
        _ctx: &mut BsdRenderContext,
        cur_name: &str,
        new_name: &str,
    ) -> Result<(), NetRenderError> {
        Err(NetRenderError::new(
            ErrorKind::UnsupportedCapability,
            format!(
                "Renaming interface {cur_name} to {new_name} is not \
                supported on {}",
                self.name()
            ),
        ))
    }

    /// Store route. The `netmask` could be prefix length for IPv6.
    fn set_route(
        &self,
        ctx: &mut BsdRenderContext,
        network: &str,
        netmask: &str,
        gateway: &str,
    ) -> Result<(), NetRenderError>;

    fn write_config(
        &self,
        ctx: &mut BsdRenderContext,
        net_conf: &BsdNetConfig,
    ) -> Result<(), NetRenderError>;

    /// Run OS commands activating the configuration, do nothing if `run`
    /// is false.
    fn start_services(
        &self,
        net_conf: &BsdNetConfig,
        runner: &dyn CommandRunner,
        run: bool,
    ) -> Result<(), NetRenderError>;
}

pub(crate) fn is_default_v4(network: &str, netmask: &str) -> bool {
    network == "0.0.0.0" && matches!(netmask, "" | "0" | "0.0.0.0")
}

pub(crate) fn is_default_v6(network: &str, prefix: &str) -> bool {
    network == "::" && matches!(prefix, "" | "0")
}

pub struct BsdRenderer {
    platform: Box<dyn BsdPlatform>,
    config: RendererConfig,
    runner: Box<dyn CommandRunner>,
    link_lister: Option<Box<dyn LinkLister>>,
}

impl BsdRenderer {
    pub fn new(platform: Box<dyn BsdPlatform>, config: RendererConfig) -> Self {
        Self {
            platform,
            config,
            runner: Box::new(SystemCommandRunner::new()),
            link_lister: None,
        }
    }

    pub fn set_command_runner(&mut self, runner: Box<dyn CommandRunner>) {
        self.runner = runner;
    }

    /// Override the default `ifconfig -a` based link lister.
    pub fn set_link_lister(&mut self, link_lister: Box<dyn LinkLister>) {
        self.link_lister = Some(link_lister);
    }

    fn ifname_by_mac(&self) -> std::collections::HashMap<String, String> {
        let result = match self.link_lister.as_ref() {
            Some(lister) => lister.ifname_by_mac(),
            None => {
                IfconfigLinkLister::new(self.runner.as_ref()).ifname_by_mac()
            }
        };
        match result {
            Ok(m) => m
                .into_iter()
                .map(|(mac, name)| (normalize_mac(&mac), name))
                .collect(),
            Err(e) => {
                log::warn!(
                    "Failed to list interfaces of current system, \
                    interface renaming disabled: {e}"
                );
                Default::default()
            }
        }
    }

    // Phase 1
    fn resolve_iface_names<'a>(
        &self,
        ctx: &mut BsdRenderContext,
        net_state: &'a NetworkState,
    ) -> Result<Vec<(String, &'a Interface)>, NetRenderError> {
        let ifname_by_mac = self.ifname_by_mac();
        let mut ret = Vec::new();
        for iface in net_state.interfaces() {
            if iface.is_loopback() {
                continue;
            }
            let cur_name = match iface.mac_address().map(normalize_mac) {
                Some(mac) => match lookup_live_name(&ifname_by_mac, &mac) {
                    Ok(n) => Some(n),
                    Err(e) => {
                        log::info!("{e}");
                        None
                    }
                },
                None => None,
            };
            let device_name = match cur_name {
                Some(cur_name) if !iface.has_name() => cur_name.to_string(),
                Some(cur_name) if cur_name != iface.name() => {
                    log::info!(
                        "netif service will rename interface {cur_name} to {}",
                        iface.name()
                    );
                    match self.platform.rename_interface(
                        ctx,
                        cur_name,
                        iface.name(),
                    ) {
                        Ok(()) => iface.name().to_string(),
                        Err(e)
                            if e.kind() == ErrorKind::UnsupportedCapability =>
                        {
                            log::error!(
                                "Interface renaming is not supported on \
                                this OS, using {cur_name}: {e}"
                            );
                            cur_name.to_string()
                        }
                        Err(e) => return Err(e),
                    }
                }
                _ => iface.name().to_string(),
            };
            if device_name.is_empty() {
                log::warn!(
                    "Ignoring interface without name and with unknown \
                    MAC address: {:?}",
                    iface.mac_address()
                );
                continue;
            }
            ret.push((device_name, iface));
        }
        Ok(ret)
    }

    // Phase 2
    fn gen_net_config(&self, ifaces: &[(String, &Interface)]) -> BsdNetConfig {
        let mut net_conf = BsdNetConfig::default();
        for (device_name, iface) in ifaces {
            log::info!("Configuring interface {device_name}");
            for subnet in iface.subnets.iter() {
                if let Err(e) =
                    classify_subnet(&mut net_conf, device_name, iface, subnet)
                {
                    log::debug!("{e}");
                }
            }
        }
        net_conf
    }

    // Phase 3
    fn apply_routes(
        &self,
        ctx: &mut BsdRenderContext,
        net_state: &NetworkState,
    ) -> Result<(), NetRenderError> {
        for route in gen_route_entries(net_state) {
            if route.network.is_empty() {
                log::debug!("Skipping a bad route entry {route:?}");
                continue;
            }
            warn_on_recoverable(
                self.platform.set_route(
                    ctx,
                    route.network.as_str(),
                    route.netmask_or_prefix().unwrap_or_default().as_str(),
                    route.gateway.as_deref().unwrap_or_default(),
                ),
                "store route",
            )?;
        }
        Ok(())
    }

    // Phase 4
    fn apply_resolv_conf(
        &self,
        ctx: &BsdRenderContext,
        net_state: &NetworkState,
    ) {
        let path = ctx.target_path(RESOLV_CONF_PATH);
        let mut resolv_conf = load_resolv_conf(&path);
        resolv_conf.merge_dns(
            net_state.all_nameservers().as_slice(),
            net_state.all_searchdomains().as_slice(),
        );
        if let Err(e) =
            write_file(&path, &resolv_conf.to_string(), DEFAULT_FILE_MODE)
        {
            log::warn!("Failed to write {}: {e}", path.display());
        }
    }
}

impl Renderer for BsdRenderer {
    fn name(&self) -> &'static str {
        self.platform.name()
    }

    fn render_network_state(
        &self,
        net_state: &NetworkState,
        templates: Option<&Templates>,
        target: Option<&Path>,
    ) -> Result<(), NetRenderError> {
        if templates.is_some() {
            log::debug!("Templates are not used by {} renderer", self.name());
        }
        let mut ctx = BsdRenderContext::new(target);
        let ifaces = self.resolve_iface_names(&mut ctx, net_state)?;
        let net_conf = self.gen_net_config(ifaces.as_slice());
        self.apply_routes(&mut ctx, net_state)?;
        self.apply_resolv_conf(&ctx, net_state);

        warn_on_recoverable(
            self.platform.write_config(&mut ctx, &net_conf),
            "generate network configuration",
        )?;
        warn_on_recoverable(ctx.commit(), "write network configuration")?;

        self.platform.start_services(
            &net_conf,
            self.runner.as_ref(),
            self.config.postcmds,
        )
    }
}

fn warn_on_recoverable(
    result: Result<(), NetRenderError>,
    action: &str,
) -> Result<(), NetRenderError> {
    match result {
        Err(e) if e.kind().is_recoverable() => {
            log::warn!("Failed to {action}: {e}");
            Ok(())
        }
        r => r,
    }
}

fn lookup_live_name<'a>(
    ifname_by_mac: &'a std::collections::HashMap<String, String>,
    mac: &str,
) -> Result<&'a str, NetRenderError> {
    ifname_by_mac.get(mac).map(|n| n.as_str()).ok_or_else(|| {
        NetRenderError::new(
            ErrorKind::DeviceResolution,
            format!("Cannot find any device with MAC {mac}"),
        )
    })
}

fn classify_subnet(
    net_conf: &mut BsdNetConfig,
    device_name: &str,
    iface: &Interface,
    subnet: &Subnet,
) -> Result<(), NetRenderError> {
    let mtu = subnet.mtu.or(iface.mtu);
    match subnet.subnet_type {
        SubnetType::Static => {
            let netmask = match subnet.netmask.as_deref() {
                Some(m) if !m.is_empty() => m.to_string(),
                _ => match subnet.prefix_length() {
                    Some(prefix) => ipv4_prefix_to_netmask(prefix)?,
                    None => {
                        return Err(NetRenderError::new(
                            ErrorKind::MissingNetmaskOrPrefix,
                            format!(
                                "Skipping IP {}, because there is no netmask \
                                or prefix",
                                subnet.address.as_deref().unwrap_or_default()
                            ),
                        ));
                    }
                },
            };
            let address = subnet.ip().unwrap_or_default();
            log::debug!(
                "Configuring dev {device_name} with {address} / {netmask}"
            );
            insert_or_replace(
                &mut net_conf.ipv4,
                device_name,
                BsdIpv4Config::Static {
                    address: address.to_string(),
                    netmask,
                    mtu,
                },
            );
        }
        SubnetType::Static6 => {
            let prefix = match subnet.prefix.or_else(|| {
                subnet
                    .address
                    .as_deref()
                    .and_then(|a| crate::ip::split_ip_prefix(a).ok())
                    .and_then(|(_, p)| p)
            }) {
                Some(p) => p,
                None => {
                    return Err(NetRenderError::new(
                        ErrorKind::MissingNetmaskOrPrefix,
                        format!(
                            "Skipping IP {}, because there is no prefix",
                            subnet.address.as_deref().unwrap_or_default()
                        ),
                    ));
                }
            };
            let address = subnet.ip().unwrap_or_default();
            log::debug!(
                "Configuring dev {device_name} with {address} / {prefix}"
            );
            insert_or_replace(
                &mut net_conf.ipv6,
                device_name,
                BsdIpv6Config {
                    address: address.to_string(),
                    prefix,
                    mtu,
                },
            );
        }
        SubnetType::Dhcp | SubnetType::Dhcp4 => {
            insert_or_replace(
                &mut net_conf.ipv4,
                device_name,
                BsdIpv4Config::Dhcp,
            );
        }
        _ => {
            log::debug!(
                "Subnet type {:?} of {device_name} is not supported, ignoring",
                subnet.subnet_type
            );
        }
    }
    Ok(())
}

/// Global routes, then for each subnet the default route synthesized from
/// its gateway followed by the routes of that subnet.
pub(crate) fn gen_route_entries(net_state: &NetworkState) -> Vec<RouteEntry> {
    let mut routes: Vec<RouteEntry> = net_state.routes().cloned().collect();
    for iface in net_state.interfaces() {
        if iface.is_loopback() {
            continue;
        }
        for subnet in iface.subnets.iter() {
            routes.extend(subnet.default_route());
            routes.extend(subnet.routes.iter().cloned());
        }
    }
    routes
}
