// SPDX-License-Identifier: Apache-2.0

use super::{
    is_default_v4, is_default_v6, BsdIpv4Config, BsdNetConfig, BsdPlatform,
    BsdRenderContext,
};
use crate::{
    command::{EXIT_SUCCESS_ONLY, EXIT_SUCCESS_OR_ONE},
    CommandRunner, NetRenderError, SystemProbe,
};

const MYGATE_PATH: &str = "etc/mygate";
// OpenBSD 7.0 replaced dhclient with dhcpleased.
const DHCPLEASECTL_MIN_RELEASE: u32 = 7;
const DHCPLEASECTL_TIMEOUT: &str = "30";

#[derive(Debug, Clone)]
#[non_exhaustive]
/// OpenBSD backend writing `etc/hostname.<iface>` and `etc/mygate`.
pub struct OpenBsdPlatform {
    has_dhcpleasectl: bool,
}

impl Default for OpenBsdPlatform {
    fn default() -> Self {
        Self {
            has_dhcpleasectl: true,
        }
    }
}

impl OpenBsdPlatform {
    pub fn new(probe: &SystemProbe) -> Self {
        let has_dhcpleasectl = match probe.release_major() {
            Some(major) => major >= DHCPLEASECTL_MIN_RELEASE,
            None => {
                log::warn!(
                    "Failed to detect OpenBSD release from {:?}, \
                    assuming dhcpleasectl exists",
                    probe.release
                );
                true
            }
        };
        Self { has_dhcpleasectl }
    }
}

impl BsdPlatform for OpenBsdPlatform {
    fn name(&self) -> &'static str {
        "openbsd"
    }

    fn set_route(
        &self,
        ctx: &mut BsdRenderContext,
        network: &str,
        netmask: &str,
        gateway: &str,
    ) -> Result<(), NetRenderError> {
        if is_default_v4(network, netmask) {
            ctx.default_gateway = Some(gateway.to_string());
        } else if is_default_v6(network, netmask) {
            ctx.ipv6_default_gateway = Some(gateway.to_string());
        } else {
            log::debug!(
                "Ignoring route {network}/{netmask} via {gateway}, only \
                default gateway is supported on openbsd"
            );
        }
        Ok(())
    }

    fn write_config(
        &self,
        ctx: &mut BsdRenderContext,
        net_conf: &BsdNetConfig,
    ) -> Result<(), NetRenderError> {
        let mut iface_names: Vec<&str> =
            net_conf.ipv4.iter().map(|(n, _)| n.as_str()).collect();
        for (iface_name, _) in net_conf.ipv6.iter() {
            if !iface_names.contains(&iface_name.as_str()) {
                iface_names.push(iface_name.as_str());
            }
        }
        for iface_name in iface_names {
            let mut content = match net_conf.ipv4_config(iface_name) {
                Some(BsdIpv4Config::Dhcp) => "dhcp\n".to_string(),
                Some(BsdIpv4Config::Static {
                    address,
                    netmask,
                    mtu,
                }) => {
                    let mut line = format!("inet {address} {netmask}");
                    if let Some(mtu) = mtu {
                        line.push_str(&format!(" mtu {mtu}"));
                    }
                    line + "\n"
                }
                None => String::new(),
            };
            if let Some(ipv6_conf) = net_conf.ipv6_config(iface_name) {
                content.push_str(&format!(
                    "inet6 {} {}\n",
                    ipv6_conf.address, ipv6_conf.prefix
                ));
            }
            ctx.append_file(&format!("etc/hostname.{iface_name}"), &content);
        }
        let mygate: String = [
            ctx.default_gateway.as_deref(),
            ctx.ipv6_default_gateway.as_deref(),
        ]
        .iter()
        .flatten()
        .map(|gw| format!("{gw}\n"))
        .collect();
        if !mygate.is_empty() {
            ctx.append_file(MYGATE_PATH, &mygate);
        }
        Ok(())
    }

    fn start_services(
        &self,
        net_conf: &BsdNetConfig,
        runner: &dyn CommandRunner,
        run: bool,
    ) -> Result<(), NetRenderError> {
        if !run {
            log::debug!("openbsd generate postcmd disabled");
            return Ok(());
        }
        if self.has_dhcpleasectl {
            runner.run(&["sh", "/etc/netstart"], EXIT_SUCCESS_ONLY)?;
            for iface_name in net_conf.dhcp_interfaces() {
                runner.run(
                    &["dhcpleasectl", "-w", DHCPLEASECTL_TIMEOUT, iface_name],
                    EXIT_SUCCESS_ONLY,
                )?;
            }
        } else {
            runner.run(&["pkill", "dhclient"], EXIT_SUCCESS_OR_ONE)?;
            runner.run(&["route", "del", "default"], EXIT_SUCCESS_OR_ONE)?;
            runner.run(&["route", "flush", "default"], EXIT_SUCCESS_OR_ONE)?;
            runner.run(&["sh", "/etc/netstart"], EXIT_SUCCESS_ONLY)?;
        }
        Ok(())
    }
}
