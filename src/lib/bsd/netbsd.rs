// SPDX-License-Identifier: Apache-2.0

use super::{
    is_default_v4, BsdIpv4Config, BsdNetConfig, BsdPlatform, BsdRenderContext,
};
use crate::{command::EXIT_SUCCESS_ONLY, CommandRunner, NetRenderError};

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
/// NetBSD `rc.conf` backend using `dhcpcd` for DHCP.
pub struct NetBsdPlatform;

impl NetBsdPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl BsdPlatform for NetBsdPlatform {
    fn name(&self) -> &'static str {
        "netbsd"
    }

    fn set_route(
        &self,
        ctx: &mut BsdRenderContext,
        network: &str,
        netmask: &str,
        gateway: &str,
    ) -> Result<(), NetRenderError> {
        if is_default_v4(network, netmask) {
            ctx.set_rc_config_value("defaultroute", gateway)
        } else {
            log::debug!(
                "Ignoring route {network}/{netmask} via {gateway}, only \
                IPv4 default gateway is supported on netbsd"
            );
            Ok(())
        }
    }

    fn write_config(
        &self,
        ctx: &mut BsdRenderContext,
        net_conf: &BsdNetConfig,
    ) -> Result<(), NetRenderError> {
        let dhcp_ifaces = net_conf.dhcp_interfaces();
        if !dhcp_ifaces.is_empty() {
            ctx.set_rc_config_value("dhcpcd", "YES")?;
            ctx.set_rc_config_value("dhcpcd_flags", &dhcp_ifaces.join(" "))?;
        }
        for (iface_name, ip_conf) in net_conf.ipv4.iter() {
            if let BsdIpv4Config::Static {
                address,
                netmask,
                mtu,
            } = ip_conf
            {
                let mut value = format!("{address} netmask {netmask}");
                if let Some(mtu) = mtu {
                    value.push_str(&format!(" mtu {mtu}"));
                }
                ctx.set_rc_config_value(
                    &format!("ifconfig_{iface_name}"),
                    &value,
                )?;
            }
        }
        for (iface_name, _) in net_conf.ipv6.iter() {
            log::info!(
                "Static IPv6 address of {iface_name} is not supported \
                on netbsd, ignoring"
            );
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
            log::debug!("netbsd generate postcmd disabled");
            return Ok(());
        }
        runner.run(&["service", "network", "restart"], EXIT_SUCCESS_ONLY)?;
        if !net_conf.dhcp_interfaces().is_empty() {
            runner.run(&["service", "dhcpcd", "restart"], EXIT_SUCCESS_ONLY)?;
        }
        Ok(())
    }
}
