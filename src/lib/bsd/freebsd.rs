// SPDX-License-Identifier: Apache-2.0

use super::{
    is_default_v4, is_default_v6, BsdIpv4Config, BsdNetConfig, BsdPlatform,
    BsdRenderContext,
};
use crate::{
    command::{EXIT_SUCCESS_ONLY, EXIT_SUCCESS_OR_ONE},
    CommandRunner, NetRenderError,
};

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
/// FreeBSD and DragonFly BSD `rc.conf` backend.
pub struct FreeBsdPlatform;

impl FreeBsdPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl BsdPlatform for FreeBsdPlatform {
    fn name(&self) -> &'static str {
        "freebsd"
    }

    fn rename_interface(
        &self,
        ctx: &mut BsdRenderContext,
        cur_name: &str,
        new_name: &str,
    ) -> Result<(), NetRenderError> {
        ctx.set_rc_config_value(&format!("ifconfig_{cur_name}_name"), new_name)
    }

    fn set_route(
        &self,
        ctx: &mut BsdRenderContext,
        network: &str,
        netmask: &str,
        gateway: &str,
    ) -> Result<(), NetRenderError> {
        if is_default_v4(network, netmask) {
            return ctx.set_rc_config_value("defaultrouter", gateway);
        }
        if is_default_v6(network, netmask) {
            return ctx.set_rc_config_value("ipv6_defaultrouter", gateway);
        }
        let route_name = format!(
            "net{}",
            ctx.static_routes.len() + ctx.ipv6_static_routes.len()
        );
        if network.contains(':') {
            ctx.set_rc_config_value(
                &format!("ipv6_route_{route_name}"),
                &format!("-net {network}/{netmask} {gateway}"),
            )?;
            ctx.ipv6_static_routes.push(route_name);
            let names = ctx.ipv6_static_routes.join(" ");
            ctx.set_rc_config_value("ipv6_static_routes", &names)
        } else {
            ctx.set_rc_config_value(
                &format!("route_{route_name}"),
                &format!("-net {network} -netmask {netmask} {gateway}"),
            )?;
            ctx.static_routes.push(route_name);
            let names = ctx.static_routes.join(" ");
            ctx.set_rc_config_value("static_routes", &names)
        }
    }

    fn write_config(
        &self,
        ctx: &mut BsdRenderContext,
        net_conf: &BsdNetConfig,
    ) -> Result<(), NetRenderError> {
        for (iface_name, ip_conf) in net_conf.ipv4.iter() {
            let value = match ip_conf {
                BsdIpv4Config::Dhcp => "DHCP".to_string(),
                BsdIpv4Config::Static {
                    address,
                    netmask,
                    mtu,
                } => {
                    let mut value = format!("{address} netmask {netmask}");
                    if let Some(mtu) = mtu {
                        value.push_str(&format!(" mtu {mtu}"));
                    }
                    value
                }
            };
            ctx.set_rc_config_value(&format!("ifconfig_{iface_name}"), &value)?;
        }
        for (iface_name, ip_conf) in net_conf.ipv6.iter() {
            let mut value =
                format!("inet6 {}/{}", ip_conf.address, ip_conf.prefix);
            if let Some(mtu) = ip_conf.mtu {
                value.push_str(&format!(" mtu {mtu}"));
            }
            ctx.set_rc_config_value(
                &format!("ifconfig_{iface_name}_ipv6"),
                &value,
            )?;
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
            log::debug!("freebsd generate postcmd disabled");
            return Ok(());
        }
        runner.run(&["service", "netif", "restart"], EXIT_SUCCESS_ONLY)?;
        // Routing restart might fail on removing loopback route while
        // default route is still set up as expected.
        runner.run(&["service", "routing", "restart"], EXIT_SUCCESS_OR_ONE)?;
        for iface_name in net_conf.dhcp_interfaces() {
            runner.run(
                &["service", "dhclient", "restart", iface_name],
                EXIT_SUCCESS_OR_ONE,
            )?;
        }
        Ok(())
    }
}
