// SPDX-License-Identifier: Apache-2.0

//! Renderer for Gentoo `netifrc` storing everything in shell variables of
//! `etc/conf.d/net`.

use std::path::Path;

use crate::{
    command::EXIT_SUCCESS_ONLY,
    file::{symlink_if_missing, target_path, write_file, DEFAULT_FILE_MODE},
    renderer::gen_persistent_net_rules,
    resolv_conf::load_resolv_conf,
    CommandRunner, DhcpOverrides, Interface, NetRenderError, NetworkState,
    Renderer, RendererConfig, RouteEntry, SubnetType, SystemCommandRunner,
    SystemProbe, Templates,
};

const CONF_NET_PATH: &str = "etc/conf.d/net";
const INIT_D_DIR: &str = "etc/init.d";
const NET_LO_SCRIPT: &str = "net.lo";
const RESOLV_CONF_PATH: &str = "etc/resolv.conf";
const CONF_NET_HEADER: &str =
    "# Generated by netrender, changes will be overwritten\n";
const NULL_CONFIG: &str = "null";

pub struct GentooRenderer {
    config: RendererConfig,
    runner: Box<dyn CommandRunner>,
}

impl GentooRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            runner: Box::new(SystemCommandRunner::new()),
        }
    }

    pub fn set_command_runner(&mut self, runner: Box<dyn CommandRunner>) {
        self.runner = runner;
    }

    /// Whether `netifrc` is installed, i.e. `etc/init.d/net.lo` exists.
    pub fn available(_probe: &SystemProbe, target: Option<&Path>) -> bool {
        let script =
            target_path(target, &format!("{INIT_D_DIR}/{NET_LO_SCRIPT}"));
        let ret = script.exists();
        if !ret {
            log::debug!("{} not found", script.display());
        }
        ret
    }

    fn write_resolv_conf(
        &self,
        net_state: &NetworkState,
        target: Option<&Path>,
    ) {
        if net_state.dns.is_empty() {
            return;
        }
        let path = target_path(target, RESOLV_CONF_PATH);
        let mut resolv_conf = load_resolv_conf(&path);
        resolv_conf.merge_dns(
            net_state.dns_nameservers(),
            net_state.dns_searchdomains(),
        );
        if let Err(e) =
            write_file(&path, &resolv_conf.to_string(), DEFAULT_FILE_MODE)
        {
            log::warn!("Failed to write {}: {e}", path.display());
        }
    }

    fn write_netrules(&self, net_state: &NetworkState, target: Option<&Path>) {
        let rel_path = match self.config.netrules_path.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return,
        };
        let rules = gen_persistent_net_rules(net_state);
        if rules.is_empty() {
            return;
        }
        let path = target_path(target, rel_path);
        if let Err(e) = write_file(&path, &rules, DEFAULT_FILE_MODE) {
            log::warn!("Failed to write {}: {e}", path.display());
        }
    }

    fn start_services(
        &self,
        net_state: &NetworkState,
        ports: &[String],
    ) -> Result<(), NetRenderError> {
        if !self.config.postcmds {
            log::debug!("gentoo generate postcmd disabled");
            return Ok(());
        }
        for iface in net_state.interfaces() {
            if !iface.has_name()
                || iface.is_loopback()
                || ports.iter().any(|p| p == iface.name())
            {
                continue;
            }
            let service = format!("net.{}", iface.name());
            self.runner.run(
                &["rc-service", service.as_str(), "restart"],
                EXIT_SUCCESS_ONLY,
            )?;
        }
        Ok(())
    }
}

impl Renderer for GentooRenderer {
    fn name(&self) -> &'static str {
        "gentoo"
    }

    fn render_network_state(
        &self,
        net_state: &NetworkState,
        templates: Option<&Templates>,
        target: Option<&Path>,
    ) -> Result<(), NetRenderError> {
        if templates.is_some() {
            log::debug!("Templates are not used by gentoo renderer");
        }
        let topology = PortTopology::new(net_state);
        let content = gen_conf_net(net_state, &topology);
        let path = target_path(target, CONF_NET_PATH);
        if let Err(e) = write_file(&path, &content, DEFAULT_FILE_MODE) {
            log::warn!("Failed to write {}: {e}", path.display());
        }

        for iface in net_state.interfaces() {
            if !iface.has_name() || iface.is_loopback() {
                continue;
            }
            let link = target_path(
                target,
                &format!("{INIT_D_DIR}/net.{}", iface.name()),
            );
            if let Err(e) = symlink_if_missing(NET_LO_SCRIPT, &link) {
                log::warn!("Failed to create {}: {e}", link.display());
            }
        }

        self.write_resolv_conf(net_state, target);
        self.write_netrules(net_state, target);
        self.start_services(net_state, topology.ports().as_slice())
    }
}

/// Shell variables can not hold `.` in the name.
pub(crate) fn sanitize_iface_name(iface_name: &str) -> String {
    iface_name.replace('.', "_")
}

// Inside double quotes, only these characters keep special meaning.
fn escape_double_quoted(value: &str) -> String {
    let mut ret = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            ret.push('\\');
        }
        ret.push(c);
    }
    ret
}

#[derive(Debug, Default)]
struct ConfNet {
    lines: Vec<String>,
}

impl ConfNet {
    fn set(&mut self, prefix: &str, iface_name: &str, value: &str) {
        self.lines.push(format!(
            "{prefix}_{}=\"{}\"",
            sanitize_iface_name(iface_name),
            escape_double_quoted(value)
        ));
    }

    fn set_int(&mut self, prefix: &str, iface_name: &str, value: u64) {
        self.lines.push(format!(
            "{prefix}_{}={value}",
            sanitize_iface_name(iface_name)
        ));
    }

    fn set_raw(&mut self, key: &str, value: &str) {
        self.lines
            .push(format!("{key}=\"{}\"", escape_double_quoted(value)));
    }

    fn into_string(self) -> String {
        let mut content = CONF_NET_HEADER.to_string();
        for line in self.lines {
            content.push_str(&line);
            content.push('\n');
        }
        content
    }
}

/// Bond and bridge ports of the whole state.
#[derive(Debug, Default)]
struct PortTopology {
    // (port, bond) in discovery order
    bond_ports: Vec<(String, String)>,
    bridge_ports: Vec<(String, String)>,
}

impl PortTopology {
    fn new(net_state: &NetworkState) -> Self {
        let mut ret = Self::default();
        for iface in net_state.interfaces() {
            if let Some(bond) = iface.bond_master() {
                ret.add_bond_port(iface.name(), bond.as_str());
            }
        }
        for iface in net_state.interfaces().filter(|i| i.is_bond()) {
            for port in iface.bond_interfaces.iter() {
                ret.add_bond_port(port, iface.name());
            }
        }
        for iface in net_state.interfaces().filter(|i| i.is_bridge()) {
            for port in iface.bridge_ports() {
                if !ret.bridge_ports.iter().any(|(p, _)| p == port) {
                    ret.bridge_ports
                        .push((port.to_string(), iface.name().to_string()));
                }
            }
        }
        ret
    }

    fn add_bond_port(&mut self, port: &str, bond: &str) {
        if !self.bond_ports.iter().any(|(p, _)| p == port) {
            self.bond_ports.push((port.to_string(), bond.to_string()));
        }
    }

    fn controller_of(&self, iface_name: &str) -> Option<&str> {
        self.bond_ports
            .iter()
            .chain(self.bridge_ports.iter())
            .find(|(p, _)| p == iface_name)
            .map(|(_, c)| c.as_str())
    }

    fn bond_ports_of(&self, bond: &str) -> Vec<&str> {
        self.bond_ports
            .iter()
            .filter(|(_, b)| b == bond)
            .map(|(p, _)| p.as_str())
            .collect()
    }

    fn ports(&self) -> Vec<String> {
        self.bond_ports
            .iter()
            .chain(self.bridge_ports.iter())
            .map(|(p, _)| p.clone())
            .collect()
    }
}

fn gen_conf_net(net_state: &NetworkState, topology: &PortTopology) -> String {
    let mut conf = ConfNet::default();
    // (link, [(vlan id, vlan interface)])
    let mut vlans: Vec<(&str, Vec<(u16, &str)>)> = Vec::new();

    for route in net_state.routes() {
        let known = route
            .interface
            .as_deref()
            .map(|n| net_state.get_iface(n).is_some())
            .unwrap_or(false);
        if !known {
            log::warn!(
                "Ignoring route {route:?} as it is not bound to any \
                defined interface"
            );
        }
    }

    for iface in net_state.interfaces() {
        if !iface.has_name() {
            log::warn!("Ignoring interface without name: {iface:?}");
            continue;
        }
        let iface_name = iface.name();
        if let Some(controller) = topology.controller_of(iface_name) {
            if !iface.subnets.is_empty() {
                log::warn!(
                    "Interface {iface_name} is port of {controller}, \
                    ignoring its IP configuration"
                );
            }
            conf.set("config", iface_name, NULL_CONFIG);
        } else {
            gen_ip_conf(&mut conf, iface);
            gen_routes_conf(&mut conf, iface, net_state);
            gen_dns_conf(&mut conf, iface);
        }

        if let Some(mtu) = iface.mtu {
            conf.set("mtu", iface_name, &mtu.to_string());
        }

        if iface.is_bond() {
            conf.set(
                "slaves",
                iface_name,
                &topology.bond_ports_of(iface_name).join(" "),
            );
            for (opt_name, value) in iface.bond_options() {
                conf.set(&opt_name.replace('-', "_"), iface_name, &value);
            }
        }

        if iface.is_bridge() {
            conf.set("bridge", iface_name, &iface.bridge_ports().join(" "));
            let opts = iface.bridge_options();
            if let Some(v) = opts.forward_delay {
                conf.set_int("bridge_forward_delay", iface_name, v);
            }
            if let Some(v) = opts.hello_time {
                conf.set_int("bridge_hello_time", iface_name, v);
            }
            if let Some(v) = opts.stp_state {
                conf.set_int("bridge_stp_state", iface_name, v);
            }
        }

        if let Some((link, vlan_id)) = iface.vlan_parent() {
            match vlans.iter_mut().find(|(l, _)| *l == link) {
                Some((_, ids)) => ids.push((vlan_id, iface_name)),
                None => vlans.push((link, vec![(vlan_id, iface_name)])),
            }
        }
    }

    for (link, entries) in vlans {
        let link_key = sanitize_iface_name(link);
        for (vlan_id, vlan_iface) in entries.iter() {
            conf.set_raw(&format!("{link_key}_vlan{vlan_id}_name"), vlan_iface);
        }
        let ids: Vec<String> =
            entries.iter().map(|(id, _)| id.to_string()).collect();
        conf.set("vlans", link, &ids.join(" "));
    }

    conf.into_string()
}

fn gen_ip_conf(conf: &mut ConfNet, iface: &Interface) {
    let mut entries: Vec<String> = Vec::new();
    let mut has_dhcp4 = false;
    let mut has_dhcp6 = false;
    for subnet in iface.subnets.iter() {
        match subnet.subnet_type {
            SubnetType::Static | SubnetType::Static6 => {
                match (subnet.ip(), subnet.prefix_length()) {
                    (Some(ip), Some(prefix)) if !ip.is_empty() => {
                        entries.push(format!("{ip}/{prefix}"));
                    }
                    _ => {
                        log::warn!(
                            "Skipping subnet {subnet:?} of {}, because there \
                            is no address or netmask/prefix",
                            iface.name()
                        );
                    }
                }
            }
            t if t.is_dhcp4() || t.is_dhcp6() => {
                if !has_dhcp4 && !has_dhcp6 {
                    entries.push("dhcp".to_string());
                }
                has_dhcp4 |= t.is_dhcp4();
                has_dhcp6 |= t.is_dhcp6();
            }
            _ => (),
        }
    }
    if entries.is_empty() {
        conf.set("config", iface.name(), NULL_CONFIG);
    } else {
        conf.set("config", iface.name(), &entries.join("\n"));
    }

    match (has_dhcp4, has_dhcp6) {
        (true, false) => conf.set("dhcpcd", iface.name(), "-4"),
        (false, true) => conf.set("dhcpcd", iface.name(), "-6"),
        _ => (),
    }

    // netifrc has no per family DHCP option, both lists share one variable
    let mut dhcp_opts = dhcp_override_opts(iface.dhcp4_overrides.as_ref());
    dhcp_opts.extend(dhcp_override_opts(iface.dhcp6_overrides.as_ref()));
    if !dhcp_opts.is_empty() {
        conf.set("dhcp", iface.name(), &dhcp_opts.join(" "));
    }
}

fn dhcp_override_opts(overrides: Option<&DhcpOverrides>) -> Vec<&'static str> {
    let mut ret = Vec::new();
    if let Some(overrides) = overrides {
        if overrides.use_dns == Some(false) {
            ret.push("nodns");
        }
        if overrides.use_routes == Some(false) {
            ret.push("nogateway");
        }
        if overrides.use_ntp == Some(false) {
            ret.push("nontp");
        }
        if overrides.use_hostname == Some(false) {
            ret.push("nosendhost");
        }
    }
    ret
}

fn gen_routes_conf(
    conf: &mut ConfNet,
    iface: &Interface,
    net_state: &NetworkState,
) {
    let mut routes: Vec<RouteEntry> = Vec::new();
    for subnet in iface.subnets.iter() {
        routes.extend(subnet.default_route());
        routes.extend(subnet.routes.iter().cloned());
    }
    routes.extend(
        net_state
            .routes()
            .filter(|r| r.interface.as_deref() == Some(iface.name()))
            .cloned(),
    );

    let mut lines: Vec<String> = Vec::new();
    for route in routes.iter() {
        let gateway = match route.gateway.as_deref().filter(|g| !g.is_empty()) {
            Some(g) => g,
            None => {
                log::debug!("Skipping route without gateway {route:?}");
                continue;
            }
        };
        if route.network.is_empty() {
            log::debug!("Skipping route without network {route:?}");
            continue;
        }
        let dst = if route.is_default() {
            "default".to_string()
        } else {
            match route.prefix_length() {
                Some(prefix) => format!("{}/{prefix}", route.network),
                None => route.network.clone(),
            }
        };
        let metric = route
            .metric
            .map(|m| format!("metric {m} "))
            .unwrap_or_default();
        lines.push(format!("{dst} {metric}via {gateway}"));
    }
    if !lines.is_empty() {
        conf.set("routes", iface.name(), &lines.join("\n"));
    }
}

fn gen_dns_conf(conf: &mut ConfNet, iface: &Interface) {
    let mut servers: Vec<String> = Vec::new();
    let mut search: Vec<String> = Vec::new();
    for subnet in iface.subnets.iter() {
        crate::dns::append_unique(&mut servers, &subnet.dns_nameservers);
        crate::dns::append_unique(&mut search, &subnet.dns_search);
    }
    if !servers.is_empty() {
        conf.set("dns_servers", iface.name(), &servers.join(" "));
    }
    if !search.is_empty() {
        conf.set("dns_search", iface.name(), &search.join(" "));
    }
}
