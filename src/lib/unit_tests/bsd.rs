// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    unit_tests::testlib::{
        config_without_postcmds, new_net_state, read_target_file,
        write_target_file, MapLinkLister, RecordingRunner,
    },
    BsdIpv4Config, BsdIpv6Config, BsdNetConfig, BsdPlatform, BsdRenderContext,
    BsdRenderer, CommandRunner, NetRenderError, NetworkState, Renderer,
};

#[derive(Debug, Clone, Default)]
struct RecordingPlatform {
    support_rename: bool,
    fail_routes: bool,
    renames: Rc<RefCell<Vec<(String, String)>>>,
    routes: Rc<RefCell<Vec<String>>>,
    net_conf: Rc<RefCell<BsdNetConfig>>,
}

impl BsdPlatform for RecordingPlatform {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn rename_interface(
        &self,
        ctx: &mut BsdRenderContext,
        cur_name: &str,
        new_name: &str,
    ) -> Result<(), NetRenderError> {
        if !self.support_rename {
            return Err(NetRenderError::new(
                crate::ErrorKind::UnsupportedCapability,
                "no rename".to_string(),
            ));
        }
        self.renames
            .borrow_mut()
            .push((cur_name.to_string(), new_name.to_string()));
        ctx.set_rc_config_value(&format!("ifconfig_{cur_name}_name"), new_name)
    }

    fn set_route(
        &self,
        _ctx: &mut BsdRenderContext,
        network: &str,
        netmask: &str,
        gateway: &str,
    ) -> Result<(), NetRenderError> {
        if self.fail_routes {
            return Err(NetRenderError::new(
                crate::ErrorKind::IoError,
                "Permission denied".to_string(),
            ));
        }
        self.routes
            .borrow_mut()
            .push(format!("{network} {netmask} {gateway}"));
        Ok(())
    }

    fn write_config(
        &self,
        _ctx: &mut BsdRenderContext,
        net_conf: &BsdNetConfig,
    ) -> Result<(), NetRenderError> {
        *self.net_conf.borrow_mut() = net_conf.clone();
        Ok(())
    }

    fn start_services(
        &self,
        _net_conf: &BsdNetConfig,
        _runner: &dyn CommandRunner,
        _run: bool,
    ) -> Result<(), NetRenderError> {
        Ok(())
    }
}

fn render(
    platform: &RecordingPlatform,
    net_state: &NetworkState,
    links: &[(&str, &str)],
) -> tempfile::TempDir {
    let tmp_dir = tempfile::tempdir().unwrap();
    let mut renderer =
        BsdRenderer::new(Box::new(platform.clone()), config_without_postcmds());
    renderer.set_command_runner(Box::new(RecordingRunner::new()));
    renderer.set_link_lister(Box::new(MapLinkLister::new(links)));
    renderer
        .render_network_state(net_state, None, Some(tmp_dir.path()))
        .unwrap();
    tmp_dir
}

const ETH1_DHCP_YAML: &str = r#"---
interfaces:
- name: eth1
  mac_address: "52:54:00:12:34:00"
  subnets:
  - type: dhcp
"#;

#[test]
fn test_bsd_rename_interface_once() {
    let platform = RecordingPlatform {
        support_rename: true,
        ..Default::default()
    };
    let net_state = new_net_state(ETH1_DHCP_YAML);

    let tmp_dir = render(&platform, &net_state, &[("52:54:00:12:34:00", "eth0")]);

    assert_eq!(
        platform.renames.borrow().as_slice(),
        &[("eth0".to_string(), "eth1".to_string())]
    );
    assert_eq!(
        platform.net_conf.borrow().ipv4_config("eth1"),
        Some(&BsdIpv4Config::Dhcp)
    );
    assert_eq!(
        read_target_file(tmp_dir.path(), "etc/rc.conf"),
        "ifconfig_eth0_name=eth1\n"
    );
}

#[test]
fn test_bsd_rename_unsupported_use_live_name() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(ETH1_DHCP_YAML);

    render(&platform, &net_state, &[("52:54:00:12:34:00", "eth0")]);

    assert!(platform.renames.borrow().is_empty());
    assert_eq!(
        platform.net_conf.borrow().dhcp_interfaces(),
        vec!["eth0"]
    );
}

#[test]
fn test_bsd_mac_lookup_is_case_insensitive() {
    let platform = RecordingPlatform {
        support_rename: true,
        ..Default::default()
    };
    let net_state = new_net_state(
        r#"---
interfaces:
- name: eth1
  mac_address: "52:54:00:AB:CD:EF"
  subnets:
  - type: dhcp
"#,
    );

    render(&platform, &net_state, &[("52:54:00:ab:cd:ef", "eth0")]);

    assert_eq!(
        platform.renames.borrow().as_slice(),
        &[("eth0".to_string(), "eth1".to_string())]
    );
}

#[test]
fn test_bsd_same_name_no_rename() {
    let platform = RecordingPlatform {
        support_rename: true,
        ..Default::default()
    };
    let net_state = new_net_state(ETH1_DHCP_YAML);

    render(&platform, &net_state, &[("52:54:00:12:34:00", "eth1")]);

    assert!(platform.renames.borrow().is_empty());
}

#[test]
fn test_bsd_unknown_mac_keep_name() {
    let platform = RecordingPlatform {
        support_rename: true,
        ..Default::default()
    };
    let net_state = new_net_state(ETH1_DHCP_YAML);

    render(&platform, &net_state, &[("52:54:00:12:34:99", "eth0")]);

    assert!(platform.renames.borrow().is_empty());
    assert_eq!(
        platform.net_conf.borrow().dhcp_interfaces(),
        vec!["eth1"]
    );
}

#[test]
fn test_bsd_nameless_iface_use_live_name() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(
        r#"---
interfaces:
- mac_address: "52:54:00:12:34:00"
  subnets:
  - type: dhcp
- mac_address: "52:54:00:12:34:01"
  subnets:
  - type: dhcp
"#,
    );

    render(&platform, &net_state, &[("52:54:00:12:34:00", "vtnet0")]);

    assert_eq!(
        platform.net_conf.borrow().dhcp_interfaces(),
        vec!["vtnet0"]
    );
}

#[test]
fn test_bsd_static_subnets() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(
        r#"---
interfaces:
- name: lo0
  subnets:
  - type: static
    address: 127.0.0.1
    netmask: 255.0.0.0
- name: em0
  mtu: 9000
  subnets:
  - type: static
    address: 192.0.2.5/24
  - type: static
    address: 198.51.100.5
    netmask: 255.255.255.0
  - type: static6
    address: 2001:db8::5/64
    mtu: 1400
  - type: dhcp6
"#,
    );

    render(&platform, &net_state, &[]);

    let net_conf = platform.net_conf.borrow();
    assert_eq!(net_conf.ipv4.len(), 1);
    assert_eq!(
        net_conf.ipv4_config("em0"),
        Some(&BsdIpv4Config::Static {
            address: "198.51.100.5".to_string(),
            netmask: "255.255.255.0".to_string(),
            mtu: Some(9000),
        })
    );
    assert_eq!(
        net_conf.ipv6_config("em0"),
        Some(&BsdIpv6Config {
            address: "2001:db8::5".to_string(),
            prefix: 64,
            mtu: Some(1400),
        })
    );
}

#[test]
fn test_bsd_static_netmask_from_prefix() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(
        r#"---
interfaces:
- name: em0
  subnets:
  - type: static
    address: 192.0.2.5/24
- name: em1
  subnets:
  - type: static
    address: 198.51.100.5
    prefix: 25
- name: em2
  subnets:
  - type: static
    address: 203.0.113.5
"#,
    );

    render(&platform, &net_state, &[]);

    let net_conf = platform.net_conf.borrow();
    assert_eq!(
        net_conf.ipv4_config("em0"),
        Some(&BsdIpv4Config::Static {
            address: "192.0.2.5".to_string(),
            netmask: "255.255.255.0".to_string(),
            mtu: None,
        })
    );
    assert_eq!(
        net_conf.ipv4_config("em1"),
        Some(&BsdIpv4Config::Static {
            address: "198.51.100.5".to_string(),
            netmask: "255.255.255.128".to_string(),
            mtu: None,
        })
    );
    assert_eq!(net_conf.ipv4_config("em2"), None);
}

#[test]
fn test_bsd_route_failure_is_not_fatal() {
    let platform = RecordingPlatform {
        fail_routes: true,
        ..Default::default()
    };
    let net_state = new_net_state(
        r#"---
dns:
  nameservers:
  - 192.0.2.53
interfaces:
- name: em0
  subnets:
  - type: static
    address: 192.0.2.5
    netmask: 255.255.255.0
    gateway: 192.0.2.1
"#,
    );

    let tmp_dir = render(&platform, &net_state, &[]);

    assert!(platform.routes.borrow().is_empty());
    assert!(platform.net_conf.borrow().ipv4_config("em0").is_some());
    assert_eq!(
        read_target_file(tmp_dir.path(), "etc/resolv.conf"),
        "nameserver 192.0.2.53\n"
    );
}

#[test]
fn test_bsd_later_subnet_overrides_earlier() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(
        r#"---
interfaces:
- name: em0
  subnets:
  - type: static
    address: 192.0.2.5
    netmask: 255.255.255.0
  - type: dhcp4
"#,
    );

    render(&platform, &net_state, &[]);

    assert_eq!(
        platform.net_conf.borrow().ipv4_config("em0"),
        Some(&BsdIpv4Config::Dhcp)
    );
}

#[test]
fn test_bsd_routes() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(
        r#"---
routes:
- network: 203.0.113.0
  prefix: 24
  gateway: 192.0.2.254
interfaces:
- name: em0
  subnets:
  - type: static
    address: 192.0.2.5
    netmask: 255.255.255.0
    gateway: 192.0.2.1
    routes:
    - network: 198.51.100.0
      netmask: 255.255.255.0
      gateway: 192.0.2.253
  - type: static6
    address: 2001:db8::5
    prefix: 64
    gateway: 2001:db8::1
  - type: dhcp
    gateway: 192.0.2.2
"#,
    );

    render(&platform, &net_state, &[]);

    assert_eq!(
        platform.routes.borrow().as_slice(),
        &[
            "203.0.113.0 24 192.0.2.254".to_string(),
            "0.0.0.0 0.0.0.0 192.0.2.1".to_string(),
            "198.51.100.0 255.255.255.0 192.0.2.253".to_string(),
            ":: 0 2001:db8::1".to_string(),
        ]
    );
}

#[test]
fn test_bsd_resolv_conf_merged() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(
        r#"---
dns:
  nameservers:
  - 192.0.2.250
  - 192.0.2.251
  search:
  - example.org
interfaces:
- name: em0
  subnets:
  - type: static
    address: 192.0.2.5
    netmask: 255.255.255.0
    dns_nameservers:
    - 192.0.2.252
    - 192.0.2.253
"#,
    );
    let tmp_dir = tempfile::tempdir().unwrap();
    write_target_file(
        tmp_dir.path(),
        "etc/resolv.conf",
        "# keep me\nnameserver 192.0.2.250\n",
    );
    let mut renderer =
        BsdRenderer::new(Box::new(platform.clone()), config_without_postcmds());
    renderer.set_link_lister(Box::new(MapLinkLister::new(&[])));

    renderer
        .render_network_state(&net_state, None, Some(tmp_dir.path()))
        .unwrap();

    assert_eq!(
        read_target_file(tmp_dir.path(), "etc/resolv.conf"),
        "# keep me\n\
        nameserver 192.0.2.250\n\
        nameserver 192.0.2.251\n\
        nameserver 192.0.2.252\n\
        search example.org\n"
    );
}

#[test]
fn test_bsd_malformed_resolv_conf_replaced() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(
        r#"---
dns:
  nameservers:
  - 192.0.2.250
"#,
    );
    let tmp_dir = tempfile::tempdir().unwrap();
    write_target_file(tmp_dir.path(), "etc/resolv.conf", "bogus line\n");
    let mut renderer =
        BsdRenderer::new(Box::new(platform.clone()), config_without_postcmds());
    renderer.set_link_lister(Box::new(MapLinkLister::new(&[])));

    renderer
        .render_network_state(&net_state, None, Some(tmp_dir.path()))
        .unwrap();

    assert_eq!(
        read_target_file(tmp_dir.path(), "etc/resolv.conf"),
        "nameserver 192.0.2.250\n"
    );
}

#[test]
fn test_bsd_renderer_reuse_does_not_leak() {
    let platform = RecordingPlatform::default();
    let tmp_dir = tempfile::tempdir().unwrap();
    let mut renderer =
        BsdRenderer::new(Box::new(platform.clone()), config_without_postcmds());
    renderer.set_link_lister(Box::new(MapLinkLister::new(&[])));

    renderer
        .render_network_state(
            &new_net_state(
                r#"---
interfaces:
- name: em0
  subnets:
  - type: dhcp
"#,
            ),
            None,
            Some(tmp_dir.path()),
        )
        .unwrap();
    renderer
        .render_network_state(
            &new_net_state(
                r#"---
interfaces:
- name: em1
  subnets:
  - type: dhcp
"#,
            ),
            None,
            Some(tmp_dir.path()),
        )
        .unwrap();

    assert_eq!(
        platform.net_conf.borrow().dhcp_interfaces(),
        vec!["em1"]
    );
}

#[test]
fn test_bsd_link_listing_failure_is_not_fatal() {
    let platform = RecordingPlatform {
        support_rename: true,
        ..Default::default()
    };
    let net_state = new_net_state(ETH1_DHCP_YAML);
    let tmp_dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::new_failing("ifconfig -a");
    let mut renderer =
        BsdRenderer::new(Box::new(platform.clone()), config_without_postcmds());
    renderer.set_command_runner(Box::new(runner.clone()));

    renderer
        .render_network_state(&net_state, None, Some(tmp_dir.path()))
        .unwrap();

    assert_eq!(runner.commands(), vec!["ifconfig -a".to_string()]);
    assert!(platform.renames.borrow().is_empty());
    assert_eq!(
        platform.net_conf.borrow().dhcp_interfaces(),
        vec!["eth1"]
    );
}

#[test]
fn test_bsd_single_default_route_per_gateway() {
    let platform = RecordingPlatform::default();
    let net_state = new_net_state(
        r#"---
interfaces:
- name: em0
  subnets:
  - type: static
    address: 10.0.0.5
    netmask: 255.255.255.0
    gateway: 10.0.0.1
- name: em1
  subnets:
  - type: static6
    address: "::5"
    prefix: 64
    gateway: "::1"
"#,
    );

    render(&platform, &net_state, &[]);

    assert_eq!(
        platform.routes.borrow().as_slice(),
        &["0.0.0.0 0.0.0.0 10.0.0.1".to_string(), ":: 0 ::1".to_string()]
    );
}
