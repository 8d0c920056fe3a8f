// SPDX-License-Identifier: Apache-2.0

use crate::{
    unit_tests::testlib::{
        config_without_postcmds, new_net_state, read_target_file,
        write_target_file, MapLinkLister, RecordingRunner,
    },
    BsdRenderer, ErrorKind, FreeBsdPlatform, Renderer, RendererConfig,
};

fn new_freebsd_renderer(
    config: RendererConfig,
    runner: &RecordingRunner,
    links: &[(&str, &str)],
) -> BsdRenderer {
    let mut renderer = BsdRenderer::new(Box::new(FreeBsdPlatform::new()), config);
    renderer.set_command_runner(Box::new(runner.clone()));
    renderer.set_link_lister(Box::new(MapLinkLister::new(links)));
    renderer
}

#[test]
fn test_freebsd_rc_conf() {
    let net_state = new_net_state(
        r#"---
routes:
- network: 203.0.113.0
  netmask: 255.255.255.0
  gateway: 192.0.2.254
- network: "2001:db8:1::"
  prefix: 48
  gateway: 2001:db8::1
interfaces:
- name: em0
  subnets:
  - type: static
    address: 192.0.2.5
    netmask: 255.255.255.0
    gateway: 192.0.2.1
  - type: static6
    address: 2001:db8::5/64
    gateway: 2001:db8::1
- name: em1
  subnets:
  - type: dhcp
"#,
    );
    let tmp_dir = tempfile::tempdir().unwrap();
    write_target_file(
        tmp_dir.path(),
        "etc/rc.conf",
        "hostname=\"bsd\"\nifconfig_em0=\"DHCP\"\n",
    );
    let runner = RecordingRunner::new();
    let renderer =
        new_freebsd_renderer(RendererConfig::default(), &runner, &[]);

    renderer
        .render_network_state(&net_state, None, Some(tmp_dir.path()))
        .unwrap();

    assert_eq!(
        read_target_file(tmp_dir.path(), "etc/rc.conf"),
        "hostname=\"bsd\"\n\
        ifconfig_em0='192.0.2.5 netmask 255.255.255.0'\n\
        route_net0='-net 203.0.113.0 -netmask 255.255.255.0 192.0.2.254'\n\
        static_routes=net0\n\
        ipv6_route_net1='-net 2001:db8:1::/48 2001:db8::1'\n\
        ipv6_static_routes=net1\n\
        defaultrouter=192.0.2.1\n\
        ipv6_defaultrouter=2001:db8::1\n\
        ifconfig_em1=DHCP\n\
        ifconfig_em0_ipv6='inet6 2001:db8::5/64'\n"
    );
    assert_eq!(
        runner.commands(),
        vec![
            "service netif restart".to_string(),
            "service routing restart".to_string(),
            "service dhclient restart em1".to_string(),
        ]
    );
}

#[test]
fn test_freebsd_rename_interface() {
    let net_state = new_net_state(
        r#"---
interfaces:
- name: eth1
  mac_address: "52:54:00:12:34:00"
  mtu: 9000
  subnets:
  - type: dhcp
"#,
    );
    let tmp_dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::new();
    let renderer = new_freebsd_renderer(
        config_without_postcmds(),
        &runner,
        &[("52:54:00:12:34:00", "vtnet0")],
    );

    renderer
        .render_network_state(&net_state, None, Some(tmp_dir.path()))
        .unwrap();

    assert_eq!(
        read_target_file(tmp_dir.path(), "etc/rc.conf"),
        "ifconfig_vtnet0_name=eth1\nifconfig_eth1=DHCP\n"
    );
    assert!(runner.commands().is_empty());
}

#[test]
fn test_freebsd_static_mtu() {
    let net_state = new_net_state(
        r#"---
interfaces:
- name: em0
  mtu: 9000
  subnets:
  - type: static
    address: 192.0.2.5
    netmask: 255.255.255.0
"#,
    );
    let tmp_dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::new();
    let renderer =
        new_freebsd_renderer(config_without_postcmds(), &runner, &[]);

    renderer
        .render_network_state(&net_state, None, Some(tmp_dir.path()))
        .unwrap();

    assert_eq!(
        read_target_file(tmp_dir.path(), "etc/rc.conf"),
        "ifconfig_em0='192.0.2.5 netmask 255.255.255.0 mtu 9000'\n"
    );
}

#[test]
fn test_freebsd_routing_restart_exit_one_tolerated() {
    let net_state = new_net_state(
        r#"---
interfaces:
- name: em0
  subnets:
  - type: dhcp
"#,
    );
    let tmp_dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::new_failing("service routing restart");
    let renderer =
        new_freebsd_renderer(RendererConfig::default(), &runner, &[]);

    renderer
        .render_network_state(&net_state, None, Some(tmp_dir.path()))
        .unwrap();

    assert_eq!(runner.commands().len(), 3);
}

#[test]
fn test_freebsd_netif_restart_failure() {
    let net_state = new_net_state(
        r#"---
interfaces:
- name: em0
  subnets:
  - type: dhcp
"#,
    );
    let tmp_dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::new_failing("service netif restart");
    let renderer =
        new_freebsd_renderer(RendererConfig::default(), &runner, &[]);

    let result =
        renderer.render_network_state(&net_state, None, Some(tmp_dir.path()));

    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::CommandExecutionFailure);
    }
    assert_eq!(runner.commands(), vec!["service netif restart".to_string()]);
    assert_eq!(
        read_target_file(tmp_dir.path(), "etc/rc.conf"),
        "ifconfig_em0=DHCP\n"
    );
}
