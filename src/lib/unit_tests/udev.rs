// SPDX-License-Identifier: Apache-2.0

use crate::{
    compose_udev_attr_equality, compose_udev_equality, compose_udev_setting,
    generate_udev_rule, ErrorKind, UdevAssignKey, UdevAttr, UdevMatchKey,
};

#[test]
fn test_generate_udev_rule_any_driver() {
    assert_eq!(
        generate_udev_rule("eth0", "00:11:22:33:44:55", None),
        "SUBSYSTEM==\"net\", ACTION==\"add\", DRIVERS==\"?*\", \
        ATTR{address}==\"00:11:22:33:44:55\", NAME=\"eth0\"\n"
    );
}

#[test]
fn test_generate_udev_rule_with_driver() {
    assert_eq!(
        generate_udev_rule("eth1", "00:11:22:33:44:66", Some("virtio_net")),
        "SUBSYSTEM==\"net\", ACTION==\"add\", DRIVERS==\"virtio_net\", \
        ATTR{address}==\"00:11:22:33:44:66\", NAME=\"eth1\"\n"
    );
}

#[test]
fn test_compose_udev_items() {
    assert_eq!(
        compose_udev_equality(UdevMatchKey::SUBSYSTEM, "net"),
        "SUBSYSTEM==\"net\""
    );
    assert_eq!(
        compose_udev_attr_equality(UdevAttr::ADDRESS, "aa:bb"),
        "ATTR{address}==\"aa:bb\""
    );
    assert_eq!(
        compose_udev_setting(UdevAssignKey::NAME, "eth0"),
        "NAME=\"eth0\""
    );
}

#[test]
fn test_udev_key_case_checked() {
    assert!(UdevMatchKey::new("KERNEL").is_ok());
    assert!(UdevAttr::new("dev_id").is_ok());

    let result = UdevMatchKey::new("kernel");
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::Bug);
    }
    assert!(UdevAssignKey::new("Name").is_err());
    assert!(UdevAttr::new("ADDRESS").is_err());
}
