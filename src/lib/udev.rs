// SPDX-License-Identifier: Apache-2.0

//! Builders of udev rules binding interface name to MAC address.
//!
//! udev requires match and assignment keys in upper case while attribute
//! names are in lower case. The newtypes below keep that contract: the
//! provided constants are valid, custom ones are checked on creation.

use crate::{ErrorKind, NetRenderError};

const ANY_DRIVER: &str = "?*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Upper case key used in `KEY=="value"` match clause.
pub struct UdevMatchKey(&'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Upper case key used in `KEY="value"` assignment clause.
pub struct UdevAssignKey(&'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Lower case sysfs attribute name used in `ATTR{attr}=="value"`.
pub struct UdevAttr(&'static str);

impl UdevMatchKey {
    pub const SUBSYSTEM: Self = Self("SUBSYSTEM");
    pub const ACTION: Self = Self("ACTION");
    pub const DRIVERS: Self = Self("DRIVERS");

    pub fn new(key: &'static str) -> Result<Self, NetRenderError> {
        check_case(key, true).map(|_| Self(key))
    }
}

impl UdevAssignKey {
    pub const NAME: Self = Self("NAME");

    pub fn new(key: &'static str) -> Result<Self, NetRenderError> {
        check_case(key, true).map(|_| Self(key))
    }
}

impl UdevAttr {
    pub const ADDRESS: Self = Self("address");

    pub fn new(attr: &'static str) -> Result<Self, NetRenderError> {
        check_case(attr, false).map(|_| Self(attr))
    }
}

fn check_case(name: &str, upper: bool) -> Result<(), NetRenderError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| {
            if c.is_ascii_alphabetic() {
                c.is_ascii_uppercase() == upper
            } else {
                c.is_ascii_digit() || c == '_'
            }
        });
    if valid {
        Ok(())
    } else {
        Err(NetRenderError::new(
            ErrorKind::Bug,
            format!(
                "udev key {name} should be in {} case",
                if upper { "upper" } else { "lower" }
            ),
        ))
    }
}

pub fn compose_udev_equality(key: UdevMatchKey, value: &str) -> String {
    format!("{}==\"{}\"", key.0, value)
}

pub fn compose_udev_attr_equality(attr: UdevAttr, value: &str) -> String {
    format!("ATTR{{{}}}==\"{}\"", attr.0, value)
}

pub fn compose_udev_setting(key: UdevAssignKey, value: &str) -> String {
    format!("{}=\"{}\"", key.0, value)
}

/// Generate a single udev rule line naming the interface holding
/// specified MAC address.
pub fn generate_udev_rule(
    interface: &str,
    mac: &str,
    driver: Option<&str>,
) -> String {
    let rule = [
        compose_udev_equality(UdevMatchKey::SUBSYSTEM, "net"),
        compose_udev_equality(UdevMatchKey::ACTION, "add"),
        compose_udev_equality(
            UdevMatchKey::DRIVERS,
            driver.filter(|d| !d.is_empty()).unwrap_or(ANY_DRIVER),
        ),
        compose_udev_attr_equality(UdevAttr::ADDRESS, mac),
        compose_udev_setting(UdevAssignKey::NAME, interface),
    ];
    format!("{}\n", rule.join(", "))
}
