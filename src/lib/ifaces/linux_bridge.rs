// SPDX-License-Identifier: Apache-2.0

use crate::{Interface, InterfaceType};

const BRIDGE_FORWARD_DELAY_PARAM: &str = "bridge_fd";
const BRIDGE_HELLO_TIME_PARAM: &str = "bridge_hello";
const BRIDGE_STP_PARAM: &str = "bridge_stp";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
/// Bridge level timers and STP state in integer form.
pub struct BridgeOptions {
    pub forward_delay: Option<u64>,
    pub hello_time: Option<u64>,
    pub stp_state: Option<u64>,
}

impl Interface {
    pub fn is_bridge(&self) -> bool {
        self.iface_type == InterfaceType::Bridge
    }

    pub fn bridge_ports(&self) -> &[String] {
        self.bridge_interfaces.as_slice()
    }

    pub fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            forward_delay: self.bridge_int_param(BRIDGE_FORWARD_DELAY_PARAM),
            hello_time: self.bridge_int_param(BRIDGE_HELLO_TIME_PARAM),
            stp_state: self.bridge_int_param(BRIDGE_STP_PARAM),
        }
    }

    fn bridge_int_param(&self, key: &str) -> Option<u64> {
        let value = self.params.get(key)?;
        let ret = match value {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::Bool(b) => Some(u64::from(*b)),
            serde_json::Value::String(s) => match s.to_lowercase().as_str() {
                "on" | "yes" | "true" => Some(1),
                "off" | "no" | "false" => Some(0),
                s => s.parse::<u64>().ok(),
            },
            _ => None,
        };
        if ret.is_none() {
            log::warn!(
                "Ignoring non-integer {key} value {value} of bridge {}",
                self.name
            );
        }
        ret
    }
}
