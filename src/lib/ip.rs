// SPDX-License-Identifier: Apache-2.0

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::{ErrorKind, NetRenderError};

const IPV4_ADDR_LEN: u8 = 32;

pub(crate) fn is_ipv6_addr(addr: &str) -> bool {
    addr.contains(':')
}

// Matches the loose `a.b.c.d` shape used to tell an IPv4 gateway apart,
// without validating each octet.
pub(crate) fn is_dotted_quad(addr: &str) -> bool {
    addr.split('.').count() == 4
}

/// Convert IPv4 netmask like `255.255.255.0` into prefix length.
/// A netmask given as plain number is treated as prefix length already.
pub fn ipv4_netmask_to_prefix(netmask: &str) -> Result<u8, NetRenderError> {
    if let Ok(prefix) = u8::from_str(netmask) {
        if prefix <= IPV4_ADDR_LEN {
            return Ok(prefix);
        }
    }
    let mask = u32::from(Ipv4Addr::from_str(netmask)?);
    let prefix = mask.leading_ones();
    if mask.checked_shl(prefix).unwrap_or(0) != 0 {
        return Err(NetRenderError::new(
            ErrorKind::InvalidArgument,
            format!("Netmask {netmask} is not contiguous"),
        ));
    }
    Ok(prefix as u8)
}

/// Convert IPv4 prefix length into netmask like `255.255.255.0`.
pub(crate) fn ipv4_prefix_to_netmask(
    prefix: u8,
) -> Result<String, NetRenderError> {
    if prefix > IPV4_ADDR_LEN {
        return Err(NetRenderError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid IPv4 prefix length {prefix}"),
        ));
    }
    let mask = u32::MAX.checked_shl((IPV4_ADDR_LEN - prefix).into());
    Ok(Ipv4Addr::from(mask.unwrap_or(0)).to_string())
}

// Split `192.0.2.1/24` into address and prefix length.
pub(crate) fn split_ip_prefix(
    address: &str,
) -> Result<(&str, Option<u8>), NetRenderError> {
    match address.split_once('/') {
        Some((ip, prefix)) => {
            let prefix = u8::from_str(prefix).map_err(|e| {
                NetRenderError::new(
                    ErrorKind::InvalidArgument,
                    format!("Invalid prefix length in {address}: {e}"),
                )
            })?;
            Ok((ip, Some(prefix)))
        }
        None => Ok((address, None)),
    }
}
