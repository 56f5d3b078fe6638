/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv6Addr, SocketAddrV4};
use std::str::FromStr;

use crate::ConfigurationError;

fn invalid_server(s: &str, reason: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidServer(s.to_string(), reason)
}

fn invalid_sort_rule(s: &str, reason: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidSortRule(s.to_string(), reason)
}

/// Check a single server entry of the csv server directive.
///
/// Accepted forms are `ip`, `ipv4:port`, `[ipv6]:port`, each of which may be
/// followed by `%iface`.
pub(crate) fn check_server(s: &str) -> Result<(), ConfigurationError> {
    if s.is_empty() {
        return Err(invalid_server(s, "empty server"));
    }
    if s.contains(',') || s.contains(char::is_whitespace) {
        return Err(invalid_server(s, "separator char found"));
    }

    let host_port = match s.rsplit_once('%') {
        Some((_, "")) => return Err(invalid_server(s, "empty interface name")),
        Some((host_port, _)) => host_port,
        None => s,
    };

    if let Some(left) = host_port.strip_prefix('[') {
        let Some((ip6, port)) = left.split_once(']') else {
            return Err(invalid_server(s, "unclosed bracket"));
        };
        Ipv6Addr::from_str(ip6).map_err(|_| invalid_server(s, "invalid ipv6 address"))?;
        if !port.is_empty() {
            let Some(port) = port.strip_prefix(':') else {
                return Err(invalid_server(s, "garbage after bracket"));
            };
            u16::from_str(port).map_err(|_| invalid_server(s, "invalid port"))?;
        }
        return Ok(());
    }

    if IpAddr::from_str(host_port).is_ok() {
        return Ok(());
    }
    SocketAddrV4::from_str(host_port)
        .map(|_| ())
        .map_err(|_| invalid_server(s, "invalid ip address"))
}

/// Check a single rule of the sort list directive.
///
/// Accepted forms are `ip`, `ip/prefix` and `ip&mask`.
pub(crate) fn check_sort_rule(s: &str) -> Result<(), ConfigurationError> {
    if s.is_empty() {
        return Err(invalid_sort_rule(s, "empty rule"));
    }
    if s.contains(char::is_whitespace) {
        return Err(invalid_sort_rule(s, "separator char found"));
    }

    if let Some((ip, prefix)) = s.split_once('/') {
        let ip = IpAddr::from_str(ip).map_err(|_| invalid_sort_rule(s, "invalid ip address"))?;
        let prefix = u8::from_str(prefix).map_err(|_| invalid_sort_rule(s, "invalid prefix"))?;
        let max_prefix = if ip.is_ipv4() { 32 } else { 128 };
        if prefix > max_prefix {
            return Err(invalid_sort_rule(s, "prefix too large"));
        }
        Ok(())
    } else if let Some((ip, mask)) = s.split_once('&') {
        let ip = IpAddr::from_str(ip).map_err(|_| invalid_sort_rule(s, "invalid ip address"))?;
        let mask = IpAddr::from_str(mask).map_err(|_| invalid_sort_rule(s, "invalid mask"))?;
        if ip.is_ipv4() != mask.is_ipv4() {
            return Err(invalid_sort_rule(s, "address family mismatch"));
        }
        Ok(())
    } else {
        IpAddr::from_str(s)
            .map(|_| ())
            .map_err(|_| invalid_sort_rule(s, "invalid ip address"))
    }
}
