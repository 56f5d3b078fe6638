/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bitflags::bitflags;

use crate::ConfigurationError;

mod addr;

#[cfg(feature = "yaml")]
mod yaml;

bitflags! {
    /// Behaviour flags of a channel, honored when `AresOptionMask::FLAGS` is set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AresFlags: i32 {
        const USEVC = 1 << 0;
        const PRIMARY = 1 << 1;
        const IGNTC = 1 << 2;
        const NORECURSE = 1 << 3;
        const STAYOPEN = 1 << 4;
        const NOSEARCH = 1 << 5;
        const NOALIASES = 1 << 6;
        const NOCHECKRESP = 1 << 7;
        const EDNS = 1 << 8;
        const NO_DFLT_SVR = 1 << 9;
    }
}

bitflags! {
    /// Selects which native option fields the engine should honor.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AresOptionMask: i32 {
        const FLAGS = 1 << 0;
        const TIMEOUT = 1 << 1;
        const TRIES = 1 << 2;
        const NDOTS = 1 << 3;
        const UDP_PORT = 1 << 4;
        const TCP_PORT = 1 << 5;
        const SERVERS = 1 << 6;
        const DOMAINS = 1 << 7;
        const LOOKUPS = 1 << 8;
        const SOCK_STATE_CB = 1 << 9;
        const SORTLIST = 1 << 10;
        const SOCK_SNDBUF = 1 << 11;
        const SOCK_RCVBUF = 1 << 12;
        const TIMEOUTMS = 1 << 13;
        const ROTATE = 1 << 14;
        const EDNSPSZ = 1 << 15;
        const NOROTATE = 1 << 16;
        const RESOLVCONF = 1 << 17;
        const HOSTS_FILE = 1 << 18;
        const UDP_MAX_QUERIES = 1 << 19;
        const MAXTIMEOUTMS = 1 << 20;
        const QUERY_CACHE = 1 << 21;
    }
}

impl AresOptionMask {
    /// Bits that must not be passed at init time.
    ///
    /// Servers and sort list are applied to the live channel after init,
    /// socket callbacks belong to the event loop. The seconds based
    /// `TIMEOUT` is superseded by `TIMEOUTMS`, which `set_timeout` fills.
    const REJECTED: AresOptionMask = AresOptionMask::SERVERS
        .union(AresOptionMask::SORTLIST)
        .union(AresOptionMask::SOCK_STATE_CB)
        .union(AresOptionMask::TIMEOUT);

    /// Bits that carry a value in the native options struct, except flags,
    /// for which an empty set is meaningful.
    const VALUE_REQUIRED: AresOptionMask = AresOptionMask::TIMEOUTMS
        .union(AresOptionMask::TRIES)
        .union(AresOptionMask::NDOTS)
        .union(AresOptionMask::UDP_PORT)
        .union(AresOptionMask::TCP_PORT)
        .union(AresOptionMask::DOMAINS)
        .union(AresOptionMask::LOOKUPS)
        .union(AresOptionMask::SOCK_SNDBUF)
        .union(AresOptionMask::SOCK_RCVBUF)
        .union(AresOptionMask::EDNSPSZ)
        .union(AresOptionMask::RESOLVCONF)
        .union(AresOptionMask::HOSTS_FILE)
        .union(AresOptionMask::UDP_MAX_QUERIES)
        .union(AresOptionMask::MAXTIMEOUTMS)
        .union(AresOptionMask::QUERY_CACHE);
}

/// The materialized native option fields.
///
/// Strings are kept as `CString` so engines can hand out pointers to them
/// for the duration of the init call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativeOptions {
    pub flags: i32,
    pub timeout_ms: i32,
    pub tries: i32,
    pub ndots: i32,
    pub udp_port: u16,
    pub tcp_port: u16,
    pub socket_send_buffer_size: i32,
    pub socket_receive_buffer_size: i32,
    pub domains: Vec<CString>,
    pub lookups: Option<CString>,
    pub edns_packet_size: i32,
    pub resolvconf_path: Option<CString>,
    pub hosts_path: Option<CString>,
    pub udp_max_queries: i32,
    pub max_timeout_ms: i32,
    pub query_cache_max_ttl: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AresOptionsBuilder {
    servers: Option<Vec<String>>,
    sortlist: Option<Vec<String>>,
    extra_mask: AresOptionMask,
    flags: Option<AresFlags>,
    timeout: Option<Duration>,
    tries: Option<u32>,
    ndots: Option<u32>,
    udp_port: Option<u16>,
    tcp_port: Option<u16>,
    so_send_buf_size: Option<u32>,
    so_recv_buf_size: Option<u32>,
    domains: Option<Vec<String>>,
    lookups: Option<String>,
    edns_packet_size: Option<u32>,
    resolvconf_path: Option<PathBuf>,
    hosts_path: Option<PathBuf>,
    udp_max_queries: Option<u32>,
    max_timeout: Option<Duration>,
    query_cache_max_ttl: Option<u32>,
    rotate: Option<bool>,
}

fn to_c_int(v: u32, name: &'static str) -> Result<i32, ConfigurationError> {
    i32::try_from(v).map_err(|_| ConfigurationError::OutOfRange(name))
}

fn duration_to_ms(v: Duration, name: &'static str) -> Result<i32, ConfigurationError> {
    i32::try_from(v.as_millis()).map_err(|_| ConfigurationError::OutOfRange(name))
}

fn path_to_c_string(path: &Path) -> Result<CString, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidPath(path.display().to_string());
    let s = path.to_str().ok_or_else(invalid)?;
    if s.is_empty() {
        return Err(invalid());
    }
    CString::new(s).map_err(|_| invalid())
}

fn check_lookups(s: &str) -> Result<CString, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidLookups(s.to_string());
    if s.is_empty() || s.len() > 2 {
        return Err(invalid());
    }
    let mut seen_b = false;
    let mut seen_f = false;
    for c in s.chars() {
        let seen = match c {
            'b' => &mut seen_b,
            'f' => &mut seen_f,
            _ => return Err(invalid()),
        };
        if *seen {
            return Err(invalid());
        }
        *seen = true;
    }
    CString::new(s).map_err(|_| invalid())
}

fn domains_to_c_string(domains: &[String]) -> Result<Vec<CString>, ConfigurationError> {
    let mut v = Vec::new();
    v.try_reserve_exact(domains.len())
        .map_err(|_| ConfigurationError::AllocationFailed)?;
    for domain in domains {
        if domain.is_empty() || domain.contains(char::is_whitespace) {
            return Err(ConfigurationError::InvalidDomain(domain.clone()));
        }
        let s = CString::new(domain.as_str())
            .map_err(|_| ConfigurationError::InvalidDomain(domain.clone()))?;
        v.push(s);
    }
    Ok(v)
}

impl AresOptionsBuilder {
    pub fn new() -> Self {
        AresOptionsBuilder::default()
    }

    pub fn add_server(&mut self, server: &str) -> Result<(), ConfigurationError> {
        addr::check_server(server)?;
        self.servers
            .get_or_insert_with(Vec::new)
            .push(server.to_string());
        Ok(())
    }

    /// Set the whole server list, entries are checked in `build()`.
    pub fn set_servers<I, S>(&mut self, servers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servers = Some(servers.into_iter().map(Into::into).collect());
    }

    pub fn add_sort_rule(&mut self, rule: &str) -> Result<(), ConfigurationError> {
        addr::check_sort_rule(rule)?;
        self.sortlist
            .get_or_insert_with(Vec::new)
            .push(rule.to_string());
        Ok(())
    }

    /// Set the whole sort list, rules are checked in `build()`.
    pub fn set_sortlist<I, S>(&mut self, rules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortlist = Some(rules.into_iter().map(Into::into).collect());
    }

    /// Enable mask bits that have no dedicated setter, or that should honor
    /// the default value of a field.
    ///
    /// `SERVERS`, `SORTLIST`, `SOCK_STATE_CB` and `TIMEOUT` are rejected by
    /// `build()`, use the dedicated setters instead.
    pub fn enable_mask(&mut self, mask: AresOptionMask) {
        self.extra_mask |= mask;
    }

    pub fn set_flags(&mut self, flags: AresFlags) {
        self.flags = Some(flags);
    }

    pub fn add_flags(&mut self, flags: AresFlags) {
        let f = self.flags.get_or_insert_with(AresFlags::empty);
        *f |= flags;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn set_tries(&mut self, tries: u32) {
        self.tries = Some(tries);
    }

    pub fn set_ndots(&mut self, ndots: u32) {
        self.ndots = Some(ndots);
    }

    pub fn set_udp_port(&mut self, port: u16) {
        self.udp_port = Some(port);
    }

    pub fn set_tcp_port(&mut self, port: u16) {
        self.tcp_port = Some(port);
    }

    pub fn set_socket_send_buffer_size(&mut self, size: u32) {
        self.so_send_buf_size = Some(size);
    }

    pub fn set_socket_receive_buffer_size(&mut self, size: u32) {
        self.so_recv_buf_size = Some(size);
    }

    pub fn set_domains<I, S>(&mut self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = Some(domains.into_iter().map(Into::into).collect());
    }

    /// Set the lookup order, `b` for dns and `f` for the hosts file.
    pub fn set_lookups(&mut self, lookups: &str) {
        self.lookups = Some(lookups.to_string());
    }

    pub fn set_edns_packet_size(&mut self, size: u32) {
        self.edns_packet_size = Some(size);
    }

    pub fn set_resolvconf_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.resolvconf_path = Some(path.into());
    }

    pub fn set_hosts_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.hosts_path = Some(path.into());
    }

    pub fn set_udp_max_queries(&mut self, max: u32) {
        self.udp_max_queries = Some(max);
    }

    pub fn set_max_timeout(&mut self, timeout: Duration) {
        self.max_timeout = Some(timeout);
    }

    /// Set the max ttl of the engine query cache, 0 to disable the cache.
    pub fn set_query_cache_max_ttl(&mut self, ttl: u32) {
        self.query_cache_max_ttl = Some(ttl);
    }

    pub fn set_rotate(&mut self, rotate: bool) {
        self.rotate = Some(rotate);
    }

    pub fn build(&self) -> Result<AresOptions, ConfigurationError> {
        let rejected = self.extra_mask & AresOptionMask::REJECTED;
        if !rejected.is_empty() {
            return Err(ConfigurationError::UnsupportedMask(rejected.bits()));
        }

        if let Some(servers) = &self.servers {
            for s in servers {
                addr::check_server(s)?;
            }
        }
        if let Some(rules) = &self.sortlist {
            for r in rules {
                addr::check_sort_rule(r)?;
            }
        }

        let mut mask = AresOptionMask::empty();
        let mut native = Box::new(NativeOptions::default());

        if let Some(flags) = self.flags {
            mask |= AresOptionMask::FLAGS;
            native.flags = flags.bits();
        }
        if let Some(timeout) = self.timeout {
            mask |= AresOptionMask::TIMEOUTMS;
            native.timeout_ms = duration_to_ms(timeout, "timeout")?;
        }
        if let Some(tries) = self.tries {
            if tries == 0 {
                return Err(ConfigurationError::OutOfRange("tries"));
            }
            mask |= AresOptionMask::TRIES;
            native.tries = to_c_int(tries, "tries")?;
        }
        if let Some(ndots) = self.ndots {
            mask |= AresOptionMask::NDOTS;
            native.ndots = to_c_int(ndots, "ndots")?;
        }
        if let Some(port) = self.udp_port {
            mask |= AresOptionMask::UDP_PORT;
            native.udp_port = port;
        }
        if let Some(port) = self.tcp_port {
            mask |= AresOptionMask::TCP_PORT;
            native.tcp_port = port;
        }
        if let Some(size) = self.so_send_buf_size {
            mask |= AresOptionMask::SOCK_SNDBUF;
            native.socket_send_buffer_size = to_c_int(size, "socket_send_buffer_size")?;
        }
        if let Some(size) = self.so_recv_buf_size {
            mask |= AresOptionMask::SOCK_RCVBUF;
            native.socket_receive_buffer_size = to_c_int(size, "socket_receive_buffer_size")?;
        }
        if let Some(domains) = &self.domains {
            mask |= AresOptionMask::DOMAINS;
            native.domains = domains_to_c_string(domains)?;
        }
        if let Some(lookups) = &self.lookups {
            mask |= AresOptionMask::LOOKUPS;
            native.lookups = Some(check_lookups(lookups)?);
        }
        if let Some(size) = self.edns_packet_size {
            mask |= AresOptionMask::EDNSPSZ;
            native.edns_packet_size = to_c_int(size, "edns_packet_size")?;
        }
        if let Some(path) = &self.resolvconf_path {
            mask |= AresOptionMask::RESOLVCONF;
            native.resolvconf_path = Some(path_to_c_string(path)?);
        }
        if let Some(path) = &self.hosts_path {
            mask |= AresOptionMask::HOSTS_FILE;
            native.hosts_path = Some(path_to_c_string(path)?);
        }
        if let Some(max) = self.udp_max_queries {
            mask |= AresOptionMask::UDP_MAX_QUERIES;
            native.udp_max_queries = to_c_int(max, "udp_max_queries")?;
        }
        if let Some(timeout) = self.max_timeout {
            mask |= AresOptionMask::MAXTIMEOUTMS;
            native.max_timeout_ms = duration_to_ms(timeout, "max_timeout")?;
        }
        if let Some(ttl) = self.query_cache_max_ttl {
            mask |= AresOptionMask::QUERY_CACHE;
            native.query_cache_max_ttl = ttl;
        }
        match self.rotate {
            Some(true) => mask |= AresOptionMask::ROTATE,
            Some(false) => mask |= AresOptionMask::NOROTATE,
            None => {}
        }

        let missing = (self.extra_mask - mask) & AresOptionMask::VALUE_REQUIRED;
        if !missing.is_empty() {
            return Err(ConfigurationError::MissingValue(missing.bits()));
        }
        mask |= self.extra_mask;

        if mask.contains(AresOptionMask::ROTATE | AresOptionMask::NOROTATE) {
            return Err(ConfigurationError::Conflict("rotate and norotate"));
        }
        if let (Some(timeout), Some(max_timeout)) = (self.timeout, self.max_timeout) {
            if max_timeout < timeout {
                return Err(ConfigurationError::Conflict(
                    "max_timeout is smaller than timeout",
                ));
            }
        }

        Ok(AresOptions {
            servers: self.servers.clone(),
            sortlist: self.sortlist.clone(),
            mask,
            native,
        })
    }
}

/// Validated channel options, consumed by `AresChannel` construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AresOptions {
    servers: Option<Vec<String>>,
    sortlist: Option<Vec<String>>,
    mask: AresOptionMask,
    native: Box<NativeOptions>,
}

impl Default for AresOptions {
    fn default() -> Self {
        AresOptions {
            servers: None,
            sortlist: None,
            mask: AresOptionMask::empty(),
            native: Box::default(),
        }
    }
}

impl AresOptions {
    pub fn builder() -> AresOptionsBuilder {
        AresOptionsBuilder::default()
    }

    #[inline]
    pub fn servers(&self) -> Option<&[String]> {
        self.servers.as_deref()
    }

    #[inline]
    pub fn sortlist(&self) -> Option<&[String]> {
        self.sortlist.as_deref()
    }

    #[inline]
    pub fn option_mask(&self) -> AresOptionMask {
        self.mask
    }

    #[inline]
    pub fn native(&self) -> &NativeOptions {
        &self.native
    }

    /// The csv server directive, `None` if no server list is configured.
    pub fn servers_directive(&self) -> Option<String> {
        self.servers.as_ref().map(|v| v.join(","))
    }

    /// The space separated sort list directive, `None` if not configured.
    pub fn sortlist_directive(&self) -> Option<String> {
        self.sortlist.as_ref().map(|v| v.join(" "))
    }
}
