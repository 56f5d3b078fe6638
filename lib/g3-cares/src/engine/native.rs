/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::ffi::CString;
use std::{mem, ptr};

use libc::{c_char, c_int};
use log::warn;

use super::AresEngine;
use crate::{AresOptionMask, EngineStatus, NativeOptions};

/// A live c-ares channel.
pub struct CAresChannel(c_ares_sys::ares_channel);

/// NOTE: the channel pointer is only dereferenced by c-ares while the owning
/// `AresChannel` lock is held, so it can be moved across threads
unsafe impl Send for CAresChannel {}

impl CAresChannel {
    /// The raw channel pointer, valid only inside `AresChannel::with_channel`.
    #[inline]
    pub fn as_ptr(&self) -> c_ares_sys::ares_channel {
        self.0
    }
}

/// The resolution engine backed by the linked c-ares library.
#[derive(Clone, Copy, Debug, Default)]
pub struct CAresEngine;

#[allow(unused_mut)]
fn unsupported_mask() -> AresOptionMask {
    let mut mask = AresOptionMask::empty();
    #[cfg(not(cares1_15))]
    {
        mask |= AresOptionMask::RESOLVCONF;
    }
    #[cfg(not(cares1_19))]
    {
        mask |= AresOptionMask::HOSTS_FILE;
    }
    #[cfg(not(cares1_20))]
    {
        mask |= AresOptionMask::UDP_MAX_QUERIES;
    }
    #[cfg(not(cares1_22))]
    {
        mask |= AresOptionMask::MAXTIMEOUTMS;
    }
    #[cfg(not(cares1_23))]
    {
        mask |= AresOptionMask::QUERY_CACHE;
    }
    mask
}

/// Split `mask` into the bits the linked library knows and the stripped ones.
fn split_supported(mask: AresOptionMask) -> (AresOptionMask, AresOptionMask) {
    let unsupported = mask & unsupported_mask();
    (mask - unsupported, unsupported)
}

fn c_str_ptr(s: &Option<CString>) -> *mut c_char {
    s.as_ref()
        .map(|s| s.as_ptr() as *mut c_char)
        .unwrap_or(ptr::null_mut())
}

impl AresEngine for CAresEngine {
    type Channel = CAresChannel;

    fn library_init(&self) -> Result<(), EngineStatus> {
        let r = unsafe { c_ares_sys::ares_library_init(c_ares_sys::ARES_LIB_INIT_ALL) };
        EngineStatus::check(r)
    }

    fn library_cleanup(&self) {
        unsafe { c_ares_sys::ares_library_cleanup() }
    }

    fn init_channel(
        &self,
        options: &NativeOptions,
        mask: AresOptionMask,
    ) -> Result<CAresChannel, EngineStatus> {
        let (mask, unsupported) = split_supported(mask);
        for (name, _) in unsupported.iter_names() {
            warn!("option {name} is not supported by the linked c-ares library, ignored");
        }

        // c-ares copies all the values, these pointers only need to live
        // through the ares_init_options call
        let mut domains: Vec<*mut c_char> = options
            .domains
            .iter()
            .map(|s| s.as_ptr() as *mut c_char)
            .collect();

        let mut ares_options: c_ares_sys::ares_options = unsafe { mem::zeroed() };
        ares_options.flags = options.flags;
        ares_options.timeout = options.timeout_ms;
        ares_options.tries = options.tries;
        ares_options.ndots = options.ndots;
        ares_options.udp_port = options.udp_port;
        ares_options.tcp_port = options.tcp_port;
        ares_options.socket_send_buffer_size = options.socket_send_buffer_size;
        ares_options.socket_receive_buffer_size = options.socket_receive_buffer_size;
        if !domains.is_empty() {
            ares_options.domains = domains.as_mut_ptr();
            ares_options.ndomains = domains.len() as c_int;
        }
        ares_options.lookups = c_str_ptr(&options.lookups);
        ares_options.ednspsz = options.edns_packet_size;
        #[cfg(cares1_15)]
        {
            ares_options.resolvconf_path = c_str_ptr(&options.resolvconf_path);
        }
        #[cfg(cares1_19)]
        {
            ares_options.hosts_path = c_str_ptr(&options.hosts_path);
        }
        #[cfg(cares1_20)]
        {
            ares_options.udp_max_queries = options.udp_max_queries;
        }
        #[cfg(cares1_22)]
        {
            ares_options.maxtimeout = options.max_timeout_ms;
        }
        #[cfg(cares1_23)]
        {
            ares_options.qcache_max_ttl = options.query_cache_max_ttl;
        }

        let mut channel: c_ares_sys::ares_channel = ptr::null_mut();
        let r = unsafe { c_ares_sys::ares_init_options(&mut channel, &ares_options, mask.bits()) };
        EngineStatus::check(r)?;
        if channel.is_null() {
            return Err(EngineStatus::ENOMEM);
        }
        Ok(CAresChannel(channel))
    }

    fn set_servers_csv(
        &self,
        channel: &mut CAresChannel,
        servers: &str,
    ) -> Result<(), EngineStatus> {
        let servers = CString::new(servers).map_err(|_| EngineStatus::EBADSTR)?;
        let r = unsafe { c_ares_sys::ares_set_servers_ports_csv(channel.0, servers.as_ptr()) };
        EngineStatus::check(r)
    }

    fn set_sortlist(&self, channel: &mut CAresChannel, sortlist: &str) -> Result<(), EngineStatus> {
        let sortlist = CString::new(sortlist).map_err(|_| EngineStatus::EBADSTR)?;
        let r = unsafe { c_ares_sys::ares_set_sortlist(channel.0, sortlist.as_ptr()) };
        EngineStatus::check(r)
    }

    fn destroy_channel(&self, channel: CAresChannel) {
        unsafe { c_ares_sys::ares_destroy(channel.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_mask() {
        let all = AresOptionMask::all();
        let (kept, stripped) = split_supported(all);
        assert_eq!(kept | stripped, all);
        assert!(kept.intersection(stripped).is_empty());
        assert_eq!(stripped, unsupported_mask());

        let basic = AresOptionMask::FLAGS | AresOptionMask::TRIES | AresOptionMask::TIMEOUTMS;
        assert_eq!(split_supported(basic), (basic, AresOptionMask::empty()));
    }

    #[test]
    fn stripped_by_version() {
        let (_, stripped) = split_supported(AresOptionMask::HOSTS_FILE);
        if cfg!(cares1_19) {
            assert!(stripped.is_empty());
        } else {
            assert_eq!(stripped, AresOptionMask::HOSTS_FILE);
        }

        let (kept, stripped) = split_supported(AresOptionMask::RESOLVCONF);
        if cfg!(cares1_15) {
            assert_eq!(kept, AresOptionMask::RESOLVCONF);
        } else {
            assert_eq!(stripped, AresOptionMask::RESOLVCONF);
        }

        let (_, stripped) = split_supported(AresOptionMask::QUERY_CACHE);
        assert_eq!(stripped.is_empty(), cfg!(cares1_23));
    }
}
