/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

/// Raw status code returned by the resolution engine.
///
/// The code is kept verbatim so it can be surfaced for diagnostics,
/// the symbolic name is only a best effort lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EngineStatus(i32);

impl EngineStatus {
    pub const SUCCESS: EngineStatus = EngineStatus(0);
    pub const ENOMEM: EngineStatus = EngineStatus(15);
    pub const EBADSTR: EngineStatus = EngineStatus(17);
    pub const ENOTINITIALIZED: EngineStatus = EngineStatus(21);

    pub const fn new(code: i32) -> Self {
        EngineStatus(code)
    }

    #[inline]
    pub const fn code(&self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// Convert the raw return value of an engine call into a `Result`.
    pub fn check(code: i32) -> Result<(), EngineStatus> {
        let status = EngineStatus(code);
        if status.is_success() {
            Ok(())
        } else {
            Err(status)
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "ARES_SUCCESS",
            1 => "ARES_ENODATA",
            2 => "ARES_EFORMERR",
            3 => "ARES_ESERVFAIL",
            4 => "ARES_ENOTFOUND",
            5 => "ARES_ENOTIMP",
            6 => "ARES_EREFUSED",
            7 => "ARES_EBADQUERY",
            8 => "ARES_EBADNAME",
            9 => "ARES_EBADFAMILY",
            10 => "ARES_EBADRESP",
            11 => "ARES_ECONNREFUSED",
            12 => "ARES_ETIMEOUT",
            13 => "ARES_EOF",
            14 => "ARES_EFILE",
            15 => "ARES_ENOMEM",
            16 => "ARES_EDESTRUCTION",
            17 => "ARES_EBADSTR",
            18 => "ARES_EBADFLAGS",
            19 => "ARES_ENONAME",
            20 => "ARES_EBADHINTS",
            21 => "ARES_ENOTINITIALIZED",
            22 => "ARES_ELOADIPHLPAPI",
            23 => "ARES_EADDRGETNETWORKPARAMS",
            24 => "ARES_ECANCELLED",
            25 => "ARES_ESERVICE",
            26 => "ARES_ENOSERVER",
            _ => return None,
        };
        Some(name)
    }

    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "successful completion",
            1 => "DNS server returned answer with no data",
            2 => "DNS server claims query was misformatted",
            3 => "DNS server returned general failure",
            4 => "domain name not found",
            5 => "DNS server does not implement requested operation",
            6 => "DNS server refused query",
            7 => "misformatted DNS query",
            8 => "misformatted domain name",
            9 => "unsupported address family",
            10 => "misformatted DNS reply",
            11 => "could not contact DNS servers",
            12 => "timeout while contacting DNS servers",
            13 => "end of file",
            14 => "error reading file",
            15 => "out of memory",
            16 => "channel is being destroyed",
            17 => "misformatted string",
            18 => "illegal flags specified",
            19 => "given hostname is not numeric",
            20 => "illegal hints flags specified",
            21 => "library initialization not yet performed",
            22 => "error loading iphlpapi.dll",
            23 => "could not find GetNetworkParams function",
            24 => "DNS query cancelled",
            25 => "invalid service name or number",
            26 => "no DNS servers were configured",
            _ => "unknown error",
        }
    }
}

impl From<i32> for EngineStatus {
    fn from(code: i32) -> Self {
        EngineStatus(code)
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({}): {}", self.0, self.description()),
            None => write!(f, "code {}: {}", self.0, self.description()),
        }
    }
}
