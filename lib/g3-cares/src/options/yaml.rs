/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::Yaml;

use super::{AresFlags, AresOptionsBuilder};

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn as_u32(v: &Yaml) -> anyhow::Result<u32> {
    match v {
        Yaml::String(s) => Ok(u32::from_str(s)?),
        Yaml::Integer(i) => Ok(u32::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u32' should be 'string' or 'integer'"
        )),
    }
}

fn as_u16(v: &Yaml) -> anyhow::Result<u16> {
    match v {
        Yaml::String(s) => Ok(u16::from_str(s)?),
        Yaml::Integer(i) => Ok(u16::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u16' should be 'string' or 'integer'"
        )),
    }
}

fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

/// Bare numbers are in seconds, strings may carry a unit.
fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else if let Ok(f) = f64::from_str(value) {
                    Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        Yaml::Real(s) => {
            let f = f64::from_str(s).map_err(|e| anyhow!("invalid f64 value: {e}"))?;
            Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
        }
        _ => Err(anyhow!(
            "yaml value type for duration should be 'string' or 'integer' or 'real'"
        )),
    }
}

/// A list of strings given as a yaml array or as a single string with the
/// entries separated by any char in `separators`.
fn as_string_list(v: &Yaml, separators: &[char]) -> anyhow::Result<Vec<String>> {
    match v {
        Yaml::String(s) => Ok(s
            .split(separators)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()),
        Yaml::Array(seq) => {
            let mut list = Vec::with_capacity(seq.len());
            for (i, v) in seq.iter().enumerate() {
                if let Yaml::String(s) = v {
                    list.push(s.to_string());
                } else {
                    return Err(anyhow!("invalid string value for #{i}"));
                }
            }
            Ok(list)
        }
        _ => Err(anyhow!("invalid yaml value type, expect string / array")),
    }
}

fn as_flag(v: &Yaml) -> anyhow::Result<AresFlags> {
    let Yaml::String(s) = v else {
        return Err(anyhow!("yaml value type for flag should be 'string'"));
    };
    let flag = match normalize_key(s).as_str() {
        "usevc" | "use_vc" | "tcp" => AresFlags::USEVC,
        "primary" => AresFlags::PRIMARY,
        "igntc" => AresFlags::IGNTC,
        "norecurse" | "no_recurse" => AresFlags::NORECURSE,
        "stayopen" | "stay_open" => AresFlags::STAYOPEN,
        "nosearch" | "no_search" => AresFlags::NOSEARCH,
        "noaliases" | "no_aliases" => AresFlags::NOALIASES,
        "nocheckresp" | "no_check_resp" => AresFlags::NOCHECKRESP,
        "edns" => AresFlags::EDNS,
        "no_dflt_svr" | "no_default_server" => AresFlags::NO_DFLT_SVR,
        _ => return Err(anyhow!("unknown flag {s}")),
    };
    Ok(flag)
}

impl AresOptionsBuilder {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let mut builder = AresOptionsBuilder::default();
        match v {
            Yaml::Hash(map) => {
                for (k, v) in map.iter() {
                    let Yaml::String(key) = k else {
                        return Err(anyhow!("key in hash should be string"));
                    };
                    builder
                        .set_by_yaml_kv(key, v)
                        .context(format!("failed to parse value of key {key}"))?;
                }
            }
            Yaml::Null => {}
            _ => return Err(anyhow!("yaml value type for c-ares options should be 'map'")),
        }
        Ok(builder)
    }

    pub fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match normalize_key(k).as_str() {
            "server" | "servers" => {
                for server in as_string_list(v, &[' ', ','])? {
                    self.add_server(&server)?;
                }
                Ok(())
            }
            "sortlist" | "sort_list" => {
                for rule in as_string_list(v, &[' '])? {
                    self.add_sort_rule(&rule)?;
                }
                Ok(())
            }
            "flags" => match v {
                Yaml::Array(seq) => {
                    let mut flags = AresFlags::empty();
                    for (i, v) in seq.iter().enumerate() {
                        flags |= as_flag(v).context(format!("invalid flag value for #{i}"))?;
                    }
                    self.set_flags(flags);
                    Ok(())
                }
                _ => {
                    self.set_flags(as_flag(v)?);
                    Ok(())
                }
            },
            "timeout" => {
                self.set_timeout(as_duration(v)?);
                Ok(())
            }
            "tries" | "each_tries" => {
                self.set_tries(as_u32(v)?);
                Ok(())
            }
            "ndots" => {
                self.set_ndots(as_u32(v)?);
                Ok(())
            }
            "udp_port" => {
                self.set_udp_port(as_u16(v)?);
                Ok(())
            }
            "tcp_port" => {
                self.set_tcp_port(as_u16(v)?);
                Ok(())
            }
            "socket_send_buffer_size" => {
                self.set_socket_send_buffer_size(as_u32(v)?);
                Ok(())
            }
            "socket_recv_buffer_size" | "socket_receive_buffer_size" => {
                self.set_socket_receive_buffer_size(as_u32(v)?);
                Ok(())
            }
            "domains" | "search" => {
                self.set_domains(as_string_list(v, &[' '])?);
                Ok(())
            }
            "lookups" => match v {
                Yaml::String(s) => {
                    self.set_lookups(s);
                    Ok(())
                }
                _ => Err(anyhow!("yaml value type for 'lookups' should be 'string'")),
            },
            "edns_packet_size" | "edns_psz" => {
                self.set_edns_packet_size(as_u32(v)?);
                Ok(())
            }
            "resolv_conf" | "resolvconf_path" => match v {
                Yaml::String(s) => {
                    self.set_resolvconf_path(s);
                    Ok(())
                }
                _ => Err(anyhow!("yaml value type for 'path' should be 'string'")),
            },
            "hosts_file" | "hosts_path" => match v {
                Yaml::String(s) => {
                    self.set_hosts_path(s);
                    Ok(())
                }
                _ => Err(anyhow!("yaml value type for 'path' should be 'string'")),
            },
            "udp_max_queries" => {
                self.set_udp_max_queries(as_u32(v)?);
                Ok(())
            }
            "max_timeout" => {
                self.set_max_timeout(as_duration(v)?);
                Ok(())
            }
            "query_cache_max_ttl" | "qcache_max_ttl" => {
                self.set_query_cache_max_ttl(as_u32(v)?);
                Ok(())
            }
            "rotate" | "round_robin" => {
                self.set_rotate(as_bool(v)?);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}
