// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-loopback IPv4 address discovery, rank-ordered RFC1918 private
//! first, then global, then link-local.
//!
//! Nothing in this workspace's dependency stack enumerates network
//! interfaces directly, so this probes the handful of well-known
//! destinations via `UdpSocket::connect` (no packet is sent; the kernel
//! only picks the outbound route) and collects whichever local addresses
//! the routing table surfaces. That is necessarily a subset of every
//! address bound to the host, but it is exactly the set useful for
//! `preferred_connect_addrs` ranking: addresses that can actually reach
//! something.

use std::net::{Ipv4Addr, UdpSocket};

/// Routes known to surface a private, a public, and a link-local source
/// address respectively, when one is locally available.
const PROBE_TARGETS: &[&str] = &["10.255.255.255:1", "1.1.1.1:80", "169.254.255.255:1"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Private,
    Global,
    LinkLocal,
}

fn rank(addr: Ipv4Addr) -> Option<Rank> {
    if addr.is_loopback() {
        return None;
    }
    if addr.is_link_local() {
        return Some(Rank::LinkLocal);
    }
    let octets = addr.octets();
    let is_private = octets[0] == 10
        || (octets[0] == 172 && (16..=31).contains(&octets[1]))
        || (octets[0] == 192 && octets[1] == 168);
    Some(if is_private { Rank::Private } else { Rank::Global })
}

fn probe_local_addr(target: &str) -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(target).ok()?;
    match socket.local_addr().ok()?.ip() {
        std::net::IpAddr::V4(v4) => Some(v4),
        std::net::IpAddr::V6(_) => None,
    }
}

/// Rank-ordered, deduplicated non-loopback IPv4 addresses this host could
/// plausibly be reached on.
pub fn local_ipv4_addrs() -> Vec<Ipv4Addr> {
    let mut found: Vec<(Rank, Ipv4Addr)> = Vec::new();
    for target in PROBE_TARGETS {
        if let Some(addr) = probe_local_addr(target) {
            if let Some(r) = rank(addr) {
                if !found.iter().any(|(_, a)| *a == addr) {
                    found.push((r, addr));
                }
            }
        }
    }
    found.sort_by_key(|(r, _)| *r);
    found.into_iter().map(|(_, a)| a).collect()
}

#[cfg(test)]
#[path = "addrs_tests.rs"]
mod tests;
