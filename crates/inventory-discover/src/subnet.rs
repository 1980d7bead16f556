//! IPv4 subnet parsing and host enumeration.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net};

use crate::error::{DiscoverError, Result};

/// A parsed IPv4 network in CIDR notation.
///
/// Only network descriptors are accepted: `10.0.0.0/24` parses,
/// `10.0.0.7/24` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet(Ipv4Net);

impl Subnet {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| DiscoverError::InvalidSubnet {
            input: input.trim().to_string(),
            reason,
        };

        let net = match input.trim().parse::<IpNet>() {
            Ok(IpNet::V4(net)) => net,
            Ok(IpNet::V6(_)) => return Err(invalid("IPv6 networks are not supported".into())),
            Err(e) => return Err(invalid(format!("{e}, expected CIDR such as 192.168.1.0/24"))),
        };

        if net.addr() != net.network() {
            return Err(invalid(format!("host bits set, did you mean {}?", net.trunc())));
        }

        Ok(Self(net))
    }

    pub fn network(&self) -> Ipv4Addr {
        self.0.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Number of usable host addresses.
    pub fn host_count(&self) -> u64 {
        let range = self.host_range();
        u64::from(*range.end() - *range.start()) + 1
    }

    /// Usable host addresses in ascending order. Network and broadcast
    /// addresses are excluded, except that a `/31` yields both addresses
    /// (RFC 3021 point-to-point) and a `/32` yields its single address.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + Send + 'static {
        self.host_range().map(Ipv4Addr::from)
    }

    /// Whether `addr` is one of this subnet's usable hosts.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.host_range().contains(&u32::from(addr))
    }

    fn host_range(&self) -> RangeInclusive<u32> {
        let network = u32::from(self.0.network());
        let broadcast = u32::from(self.0.broadcast());
        if self.0.prefix_len() >= 31 {
            network..=broadcast
        } else {
            (network + 1)..=(broadcast - 1)
        }
    }
}

impl FromStr for Subnet {
    type Err = DiscoverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
