//! Subnet parsing and role-based IP assignment.
//!
//! A stand occupies one IPv4 subnet. Role addresses are fixed offsets from
//! the network address by convention: gateway at +1, workstation at +10,
//! server at +20, domain controller at +30. The offsets are deliberately not
//! configurable.

use color_eyre::eyre::{bail, eyre, Result};
use std::fmt;
use std::net::Ipv4Addr;

/// Offset of the stand gateway from the network address
pub const GATEWAY_OFFSET: u32 = 1;
/// Offset of the workstation VM from the network address
pub const WORKSTATION_OFFSET: u32 = 10;
/// Offset of the server VM from the network address
pub const SERVER_OFFSET: u32 = 20;
/// Offset of the domain controller VM from the network address
pub const DOMAIN_CONTROLLER_OFFSET: u32 = 30;

/// An IPv4 subnet assigned to one stand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubnetAllocation {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl SubnetAllocation {
    /// Parse a CIDR string like `192.168.103.0/24`.
    ///
    /// Host bits are masked off, so `192.168.103.5/24` yields the same
    /// allocation as `192.168.103.0/24` (non-strict parse).
    pub fn parse(cidr: &str) -> Result<Self> {
        let (addr_part, prefix_part) = cidr.split_once('/').ok_or_else(|| {
            eyre!(
                "Invalid subnet '{}': expected CIDR notation like 192.168.103.0/24",
                cidr
            )
        })?;

        let addr: Ipv4Addr = addr_part
            .trim()
            .parse()
            .map_err(|_| eyre!("Invalid IPv4 address in subnet '{}'", cidr))?;
        let prefix_len: u8 = prefix_part
            .trim()
            .parse()
            .map_err(|_| eyre!("Invalid prefix length in subnet '{}'", cidr))?;
        if prefix_len > 32 {
            bail!("Invalid prefix length in subnet '{}': must be 0-32", cidr);
        }

        let mask = if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - prefix_len)
        };
        let network = Ipv4Addr::from(u32::from(addr) & mask);

        Ok(SubnetAllocation { network, prefix_len })
    }

    pub fn network_address(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Address at the given offset from the network address.
    ///
    /// The offset is not range-checked against the prefix length; like the
    /// convention it implements, it assumes subnets large enough to hold
    /// the role offsets.
    pub fn ip_at(&self, offset: u32) -> Result<Ipv4Addr> {
        let host = u32::from(self.network)
            .checked_add(offset)
            .ok_or_else(|| eyre!("Offset {} overflows subnet {}", offset, self))?;
        Ok(Ipv4Addr::from(host))
    }

    pub fn gateway(&self) -> Result<Ipv4Addr> {
        self.ip_at(GATEWAY_OFFSET)
    }

    pub fn workstation_ip(&self) -> Result<Ipv4Addr> {
        self.ip_at(WORKSTATION_OFFSET)
    }

    pub fn server_ip(&self) -> Result<Ipv4Addr> {
        self.ip_at(SERVER_OFFSET)
    }

    pub fn domain_controller_ip(&self) -> Result<Ipv4Addr> {
        self.ip_at(DOMAIN_CONTROLLER_OFFSET)
    }
}

impl fmt::Display for SubnetAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_network() {
        let subnet = SubnetAllocation::parse("192.168.103.0/24").unwrap();
        assert_eq!(subnet.network_address(), Ipv4Addr::new(192, 168, 103, 0));
        assert_eq!(subnet.prefix_len(), 24);
    }

    #[test]
    fn test_parse_masks_host_bits() {
        let subnet = SubnetAllocation::parse("192.168.103.57/24").unwrap();
        assert_eq!(subnet.network_address(), Ipv4Addr::new(192, 168, 103, 0));
        assert_eq!(subnet.to_string(), "192.168.103.0/24");
    }

    #[test]
    fn test_role_offsets() {
        let subnet = SubnetAllocation::parse("192.168.103.0/24").unwrap();
        assert_eq!(subnet.gateway().unwrap().to_string(), "192.168.103.1");
        assert_eq!(subnet.workstation_ip().unwrap().to_string(), "192.168.103.10");
        assert_eq!(subnet.server_ip().unwrap().to_string(), "192.168.103.20");
        assert_eq!(
            subnet.domain_controller_ip().unwrap().to_string(),
            "192.168.103.30"
        );
    }

    #[test]
    fn test_offset_crosses_octet_boundary() {
        let subnet = SubnetAllocation::parse("10.0.0.0/16").unwrap();
        assert_eq!(subnet.ip_at(300).unwrap().to_string(), "10.0.1.44");
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert!(SubnetAllocation::parse("192.168.103.0").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_address() {
        assert!(SubnetAllocation::parse("192.168.303.0/24").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_prefix() {
        assert!(SubnetAllocation::parse("192.168.103.0/33").is_err());
        assert!(SubnetAllocation::parse("192.168.103.0/abc").is_err());
    }

    #[test]
    fn test_offset_overflow() {
        let subnet = SubnetAllocation::parse("255.255.255.0/24").unwrap();
        assert!(subnet.ip_at(u32::MAX).is_err());
    }
}
