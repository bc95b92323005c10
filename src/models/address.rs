//! Addresses: a section plus an optional IPv6 zone.

use super::section::{ip_addr_of, MaskMode, Section};
use super::version::IpVersion;
use crate::error::{AddressError, AddressResult};
use num_bigint::BigUint;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// An IP address or subnet.
///
/// Owns its [`Section`]; every transforming method returns a new address
/// carrying the same zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    section: Section,
    zone: Option<String>,
}

impl Address {
    pub fn new(section: Section) -> Address {
        Address {
            section,
            zone: None,
        }
    }

    /// IPv6 address with a zone; zones are rejected for IPv4.
    pub fn with_zone(section: Section, zone: impl Into<String>) -> AddressResult<Address> {
        let zone = zone.into();
        if section.version() != IpVersion::V6 {
            return Err(AddressError::value(format!(
                "zone {zone:?} is only valid for IPv6"
            )));
        }
        Ok(Address {
            section,
            zone: Some(zone).filter(|z| !z.is_empty()),
        })
    }

    /// Address from 4 or 16 network-order bytes.
    pub fn from_bytes(bytes: &[u8], prefix_len: Option<u8>) -> AddressResult<Address> {
        Section::from_bytes(bytes, prefix_len).map(Address::new)
    }

    /// Address from bytes plus mask bytes of the same length.
    ///
    /// A network mask becomes the prefix length; any other mask is applied
    /// to the address bytes and the result is unprefixed.
    pub fn from_bytes_masked(bytes: &[u8], mask: &[u8]) -> AddressResult<Address> {
        if bytes.len() != mask.len() {
            return Err(AddressError::size_mismatch(bytes.len(), mask.len()));
        }
        let mask = Section::from_bytes(mask, None)?;
        match mask.block_mask_prefix_len(true) {
            Some(p) => Self::from_bytes(bytes, Some(p)),
            None => {
                let section = Section::from_bytes(bytes, None)?;
                section.mask(&mask).map(Address::new)
            }
        }
    }

    /// First address of a resolution result.
    ///
    /// An empty result is an error rather than an out-of-bounds access.
    pub fn from_resolved<B: AsRef<[u8]>>(
        resolved: &[B],
        prefix_len: Option<u8>,
    ) -> AddressResult<Address> {
        let first = resolved
            .first()
            .ok_or_else(|| AddressError::value("host resolved to no addresses"))?;
        if resolved.len() > 1 {
            log::debug!(
                "using the first of {} resolved addresses",
                resolved.len()
            );
        }
        Self::from_bytes(first.as_ref(), prefix_len)
    }

    /// Single-valued address from a full address value.
    pub fn from_value(
        version: IpVersion,
        value: u128,
        prefix_len: Option<u8>,
    ) -> AddressResult<Address> {
        Section::from_value(version, value, prefix_len).map(Address::new)
    }

    pub(crate) fn wrap(&self, section: Section) -> Address {
        Address {
            section,
            zone: self.zone.clone(),
        }
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn into_section(self) -> Section {
        self.section
    }

    pub fn version(&self) -> IpVersion {
        self.section.version()
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    pub fn prefix_len(&self) -> Option<u8> {
        self.section.prefix_len()
    }

    pub fn is_prefixed(&self) -> bool {
        self.section.is_prefixed()
    }

    pub fn is_multiple(&self) -> bool {
        self.section.is_multiple()
    }

    pub fn is_sequential(&self) -> bool {
        self.section.is_sequential()
    }

    pub fn count(&self) -> BigUint {
        self.section.count()
    }

    pub fn lower(&self) -> Address {
        self.wrap(self.section.lower())
    }

    pub fn upper(&self) -> Address {
        self.wrap(self.section.upper())
    }

    pub fn lower_value(&self) -> u128 {
        self.section.lower_value()
    }

    pub fn upper_value(&self) -> u128 {
        self.section.upper_value()
    }

    pub fn contains(&self, other: &Address) -> bool {
        self.section.contains(&other.section)
    }

    pub fn overlaps(&self, other: &Address) -> bool {
        self.section.overlaps(&other.section)
    }

    pub fn is_zero_host(&self) -> bool {
        self.section.is_zero_host()
    }

    pub fn is_max_host(&self) -> bool {
        self.section.is_max_host()
    }

    pub fn is_prefix_block(&self) -> bool {
        self.section.is_prefix_block()
    }

    pub fn is_single_prefix_block(&self) -> bool {
        self.section.is_single_prefix_block()
    }

    pub fn set_prefix_len(&self, prefix_len: u8) -> AddressResult<Address> {
        self.section.set_prefix_len(prefix_len).map(|s| self.wrap(s))
    }

    pub fn without_prefix_len(&self) -> Address {
        self.wrap(self.section.without_prefix_len())
    }

    pub fn to_zero_host(&self) -> AddressResult<Address> {
        self.section.to_zero_host().map(|s| self.wrap(s))
    }

    pub fn to_zero_host_len_with(&self, prefix_len: u8, mode: MaskMode) -> AddressResult<Address> {
        self.section
            .to_zero_host_len_with(prefix_len, mode)
            .map(|s| self.wrap(s))
    }

    pub fn to_max_host(&self) -> AddressResult<Address> {
        self.section.to_max_host().map(|s| self.wrap(s))
    }

    pub fn to_max_host_len_with(&self, prefix_len: u8, mode: MaskMode) -> AddressResult<Address> {
        self.section
            .to_max_host_len_with(prefix_len, mode)
            .map(|s| self.wrap(s))
    }

    pub fn to_prefix_block(&self) -> Address {
        self.wrap(self.section.to_prefix_block())
    }

    pub fn to_prefix_block_len(&self, prefix_len: u8) -> AddressResult<Address> {
        self.section
            .to_prefix_block_len(prefix_len)
            .map(|s| self.wrap(s))
    }

    pub fn assign_prefix_for_single_block(&self) -> Option<Address> {
        self.section
            .assign_prefix_for_single_block()
            .map(|s| self.wrap(s))
    }

    pub fn mask(&self, mask: &Address) -> AddressResult<Address> {
        self.section.mask(&mask.section).map(|s| self.wrap(s))
    }

    pub fn bitwise_or(&self, mask: &Address) -> AddressResult<Address> {
        self.section.bitwise_or(&mask.section).map(|s| self.wrap(s))
    }

    /// Reversed bits; the zone is dropped along with the prefix length.
    pub fn reverse_bits(&self) -> AddressResult<Address> {
        self.section.reverse_bits().map(Address::new)
    }

    pub fn reverse_bytes(&self) -> AddressResult<Address> {
        self.section.reverse_bytes().map(Address::new)
    }

    /// The `std::net` address, if single-valued.
    pub fn to_ip_addr(&self) -> Option<IpAddr> {
        (!self.is_multiple()).then(|| ip_addr_of(self.version(), self.lower_value()))
    }

    pub fn to_ipv4_addr(&self) -> Option<Ipv4Addr> {
        match self.to_ip_addr()? {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        }
    }

    pub fn to_ipv6_addr(&self) -> Option<Ipv6Addr> {
        match self.to_ip_addr()? {
            IpAddr::V6(addr) => Some(addr),
            IpAddr::V4(_) => None,
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Self {
        Address::new(Section::from_value_bounds(
            IpVersion::V4,
            u128::from(u32::from(addr)),
            u128::from(u32::from(addr)),
            None,
        ))
    }
}

impl From<Ipv6Addr> for Address {
    fn from(addr: Ipv6Addr) -> Self {
        let value = u128::from(addr);
        Address::new(Section::from_value_bounds(IpVersion::V6, value, value, None))
    }
}

impl From<IpAddr> for Address {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl From<Section> for Address {
    fn from(section: Section) -> Self {
        Address::new(section)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.zone {
            // zone goes between the address and the prefix length
            Some(zone) => match self.prefix_len() {
                Some(p) => {
                    let text = self.section.to_string();
                    let base = text.rsplit_once('/').map_or(text.as_str(), |(b, _)| b);
                    write!(f, "{base}%{zone}/{p}")
                }
                None => write!(f, "{}%{zone}", self.section),
            },
            None => write!(f, "{}", self.section),
        }
    }
}
