//! Flag arguments of the flag-qualified call shapes.

use bitflags::bitflags;

bitflags! {
	/// `virConnectFlags`
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct OpenFlags: u32 {
		/// `VIR_CONNECT_RO`
		const READ_ONLY = 1 << 0;
	}
}

bitflags! {
	/// `virDomainXMLFlags`
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct XmlFlags: u32 {
		/// `VIR_DOMAIN_XML_SECURE`: include security-sensitive information
		const SECURE = 1 << 0;
		/// `VIR_DOMAIN_XML_INACTIVE`: dump the persistent configuration
		const INACTIVE = 1 << 1;
	}
}

bitflags! {
	/// `virDomainMigrateFlags`
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct MigrateFlags: u32 {
		/// `VIR_MIGRATE_LIVE`
		const LIVE = 1 << 0;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bits_match_the_native_constants() {
		assert_eq!(OpenFlags::READ_ONLY.bits(), 1);
		assert_eq!(XmlFlags::SECURE.bits(), 1);
		assert_eq!(XmlFlags::INACTIVE.bits(), 2);
		assert_eq!(MigrateFlags::LIVE.bits(), 1);
		assert_eq!(OpenFlags::default().bits(), 0);
	}
}
