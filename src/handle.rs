//! Opaque native resource handles.
//!
//! libvirt hands out pointer-sized object references (`virConnectPtr`,
//! `virDomainPtr`, ...). This layer never dereferences them; it only
//! stores them and passes them back into native entry points. Validity is
//! part of the native library's contract with the caller, so the wrappers
//! here are infallible and implement no `Drop` — close/free stay explicit.

use std::os::raw::c_void;
use std::ptr;

/// A pointer-sized native object reference.
///
/// Round-trips losslessly through [`token`](Self::token) /
/// [`from_token`](Self::from_token) on both 32- and 64-bit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct RawHandle(*mut c_void);

impl RawHandle {
	pub const NULL: Self = Self(ptr::null_mut());

	pub fn from_token(token: usize) -> Self {
		Self(token as *mut c_void)
	}

	pub fn token(self) -> usize {
		self.0 as usize
	}

	pub fn is_null(self) -> bool {
		self.0.is_null()
	}
}

macro_rules! handle_kind {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq)]
		#[repr(transparent)]
		pub struct $name(RawHandle);

		impl $name {
			pub fn new(raw: RawHandle) -> Self {
				Self(raw)
			}

			pub fn raw(self) -> RawHandle {
				self.0
			}
		}
	};
}

handle_kind!(
	/// A `virConnectPtr`.
	ConnectHandle
);
handle_kind!(
	/// A `virDomainPtr`.
	DomainHandle
);
handle_kind!(
	/// A `virNetworkPtr`.
	NetworkHandle
);
handle_kind!(
	/// A `virStoragePoolPtr`.
	StoragePoolHandle
);
handle_kind!(
	/// A `virStorageVolPtr`.
	StorageVolHandle
);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn token_round_trip() {
		for token in [0usize, 1, 0xdead_beef, usize::MAX, usize::MAX >> 1] {
			let handle = RawHandle::from_token(token);
			assert_eq!(handle.token(), token);
		}
	}

	#[test]
	fn null_detection() {
		assert!(RawHandle::NULL.is_null());
		assert!(RawHandle::from_token(0).is_null());
		assert!(!RawHandle::from_token(8).is_null());
	}

	#[test]
	fn typed_wrappers_preserve_bits() {
		let raw = RawHandle::from_token(0x7fff_0042);
		assert_eq!(DomainHandle::new(raw).raw(), raw);
		assert_eq!(ConnectHandle::new(raw).raw().token(), 0x7fff_0042);
	}
}
