//! Value conversions across the native boundary.
//!
//! The ownership rule for inbound strings follows the per-function libvirt
//! contract: [`owned_string`] is for results the caller must free (the
//! copy is taken and the native buffer released on every path),
//! [`const_string`] is for static/const results that must never be freed.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};

use uuid::Uuid;

use crate::BindResult;
use crate::error::BindError;

/// `VIR_UUID_BUFLEN`
pub const UUID_BUFLEN: usize = 16;
/// `VIR_UUID_STRING_BUFLEN` (36 characters plus NUL)
pub const UUID_STRING_BUFLEN: usize = 37;

/// Frees a caller-owned native string when dropped.
struct OwnedCStr(*mut c_char);

impl Drop for OwnedCStr {
	fn drop(&mut self) {
		unsafe { libc::free(self.0.cast::<c_void>()) };
	}
}

/// Copies a const/static native string. The native buffer is not released.
pub fn const_string(ptr: *const c_char) -> Option<String> {
	if ptr.is_null() {
		return None;
	}
	let s = unsafe { CStr::from_ptr(ptr) };
	Some(s.to_string_lossy().into_owned())
}

/// Copies a native string the caller owns, then frees the native buffer.
pub fn owned_string(ptr: *mut c_char) -> Option<String> {
	if ptr.is_null() {
		return None;
	}
	let guard = OwnedCStr(ptr);
	const_string(guard.0)
}

/// The native 0/non-0 boolean convention.
pub fn int_bool(value: c_int) -> bool {
	value != 0
}

/// Runs `f` with a NUL-terminated copy of `s`. The copy lives exactly for
/// the duration of the call.
pub fn with_cstr<R>(s: &str, f: impl FnOnce(*const c_char) -> R) -> BindResult<R> {
	let cstr = CString::new(s)?;
	Ok(f(cstr.as_ptr()))
}

/// [`with_cstr`] for optional arguments; `None` becomes a null pointer.
pub fn with_opt_cstr<R>(s: Option<&str>, f: impl FnOnce(*const c_char) -> R) -> BindResult<R> {
	match s {
		Some(s) => with_cstr(s, f),
		None => Ok(f(std::ptr::null())),
	}
}

/// Enumerations mirrored from native ordinals through a static table.
///
/// `VALUES` must list the variants in native declaration order; the two
/// sides are kept in lockstep by inspection, not checked at runtime.
pub trait Ordinal: Copy + PartialEq + Sized + 'static {
	const VALUES: &'static [Self];

	fn from_ordinal(ordinal: i32) -> Option<Self> {
		usize::try_from(ordinal)
			.ok()
			.and_then(|index| Self::VALUES.get(index))
			.copied()
	}

	/// The position of `self` in `VALUES`. Implementations whose type has
	/// a variant outside the table must override this; for a complete
	/// table the lookup cannot fail.
	fn ordinal(self) -> i32 {
		Self::VALUES
			.iter()
			.position(|value| *value == self)
			.unwrap() as i32
	}
}

/// Formats 16 UUID bytes in the canonical hyphenated form.
pub fn uuid_to_string(bytes: &[u8; UUID_BUFLEN]) -> String {
	Uuid::from_bytes(*bytes).as_hyphenated().to_string()
}

/// Parses a canonical UUID string back into its 16 bytes.
pub fn uuid_from_string(s: &str) -> BindResult<[u8; UUID_BUFLEN]> {
	Uuid::try_parse(s)
		.map(Uuid::into_bytes)
		.map_err(|_| BindError::InvalidUuid(s.to_owned()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn const_string_copies_without_freeing() {
		let original = c"qemu";
		assert_eq!(const_string(original.as_ptr()), Some("qemu".to_owned()));
		// The original buffer must still be intact.
		assert_eq!(original.to_bytes(), b"qemu");
		assert_eq!(const_string(std::ptr::null()), None);
	}

	#[test]
	fn owned_string_takes_the_copy() {
		let native = unsafe { libc::strdup(c"host.example.org".as_ptr()) };
		assert_eq!(owned_string(native), Some("host.example.org".to_owned()));
		assert_eq!(owned_string(std::ptr::null_mut()), None);
	}

	#[test]
	fn bool_convention() {
		assert!(!int_bool(0));
		assert!(int_bool(1));
		assert!(int_bool(-1));
	}

	#[test]
	fn cstr_scope_rejects_interior_nul() {
		assert!(with_cstr("a\0b", |_| ()).is_err());
		let len = with_cstr("abc", |ptr| {
			unsafe { CStr::from_ptr(ptr) }.to_bytes().len()
		})
		.unwrap();
		assert_eq!(len, 3);
	}

	#[test]
	fn uuid_round_trip_known_value() {
		let bytes: [u8; UUID_BUFLEN] = [
			0x00, 0x4b, 0x96, 0xe1, 0x2d, 0x78, 0xc3, 0x0f, 0x5a, 0xa5, 0xf0, 0x3c, 0x87, 0xd2,
			0x1e, 0x69,
		];
		let s = uuid_to_string(&bytes);
		assert_eq!(s, "004b96e1-2d78-c30f-5aa5-f03c87d21e69");
		assert_eq!(uuid_from_string(&s).unwrap(), bytes);
	}

	#[test]
	fn uuid_round_trip_random() {
		for _ in 0..1000 {
			let bytes = *Uuid::new_v4().as_bytes();
			assert_eq!(uuid_from_string(&uuid_to_string(&bytes)).unwrap(), bytes);
		}
	}

	#[test]
	fn uuid_rejects_garbage() {
		assert!(uuid_from_string("not-a-uuid").is_err());
	}
}
