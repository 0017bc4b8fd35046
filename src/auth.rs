//! The credential callback bridge.
//!
//! When libvirt needs interactive authentication it calls back into the
//! embedder with an array of `virConnectCredential` records. The bridge
//! here turns those records into host-side [`Credential`] values, invokes
//! the one user-supplied [`AuthCallback`], and on success copies each
//! result string into memory the native library takes ownership of.
//!
//! A callback that reports success but leaves a result unset has broken
//! its contract; the bridge panics (which aborts at the FFI boundary)
//! rather than handing undefined memory to the native side.

use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::slice;

use crate::marshal::{Ordinal, const_string};

/// `virConnectCredentialType`. Native values start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
	Username,
	Authname,
	Language,
	Cnonce,
	Passphrase,
	Echoprompt,
	Noechoprompt,
	Realm,
	External,
}

impl Ordinal for CredentialKind {
	const VALUES: &'static [Self] = &[
		Self::Username,
		Self::Authname,
		Self::Language,
		Self::Cnonce,
		Self::Passphrase,
		Self::Echoprompt,
		Self::Noechoprompt,
		Self::Realm,
		Self::External,
	];
}

impl CredentialKind {
	pub fn from_native(value: c_int) -> Option<Self> {
		Self::from_ordinal(value - 1)
	}

	pub fn to_native(self) -> c_int {
		self.ordinal() + 1
	}
}

/// `#[repr(C)]` mirror of `virConnectCredential`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawCredential {
	pub kind: c_int,
	pub prompt: *const c_char,
	pub challenge: *const c_char,
	pub defresult: *const c_char,
	pub result: *mut c_char,
	pub resultlen: c_uint,
}

/// One credential request as the host callback sees it. The callback
/// fills in `result` before returning success.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
	pub kind: Option<CredentialKind>,
	pub prompt: Option<String>,
	pub challenge: Option<String>,
	pub default_result: Option<String>,
	pub result: Option<String>,
}

/// The single host-supplied authentication callback.
///
/// Returns 0 when every request in `credentials` has been answered (its
/// `result` set), non-zero to abort authentication.
pub trait AuthCallback {
	fn callback(&mut self, credentials: &mut [Credential]) -> i32;
}

impl<F: FnMut(&mut [Credential]) -> i32> AuthCallback for F {
	fn callback(&mut self, credentials: &mut [Credential]) -> i32 {
		self(credentials)
	}
}

/// The signature of `virConnectAuthCallbackPtr`.
pub type AuthBridgeFn = unsafe extern "C" fn(*mut RawCredential, c_uint, *mut c_void) -> c_int;

/// `#[repr(C)]` mirror of `virConnectAuth`.
#[repr(C)]
pub struct RawConnectAuth {
	pub credtype: *const c_int,
	pub ncredtype: c_uint,
	pub cb: AuthBridgeFn,
	pub cbdata: *mut c_void,
}

/// Bridge state reachable from the native `cbdata` pointer for the
/// duration of exactly one authentication round trip.
struct AuthContext<'cb> {
	callback: &'cb mut dyn AuthCallback,
}

/// Native-facing credential callback.
///
/// # Safety
///
/// `cbdata` must point at the `AuthContext` set up by [`with_auth`], and
/// `cred` must reference `ncred` valid records for the duration of the
/// call.
pub unsafe extern "C" fn auth_bridge(
	cred: *mut RawCredential,
	ncred: c_uint,
	cbdata: *mut c_void,
) -> c_int {
	if cbdata.is_null() {
		return -1;
	}
	let context = unsafe { &mut *cbdata.cast::<AuthContext<'_>>() };
	let raw: &mut [RawCredential] = if cred.is_null() {
		&mut []
	} else {
		unsafe { slice::from_raw_parts_mut(cred, ncred as usize) }
	};

	let mut credentials: Vec<Credential> = raw
		.iter()
		.map(|record| Credential {
			kind: CredentialKind::from_native(record.kind),
			prompt: const_string(record.prompt),
			challenge: const_string(record.challenge),
			default_result: const_string(record.defresult),
			result: None,
		})
		.collect();

	if context.callback.callback(&mut credentials) != 0 {
		// Callback refused; nothing is copied back.
		return -1;
	}

	for (record, credential) in raw.iter_mut().zip(&credentials) {
		let result = credential
			.result
			.as_deref()
			.expect("authentication callback returned success with an unset credential result");
		let result = CString::new(result)
			.expect("authentication callback produced a credential result with an interior nul");
		// The native library takes ownership of this buffer.
		record.result = unsafe { libc::strdup(result.as_ptr()) };
		record.resultlen = result.as_bytes().len() as c_uint;
	}
	0
}

/// Builds the `virConnectAuth` record around `callback` and keeps its
/// bridge context alive for exactly the duration of `f`.
pub fn with_auth<R>(
	cred_types: &[CredentialKind],
	callback: &mut dyn AuthCallback,
	f: impl FnOnce(*mut RawConnectAuth) -> R,
) -> R {
	let credtype: Vec<c_int> = cred_types.iter().map(|kind| kind.to_native()).collect();
	let mut context = AuthContext { callback };
	let mut auth = RawConnectAuth {
		credtype: credtype.as_ptr(),
		ncredtype: credtype.len() as c_uint,
		cb: auth_bridge,
		cbdata: std::ptr::from_mut(&mut context).cast(),
	};
	f(&mut auth)
}

/// Answers every request with its default result, like the stock
/// `virConnectAuthPtrDefault` behavior for non-interactive use.
pub struct DefaultAuth;

impl AuthCallback for DefaultAuth {
	fn callback(&mut self, credentials: &mut [Credential]) -> i32 {
		for credential in credentials.iter_mut() {
			match &credential.default_result {
				Some(default) => credential.result = Some(default.clone()),
				None => return -1,
			}
		}
		0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::ffi::CStr;
	use std::ptr;

	fn request(kind: CredentialKind, prompt: &'static CStr) -> RawCredential {
		RawCredential {
			kind: kind.to_native(),
			prompt: prompt.as_ptr(),
			challenge: ptr::null(),
			defresult: ptr::null(),
			result: ptr::null_mut(),
			resultlen: 0,
		}
	}

	fn take_result(record: &mut RawCredential) -> Option<String> {
		let result = crate::marshal::owned_string(record.result);
		record.result = ptr::null_mut();
		result
	}

	#[test]
	fn successful_callback_copies_results_back() {
		let mut records = [
			request(CredentialKind::Username, c"Username"),
			request(CredentialKind::Passphrase, c"Password"),
		];

		let mut answer = |credentials: &mut [Credential]| {
			assert_eq!(credentials[0].prompt.as_deref(), Some("Username"));
			assert_eq!(credentials[1].prompt.as_deref(), Some("Password"));
			credentials[0].result = Some("alice".to_owned());
			credentials[1].result = Some("secret".to_owned());
			0
		};

		let status = with_auth(
			&[CredentialKind::Username, CredentialKind::Passphrase],
			&mut answer,
			|auth| unsafe {
				let auth = &*auth;
				(auth.cb)(records.as_mut_ptr(), records.len() as c_uint, auth.cbdata)
			},
		);
		assert_eq!(status, 0);

		assert_eq!(records[0].resultlen, 5);
		assert_eq!(records[1].resultlen, 6);
		assert_eq!(take_result(&mut records[0]).as_deref(), Some("alice"));
		assert_eq!(take_result(&mut records[1]).as_deref(), Some("secret"));
	}

	#[test]
	fn failing_callback_leaves_results_untouched() {
		let mut records = [request(CredentialKind::Username, c"Username")];
		let mut refuse = |_: &mut [Credential]| 1;

		let status = with_auth(&[CredentialKind::Username], &mut refuse, |auth| unsafe {
			let auth = &*auth;
			(auth.cb)(records.as_mut_ptr(), records.len() as c_uint, auth.cbdata)
		});
		assert_eq!(status, -1);
		assert!(records[0].result.is_null());
		assert_eq!(records[0].resultlen, 0);
	}

	#[test]
	fn auth_record_carries_the_requested_types() {
		let mut noop = |_: &mut [Credential]| 0;
		with_auth(
			&[CredentialKind::Username, CredentialKind::Passphrase],
			&mut noop,
			|auth| {
				let auth = unsafe { &*auth };
				assert_eq!(auth.ncredtype, 2);
				let types = unsafe { slice::from_raw_parts(auth.credtype, 2) };
				assert_eq!(types, [1, 5]);
			},
		);
	}

	#[test]
	fn default_auth_answers_from_defaults() {
		let mut credentials = [Credential {
			kind: Some(CredentialKind::Authname),
			prompt: Some("Username".to_owned()),
			challenge: None,
			default_result: Some("root".to_owned()),
			result: None,
		}];
		assert_eq!(DefaultAuth.callback(&mut credentials), 0);
		assert_eq!(credentials[0].result.as_deref(), Some("root"));

		credentials[0].default_result = None;
		credentials[0].result = None;
		assert_eq!(DefaultAuth.callback(&mut credentials), -1);
		assert_eq!(credentials[0].result, None);
	}

	#[test]
	fn credential_kind_table_matches_native_values() {
		assert_eq!(CredentialKind::from_native(1), Some(CredentialKind::Username));
		assert_eq!(
			CredentialKind::from_native(7),
			Some(CredentialKind::Noechoprompt)
		);
		assert_eq!(CredentialKind::from_native(0), None);
		assert_eq!(CredentialKind::from_native(10), None);
		assert_eq!(CredentialKind::External.to_native(), 9);
	}
}
