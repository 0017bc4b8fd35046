//! The closed catalogue of native call shapes.
//!
//! Every libvirt entry point this layer forwards to has one of a handful
//! of argument/return shapes. Each shape is a single generic function
//! parameterized over the native entry point, replacing the per-function
//! macro expansion of classic binding layers with one body per shape.
//!
//! Failure policy: a negative integer or null handle drains the
//! [`ErrorContext`] into an `Err`. A null *string* with no recorded error
//! is "field absent" and comes back as `Ok(None)`.
//!
//! The functions here are safe to call under the same contract the native
//! library imposes: the entry point and the handle must belong together
//! and the handle must still be valid. That discipline is owned by the
//! caller, exactly as it is when calling the C API directly.

use std::ffi::CStr;
use std::mem;
use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_ulong};

use crate::BindResult;
use crate::error::ErrorContext;
use crate::handle::RawHandle;
use crate::marshal::{self, UUID_BUFLEN, UUID_STRING_BUFLEN};

// handle → int
pub type IntFn = unsafe extern "C" fn(RawHandle) -> c_int;
// handle, flags → int
pub type IntFlagsFn = unsafe extern "C" fn(RawHandle, c_uint) -> c_int;
// handle, int → int
pub type IntArgFn = unsafe extern "C" fn(RawHandle, c_int) -> c_int;
// handle, ulong → int
pub type IntUlongFn = unsafe extern "C" fn(RawHandle, c_ulong) -> c_int;
// handle → ulong (0 means failure)
pub type UlongFn = unsafe extern "C" fn(RawHandle) -> c_ulong;
// handle → const string, no ownership transfer
pub type ConstStrFn = unsafe extern "C" fn(RawHandle) -> *const c_char;
// handle → string the caller frees
pub type OwnedStrFn = unsafe extern "C" fn(RawHandle) -> *mut c_char;
// handle, flags → string the caller frees
pub type OwnedStrFlagsFn = unsafe extern "C" fn(RawHandle, c_uint) -> *mut c_char;
// handle, string → int
pub type StrIntFn = unsafe extern "C" fn(RawHandle, *const c_char) -> c_int;
// handle, string, flags → int
pub type StrFlagsIntFn = unsafe extern "C" fn(RawHandle, *const c_char, c_uint) -> c_int;
// handle, string → new handle (creation, definition, lookup by name/UUID string)
pub type StrHandleFn = unsafe extern "C" fn(RawHandle, *const c_char) -> RawHandle;
// handle, string, flags → new handle
pub type StrFlagsHandleFn = unsafe extern "C" fn(RawHandle, *const c_char, c_uint) -> RawHandle;
// handle, int → new handle (lookup by id)
pub type IntHandleFn = unsafe extern "C" fn(RawHandle, c_int) -> RawHandle;
// handle → new handle
pub type HandleFn = unsafe extern "C" fn(RawHandle) -> RawHandle;
// handle, UUID bytes → new handle
pub type UuidHandleFn = unsafe extern "C" fn(RawHandle, *const c_uchar) -> RawHandle;
// handle, UUID out-buffer → int
pub type UuidOutFn = unsafe extern "C" fn(RawHandle, *mut c_uchar) -> c_int;
// handle, UUID-string out-buffer → int
pub type UuidStringOutFn = unsafe extern "C" fn(RawHandle, *mut c_char) -> c_int;
// handle, int out-parameter → int
pub type OutIntFn = unsafe extern "C" fn(RawHandle, *mut c_int) -> c_int;
// handle, ulong out-parameter → int
pub type OutUlongFn = unsafe extern "C" fn(RawHandle, *mut c_ulong) -> c_int;

fn int_status(ctx: &ErrorContext, op: &'static str, status: c_int) -> BindResult<i32> {
	if status < 0 {
		return Err(ctx.failure(op));
	}
	ctx.success(op);
	Ok(status)
}

fn handle_result(ctx: &ErrorContext, op: &'static str, handle: RawHandle) -> BindResult<RawHandle> {
	if handle.is_null() {
		return Err(ctx.failure(op));
	}
	ctx.success(op);
	trace!("{op} -> {:#x}", handle.token());
	Ok(handle)
}

fn string_result(
	ctx: &ErrorContext,
	op: &'static str,
	value: Option<String>,
) -> BindResult<Option<String>> {
	match value {
		Some(value) => {
			ctx.success(op);
			Ok(Some(value))
		}
		// Null with no recorded error means "no value", not a failure.
		None => match ctx.take() {
			Some(error) => Err(error.into()),
			None => Ok(None),
		},
	}
}

/// Status/count queries and free/destroy/close operations.
pub fn call_int(ctx: &ErrorContext, op: &'static str, f: IntFn, h: RawHandle) -> BindResult<i32> {
	int_status(ctx, op, unsafe { f(h) })
}

/// Flag-qualified mutations.
pub fn call_int_flags(
	ctx: &ErrorContext,
	op: &'static str,
	f: IntFlagsFn,
	h: RawHandle,
	flags: u32,
) -> BindResult<i32> {
	int_status(ctx, op, unsafe { f(h, flags) })
}

/// Mutations taking a plain int argument (autostart, vcpu count).
pub fn call_int_arg(
	ctx: &ErrorContext,
	op: &'static str,
	f: IntArgFn,
	h: RawHandle,
	arg: i32,
) -> BindResult<i32> {
	int_status(ctx, op, unsafe { f(h, arg) })
}

/// Mutations taking an unsigned long argument (memory sizes).
pub fn call_int_ulong(
	ctx: &ErrorContext,
	op: &'static str,
	f: IntUlongFn,
	h: RawHandle,
	arg: u64,
) -> BindResult<i32> {
	int_status(ctx, op, unsafe { f(h, arg as c_ulong) })
}

/// Getters returning an unsigned long directly, with 0 as the failure
/// value (`virDomainGetMaxMemory`).
pub fn call_ulong(
	ctx: &ErrorContext,
	op: &'static str,
	f: UlongFn,
	h: RawHandle,
) -> BindResult<u64> {
	let value = unsafe { f(h) };
	if value == 0 {
		return Err(ctx.failure(op));
	}
	ctx.success(op);
	Ok(value as u64)
}

/// Getters returning a string owned by the native library.
pub fn call_const_string(
	ctx: &ErrorContext,
	op: &'static str,
	f: ConstStrFn,
	h: RawHandle,
) -> BindResult<Option<String>> {
	let value = marshal::const_string(unsafe { f(h) });
	string_result(ctx, op, value)
}

/// Getters returning a string this layer must free after copying.
pub fn call_owned_string(
	ctx: &ErrorContext,
	op: &'static str,
	f: OwnedStrFn,
	h: RawHandle,
) -> BindResult<Option<String>> {
	let value = marshal::owned_string(unsafe { f(h) });
	string_result(ctx, op, value)
}

/// Flag-qualified owned-string getters (XML descriptions).
pub fn call_owned_string_flags(
	ctx: &ErrorContext,
	op: &'static str,
	f: OwnedStrFlagsFn,
	h: RawHandle,
	flags: u32,
) -> BindResult<Option<String>> {
	let value = marshal::owned_string(unsafe { f(h, flags) });
	string_result(ctx, op, value)
}

/// XML-bearing mutations (attach/detach/save/restore).
pub fn call_str_int(
	ctx: &ErrorContext,
	op: &'static str,
	f: StrIntFn,
	h: RawHandle,
	arg: &str,
) -> BindResult<i32> {
	let status = marshal::with_cstr(arg, |ptr| unsafe { f(h, ptr) })?;
	int_status(ctx, op, status)
}

/// XML-bearing, flag-qualified mutations (core dump, delete with flags).
pub fn call_str_flags_int(
	ctx: &ErrorContext,
	op: &'static str,
	f: StrFlagsIntFn,
	h: RawHandle,
	arg: &str,
	flags: u32,
) -> BindResult<i32> {
	let status = marshal::with_cstr(arg, |ptr| unsafe { f(h, ptr, flags) })?;
	int_status(ctx, op, status)
}

/// Creation, definition and lookup-by-string calls yielding a new handle.
pub fn call_lookup(
	ctx: &ErrorContext,
	op: &'static str,
	f: StrHandleFn,
	h: RawHandle,
	arg: &str,
) -> BindResult<RawHandle> {
	let handle = marshal::with_cstr(arg, |ptr| unsafe { f(h, ptr) })?;
	handle_result(ctx, op, handle)
}

/// Flag-qualified creation calls.
pub fn call_lookup_flags(
	ctx: &ErrorContext,
	op: &'static str,
	f: StrFlagsHandleFn,
	h: RawHandle,
	arg: &str,
	flags: u32,
) -> BindResult<RawHandle> {
	let handle = marshal::with_cstr(arg, |ptr| unsafe { f(h, ptr, flags) })?;
	handle_result(ctx, op, handle)
}

/// Lookup by numeric id.
pub fn call_lookup_int(
	ctx: &ErrorContext,
	op: &'static str,
	f: IntHandleFn,
	h: RawHandle,
	id: i32,
) -> BindResult<RawHandle> {
	handle_result(ctx, op, unsafe { f(h, id) })
}

/// Handle-to-handle navigation (`virStoragePoolLookupByVolume`).
pub fn call_handle(
	ctx: &ErrorContext,
	op: &'static str,
	f: HandleFn,
	h: RawHandle,
) -> BindResult<RawHandle> {
	handle_result(ctx, op, unsafe { f(h) })
}

/// Lookup by raw 16-byte UUID.
pub fn call_lookup_uuid(
	ctx: &ErrorContext,
	op: &'static str,
	f: UuidHandleFn,
	h: RawHandle,
	uuid: &[u8; UUID_BUFLEN],
) -> BindResult<RawHandle> {
	handle_result(ctx, op, unsafe { f(h, uuid.as_ptr()) })
}

/// UUID getters filling the fixed 16-byte buffer.
pub fn call_uuid(
	ctx: &ErrorContext,
	op: &'static str,
	f: UuidOutFn,
	h: RawHandle,
) -> BindResult<[u8; UUID_BUFLEN]> {
	let mut uuid = [0u8; UUID_BUFLEN];
	let status = unsafe { f(h, uuid.as_mut_ptr()) };
	int_status(ctx, op, status)?;
	Ok(uuid)
}

/// UUID getters filling the canonical-string buffer.
pub fn call_uuid_string(
	ctx: &ErrorContext,
	op: &'static str,
	f: UuidStringOutFn,
	h: RawHandle,
) -> BindResult<String> {
	let mut buffer = [0 as c_char; UUID_STRING_BUFLEN];
	let status = unsafe { f(h, buffer.as_mut_ptr()) };
	int_status(ctx, op, status)?;
	let s = unsafe { CStr::from_ptr(buffer.as_ptr()) };
	Ok(s.to_string_lossy().into_owned())
}

/// Out-parameter boolean getters (`virDomainGetAutostart`).
pub fn call_out_flag(
	ctx: &ErrorContext,
	op: &'static str,
	f: OutIntFn,
	h: RawHandle,
) -> BindResult<bool> {
	let mut value: c_int = 0;
	let status = unsafe { f(h, &mut value) };
	int_status(ctx, op, status)?;
	Ok(marshal::int_bool(value))
}

/// Out-parameter unsigned-long getters (`virConnectGetVersion`).
pub fn call_out_ulong(
	ctx: &ErrorContext,
	op: &'static str,
	f: OutUlongFn,
	h: RawHandle,
) -> BindResult<u64> {
	let mut value: c_ulong = 0;
	let status = unsafe { f(h, &mut value) };
	int_status(ctx, op, status)?;
	Ok(value as u64)
}

/// Getters filling a plain-data native struct.
///
/// `T` must be a `#[repr(C)]` mirror of the native record for which the
/// all-zero bit pattern is a valid value.
pub fn call_fill<T: Copy>(
	ctx: &ErrorContext,
	op: &'static str,
	fill: impl FnOnce(*mut T) -> c_int,
) -> BindResult<T> {
	let mut value = unsafe { mem::zeroed::<T>() };
	let status = fill(&mut value);
	int_status(ctx, op, status)?;
	Ok(value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{BindError, ErrorDomain, ErrorLevel, ErrorNumber, NativeError};

	fn sample_error() -> NativeError {
		NativeError {
			code: ErrorNumber::OperationFailed,
			domain: ErrorDomain::Qemu,
			level: ErrorLevel::Error,
			message: "it broke".to_owned(),
			str1: None,
			str2: None,
			str3: None,
			int1: 0,
			int2: 0,
		}
	}

	extern "C" fn ret_zero(_: RawHandle) -> c_int {
		0
	}

	extern "C" fn ret_neg(_: RawHandle) -> c_int {
		-1
	}

	extern "C" fn ret_token(h: RawHandle) -> c_int {
		h.token() as c_int
	}

	extern "C" fn name_static(_: RawHandle) -> *const c_char {
		c"default".as_ptr()
	}

	extern "C" fn name_null(_: RawHandle) -> *const c_char {
		std::ptr::null()
	}

	extern "C" fn name_owned(_: RawHandle) -> *mut c_char {
		unsafe { libc::strdup(c"ostype-linux".as_ptr()) }
	}

	extern "C" fn lookup_null(_: RawHandle, _: *const c_char) -> RawHandle {
		RawHandle::NULL
	}

	extern "C" fn fill_uuid(_: RawHandle, out: *mut c_uchar) -> c_int {
		for i in 0..UUID_BUFLEN {
			unsafe { *out.add(i) = i as c_uchar };
		}
		0
	}

	#[test]
	fn int_shape_passes_the_handle_through() {
		let ctx = ErrorContext::new();
		let h = RawHandle::from_token(1234);
		assert_eq!(call_int(&ctx, "virTestOp", ret_token, h).unwrap(), 1234);
		assert_eq!(call_int(&ctx, "virTestOp", ret_zero, h).unwrap(), 0);
	}

	#[test]
	fn negative_status_drains_the_context() {
		let ctx = ErrorContext::new();
		ctx.record(sample_error());
		let err = call_int(&ctx, "virTestOp", ret_neg, RawHandle::NULL).unwrap_err();
		match err {
			BindError::Native(native) => assert_eq!(native.message, "it broke"),
			other => panic!("unexpected error: {other:?}"),
		}
		// The error was delivered exactly once.
		assert!(ctx.take().is_none());
	}

	#[test]
	fn negative_status_without_detail_is_still_an_error() {
		let ctx = ErrorContext::new();
		assert_eq!(
			call_int(&ctx, "virTestOp", ret_neg, RawHandle::NULL).unwrap_err(),
			BindError::CallFailed("virTestOp")
		);
	}

	#[test]
	fn null_string_without_error_is_absent() {
		let ctx = ErrorContext::new();
		assert_eq!(
			call_const_string(&ctx, "virTestOp", name_null, RawHandle::NULL).unwrap(),
			None
		);
	}

	#[test]
	fn null_string_with_recorded_error_fails() {
		let ctx = ErrorContext::new();
		ctx.record(sample_error());
		assert!(call_const_string(&ctx, "virTestOp", name_null, RawHandle::NULL).is_err());
	}

	#[test]
	fn string_shapes_copy_the_value() {
		let ctx = ErrorContext::new();
		assert_eq!(
			call_const_string(&ctx, "virTestOp", name_static, RawHandle::NULL).unwrap(),
			Some("default".to_owned())
		);
		assert_eq!(
			call_owned_string(&ctx, "virTestOp", name_owned, RawHandle::NULL).unwrap(),
			Some("ostype-linux".to_owned())
		);
	}

	#[test]
	fn null_handle_is_a_failure() {
		let ctx = ErrorContext::new();
		assert!(call_lookup(&ctx, "virTestOp", lookup_null, RawHandle::NULL, "name").is_err());
	}

	#[test]
	fn uuid_shape_returns_the_filled_buffer() {
		let ctx = ErrorContext::new();
		let uuid = call_uuid(&ctx, "virTestOp", fill_uuid, RawHandle::NULL).unwrap();
		assert_eq!(uuid[0], 0);
		assert_eq!(uuid[15], 15);
	}
}
