//! Structured native errors and their conversion into Rust errors.
//!
//! libvirt reports failures out-of-band: a handler registered per
//! connection receives a `virError` record, while the failing call still
//! returns its failure status in-band. The [`ErrorContext`] bridges the
//! two channels. It is an explicit per-connection value handed to every
//! dispatch call; the native handler records into it, and the dispatch
//! layer drains it at the point of failure so that every native failure
//! maps to exactly one `Err` and no success leaves a recorded error
//! behind.

use std::cell::Cell;
use std::ffi::NulError;
use std::fmt;
use std::mem;
use std::os::raw::{c_char, c_int, c_void};

use thiserror::Error;

use crate::marshal::const_string;

/// `#[repr(C)]` mirror of `virError`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawError {
	pub code: c_int,
	pub domain: c_int,
	pub message: *const c_char,
	pub level: c_int,
	pub conn: *mut c_void,
	pub dom: *mut c_void,
	pub str1: *const c_char,
	pub str2: *const c_char,
	pub str3: *const c_char,
	pub int1: c_int,
	pub int2: c_int,
	pub net: *mut c_void,
}

impl RawError {
	pub fn zeroed() -> Self {
		unsafe { mem::zeroed() }
	}
}

ordinal_enum!(
	/// `virErrorLevel`
	pub enum ErrorLevel {
		None,
		Warning,
		Error,
	}
);

ordinal_enum!(
	/// `virErrorDomain`
	pub enum ErrorDomain {
		None,
		Xen,
		Xend,
		Xenstore,
		Sexpr,
		Xml,
		Dom,
		Rpc,
		Proxy,
		Conf,
		Qemu,
		Net,
		Test,
		Remote,
		Openvz,
	}
);

ordinal_enum!(
	/// `virErrorNumber`
	pub enum ErrorNumber {
		Ok,
		InternalError,
		NoMemory,
		NoSupport,
		UnknownHost,
		NoConnect,
		InvalidConn,
		InvalidDomain,
		InvalidArg,
		OperationFailed,
		GetFailed,
		PostFailed,
		HttpError,
		SexprSerial,
		NoXen,
		XenCall,
		OsType,
		NoKernel,
		NoRoot,
		NoSource,
		NoTarget,
		NoName,
		NoOs,
		NoDevice,
		NoXenstore,
		DriverFull,
		CallFailed,
		XmlError,
		DomExist,
		OperationDenied,
		OpenFailed,
		ReadFailed,
		ParseFailed,
		ConfSyntax,
		WriteFailed,
		XmlDetail,
		InvalidNetwork,
		NetworkExist,
		SystemError,
		Rpc,
		GnutlsError,
		WarNoNetwork,
		NoDomain,
		NoNetwork,
		InvalidMac,
	}
);

/// An owned copy of a `virError` record.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("libvirt error {code:?} from {domain:?}: {message}")]
pub struct NativeError {
	pub code: ErrorNumber,
	pub domain: ErrorDomain,
	pub level: ErrorLevel,
	pub message: String,
	pub str1: Option<String>,
	pub str2: Option<String>,
	pub str3: Option<String>,
	pub int1: i32,
	pub int2: i32,
}

impl NativeError {
	/// Copies every field out of a native record. The record stays owned
	/// by the native library.
	///
	/// # Safety
	///
	/// The string pointers in `raw`, when non-null, must point to valid
	/// NUL-terminated buffers.
	pub unsafe fn from_raw(raw: &RawError) -> Self {
		Self {
			code: ErrorNumber::from_native(raw.code),
			domain: ErrorDomain::from_native(raw.domain),
			level: ErrorLevel::from_native(raw.level),
			message: const_string(raw.message).unwrap_or_default(),
			str1: const_string(raw.str1),
			str2: const_string(raw.str2),
			str3: const_string(raw.str3),
			int1: raw.int1,
			int2: raw.int2,
		}
	}
}

/// Errors surfaced by the binding layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
	/// The native library reported a structured error.
	#[error(transparent)]
	Native(#[from] NativeError),
	/// A native call failed without leaving a structured error behind.
	#[error("native call {0} failed without recorded error detail")]
	CallFailed(&'static str),
	/// An outbound string cannot be represented as a C string.
	#[error("argument string contains an interior nul byte")]
	Nul(#[from] NulError),
	#[error("`{0}` is not a valid UUID string")]
	InvalidUuid(String),
	/// A parameter field name does not fit the fixed native buffer.
	#[error("parameter field `{0}` exceeds the native field buffer")]
	FieldTooLong(String),
	#[error("unknown typed parameter tag {0}")]
	UnknownParamType(i32),
}

/// The signature of `virErrorFunc`.
pub type ErrorHandlerFn = unsafe extern "C" fn(*mut c_void, *const RawError);

/// Per-connection pending-error slot.
///
/// Deliberately `!Sync`: the native library's thread-safety contract for a
/// connection governs concurrent use, and this layer neither weakens nor
/// strengthens it. One context belongs to one connection.
#[derive(Default)]
pub struct ErrorContext {
	pending: Cell<Option<NativeError>>,
}

// Not derivable: `Cell<T>: Debug` wants `T: Copy`, and the pending error
// owns its strings. The slot stays opaque here.
impl fmt::Debug for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ErrorContext").finish_non_exhaustive()
	}
}

impl ErrorContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// The `userdata` pointer to register together with [`error_handler`].
	/// The context must outlive the registration.
	pub fn as_user_data(&self) -> *mut c_void {
		std::ptr::from_ref(self).cast_mut().cast()
	}

	/// Stores a freshly reported error. An undelivered previous error is
	/// replaced; that means a failure went unchecked somewhere.
	pub fn record(&self, error: NativeError) {
		if let Some(stale) = self.pending.replace(Some(error)) {
			warn!("replacing undelivered native error: {stale}");
		}
	}

	pub fn take(&self) -> Option<NativeError> {
		self.pending.take()
	}

	/// Drains the pending error after a failed native call.
	pub(crate) fn failure(&self, op: &'static str) -> BindError {
		match self.take() {
			Some(error) => {
				debug!("{op}: {error}");
				BindError::Native(error)
			}
			None => {
				debug!("{op}: failure status without structured error");
				BindError::CallFailed(op)
			}
		}
	}

	/// Keeps the two error channels consistent after a successful call.
	pub(crate) fn success(&self, op: &'static str) {
		if let Some(error) = self.take() {
			warn!("{op}: discarding error recorded on a successful call: {error}");
		}
	}
}

/// Native-facing error callback.
///
/// # Safety
///
/// `userdata` must be the [`ErrorContext::as_user_data`] pointer of a live
/// context registered on the reporting connection, and the call must
/// happen on the thread driving that connection.
pub unsafe extern "C" fn error_handler(userdata: *mut c_void, error: *const RawError) {
	if userdata.is_null() || error.is_null() {
		return;
	}
	let ctx = unsafe { &*userdata.cast::<ErrorContext>() };
	let native = unsafe { NativeError::from_raw(&*error) };
	ctx.record(native);
}
