//! Scheduler parameter marshaling.
//!
//! `virSchedParameter` is a tagged union with a fixed-size field-name
//! buffer. A name that does not fit the buffer is rejected outright —
//! never truncated, never copied past the end.

use std::ffi::CString;
use std::fmt;
use std::mem;
use std::os::raw::{c_char, c_int, c_longlong, c_uint, c_ulonglong};

use crate::BindResult;
use crate::error::{BindError, ErrorContext};
use crate::handle::RawHandle;
use crate::marshal;

/// `VIR_DOMAIN_SCHED_FIELD_LENGTH`
pub const FIELD_LENGTH: usize = 80;

const TYPE_INT: c_int = 1;
const TYPE_UINT: c_int = 2;
const TYPE_LLONG: c_int = 3;
const TYPE_ULLONG: c_int = 4;
const TYPE_DOUBLE: c_int = 5;
const TYPE_BOOLEAN: c_int = 6;

/// `#[repr(C)]` mirror of the `virSchedParameter` value union.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawParamValue {
	pub i: c_int,
	pub ui: c_uint,
	pub l: c_longlong,
	pub ul: c_ulonglong,
	pub d: f64,
	pub b: c_char,
}

/// `#[repr(C)]` mirror of `virSchedParameter`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawSchedParameter {
	pub field: [c_char; FIELD_LENGTH],
	pub kind: c_int,
	pub value: RawParamValue,
}

impl RawSchedParameter {
	pub fn zeroed() -> Self {
		unsafe { mem::zeroed() }
	}
}

// The union only renders through its tag.
impl fmt::Debug for RawSchedParameter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match SchedParameter::from_raw(self) {
			Ok(param) => write!(f, "RawSchedParameter({param:?})"),
			Err(_) => write!(f, "RawSchedParameter(unknown kind {})", self.kind),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
	Int(i32),
	Uint(u32),
	Long(i64),
	Ulong(u64),
	Double(f64),
	Bool(bool),
}

/// One scheduler parameter as host code sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedParameter {
	pub field: String,
	pub value: ParamValue,
}

impl SchedParameter {
	pub fn new(field: impl Into<String>, value: ParamValue) -> Self {
		Self {
			field: field.into(),
			value,
		}
	}

	pub fn to_raw(&self) -> BindResult<RawSchedParameter> {
		let name = CString::new(self.field.as_str())?;
		let bytes = name.as_bytes_with_nul();
		if bytes.len() > FIELD_LENGTH {
			return Err(BindError::FieldTooLong(self.field.clone()));
		}

		let mut raw = RawSchedParameter::zeroed();
		for (dst, src) in raw.field.iter_mut().zip(bytes) {
			*dst = *src as c_char;
		}
		match self.value {
			ParamValue::Int(v) => {
				raw.kind = TYPE_INT;
				raw.value.i = v;
			}
			ParamValue::Uint(v) => {
				raw.kind = TYPE_UINT;
				raw.value.ui = v;
			}
			ParamValue::Long(v) => {
				raw.kind = TYPE_LLONG;
				raw.value.l = v;
			}
			ParamValue::Ulong(v) => {
				raw.kind = TYPE_ULLONG;
				raw.value.ul = v;
			}
			ParamValue::Double(v) => {
				raw.kind = TYPE_DOUBLE;
				raw.value.d = v;
			}
			ParamValue::Bool(v) => {
				raw.kind = TYPE_BOOLEAN;
				raw.value.b = v as c_char;
			}
		}
		Ok(raw)
	}

	pub fn from_raw(raw: &RawSchedParameter) -> BindResult<Self> {
		let len = raw
			.field
			.iter()
			.position(|&c| c == 0)
			.unwrap_or(FIELD_LENGTH);
		let bytes: Vec<u8> = raw.field[..len].iter().map(|&c| c as u8).collect();
		let field = String::from_utf8_lossy(&bytes).into_owned();

		let value = unsafe {
			match raw.kind {
				TYPE_INT => ParamValue::Int(raw.value.i),
				TYPE_UINT => ParamValue::Uint(raw.value.ui),
				TYPE_LLONG => ParamValue::Long(raw.value.l),
				TYPE_ULLONG => ParamValue::Ulong(raw.value.ul),
				TYPE_DOUBLE => ParamValue::Double(raw.value.d),
				TYPE_BOOLEAN => ParamValue::Bool(raw.value.b != 0),
				other => return Err(BindError::UnknownParamType(other)),
			}
		};
		Ok(Self { field, value })
	}
}

// handle, nparams out-parameter → scheduler type string the caller frees
pub type SchedTypeFn = unsafe extern "C" fn(RawHandle, *mut c_int) -> *mut c_char;
// handle, parameter buffer, nparams in/out → int
pub type SchedGetFn = unsafe extern "C" fn(RawHandle, *mut RawSchedParameter, *mut c_int) -> c_int;
// handle, parameter buffer, nparams → int
pub type SchedSetFn = unsafe extern "C" fn(RawHandle, *mut RawSchedParameter, c_int) -> c_int;

/// The scheduler type name (`virDomainGetSchedulerType`), discarding the
/// parameter count it reports on the side.
pub fn scheduler_type(
	ctx: &ErrorContext,
	op: &'static str,
	f: SchedTypeFn,
	h: RawHandle,
) -> BindResult<Option<String>> {
	let mut nparams: c_int = 0;
	let name = marshal::owned_string(unsafe { f(h, &mut nparams) });
	match name {
		Some(name) => {
			ctx.success(op);
			Ok(Some(name))
		}
		None => match ctx.take() {
			Some(error) => Err(error.into()),
			None => Ok(None),
		},
	}
}

/// The two-call scheduler parameter retrieval: the type call sizes the
/// buffer, the get call fills it and reports the count that governs.
pub fn get_scheduler_parameters(
	ctx: &ErrorContext,
	op: &'static str,
	type_fn: SchedTypeFn,
	get_fn: SchedGetFn,
	h: RawHandle,
) -> BindResult<Vec<SchedParameter>> {
	let mut nparams: c_int = 0;
	if marshal::owned_string(unsafe { type_fn(h, &mut nparams) }).is_none() || nparams < 0 {
		return Err(ctx.failure(op));
	}

	let mut raw = vec![RawSchedParameter::zeroed(); nparams as usize];
	let mut actual = nparams;
	if unsafe { get_fn(h, raw.as_mut_ptr(), &mut actual) } < 0 {
		return Err(ctx.failure(op));
	}
	ctx.success(op);

	raw.iter()
		.take(actual.clamp(0, nparams) as usize)
		.map(SchedParameter::from_raw)
		.collect()
}

pub fn set_scheduler_parameters(
	ctx: &ErrorContext,
	op: &'static str,
	set_fn: SchedSetFn,
	h: RawHandle,
	params: &[SchedParameter],
) -> BindResult<()> {
	let mut raw = params
		.iter()
		.map(SchedParameter::to_raw)
		.collect::<BindResult<Vec<_>>>()?;
	if unsafe { set_fn(h, raw.as_mut_ptr(), raw.len() as c_int) } < 0 {
		return Err(ctx.failure(op));
	}
	ctx.success(op);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn round_trip(param: SchedParameter) -> SchedParameter {
		SchedParameter::from_raw(&param.to_raw().unwrap()).unwrap()
	}

	#[test]
	fn all_six_types_round_trip() {
		let params = [
			SchedParameter::new("field_int", ParamValue::Int(-5)),
			SchedParameter::new("field_uint", ParamValue::Uint(5)),
			SchedParameter::new("field_long", ParamValue::Long(-500000000000)),
			SchedParameter::new("field_ulong", ParamValue::Ulong(500000000000)),
			SchedParameter::new("field_double", ParamValue::Double(3.14)),
			SchedParameter::new("field_bool", ParamValue::Bool(true)),
		];
		for param in params {
			assert_eq!(round_trip(param.clone()), param);
		}
	}

	#[test]
	fn field_name_at_the_buffer_limit() {
		// 79 bytes plus NUL exactly fills the native buffer.
		let longest = "f".repeat(FIELD_LENGTH - 1);
		let param = SchedParameter::new(longest.clone(), ParamValue::Int(1));
		assert_eq!(round_trip(param).field, longest);
	}

	#[test]
	fn oversized_field_name_is_rejected() {
		let too_long = "f".repeat(FIELD_LENGTH);
		let param = SchedParameter::new(too_long.clone(), ParamValue::Int(1));
		assert_eq!(
			param.to_raw().unwrap_err(),
			BindError::FieldTooLong(too_long)
		);
	}

	#[test]
	fn interior_nul_in_field_name_is_rejected() {
		let param = SchedParameter::new("bad\0name", ParamValue::Int(1));
		assert!(matches!(param.to_raw(), Err(BindError::Nul(_))));
	}

	#[test]
	fn raw_parameter_renders_through_its_tag() {
		let raw = SchedParameter::new("weight", ParamValue::Uint(256))
			.to_raw()
			.unwrap();
		let rendered = format!("{raw:?}");
		assert!(rendered.contains("weight"));
		assert!(rendered.contains("256"));

		let mut unknown = RawSchedParameter::zeroed();
		unknown.kind = 42;
		assert_eq!(format!("{unknown:?}"), "RawSchedParameter(unknown kind 42)");
	}

	#[test]
	fn unknown_native_tag_is_rejected() {
		let mut raw = RawSchedParameter::zeroed();
		raw.kind = 42;
		assert_eq!(
			SchedParameter::from_raw(&raw).unwrap_err(),
			BindError::UnknownParamType(42)
		);
	}

	extern "C" fn fake_type(_: RawHandle, nparams: *mut c_int) -> *mut c_char {
		unsafe { *nparams = 2 };
		unsafe { libc::strdup(c"credit".as_ptr()) }
	}

	extern "C" fn fake_get(
		_: RawHandle,
		params: *mut RawSchedParameter,
		nparams: *mut c_int,
	) -> c_int {
		let weight = SchedParameter::new("weight", ParamValue::Uint(256));
		unsafe {
			*params = weight.to_raw().unwrap();
			// Only one parameter is actually present; the sizing call
			// over-counted.
			*nparams = 1;
		}
		0
	}

	#[test]
	fn retrieval_respects_the_fill_count() {
		let ctx = ErrorContext::new();
		assert_eq!(
			scheduler_type(&ctx, "virDomainGetSchedulerType", fake_type, RawHandle::NULL)
				.unwrap()
				.as_deref(),
			Some("credit")
		);

		let params = get_scheduler_parameters(
			&ctx,
			"virDomainGetSchedulerParameters",
			fake_type,
			fake_get,
			RawHandle::NULL,
		)
		.unwrap();
		assert_eq!(params, [SchedParameter::new("weight", ParamValue::Uint(256))]);
	}
}
