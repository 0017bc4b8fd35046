//! The count-then-fill idiom for native list retrieval.
//!
//! libvirt exposes every enumeration as a `virConnectNumOf*` /
//! `virConnectList*` pair: the count call sizes the buffer, the list call
//! fills it. The set can change between the two calls; that race is
//! inherent to the idiom and carried here as-is. The fill call's return
//! value, not the possibly stale count, governs how many elements the
//! result has.

use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::BindResult;
use crate::dispatch::IntFn;
use crate::error::ErrorContext;
use crate::handle::RawHandle;
use crate::marshal;

pub type CountFn = IntFn;
// handle, name buffer, capacity → filled count
pub type ListNamesFn = unsafe extern "C" fn(RawHandle, *mut *mut c_char, c_int) -> c_int;
// handle, id buffer, capacity → filled count
pub type ListIdsFn = unsafe extern "C" fn(RawHandle, *mut c_int, c_int) -> c_int;

/// Retrieves a native name list (defined domains, networks, volumes...).
///
/// Every name buffer the native side hands over is freed exactly once,
/// also on the failure path.
pub fn string_list(
	ctx: &ErrorContext,
	op: &'static str,
	count: CountFn,
	list: ListNamesFn,
	h: RawHandle,
) -> BindResult<Vec<String>> {
	let capacity = unsafe { count(h) };
	if capacity < 0 {
		return Err(ctx.failure(op));
	}

	let mut names: Vec<*mut c_char> = vec![ptr::null_mut(); capacity as usize];
	let filled = unsafe { list(h, names.as_mut_ptr(), capacity) };

	// Take ownership of everything that was filled in before checking the
	// status, so nothing leaks when the fill call failed half-way.
	let copies: Vec<Option<String>> = names
		.into_iter()
		.map(marshal::owned_string)
		.collect();

	if filled < 0 {
		return Err(ctx.failure(op));
	}
	ctx.success(op);

	debug!("{op}: counted {capacity}, filled {filled}");
	Ok(copies
		.into_iter()
		.take(filled as usize)
		.map(Option::unwrap_or_default)
		.collect())
}

/// Retrieves a native id list (`virConnectListDomains`).
pub fn id_list(
	ctx: &ErrorContext,
	op: &'static str,
	count: CountFn,
	list: ListIdsFn,
	h: RawHandle,
) -> BindResult<Vec<i32>> {
	let capacity = unsafe { count(h) };
	if capacity < 0 {
		return Err(ctx.failure(op));
	}

	let mut ids = vec![0 as c_int; capacity as usize];
	let filled = unsafe { list(h, ids.as_mut_ptr(), capacity) };
	if filled < 0 {
		return Err(ctx.failure(op));
	}
	ctx.success(op);

	ids.truncate(filled as usize);
	Ok(ids)
}
