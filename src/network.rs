//! The virtual network object.

use std::rc::Rc;

use crate::BindResult;
use crate::dispatch;
use crate::error::ErrorContext;
use crate::flags::XmlFlags;
use crate::handle::{NetworkHandle, RawHandle};
use crate::marshal::UUID_BUFLEN;
use crate::ops::VirtOps;

#[derive(Debug)]
pub struct Network {
	handle: NetworkHandle,
	ctx: Rc<ErrorContext>,
	ops: &'static VirtOps,
}

impl Network {
	pub(crate) fn new(handle: RawHandle, ctx: Rc<ErrorContext>, ops: &'static VirtOps) -> Self {
		Self {
			handle: NetworkHandle::new(handle),
			ctx,
			ops,
		}
	}

	pub fn handle(&self) -> NetworkHandle {
		self.handle
	}

	/// `virNetworkFree`
	pub fn free(self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virNetworkFree",
			self.ops.network.free,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virNetworkGetName`
	pub fn name(&self) -> BindResult<Option<String>> {
		dispatch::call_const_string(
			&self.ctx,
			"virNetworkGetName",
			self.ops.network.get_name,
			self.handle.raw(),
		)
	}

	/// `virNetworkGetBridgeName`
	pub fn bridge_name(&self) -> BindResult<Option<String>> {
		dispatch::call_owned_string(
			&self.ctx,
			"virNetworkGetBridgeName",
			self.ops.network.get_bridge_name,
			self.handle.raw(),
		)
	}

	/// `virNetworkGetXMLDesc`
	pub fn xml_desc(&self, flags: XmlFlags) -> BindResult<Option<String>> {
		dispatch::call_owned_string_flags(
			&self.ctx,
			"virNetworkGetXMLDesc",
			self.ops.network.get_xml_desc,
			self.handle.raw(),
			flags.bits(),
		)
	}

	/// `virNetworkGetUUID`
	pub fn uuid(&self) -> BindResult<[u8; UUID_BUFLEN]> {
		dispatch::call_uuid(
			&self.ctx,
			"virNetworkGetUUID",
			self.ops.network.get_uuid,
			self.handle.raw(),
		)
	}

	/// `virNetworkGetUUIDString`
	pub fn uuid_string(&self) -> BindResult<String> {
		dispatch::call_uuid_string(
			&self.ctx,
			"virNetworkGetUUIDString",
			self.ops.network.get_uuid_string,
			self.handle.raw(),
		)
	}

	/// `virNetworkGetAutostart`
	pub fn autostart(&self) -> BindResult<bool> {
		dispatch::call_out_flag(
			&self.ctx,
			"virNetworkGetAutostart",
			self.ops.network.get_autostart,
			self.handle.raw(),
		)
	}

	/// `virNetworkSetAutostart`
	pub fn set_autostart(&self, autostart: bool) -> BindResult<()> {
		dispatch::call_int_arg(
			&self.ctx,
			"virNetworkSetAutostart",
			self.ops.network.set_autostart,
			self.handle.raw(),
			autostart as i32,
		)
		.map(drop)
	}

	/// `virNetworkCreate`: start a defined network.
	pub fn create(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virNetworkCreate",
			self.ops.network.create,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virNetworkDestroy`
	pub fn destroy(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virNetworkDestroy",
			self.ops.network.destroy,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virNetworkUndefine`
	pub fn undefine(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virNetworkUndefine",
			self.ops.network.undefine,
			self.handle.raw(),
		)
		.map(drop)
	}
}
