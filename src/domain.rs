//! The domain (guest) object.

use std::mem;
use std::os::raw::{c_int, c_ulong};
use std::ptr;
use std::rc::Rc;

use crate::BindResult;
use crate::connect::Connection;
use crate::dispatch;
use crate::error::ErrorContext;
use crate::flags::{MigrateFlags, XmlFlags};
use crate::handle::{DomainHandle, RawHandle};
use crate::info::{DomainBlockStats, DomainInfo, DomainInterfaceStats, RawVcpuInfo, VcpuInfo};
use crate::marshal::{self, UUID_BUFLEN};
use crate::ops::VirtOps;
use crate::param::{self, SchedParameter};

/// A domain handle bound to the connection it was looked up through.
#[derive(Debug)]
pub struct Domain {
	handle: DomainHandle,
	ctx: Rc<ErrorContext>,
	ops: &'static VirtOps,
}

impl Domain {
	pub(crate) fn new(handle: RawHandle, ctx: Rc<ErrorContext>, ops: &'static VirtOps) -> Self {
		Self {
			handle: DomainHandle::new(handle),
			ctx,
			ops,
		}
	}

	pub fn handle(&self) -> DomainHandle {
		self.handle
	}

	/// `virDomainFree`. Consumes the wrapper; the native handle is
	/// invalid afterwards.
	pub fn free(self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virDomainFree",
			self.ops.domain.free,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virDomainGetID`
	pub fn id(&self) -> BindResult<i32> {
		dispatch::call_int(
			&self.ctx,
			"virDomainGetID",
			self.ops.domain.get_id,
			self.handle.raw(),
		)
	}

	/// `virDomainGetName`. The native string lives as long as the domain
	/// object; only the copy is returned.
	pub fn name(&self) -> BindResult<Option<String>> {
		dispatch::call_const_string(
			&self.ctx,
			"virDomainGetName",
			self.ops.domain.get_name,
			self.handle.raw(),
		)
	}

	/// `virDomainGetOSType`
	pub fn os_type(&self) -> BindResult<Option<String>> {
		dispatch::call_owned_string(
			&self.ctx,
			"virDomainGetOSType",
			self.ops.domain.get_os_type,
			self.handle.raw(),
		)
	}

	/// `virDomainGetXMLDesc`
	pub fn xml_desc(&self, flags: XmlFlags) -> BindResult<Option<String>> {
		dispatch::call_owned_string_flags(
			&self.ctx,
			"virDomainGetXMLDesc",
			self.ops.domain.get_xml_desc,
			self.handle.raw(),
			flags.bits(),
		)
	}

	/// `virDomainGetUUID`
	pub fn uuid(&self) -> BindResult<[u8; UUID_BUFLEN]> {
		dispatch::call_uuid(
			&self.ctx,
			"virDomainGetUUID",
			self.ops.domain.get_uuid,
			self.handle.raw(),
		)
	}

	/// `virDomainGetUUIDString`
	pub fn uuid_string(&self) -> BindResult<String> {
		dispatch::call_uuid_string(
			&self.ctx,
			"virDomainGetUUIDString",
			self.ops.domain.get_uuid_string,
			self.handle.raw(),
		)
	}

	/// `virDomainGetInfo`
	pub fn info(&self) -> BindResult<DomainInfo> {
		let raw = dispatch::call_fill(&self.ctx, "virDomainGetInfo", |out| unsafe {
			(self.ops.domain.get_info)(self.handle.raw(), out)
		})?;
		Ok(DomainInfo::from_raw(&raw))
	}

	/// `virDomainGetAutostart`
	pub fn autostart(&self) -> BindResult<bool> {
		dispatch::call_out_flag(
			&self.ctx,
			"virDomainGetAutostart",
			self.ops.domain.get_autostart,
			self.handle.raw(),
		)
	}

	/// `virDomainSetAutostart`
	pub fn set_autostart(&self, autostart: bool) -> BindResult<()> {
		dispatch::call_int_arg(
			&self.ctx,
			"virDomainSetAutostart",
			self.ops.domain.set_autostart,
			self.handle.raw(),
			autostart as i32,
		)
		.map(drop)
	}

	/// `virDomainGetMaxMemory` (in kibibytes)
	pub fn max_memory(&self) -> BindResult<u64> {
		dispatch::call_ulong(
			&self.ctx,
			"virDomainGetMaxMemory",
			self.ops.domain.get_max_memory,
			self.handle.raw(),
		)
	}

	/// `virDomainSetMaxMemory`
	pub fn set_max_memory(&self, kibibytes: u64) -> BindResult<()> {
		dispatch::call_int_ulong(
			&self.ctx,
			"virDomainSetMaxMemory",
			self.ops.domain.set_max_memory,
			self.handle.raw(),
			kibibytes,
		)
		.map(drop)
	}

	/// `virDomainSetMemory`
	pub fn set_memory(&self, kibibytes: u64) -> BindResult<()> {
		dispatch::call_int_ulong(
			&self.ctx,
			"virDomainSetMemory",
			self.ops.domain.set_memory,
			self.handle.raw(),
			kibibytes,
		)
		.map(drop)
	}

	/// `virDomainGetMaxVcpus`
	pub fn max_vcpus(&self) -> BindResult<i32> {
		dispatch::call_int(
			&self.ctx,
			"virDomainGetMaxVcpus",
			self.ops.domain.get_max_vcpus,
			self.handle.raw(),
		)
	}

	/// `virDomainGetVcpus`, without cpumaps. The current vcpu count from
	/// `virDomainGetInfo` sizes the buffer; the call's own return value
	/// governs how many entries come back.
	pub fn vcpus(&self) -> BindResult<Vec<VcpuInfo>> {
		let count = self.info()?.nr_virt_cpu;
		let mut raw = vec![RawVcpuInfo::zeroed(); count as usize];
		let filled = unsafe {
			(self.ops.domain.get_vcpus)(
				self.handle.raw(),
				raw.as_mut_ptr(),
				raw.len() as c_int,
				ptr::null_mut(),
				0,
			)
		};
		if filled < 0 {
			return Err(self.ctx.failure("virDomainGetVcpus"));
		}
		self.ctx.success("virDomainGetVcpus");
		Ok(raw
			.iter()
			.take(filled as usize)
			.map(VcpuInfo::from_raw)
			.collect())
	}

	/// `virDomainSetVcpus`
	pub fn set_vcpus(&self, count: i32) -> BindResult<()> {
		dispatch::call_int_arg(
			&self.ctx,
			"virDomainSetVcpus",
			self.ops.domain.set_vcpus,
			self.handle.raw(),
			count,
		)
		.map(drop)
	}

	/// `virDomainSuspend`
	pub fn suspend(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virDomainSuspend",
			self.ops.domain.suspend,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virDomainResume`
	pub fn resume(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virDomainResume",
			self.ops.domain.resume,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virDomainCreate`: start a defined domain.
	pub fn create(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virDomainCreate",
			self.ops.domain.create,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virDomainDestroy`
	pub fn destroy(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virDomainDestroy",
			self.ops.domain.destroy,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virDomainShutdown`
	pub fn shutdown(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virDomainShutdown",
			self.ops.domain.shutdown,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virDomainReboot`
	pub fn reboot(&self, flags: u32) -> BindResult<()> {
		dispatch::call_int_flags(
			&self.ctx,
			"virDomainReboot",
			self.ops.domain.reboot,
			self.handle.raw(),
			flags,
		)
		.map(drop)
	}

	/// `virDomainUndefine`
	pub fn undefine(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virDomainUndefine",
			self.ops.domain.undefine,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virDomainSave`
	pub fn save(&self, path: &str) -> BindResult<()> {
		dispatch::call_str_int(
			&self.ctx,
			"virDomainSave",
			self.ops.domain.save,
			self.handle.raw(),
			path,
		)
		.map(drop)
	}

	/// `virDomainCoreDump`
	pub fn core_dump(&self, path: &str, flags: u32) -> BindResult<()> {
		dispatch::call_str_flags_int(
			&self.ctx,
			"virDomainCoreDump",
			self.ops.domain.core_dump,
			self.handle.raw(),
			path,
			flags,
		)
		.map(drop)
	}

	/// `virDomainAttachDevice`
	pub fn attach_device(&self, xml: &str) -> BindResult<()> {
		dispatch::call_str_int(
			&self.ctx,
			"virDomainAttachDevice",
			self.ops.domain.attach_device,
			self.handle.raw(),
			xml,
		)
		.map(drop)
	}

	/// `virDomainDetachDevice`
	pub fn detach_device(&self, xml: &str) -> BindResult<()> {
		dispatch::call_str_int(
			&self.ctx,
			"virDomainDetachDevice",
			self.ops.domain.detach_device,
			self.handle.raw(),
			xml,
		)
		.map(drop)
	}

	/// `virDomainGetSchedulerType`
	pub fn scheduler_type(&self) -> BindResult<Option<String>> {
		param::scheduler_type(
			&self.ctx,
			"virDomainGetSchedulerType",
			self.ops.domain.get_scheduler_type,
			self.handle.raw(),
		)
	}

	/// `virDomainGetSchedulerParameters`
	pub fn scheduler_parameters(&self) -> BindResult<Vec<SchedParameter>> {
		param::get_scheduler_parameters(
			&self.ctx,
			"virDomainGetSchedulerParameters",
			self.ops.domain.get_scheduler_type,
			self.ops.domain.get_scheduler_parameters,
			self.handle.raw(),
		)
	}

	/// `virDomainSetSchedulerParameters`
	pub fn set_scheduler_parameters(&self, params: &[SchedParameter]) -> BindResult<()> {
		param::set_scheduler_parameters(
			&self.ctx,
			"virDomainSetSchedulerParameters",
			self.ops.domain.set_scheduler_parameters,
			self.handle.raw(),
			params,
		)
	}

	/// `virDomainBlockStats`
	pub fn block_stats(&self, device: &str) -> BindResult<DomainBlockStats> {
		marshal::with_cstr(device, |dev| {
			dispatch::call_fill(&self.ctx, "virDomainBlockStats", |out| unsafe {
				(self.ops.domain.block_stats)(
					self.handle.raw(),
					dev,
					out,
					mem::size_of::<DomainBlockStats>(),
				)
			})
		})?
	}

	/// `virDomainInterfaceStats`
	pub fn interface_stats(&self, device: &str) -> BindResult<DomainInterfaceStats> {
		marshal::with_cstr(device, |dev| {
			dispatch::call_fill(&self.ctx, "virDomainInterfaceStats", |out| unsafe {
				(self.ops.domain.interface_stats)(
					self.handle.raw(),
					dev,
					out,
					mem::size_of::<DomainInterfaceStats>(),
				)
			})
		})?
	}

	/// `virDomainMigrate`: the returned domain belongs to `dest` and
	/// shares its error context.
	pub fn migrate(
		&self,
		dest: &Connection,
		flags: MigrateFlags,
		dest_name: Option<&str>,
		uri: Option<&str>,
		bandwidth_mbps: u64,
	) -> BindResult<Domain> {
		let handle = marshal::with_opt_cstr(dest_name, |dname| {
			marshal::with_opt_cstr(uri, |uri| unsafe {
				(self.ops.domain.migrate)(
					self.handle.raw(),
					dest.handle().raw(),
					flags.bits() as c_ulong,
					dname,
					uri,
					bandwidth_mbps as c_ulong,
				)
			})
		})??;
		if handle.is_null() {
			return Err(self.ctx.failure("virDomainMigrate"));
		}
		self.ctx.success("virDomainMigrate");
		Ok(Domain::new(
			handle,
			Rc::clone(dest.error_context()),
			dest.virt_ops(),
		))
	}
}
