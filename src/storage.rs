//! Storage pool and volume objects.

use std::rc::Rc;

use crate::BindResult;
use crate::dispatch;
use crate::error::ErrorContext;
use crate::flags::XmlFlags;
use crate::handle::{RawHandle, StoragePoolHandle, StorageVolHandle};
use crate::info::{StoragePoolInfo, StorageVolInfo};
use crate::list;
use crate::marshal::UUID_BUFLEN;
use crate::ops::VirtOps;

#[derive(Debug)]
pub struct StoragePool {
	handle: StoragePoolHandle,
	ctx: Rc<ErrorContext>,
	ops: &'static VirtOps,
}

impl StoragePool {
	pub(crate) fn new(handle: RawHandle, ctx: Rc<ErrorContext>, ops: &'static VirtOps) -> Self {
		Self {
			handle: StoragePoolHandle::new(handle),
			ctx,
			ops,
		}
	}

	pub fn handle(&self) -> StoragePoolHandle {
		self.handle
	}

	/// `virStoragePoolFree`
	pub fn free(self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virStoragePoolFree",
			self.ops.storage_pool.free,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virStoragePoolGetName`
	pub fn name(&self) -> BindResult<Option<String>> {
		dispatch::call_const_string(
			&self.ctx,
			"virStoragePoolGetName",
			self.ops.storage_pool.get_name,
			self.handle.raw(),
		)
	}

	/// `virStoragePoolGetUUID`
	pub fn uuid(&self) -> BindResult<[u8; UUID_BUFLEN]> {
		dispatch::call_uuid(
			&self.ctx,
			"virStoragePoolGetUUID",
			self.ops.storage_pool.get_uuid,
			self.handle.raw(),
		)
	}

	/// `virStoragePoolGetUUIDString`
	pub fn uuid_string(&self) -> BindResult<String> {
		dispatch::call_uuid_string(
			&self.ctx,
			"virStoragePoolGetUUIDString",
			self.ops.storage_pool.get_uuid_string,
			self.handle.raw(),
		)
	}

	/// `virStoragePoolGetXMLDesc`
	pub fn xml_desc(&self, flags: XmlFlags) -> BindResult<Option<String>> {
		dispatch::call_owned_string_flags(
			&self.ctx,
			"virStoragePoolGetXMLDesc",
			self.ops.storage_pool.get_xml_desc,
			self.handle.raw(),
			flags.bits(),
		)
	}

	/// `virStoragePoolGetInfo`
	pub fn info(&self) -> BindResult<StoragePoolInfo> {
		let raw = dispatch::call_fill(&self.ctx, "virStoragePoolGetInfo", |out| unsafe {
			(self.ops.storage_pool.get_info)(self.handle.raw(), out)
		})?;
		Ok(StoragePoolInfo::from_raw(&raw))
	}

	/// `virStoragePoolGetAutostart`
	pub fn autostart(&self) -> BindResult<bool> {
		dispatch::call_out_flag(
			&self.ctx,
			"virStoragePoolGetAutostart",
			self.ops.storage_pool.get_autostart,
			self.handle.raw(),
		)
	}

	/// `virStoragePoolSetAutostart`
	pub fn set_autostart(&self, autostart: bool) -> BindResult<()> {
		dispatch::call_int_arg(
			&self.ctx,
			"virStoragePoolSetAutostart",
			self.ops.storage_pool.set_autostart,
			self.handle.raw(),
			autostart as i32,
		)
		.map(drop)
	}

	/// `virStoragePoolBuild`
	pub fn build(&self, flags: u32) -> BindResult<()> {
		dispatch::call_int_flags(
			&self.ctx,
			"virStoragePoolBuild",
			self.ops.storage_pool.build,
			self.handle.raw(),
			flags,
		)
		.map(drop)
	}

	/// `virStoragePoolCreate`: start a defined pool.
	pub fn create(&self, flags: u32) -> BindResult<()> {
		dispatch::call_int_flags(
			&self.ctx,
			"virStoragePoolCreate",
			self.ops.storage_pool.create,
			self.handle.raw(),
			flags,
		)
		.map(drop)
	}

	/// `virStoragePoolDestroy`
	pub fn destroy(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virStoragePoolDestroy",
			self.ops.storage_pool.destroy,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virStoragePoolDelete`
	pub fn delete(&self, flags: u32) -> BindResult<()> {
		dispatch::call_int_flags(
			&self.ctx,
			"virStoragePoolDelete",
			self.ops.storage_pool.delete,
			self.handle.raw(),
			flags,
		)
		.map(drop)
	}

	/// `virStoragePoolRefresh`
	pub fn refresh(&self, flags: u32) -> BindResult<()> {
		dispatch::call_int_flags(
			&self.ctx,
			"virStoragePoolRefresh",
			self.ops.storage_pool.refresh,
			self.handle.raw(),
			flags,
		)
		.map(drop)
	}

	/// `virStoragePoolUndefine`
	pub fn undefine(&self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virStoragePoolUndefine",
			self.ops.storage_pool.undefine,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// Volume names in this pool, via the count/list pair.
	pub fn list_volumes(&self) -> BindResult<Vec<String>> {
		list::string_list(
			&self.ctx,
			"virStoragePoolListVolumes",
			self.ops.storage_pool.num_of_volumes,
			self.ops.storage_pool.list_volumes,
			self.handle.raw(),
		)
	}

	fn wrap_volume(&self, handle: RawHandle) -> StorageVol {
		StorageVol::new(handle, Rc::clone(&self.ctx), self.ops)
	}

	/// `virStorageVolLookupByName`
	pub fn volume_lookup_by_name(&self, name: &str) -> BindResult<StorageVol> {
		dispatch::call_lookup(
			&self.ctx,
			"virStorageVolLookupByName",
			self.ops.storage_pool.vol_lookup_by_name,
			self.handle.raw(),
			name,
		)
		.map(|handle| self.wrap_volume(handle))
	}

	/// `virStorageVolCreateXML`
	pub fn volume_create_xml(&self, xml: &str, flags: u32) -> BindResult<StorageVol> {
		dispatch::call_lookup_flags(
			&self.ctx,
			"virStorageVolCreateXML",
			self.ops.storage_pool.vol_create_xml,
			self.handle.raw(),
			xml,
			flags,
		)
		.map(|handle| self.wrap_volume(handle))
	}
}

#[derive(Debug)]
pub struct StorageVol {
	handle: StorageVolHandle,
	ctx: Rc<ErrorContext>,
	ops: &'static VirtOps,
}

impl StorageVol {
	pub(crate) fn new(handle: RawHandle, ctx: Rc<ErrorContext>, ops: &'static VirtOps) -> Self {
		Self {
			handle: StorageVolHandle::new(handle),
			ctx,
			ops,
		}
	}

	pub fn handle(&self) -> StorageVolHandle {
		self.handle
	}

	/// `virStorageVolFree`
	pub fn free(self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virStorageVolFree",
			self.ops.storage_vol.free,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virStorageVolGetName`
	pub fn name(&self) -> BindResult<Option<String>> {
		dispatch::call_const_string(
			&self.ctx,
			"virStorageVolGetName",
			self.ops.storage_vol.get_name,
			self.handle.raw(),
		)
	}

	/// `virStorageVolGetKey`
	pub fn key(&self) -> BindResult<Option<String>> {
		dispatch::call_const_string(
			&self.ctx,
			"virStorageVolGetKey",
			self.ops.storage_vol.get_key,
			self.handle.raw(),
		)
	}

	/// `virStorageVolGetPath`
	pub fn path(&self) -> BindResult<Option<String>> {
		dispatch::call_owned_string(
			&self.ctx,
			"virStorageVolGetPath",
			self.ops.storage_vol.get_path,
			self.handle.raw(),
		)
	}

	/// `virStorageVolGetXMLDesc`
	pub fn xml_desc(&self, flags: XmlFlags) -> BindResult<Option<String>> {
		dispatch::call_owned_string_flags(
			&self.ctx,
			"virStorageVolGetXMLDesc",
			self.ops.storage_vol.get_xml_desc,
			self.handle.raw(),
			flags.bits(),
		)
	}

	/// `virStorageVolGetInfo`
	pub fn info(&self) -> BindResult<StorageVolInfo> {
		let raw = dispatch::call_fill(&self.ctx, "virStorageVolGetInfo", |out| unsafe {
			(self.ops.storage_vol.get_info)(self.handle.raw(), out)
		})?;
		Ok(StorageVolInfo::from_raw(&raw))
	}

	/// `virStorageVolDelete`
	pub fn delete(&self, flags: u32) -> BindResult<()> {
		dispatch::call_int_flags(
			&self.ctx,
			"virStorageVolDelete",
			self.ops.storage_vol.delete,
			self.handle.raw(),
			flags,
		)
		.map(drop)
	}

	/// `virStoragePoolLookupByVolume`
	pub fn pool(&self) -> BindResult<StoragePool> {
		dispatch::call_handle(
			&self.ctx,
			"virStoragePoolLookupByVolume",
			self.ops.storage_vol.pool_lookup_by_volume,
			self.handle.raw(),
		)
		.map(|handle| StoragePool::new(handle, Rc::clone(&self.ctx), self.ops))
	}
}
