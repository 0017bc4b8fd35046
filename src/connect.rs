//! The hypervisor connection object.

use std::os::raw::c_void;
use std::rc::Rc;

use crate::BindResult;
use crate::auth::{self, AuthCallback, CredentialKind};
use crate::dispatch;
use crate::domain::Domain;
use crate::error::{self, BindError, ErrorContext, NativeError, RawError};
use crate::flags::OpenFlags;
use crate::handle::{ConnectHandle, RawHandle};
use crate::info::NodeInfo;
use crate::list;
use crate::marshal::{self, UUID_BUFLEN};
use crate::network::Network;
use crate::ops::VirtOps;
use crate::storage::StoragePool;

/// A live connection to a hypervisor driver.
///
/// Every object looked up or created through a connection shares the
/// connection's [`ErrorContext`], which is registered as the native
/// per-connection error callback immediately after a successful open.
/// The context is not re-registered afterwards, so open calls on the
/// same native connection must not race with in-flight calls; like the
/// C API itself, a connection belongs to one thread at a time.
#[derive(Debug)]
pub struct Connection {
	handle: ConnectHandle,
	ctx: Rc<ErrorContext>,
	ops: &'static VirtOps,
}

impl Connection {
	/// `virConnectOpen`
	pub fn open(ops: &'static VirtOps, uri: &str) -> BindResult<Self> {
		let handle = marshal::with_cstr(uri, |ptr| unsafe { (ops.connect.open)(ptr) })?;
		Self::finish_open(ops, handle)
	}

	/// `virConnectOpenReadOnly`
	pub fn open_read_only(ops: &'static VirtOps, uri: &str) -> BindResult<Self> {
		let handle = marshal::with_cstr(uri, |ptr| unsafe { (ops.connect.open_read_only)(ptr) })?;
		Self::finish_open(ops, handle)
	}

	/// `virConnectOpenAuth`. The bridge context around `callback` lives
	/// exactly as long as the native call.
	pub fn open_auth(
		ops: &'static VirtOps,
		uri: &str,
		cred_types: &[CredentialKind],
		callback: &mut dyn AuthCallback,
		flags: OpenFlags,
	) -> BindResult<Self> {
		let handle = auth::with_auth(cred_types, callback, |auth| {
			marshal::with_cstr(uri, |ptr| unsafe {
				(ops.connect.open_auth)(ptr, auth, flags.bits())
			})
		})?;
		Self::finish_open(ops, handle)
	}

	fn finish_open(ops: &'static VirtOps, handle: RawHandle) -> BindResult<Self> {
		if handle.is_null() {
			// No per-connection handler exists yet; drain the native
			// last-error state instead.
			return Err(Self::last_error(ops));
		}

		let ctx = Rc::new(ErrorContext::new());
		let user_data = Rc::as_ptr(&ctx) as *mut c_void;
		unsafe { (ops.connect.set_error_func)(handle, user_data, error::error_handler) };
		debug!("opened connection {:#x}", handle.token());

		Ok(Self {
			handle: ConnectHandle::new(handle),
			ctx,
			ops,
		})
	}

	fn last_error(ops: &VirtOps) -> BindError {
		let mut raw = RawError::zeroed();
		let status = unsafe { (ops.connect.copy_last_error)(&mut raw) };
		if status <= 0 {
			return BindError::CallFailed("virConnectOpen");
		}
		BindError::Native(unsafe { NativeError::from_raw(&raw) })
	}

	pub fn handle(&self) -> ConnectHandle {
		self.handle
	}

	pub(crate) fn error_context(&self) -> &Rc<ErrorContext> {
		&self.ctx
	}

	pub(crate) fn virt_ops(&self) -> &'static VirtOps {
		self.ops
	}

	/// `virConnectClose`. Consumes the connection; the native handle is
	/// invalid afterwards.
	pub fn close(self) -> BindResult<()> {
		dispatch::call_int(
			&self.ctx,
			"virConnectClose",
			self.ops.connect.close,
			self.handle.raw(),
		)
		.map(drop)
	}

	/// `virConnectGetHostname`
	pub fn hostname(&self) -> BindResult<Option<String>> {
		dispatch::call_owned_string(
			&self.ctx,
			"virConnectGetHostname",
			self.ops.connect.get_hostname,
			self.handle.raw(),
		)
	}

	/// `virConnectGetCapabilities`
	pub fn capabilities(&self) -> BindResult<Option<String>> {
		dispatch::call_owned_string(
			&self.ctx,
			"virConnectGetCapabilities",
			self.ops.connect.get_capabilities,
			self.handle.raw(),
		)
	}

	/// `virConnectGetType`. The native string is static; only the copy is
	/// returned.
	pub fn driver_type(&self) -> BindResult<Option<String>> {
		dispatch::call_const_string(
			&self.ctx,
			"virConnectGetType",
			self.ops.connect.get_type,
			self.handle.raw(),
		)
	}

	/// `virConnectGetURI`
	pub fn uri(&self) -> BindResult<Option<String>> {
		dispatch::call_owned_string(
			&self.ctx,
			"virConnectGetURI",
			self.ops.connect.get_uri,
			self.handle.raw(),
		)
	}

	/// `virConnectGetVersion`: the hypervisor version number.
	pub fn version(&self) -> BindResult<u64> {
		dispatch::call_out_ulong(
			&self.ctx,
			"virConnectGetVersion",
			self.ops.connect.get_version,
			self.handle.raw(),
		)
	}

	/// `virConnectGetMaxVcpus`
	pub fn max_vcpus(&self, domain_type: &str) -> BindResult<i32> {
		dispatch::call_str_int(
			&self.ctx,
			"virConnectGetMaxVcpus",
			self.ops.connect.get_max_vcpus,
			self.handle.raw(),
			domain_type,
		)
	}

	/// `virNodeGetInfo`
	pub fn node_info(&self) -> BindResult<NodeInfo> {
		let raw = dispatch::call_fill(&self.ctx, "virNodeGetInfo", |out| unsafe {
			(self.ops.connect.node_get_info)(self.handle.raw(), out)
		})?;
		Ok(NodeInfo::from_raw(&raw))
	}

	/// `virConnectNumOfDomains`
	pub fn num_of_domains(&self) -> BindResult<i32> {
		dispatch::call_int(
			&self.ctx,
			"virConnectNumOfDomains",
			self.ops.connect.num_of_domains,
			self.handle.raw(),
		)
	}

	/// Running domain ids, via the count/list pair.
	pub fn list_domains(&self) -> BindResult<Vec<i32>> {
		list::id_list(
			&self.ctx,
			"virConnectListDomains",
			self.ops.connect.num_of_domains,
			self.ops.connect.list_domains,
			self.handle.raw(),
		)
	}

	/// Defined (inactive) domain names.
	pub fn list_defined_domains(&self) -> BindResult<Vec<String>> {
		list::string_list(
			&self.ctx,
			"virConnectListDefinedDomains",
			self.ops.connect.num_of_defined_domains,
			self.ops.connect.list_defined_domains,
			self.handle.raw(),
		)
	}

	/// Active network names.
	pub fn list_networks(&self) -> BindResult<Vec<String>> {
		list::string_list(
			&self.ctx,
			"virConnectListNetworks",
			self.ops.connect.num_of_networks,
			self.ops.connect.list_networks,
			self.handle.raw(),
		)
	}

	/// Defined (inactive) network names.
	pub fn list_defined_networks(&self) -> BindResult<Vec<String>> {
		list::string_list(
			&self.ctx,
			"virConnectListDefinedNetworks",
			self.ops.connect.num_of_defined_networks,
			self.ops.connect.list_defined_networks,
			self.handle.raw(),
		)
	}

	/// Active storage pool names.
	pub fn list_storage_pools(&self) -> BindResult<Vec<String>> {
		list::string_list(
			&self.ctx,
			"virConnectListStoragePools",
			self.ops.connect.num_of_storage_pools,
			self.ops.connect.list_storage_pools,
			self.handle.raw(),
		)
	}

	fn wrap_domain(&self, handle: RawHandle) -> Domain {
		Domain::new(handle, Rc::clone(&self.ctx), self.ops)
	}

	/// `virDomainLookupByID`
	pub fn domain_lookup_by_id(&self, id: i32) -> BindResult<Domain> {
		dispatch::call_lookup_int(
			&self.ctx,
			"virDomainLookupByID",
			self.ops.connect.domain_lookup_by_id,
			self.handle.raw(),
			id,
		)
		.map(|handle| self.wrap_domain(handle))
	}

	/// `virDomainLookupByName`
	pub fn domain_lookup_by_name(&self, name: &str) -> BindResult<Domain> {
		dispatch::call_lookup(
			&self.ctx,
			"virDomainLookupByName",
			self.ops.connect.domain_lookup_by_name,
			self.handle.raw(),
			name,
		)
		.map(|handle| self.wrap_domain(handle))
	}

	/// `virDomainLookupByUUID`
	pub fn domain_lookup_by_uuid(&self, uuid: &[u8; UUID_BUFLEN]) -> BindResult<Domain> {
		dispatch::call_lookup_uuid(
			&self.ctx,
			"virDomainLookupByUUID",
			self.ops.connect.domain_lookup_by_uuid,
			self.handle.raw(),
			uuid,
		)
		.map(|handle| self.wrap_domain(handle))
	}

	/// `virDomainLookupByUUIDString`
	pub fn domain_lookup_by_uuid_string(&self, uuid: &str) -> BindResult<Domain> {
		dispatch::call_lookup(
			&self.ctx,
			"virDomainLookupByUUIDString",
			self.ops.connect.domain_lookup_by_uuid_string,
			self.handle.raw(),
			uuid,
		)
		.map(|handle| self.wrap_domain(handle))
	}

	/// `virDomainCreateXML`: boot a transient domain from its XML
	/// description.
	pub fn domain_create_xml(&self, xml: &str, flags: u32) -> BindResult<Domain> {
		dispatch::call_lookup_flags(
			&self.ctx,
			"virDomainCreateXML",
			self.ops.connect.domain_create_xml,
			self.handle.raw(),
			xml,
			flags,
		)
		.map(|handle| self.wrap_domain(handle))
	}

	/// `virDomainDefineXML`: define a persistent domain without starting
	/// it.
	pub fn domain_define_xml(&self, xml: &str) -> BindResult<Domain> {
		dispatch::call_lookup(
			&self.ctx,
			"virDomainDefineXML",
			self.ops.connect.domain_define_xml,
			self.handle.raw(),
			xml,
		)
		.map(|handle| self.wrap_domain(handle))
	}

	/// `virDomainRestore`: resurrect a domain from a save file.
	pub fn domain_restore(&self, path: &str) -> BindResult<()> {
		dispatch::call_str_int(
			&self.ctx,
			"virDomainRestore",
			self.ops.connect.domain_restore,
			self.handle.raw(),
			path,
		)
		.map(drop)
	}

	fn wrap_network(&self, handle: RawHandle) -> Network {
		Network::new(handle, Rc::clone(&self.ctx), self.ops)
	}

	/// `virNetworkLookupByName`
	pub fn network_lookup_by_name(&self, name: &str) -> BindResult<Network> {
		dispatch::call_lookup(
			&self.ctx,
			"virNetworkLookupByName",
			self.ops.connect.network_lookup_by_name,
			self.handle.raw(),
			name,
		)
		.map(|handle| self.wrap_network(handle))
	}

	/// `virNetworkLookupByUUID`
	pub fn network_lookup_by_uuid(&self, uuid: &[u8; UUID_BUFLEN]) -> BindResult<Network> {
		dispatch::call_lookup_uuid(
			&self.ctx,
			"virNetworkLookupByUUID",
			self.ops.connect.network_lookup_by_uuid,
			self.handle.raw(),
			uuid,
		)
		.map(|handle| self.wrap_network(handle))
	}

	/// `virNetworkCreateXML`
	pub fn network_create_xml(&self, xml: &str) -> BindResult<Network> {
		dispatch::call_lookup(
			&self.ctx,
			"virNetworkCreateXML",
			self.ops.connect.network_create_xml,
			self.handle.raw(),
			xml,
		)
		.map(|handle| self.wrap_network(handle))
	}

	/// `virNetworkDefineXML`
	pub fn network_define_xml(&self, xml: &str) -> BindResult<Network> {
		dispatch::call_lookup(
			&self.ctx,
			"virNetworkDefineXML",
			self.ops.connect.network_define_xml,
			self.handle.raw(),
			xml,
		)
		.map(|handle| self.wrap_network(handle))
	}

	fn wrap_pool(&self, handle: RawHandle) -> StoragePool {
		StoragePool::new(handle, Rc::clone(&self.ctx), self.ops)
	}

	/// `virStoragePoolLookupByName`
	pub fn storage_pool_lookup_by_name(&self, name: &str) -> BindResult<StoragePool> {
		dispatch::call_lookup(
			&self.ctx,
			"virStoragePoolLookupByName",
			self.ops.connect.storage_pool_lookup_by_name,
			self.handle.raw(),
			name,
		)
		.map(|handle| self.wrap_pool(handle))
	}

	/// `virStoragePoolCreateXML`
	pub fn storage_pool_create_xml(&self, xml: &str, flags: u32) -> BindResult<StoragePool> {
		dispatch::call_lookup_flags(
			&self.ctx,
			"virStoragePoolCreateXML",
			self.ops.connect.storage_pool_create_xml,
			self.handle.raw(),
			xml,
			flags,
		)
		.map(|handle| self.wrap_pool(handle))
	}

	/// `virStoragePoolDefineXML`
	pub fn storage_pool_define_xml(&self, xml: &str, flags: u32) -> BindResult<StoragePool> {
		dispatch::call_lookup_flags(
			&self.ctx,
			"virStoragePoolDefineXML",
			self.ops.connect.storage_pool_define_xml,
			self.handle.raw(),
			xml,
			flags,
		)
		.map(|handle| self.wrap_pool(handle))
	}
}
