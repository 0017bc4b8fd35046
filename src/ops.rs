//! Native entry-point tables.
//!
//! The dispatch layer is parameterized over function pointers rather than
//! linked against libvirt symbols. The embedder builds one static
//! [`VirtOps`] from the resolved native entry points (or, in tests, from
//! an in-process fake) and hands it to [`Connection::open`].
//!
//! [`Connection::open`]: crate::Connection::open

use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_ulong, c_void};

use crate::auth::RawConnectAuth;
use crate::dispatch::{
	ConstStrFn, HandleFn, IntArgFn, IntFlagsFn, IntFn, IntHandleFn, IntUlongFn, OutIntFn,
	OutUlongFn, OwnedStrFlagsFn, OwnedStrFn, StrFlagsHandleFn, StrFlagsIntFn, StrHandleFn,
	StrIntFn, UlongFn, UuidHandleFn, UuidOutFn, UuidStringOutFn,
};
use crate::error::{ErrorHandlerFn, RawError};
use crate::handle::RawHandle;
use crate::info::{
	RawDomainBlockStats, RawDomainInfo, RawDomainInterfaceStats, RawNodeInfo, RawStoragePoolInfo,
	RawStorageVolInfo, RawVcpuInfo,
};
use crate::list::{ListIdsFn, ListNamesFn};
use crate::param::{SchedGetFn, SchedSetFn, SchedTypeFn};

// uri → connection handle
pub type OpenFn = unsafe extern "C" fn(*const c_char) -> RawHandle;
// uri, auth record, flags → connection handle
pub type OpenAuthFn = unsafe extern "C" fn(*const c_char, *mut RawConnectAuth, c_uint) -> RawHandle;
// `virConnSetErrorFunc`
pub type SetErrorFn = unsafe extern "C" fn(RawHandle, *mut c_void, ErrorHandlerFn);
// `virCopyLastError`
pub type CopyLastErrorFn = unsafe extern "C" fn(*mut RawError) -> c_int;
// `virNodeGetInfo`
pub type NodeInfoFn = unsafe extern "C" fn(RawHandle, *mut RawNodeInfo) -> c_int;
// `virDomainGetInfo`
pub type DomainInfoFn = unsafe extern "C" fn(RawHandle, *mut RawDomainInfo) -> c_int;
// `virDomainBlockStats`
pub type BlockStatsFn =
	unsafe extern "C" fn(RawHandle, *const c_char, *mut RawDomainBlockStats, usize) -> c_int;
// `virDomainInterfaceStats`
pub type InterfaceStatsFn =
	unsafe extern "C" fn(RawHandle, *const c_char, *mut RawDomainInterfaceStats, usize) -> c_int;
// `virStoragePoolGetInfo`
pub type StoragePoolInfoFn = unsafe extern "C" fn(RawHandle, *mut RawStoragePoolInfo) -> c_int;
// `virStorageVolGetInfo`
pub type StorageVolInfoFn = unsafe extern "C" fn(RawHandle, *mut RawStorageVolInfo) -> c_int;
// `virDomainGetVcpus`: info buffer, capacity, cpumap buffer (may be
// null), map length → filled count
pub type VcpusFn =
	unsafe extern "C" fn(RawHandle, *mut RawVcpuInfo, c_int, *mut c_uchar, c_int) -> c_int;
// `virDomainMigrate`
pub type MigrateFn = unsafe extern "C" fn(
	RawHandle,
	RawHandle,
	c_ulong,
	*const c_char,
	*const c_char,
	c_ulong,
) -> RawHandle;

/// Connection-level entry points (`virConnect*`, `virNode*`, plus the
/// lookup/creation calls that produce new object handles).
#[derive(Debug)]
pub struct ConnectOps {
	pub open: OpenFn,
	pub open_read_only: OpenFn,
	pub open_auth: OpenAuthFn,
	pub close: IntFn,
	pub set_error_func: SetErrorFn,
	pub copy_last_error: CopyLastErrorFn,

	pub get_hostname: OwnedStrFn,
	pub get_capabilities: OwnedStrFn,
	pub get_type: ConstStrFn,
	pub get_uri: OwnedStrFn,
	pub get_version: OutUlongFn,
	pub get_max_vcpus: StrIntFn,
	pub node_get_info: NodeInfoFn,

	pub num_of_domains: IntFn,
	pub list_domains: ListIdsFn,
	pub num_of_defined_domains: IntFn,
	pub list_defined_domains: ListNamesFn,
	pub num_of_networks: IntFn,
	pub list_networks: ListNamesFn,
	pub num_of_defined_networks: IntFn,
	pub list_defined_networks: ListNamesFn,
	pub num_of_storage_pools: IntFn,
	pub list_storage_pools: ListNamesFn,

	pub domain_lookup_by_id: IntHandleFn,
	pub domain_lookup_by_name: StrHandleFn,
	pub domain_lookup_by_uuid: UuidHandleFn,
	pub domain_lookup_by_uuid_string: StrHandleFn,
	pub domain_create_xml: StrFlagsHandleFn,
	pub domain_define_xml: StrHandleFn,
	pub domain_restore: StrIntFn,

	pub network_lookup_by_name: StrHandleFn,
	pub network_lookup_by_uuid: UuidHandleFn,
	pub network_create_xml: StrHandleFn,
	pub network_define_xml: StrHandleFn,

	pub storage_pool_lookup_by_name: StrHandleFn,
	pub storage_pool_create_xml: StrFlagsHandleFn,
	pub storage_pool_define_xml: StrFlagsHandleFn,
}

/// `virDomain*` entry points.
#[derive(Debug)]
pub struct DomainOps {
	pub free: IntFn,
	pub get_id: IntFn,
	pub get_name: ConstStrFn,
	pub get_os_type: OwnedStrFn,
	pub get_xml_desc: OwnedStrFlagsFn,
	pub get_uuid: UuidOutFn,
	pub get_uuid_string: UuidStringOutFn,
	pub get_info: DomainInfoFn,

	pub get_autostart: OutIntFn,
	pub set_autostart: IntArgFn,
	pub get_max_memory: UlongFn,
	pub set_max_memory: IntUlongFn,
	pub set_memory: IntUlongFn,
	pub get_max_vcpus: IntFn,
	pub set_vcpus: IntArgFn,
	pub get_vcpus: VcpusFn,

	pub suspend: IntFn,
	pub resume: IntFn,
	pub create: IntFn,
	pub destroy: IntFn,
	pub shutdown: IntFn,
	pub reboot: IntFlagsFn,
	pub undefine: IntFn,
	pub save: StrIntFn,
	pub core_dump: StrFlagsIntFn,

	pub attach_device: StrIntFn,
	pub detach_device: StrIntFn,

	pub get_scheduler_type: SchedTypeFn,
	pub get_scheduler_parameters: SchedGetFn,
	pub set_scheduler_parameters: SchedSetFn,

	pub block_stats: BlockStatsFn,
	pub interface_stats: InterfaceStatsFn,
	pub migrate: MigrateFn,
}

/// `virNetwork*` entry points.
#[derive(Debug)]
pub struct NetworkOps {
	pub free: IntFn,
	pub get_name: ConstStrFn,
	pub get_bridge_name: OwnedStrFn,
	pub get_xml_desc: OwnedStrFlagsFn,
	pub get_uuid: UuidOutFn,
	pub get_uuid_string: UuidStringOutFn,
	pub get_autostart: OutIntFn,
	pub set_autostart: IntArgFn,
	pub create: IntFn,
	pub destroy: IntFn,
	pub undefine: IntFn,
}

/// `virStoragePool*` entry points.
#[derive(Debug)]
pub struct StoragePoolOps {
	pub free: IntFn,
	pub get_name: ConstStrFn,
	pub get_uuid: UuidOutFn,
	pub get_uuid_string: UuidStringOutFn,
	pub get_xml_desc: OwnedStrFlagsFn,
	pub get_info: StoragePoolInfoFn,
	pub get_autostart: OutIntFn,
	pub set_autostart: IntArgFn,
	pub build: IntFlagsFn,
	pub create: IntFlagsFn,
	pub destroy: IntFn,
	pub delete: IntFlagsFn,
	pub refresh: IntFlagsFn,
	pub undefine: IntFn,
	pub num_of_volumes: IntFn,
	pub list_volumes: ListNamesFn,
	pub vol_lookup_by_name: StrHandleFn,
	pub vol_create_xml: StrFlagsHandleFn,
}

/// `virStorageVol*` entry points.
#[derive(Debug)]
pub struct StorageVolOps {
	pub free: IntFn,
	pub get_name: ConstStrFn,
	pub get_key: ConstStrFn,
	pub get_path: OwnedStrFn,
	pub get_xml_desc: OwnedStrFlagsFn,
	pub get_info: StorageVolInfoFn,
	pub delete: IntFlagsFn,
	pub pool_lookup_by_volume: HandleFn,
}

/// The complete entry-point table the wrapper objects run against.
#[derive(Debug)]
pub struct VirtOps {
	pub connect: ConnectOps,
	pub domain: DomainOps,
	pub network: NetworkOps,
	pub storage_pool: StoragePoolOps,
	pub storage_vol: StorageVolOps,
}
