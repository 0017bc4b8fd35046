//! Mirrors of the native info/statistics records.
//!
//! Each `Raw*` struct matches the native layout; the owned counterpart is
//! what host code receives, populated field by field.

use std::mem;
use std::os::raw::{c_char, c_int, c_longlong, c_uchar, c_uint, c_ulong, c_ulonglong, c_ushort};

/// Length of the model-name buffer in `virNodeInfo`.
const MODEL_BUFLEN: usize = 32;

/// `#[repr(C)]` mirror of `virNodeInfo`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawNodeInfo {
	pub model: [c_char; MODEL_BUFLEN],
	pub memory: c_ulong,
	pub cpus: c_uint,
	pub mhz: c_uint,
	pub nodes: c_uint,
	pub sockets: c_uint,
	pub cores: c_uint,
	pub threads: c_uint,
}

/// Capabilities of the host node a connection points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
	pub model: String,
	/// Memory size in kibibytes.
	pub memory: u64,
	pub cpus: u32,
	pub mhz: u32,
	pub nodes: u32,
	pub sockets: u32,
	pub cores: u32,
	pub threads: u32,
}

impl NodeInfo {
	pub fn from_raw(raw: &RawNodeInfo) -> Self {
		let len = raw
			.model
			.iter()
			.position(|&c| c == 0)
			.unwrap_or(MODEL_BUFLEN);
		let bytes: Vec<u8> = raw.model[..len].iter().map(|&c| c as u8).collect();
		Self {
			model: String::from_utf8_lossy(&bytes).into_owned(),
			memory: raw.memory as u64,
			cpus: raw.cpus,
			mhz: raw.mhz,
			nodes: raw.nodes,
			sockets: raw.sockets,
			cores: raw.cores,
			threads: raw.threads,
		}
	}
}

ordinal_enum!(
	/// `virDomainState`
	pub enum DomainState {
		NoState,
		Running,
		Blocked,
		Paused,
		Shutdown,
		Shutoff,
		Crashed,
	}
);

/// `#[repr(C)]` mirror of `virDomainInfo`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawDomainInfo {
	pub state: c_uchar,
	pub max_mem: c_ulong,
	pub memory: c_ulong,
	pub nr_virt_cpu: c_ushort,
	pub cpu_time: c_ulonglong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainInfo {
	pub state: DomainState,
	/// Maximum memory in kibibytes.
	pub max_mem: u64,
	/// Current memory in kibibytes.
	pub memory: u64,
	pub nr_virt_cpu: u16,
	/// CPU time used, in nanoseconds.
	pub cpu_time: u64,
}

impl DomainInfo {
	pub fn from_raw(raw: &RawDomainInfo) -> Self {
		Self {
			state: DomainState::from_native(raw.state as i32),
			max_mem: raw.max_mem as u64,
			memory: raw.memory as u64,
			nr_virt_cpu: raw.nr_virt_cpu,
			cpu_time: raw.cpu_time,
		}
	}
}

/// `#[repr(C)]` mirror of `virDomainBlockStatsStruct`.
///
/// A field the hypervisor does not report comes back as -1.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDomainBlockStats {
	pub rd_req: c_longlong,
	pub rd_bytes: c_longlong,
	pub wr_req: c_longlong,
	pub wr_bytes: c_longlong,
	pub errs: c_longlong,
}

pub type DomainBlockStats = RawDomainBlockStats;

/// `#[repr(C)]` mirror of `virDomainInterfaceStatsStruct`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDomainInterfaceStats {
	pub rx_bytes: c_longlong,
	pub rx_packets: c_longlong,
	pub rx_errs: c_longlong,
	pub rx_drop: c_longlong,
	pub tx_bytes: c_longlong,
	pub tx_packets: c_longlong,
	pub tx_errs: c_longlong,
	pub tx_drop: c_longlong,
}

pub type DomainInterfaceStats = RawDomainInterfaceStats;

ordinal_enum!(
	/// `virVcpuState`
	pub enum VcpuState {
		Offline,
		Running,
		Blocked,
	}
);

/// `#[repr(C)]` mirror of `virVcpuInfo`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawVcpuInfo {
	pub number: c_uint,
	pub state: c_int,
	pub cpu_time: c_ulonglong,
	pub cpu: c_int,
}

impl RawVcpuInfo {
	pub fn zeroed() -> Self {
		unsafe { mem::zeroed() }
	}
}

/// State of one virtual CPU of a running domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcpuInfo {
	pub number: u32,
	pub state: VcpuState,
	/// CPU time used by this vcpu, in nanoseconds.
	pub cpu_time: u64,
	/// Real CPU the vcpu currently runs on, or -1 when offline.
	pub cpu: i32,
}

impl VcpuInfo {
	pub fn from_raw(raw: &RawVcpuInfo) -> Self {
		Self {
			number: raw.number,
			state: VcpuState::from_native(raw.state),
			cpu_time: raw.cpu_time,
			cpu: raw.cpu,
		}
	}
}

ordinal_enum!(
	/// `virStoragePoolState`
	pub enum StoragePoolState {
		Inactive,
		Building,
		Running,
		Degraded,
	}
);

/// `#[repr(C)]` mirror of `virStoragePoolInfo`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawStoragePoolInfo {
	pub state: c_int,
	pub capacity: c_ulonglong,
	pub allocation: c_ulonglong,
	pub available: c_ulonglong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePoolInfo {
	pub state: StoragePoolState,
	pub capacity: u64,
	pub allocation: u64,
	pub available: u64,
}

impl StoragePoolInfo {
	pub fn from_raw(raw: &RawStoragePoolInfo) -> Self {
		Self {
			state: StoragePoolState::from_native(raw.state),
			capacity: raw.capacity,
			allocation: raw.allocation,
			available: raw.available,
		}
	}
}

ordinal_enum!(
	/// `virStorageVolType`
	pub enum StorageVolKind {
		File,
		Block,
	}
);

/// `#[repr(C)]` mirror of `virStorageVolInfo`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawStorageVolInfo {
	pub kind: c_int,
	pub capacity: c_ulonglong,
	pub allocation: c_ulonglong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageVolInfo {
	pub kind: StorageVolKind,
	pub capacity: u64,
	pub allocation: u64,
}

impl StorageVolInfo {
	pub fn from_raw(raw: &RawStorageVolInfo) -> Self {
		Self {
			kind: StorageVolKind::from_native(raw.kind),
			capacity: raw.capacity,
			allocation: raw.allocation,
		}
	}
}

impl RawNodeInfo {
	pub fn zeroed() -> Self {
		unsafe { mem::zeroed() }
	}
}

impl RawDomainInfo {
	pub fn zeroed() -> Self {
		unsafe { mem::zeroed() }
	}
}
