#![warn(rust_2018_idioms)]

//! A marshaling and dispatch core for binding the libvirt C API.
//!
//! libvirt exposes every managed resource (connection, domain, network,
//! storage pool, storage volume) as an opaque handle, reports failures
//! through an out-of-band structured-error callback, and retrieves lists
//! with a count-then-fill call pair. This crate implements that binding
//! discipline once, as a small set of generic call shapes parameterized
//! over the native entry points, instead of expanding a marshaling body
//! per native function:
//!
//! - [`handle`]: opaque pointer-sized resource tokens,
//! - [`marshal`]: string/bool/UUID/enum-ordinal conversions with the
//!   owned-vs-const string ownership rule,
//! - [`dispatch`]: the closed catalogue of call shapes,
//! - [`list`]: the count-then-fill enumeration idiom,
//! - [`param`]: scheduler parameter tagged-union marshaling,
//! - [`auth`]: the interactive credential callback bridge,
//! - [`error`]: structured-error capture via explicit per-connection
//!   contexts.
//!
//! The wrapper objects ([`Connection`], [`Domain`], [`Network`],
//! [`StoragePool`], [`StorageVol`]) run entirely against a static
//! [`ops::VirtOps`] table of `extern "C"` entry points supplied by the
//! embedder, so the core stays independent of how (and whether) libvirt
//! is linked.

#[macro_use]
mod macros;

#[macro_use]
extern crate log;

pub mod auth;
pub mod connect;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod flags;
pub mod handle;
pub mod info;
pub mod list;
pub mod marshal;
pub mod network;
pub mod ops;
pub mod param;
pub mod storage;

pub use auth::{AuthCallback, Credential, CredentialKind};
pub use connect::Connection;
pub use domain::Domain;
pub use error::{BindError, ErrorContext, NativeError};
pub use handle::RawHandle;
pub use network::Network;
pub use param::{ParamValue, SchedParameter};
pub use storage::{StoragePool, StorageVol};

pub type BindResult<T> = Result<T, BindError>;
