//! Backend abstraction core for a tensor runtime.
//!
//! - [`backend::KernelBackend`] is the contract a compute backend fulfills:
//!   buffer lifecycle, introspection and one method per kernel, each
//!   defaulting to [`error::Error::Unimplemented`].
//! - [`storage::DataStore`] tracks which buffers are resident on a backend
//!   and migrates missing ones through a runtime-provided
//!   [`storage::DataMover`].
//! - [`gather_nd::prepare_and_validate`] validates and plans gather-style
//!   indexed reads.
//!
//! The reference backend is selected with crate feature flags and exported
//! as [`backend::SelectedBackend`].

pub mod backend;
pub mod error;
pub mod gather_nd;
pub mod storage;
pub mod tensor;
