//! Core of a small Spine skeleton viewer.
//!
//! Imports `{skeleton, atlas, page}` file triplets (plus an optional background) into
//! private storage and drives a viewer session: loading, camera, and gesture handling.
//!
//! This crate is renderer-agnostic. The skeletal runtime is `spine2d`; drawing lives in
//! separate crates (e.g. `spine-viewer-wgpu`).

#![forbid(unsafe_code)]

pub mod camera;
pub mod config;
mod error;
pub mod frame;
pub mod gesture;
pub mod import;
pub mod selection;
pub mod session;
pub mod storage;

pub use camera::{Camera, Viewport};
pub use config::Config;
pub use error::*;
pub use gesture::{Gesture, GestureDetector, GestureSettings};
pub use import::{CandidateFile, ImportOutcome, ImportPlan, Importer, TripletPlan, resolve};
pub use selection::PersistedSelection;
pub use session::{Platform, SessionState, ViewerSession};
pub use storage::{DirStorage, Storage};

#[cfg(test)]
mod test_fixtures;

#[cfg(test)]
mod import_tests;
