//! # fleetfile-sync
//!
//! Publishes cluster topology as `<id>.instances` files with atomic,
//! change-gated writes.
//!
//! [`FilesPublisher`] implements [`fleetfile_core::EventListener`]; call
//! [`FilesPublisher::sync`] directly to get an [`ApplyReport`], or [`plan`]
//! to preview a sync without touching the disk.

pub mod error;
pub mod plan;
pub mod publisher;
pub mod render;
pub mod writer;

pub use error::PublishError;
pub use plan::{plan, PlannedArtifact, PlannedChange, SyncPlan};
pub use publisher::{ApplyReport, ArtifactFailure, FilesPublisher};
pub use render::{application_protocol, artifact_path, render};
pub use writer::WriteResult;
