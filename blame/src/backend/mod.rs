//! Adapters wiring the port traits in [`crate::traits`] to a real `gix::Repository`.

mod gix_impl;

pub use gix_impl::{file, BlameRepo, GixDiff, GixMailmap, GixRenameDetector};
