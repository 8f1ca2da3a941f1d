//! Core data models for harvested book metadata and paging.

mod book;
mod query;

pub use book::{BookRecord, VolumeInfo, VolumeItem, VolumesResponse};
pub use query::{page_windows, PageWindow, DEFAULT_QUERIES};
