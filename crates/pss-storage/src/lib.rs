//! # pss-storage
//!
//! Everything the server does on disk goes through [`StorageService`],
//! which confines user-supplied paths to a single root before any
//! filesystem call.

pub mod listing;
pub mod sandbox;
pub mod search;
pub mod service;
pub mod volume;

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

pub use sandbox::{ConfinedPath, Sandbox};
pub use service::{FileDownload, StorageService};
pub use volume::{SystemVolumeProbe, VolumeProbe};

/// A byte stream used for uploads and downloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;
