//! Frame storage and asynchronous frame loading.

mod cache;
mod frame;
mod loader;
mod source;
mod store;
#[cfg(test)]
pub(crate) mod testing;

pub use cache::FrameDiskCache;
pub use frame::{decode_frame_bytes, Frame};
pub use loader::{FrameLoadResult, LoadHandle, LoadPolicy, Loader};
pub use source::{source_from_config, FrameSource, FsFrameSource, HttpFrameSource};
pub use store::{FrameSlot, FrameStore, LoadProgress};
