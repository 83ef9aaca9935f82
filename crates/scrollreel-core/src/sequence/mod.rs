//! Static description of a frame sequence and where its frames live on disk.

mod descriptor;
mod layout;

pub use descriptor::{CurveVariant, Presentation, SequenceDescriptor, TextColor};
pub use layout::{enforce_layout, scan_layout, FrameLayout, LayoutReport, SEQUENCE_DIR};
