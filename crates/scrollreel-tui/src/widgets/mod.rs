mod page;
mod sequence;
mod static_section;
mod status_bar;

pub use page::{clip_rows, PageWidget, RowSpan};
pub use sequence::{curve_profile, divider_paint, DividerPaint, SequenceWidget};
pub use static_section::StaticSectionWidget;
pub use status_bar::StatusBarWidget;
