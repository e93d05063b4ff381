//! Swipeable tab groups: a tab bar and a paged content view sharing one
//! horizontal offset

mod coordinator;
mod indicator;

pub use coordinator::{TabCoordinator, TabEvent, TabSnapshot, TabSpec, resolve_release};
pub use indicator::{DIM_OPACITY, IndicatorFrame, label_opacity};
