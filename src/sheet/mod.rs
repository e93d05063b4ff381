//! Bottom sheet: one modal surface sliding up from the bottom of the screen

mod controller;
mod handle;

pub use controller::{ContentProducer, SheetController, SheetPhase, SheetSnapshot};
pub use handle::{SheetCommand, SheetHandle, SheetHost, SheetProvider};
