pub mod dialog;
pub mod display;
#[cfg(feature = "opencv")]
pub mod highgui;
pub mod report;

pub use dialog::{Answer, ConfirmationDialog, DialogState, Prompt};
pub use display::{DisplaySurface, ExitKey};
#[cfg(feature = "opencv")]
pub use highgui::{HighGuiPrompt, HighGuiWindow};
