use crate::camera::Frame;
use crate::common::Result;
use std::time::Duration;

pub const KEY_ESC: i32 = 27;

/// Where annotated frames are shown and keystrokes are read from.
pub trait DisplaySurface {
    fn show(&mut self, frame: &Frame) -> Result<()>;

    /// Wait up to `wait` for one keystroke. `None` when nothing was pressed.
    fn poll_key(&mut self, wait: Duration) -> Result<Option<i32>>;

    /// Tear the surface down. Must be safe to call more than once.
    fn close(&mut self);
}

/// Keys that start the exit confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKey {
    Escape,
    LowerQ,
    UpperQ,
}

impl ExitKey {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            KEY_ESC => Some(Self::Escape),
            c if c == i32::from(b'q') => Some(Self::LowerQ),
            c if c == i32::from(b'Q') => Some(Self::UpperQ),
            _ => None,
        }
    }
}
