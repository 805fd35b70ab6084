use crate::camera::FrameSource;
use crate::cli::dialog::{ConfirmationDialog, Prompt};
use crate::cli::display::{DisplaySurface, ExitKey};
use crate::common::Result;
use crate::core::detector::Annotator;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    AwaitingConfirmation,
    Terminated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub exit_requests: u32,
}

/// The capture → annotate → display → key loop.
///
/// Owns the frame source and the display surface and releases both exactly
/// once, however the loop ends.
pub struct Session<S: FrameSource, D: DisplaySurface, P: Prompt> {
    source: S,
    display: D,
    dialog: ConfirmationDialog<P>,
    state: LoopState,
    key_wait: Duration,
    summary: RunSummary,
    released: bool,
}

impl<S: FrameSource, D: DisplaySurface, P: Prompt> Session<S, D, P> {
    pub fn new(source: S, display: D, dialog: ConfirmationDialog<P>, key_wait: Duration) -> Self {
        Self {
            source,
            display,
            dialog,
            state: LoopState::Running,
            key_wait,
            summary: RunSummary::default(),
            released: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn dialog(&self) -> &ConfirmationDialog<P> {
        &self.dialog
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Run until exit is confirmed or something fails, then release
    /// everything. Errors are returned after cleanup.
    pub fn run<A: Annotator + ?Sized>(&mut self, annotator: &mut A) -> Result<RunSummary> {
        tracing::info!("Starting detection loop");
        let result = self.drive(annotator);
        if let Err(e) = &result {
            tracing::error!("Detection loop aborted: {}", e);
        }
        self.state = LoopState::Terminated;
        self.cleanup();
        result
    }

    fn drive<A: Annotator + ?Sized>(&mut self, annotator: &mut A) -> Result<RunSummary> {
        loop {
            self.state = match self.state {
                LoopState::Running => self.step(annotator)?,
                LoopState::AwaitingConfirmation => self.confirm()?,
                LoopState::Terminated => return Ok(self.summary.clone()),
            };
        }
    }

    fn step<A: Annotator + ?Sized>(&mut self, annotator: &mut A) -> Result<LoopState> {
        let mut frame = self.source.read_frame()?;
        let annotation = annotator.annotate(&mut frame)?;
        self.summary.frames += 1;
        tracing::debug!(
            frame = self.summary.frames,
            faces = annotation.faces.len(),
            eyes = annotation.eyes,
            mouths = annotation.mouths,
            "annotated"
        );

        self.display.show(&frame)?;

        match self.display.poll_key(self.key_wait)?.and_then(ExitKey::from_code) {
            Some(key) => {
                tracing::info!("Exit requested with {:?}", key);
                self.summary.exit_requests += 1;
                Ok(LoopState::AwaitingConfirmation)
            }
            None => Ok(LoopState::Running),
        }
    }

    fn confirm(&mut self) -> Result<LoopState> {
        if self.dialog.show()? {
            Ok(LoopState::Terminated)
        } else {
            tracing::info!("Exit cancelled, resuming");
            Ok(LoopState::Running)
        }
    }

    fn cleanup(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.source.release();
        self.display.close();
        tracing::info!("Released capture and display after {} frames", self.summary.frames);
    }
}

impl<S: FrameSource, D: DisplaySurface, P: Prompt> Drop for Session<S, D, P> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
