use crate::common::{VjError, Result};
use image::RgbImage;
use std::path::Path;

pub const TITLE: &str = "Confirmation";
pub const MESSAGE: &str = "Are you sure you want to close the application?";

/// Longest side of the icon shown next to the question.
pub const ICON_SIZE: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// y/Y/Enter answer yes, n/N/Esc answer no, anything else is ignored.
    pub fn from_key(code: i32) -> Option<Self> {
        match u8::try_from(code).ok()? {
            b'y' | b'Y' | b'\r' | b'\n' => Some(Self::Yes),
            b'n' | b'N' | 27 => Some(Self::No),
            _ => None,
        }
    }
}

/// A blocking yes/no question.
pub trait Prompt {
    fn ask(&mut self, title: &str, message: &str) -> Result<Answer>;

    /// Tear down whatever hosts the prompt. Called once, after a yes.
    fn dismiss(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Hidden,
    AwaitingAnswer,
    Confirmed,
}

/// Exit confirmation. `Confirmed` is terminal.
pub struct ConfirmationDialog<P> {
    prompt: P,
    state: DialogState,
}

impl<P: Prompt> ConfirmationDialog<P> {
    pub fn new(prompt: P) -> Self {
        Self { prompt, state: DialogState::Hidden }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == DialogState::Confirmed
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Ask the user and return whether exit is confirmed. Once confirmed
    /// this returns `true` without asking again.
    pub fn show(&mut self) -> Result<bool> {
        if self.is_confirmed() {
            return Ok(true);
        }

        self.state = DialogState::AwaitingAnswer;
        match self.prompt.ask(TITLE, MESSAGE) {
            Ok(Answer::Yes) => {
                self.state = DialogState::Confirmed;
                self.prompt.dismiss();
                Ok(true)
            }
            Ok(Answer::No) => {
                self.state = DialogState::Hidden;
                Ok(false)
            }
            Err(e) => {
                self.state = DialogState::Hidden;
                Err(e)
            }
        }
    }
}

pub fn load_icon(path: &Path) -> Result<RgbImage> {
    let icon = image::open(path).map_err(|e| VjError::IconLoadFailure {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(icon.thumbnail(ICON_SIZE, ICON_SIZE).to_rgb8())
}

/// The dialog works without an icon, so a bad icon file only warrants a
/// warning.
pub fn load_icon_or_warn(path: &Path) -> Option<RgbImage> {
    match load_icon(path) {
        Ok(icon) => Some(icon),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        answers: VecDeque<Result<Answer>>,
        asked: usize,
        dismissed: usize,
    }

    impl Scripted {
        fn answering(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                answers: answers.into_iter().map(Ok).collect(),
                ..Default::default()
            }
        }
    }

    impl Prompt for Scripted {
        fn ask(&mut self, title: &str, message: &str) -> Result<Answer> {
            assert_eq!((title, message), (TITLE, MESSAGE));
            self.asked += 1;
            self.answers.pop_front().expect("prompt asked more often than scripted")
        }

        fn dismiss(&mut self) {
            self.dismissed += 1;
        }
    }

    #[test]
    fn no_returns_to_hidden() {
        let mut dialog = ConfirmationDialog::new(Scripted::answering([Answer::No]));
        assert!(!dialog.show().unwrap());
        assert_eq!(dialog.state(), DialogState::Hidden);
        assert!(!dialog.is_confirmed());
        assert_eq!(dialog.prompt().dismissed, 0);
    }

    #[test]
    fn can_be_asked_again_after_no() {
        let mut dialog = ConfirmationDialog::new(Scripted::answering([Answer::No, Answer::Yes]));
        assert!(!dialog.show().unwrap());
        assert!(dialog.show().unwrap());
        assert_eq!(dialog.prompt().asked, 2);
    }

    #[test]
    fn yes_confirms_once_and_dismisses() {
        let mut dialog = ConfirmationDialog::new(Scripted::answering([Answer::Yes]));
        assert!(dialog.show().unwrap());
        assert_eq!(dialog.state(), DialogState::Confirmed);

        // Already confirmed: no second prompt, no second teardown.
        assert!(dialog.show().unwrap());
        assert_eq!(dialog.prompt().asked, 1);
        assert_eq!(dialog.prompt().dismissed, 1);
    }

    #[test]
    fn prompt_failure_leaves_dialog_hidden() {
        let prompt = Scripted {
            answers: VecDeque::from([Err(VjError::Display("window vanished".into()))]),
            ..Default::default()
        };
        let mut dialog = ConfirmationDialog::new(prompt);
        assert!(matches!(dialog.show(), Err(VjError::Display(_))));
        assert_eq!(dialog.state(), DialogState::Hidden);
    }

    #[test]
    fn answer_keys() {
        for key in [b'y', b'Y', b'\r', b'\n'] {
            assert_eq!(Answer::from_key(i32::from(key)), Some(Answer::Yes));
        }
        for key in [b'n', b'N', 27] {
            assert_eq!(Answer::from_key(i32::from(key)), Some(Answer::No));
        }
        assert_eq!(Answer::from_key(i32::from(b'q')), None);
        assert_eq!(Answer::from_key(-1), None);
        assert_eq!(Answer::from_key(i32::from(b'y') + 256), None);
    }

    #[test]
    fn missing_icon_is_icon_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_icon(&dir.path().join("Icon.png")).unwrap_err();
        assert!(matches!(err, VjError::IconLoadFailure { .. }));
        assert!(!err.is_fatal());
        assert!(load_icon_or_warn(&dir.path().join("Icon.png")).is_none());
    }

    #[test]
    fn icon_is_scaled_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Icon.png");
        RgbImage::from_pixel(256, 128, image::Rgb([10, 120, 200])).save(&path).unwrap();

        let icon = load_icon(&path).unwrap();
        assert_eq!(icon.dimensions(), (64, 32));
    }
}
