use crate::camera::Frame;
use crate::cli::dialog::{Answer, Prompt};
use crate::cli::display::DisplaySurface;
use crate::common::Result;
use image::{imageops, Rgb, RgbImage};
use opencv::core::{Mat, Point, Scalar, Vec3b, VecN};
use opencv::highgui;
use opencv::imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_AA};
use opencv::prelude::*;
use std::time::Duration;

const PROMPT_WIDTH: u32 = 560;
const PROMPT_HEIGHT: u32 = 120;
const PROMPT_MARGIN: u32 = 16;
const PROMPT_POLL_MS: i32 = 50;

/// OpenCV window showing the annotated feed.
pub struct HighGuiWindow {
    title: String,
    open: bool,
}

impl HighGuiWindow {
    pub fn open(title: &str) -> Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)?;
        tracing::debug!("Opened window '{}'", title);
        Ok(Self { title: title.to_string(), open: true })
    }
}

impl DisplaySurface for HighGuiWindow {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        let mat = rgb_to_bgr_mat(frame)?;
        highgui::imshow(&self.title, &mat)?;
        Ok(())
    }

    fn poll_key(&mut self, wait: Duration) -> Result<Option<i32>> {
        let wait_ms = i32::try_from(wait.as_millis()).unwrap_or(i32::MAX).max(1);
        let code = highgui::wait_key(wait_ms)?;
        Ok((code >= 0).then_some(code))
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = highgui::destroy_all_windows() {
            tracing::warn!("Failed to destroy windows: {}", e);
        }
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        self.close();
    }
}

/// Small OpenCV window asking the exit question, answered from the
/// keyboard.
pub struct HighGuiPrompt {
    icon: Option<RgbImage>,
    window: Option<String>,
}

impl HighGuiPrompt {
    pub fn new(icon: Option<RgbImage>) -> Self {
        Self { icon, window: None }
    }

    fn render(&self, message: &str) -> Result<Mat> {
        let mut canvas = RgbImage::from_pixel(PROMPT_WIDTH, PROMPT_HEIGHT, Rgb([240, 240, 240]));
        let mut text_x = PROMPT_MARGIN;
        if let Some(icon) = &self.icon {
            let y = (PROMPT_HEIGHT.saturating_sub(icon.height()) / 2) as i64;
            imageops::overlay(&mut canvas, icon, PROMPT_MARGIN as i64, y);
            text_x += icon.width() + PROMPT_MARGIN;
        }

        let mut mat = rgb_to_bgr_mat(&canvas)?;
        let ink = Scalar::new(30.0, 30.0, 30.0, 0.0);
        imgproc::put_text(
            &mut mat,
            message,
            Point::new(text_x as i32, 50),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            ink,
            1,
            LINE_AA,
            false,
        )?;
        imgproc::put_text(
            &mut mat,
            "[Y]es    [N]o",
            Point::new(text_x as i32, 85),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            ink,
            1,
            LINE_AA,
            false,
        )?;
        Ok(mat)
    }

    fn close_window(&mut self) {
        if let Some(title) = self.window.take() {
            if let Err(e) = highgui::destroy_window(&title) {
                tracing::warn!("Failed to destroy '{}': {}", title, e);
            }
        }
    }
}

impl Prompt for HighGuiPrompt {
    fn ask(&mut self, title: &str, message: &str) -> Result<Answer> {
        let mat = self.render(message)?;
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)?;
        highgui::imshow(title, &mat)?;
        self.window = Some(title.to_string());

        let answer = loop {
            let code = highgui::wait_key(PROMPT_POLL_MS)?;
            if let Some(answer) = Answer::from_key(code) {
                break answer;
            }
            // Closing the window counts as "no".
            if highgui::get_window_property(title, highgui::WND_PROP_VISIBLE)? < 1.0 {
                break Answer::No;
            }
        };

        tracing::debug!("Exit confirmation answered {:?}", answer);
        if answer == Answer::No {
            self.close_window();
        }
        Ok(answer)
    }

    fn dismiss(&mut self) {
        self.close_window();
    }
}

/// Copy an RGB frame into a BGR `Mat`, the channel order OpenCV draws and
/// displays in.
pub fn rgb_to_bgr_mat(image: &RgbImage) -> opencv::Result<Mat> {
    let (width, height) = image.dimensions();
    let pixels: Vec<Vec3b> = image.pixels()
        .map(|p| VecN([p[2], p[1], p[0]]))
        .collect();
    let borrowed = Mat::new_rows_cols_with_data(height as i32, width as i32, pixels.as_slice())?;
    borrowed.try_clone()
}
