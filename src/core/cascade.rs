use crate::common::config::DetectionParams;
use crate::common::{VjError, Result};
use crate::core::detector::Classifier;
use crate::core::region::Region;
use image::GrayImage;
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use std::path::{Path, PathBuf};

/// Haar cascade loaded through OpenCV's `CascadeClassifier`.
pub struct HaarCascade {
    inner: CascadeClassifier,
    path: PathBuf,
}

impl HaarCascade {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(VjError::ClassifierNotFound(path.to_path_buf()));
        }

        let malformed = |reason: String| VjError::MalformedClassifier {
            path: path.to_path_buf(),
            reason,
        };

        let path_str = path.to_str()
            .ok_or_else(|| malformed("path is not valid UTF-8".into()))?;
        let inner = CascadeClassifier::new(path_str)
            .map_err(|e| malformed(e.to_string()))?;

        // OpenCV hands back an empty classifier instead of failing when the
        // XML cannot be parsed.
        if inner.empty().map_err(|e| malformed(e.to_string()))? {
            return Err(malformed("no cascade could be read from the file".into()));
        }

        tracing::debug!("Loaded cascade {}", path.display());
        Ok(Self { inner, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Classifier for HaarCascade {
    fn detect(&mut self, image: &GrayImage, params: &DetectionParams) -> Result<Vec<Region>> {
        let detection_error = |e: opencv::Error| {
            VjError::Detection(format!("{}: {}", self.path.display(), e))
        };

        let mat = gray_to_mat(image).map_err(detection_error)?;
        let mut found: Vector<Rect> = Vector::new();
        let (min_w, min_h) = params.min_size;

        self.inner
            .detect_multi_scale(
                &mat,
                &mut found,
                params.scale_factor,
                params.min_neighbors,
                0,
                Size::new(min_w as i32, min_h as i32),
                Size::new(0, 0),
            )
            .map_err(detection_error)?;

        Ok(found.iter().filter_map(|r| Region::from_cv(&r)).collect())
    }
}

fn gray_to_mat(image: &GrayImage) -> opencv::Result<Mat> {
    let (width, height) = image.dimensions();
    let borrowed = Mat::new_rows_cols_with_data(height as i32, width as i32, image.as_raw().as_slice())?;
    borrowed.try_clone()
}
