use crate::camera::Frame;
use crate::common::config::{DetectionConfig, DetectionParams};
use crate::common::Result;
use crate::core::region::Region;
use image::{imageops, GrayImage, Rgb};
use imageproc::drawing::{draw_hollow_rect_mut, Canvas};
use imageproc::rect::Rect;

pub const FACE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const EYE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const MOUTH_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// A pre-trained object classifier run over an intensity image.
///
/// Returned regions are in the coordinate space of `image`.
pub trait Classifier {
    fn detect(&mut self, image: &GrayImage, params: &DetectionParams) -> Result<Vec<Region>>;
}

/// What was found in one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub faces: Vec<Region>,
    pub eyes: usize,
    pub mouths: usize,
}

pub trait Annotator {
    /// Draw detections onto `frame` in place.
    fn annotate(&mut self, frame: &mut Frame) -> Result<Annotation>;
}

/// Face, eye and mouth classifiers. Faces are searched in the whole
/// frame, eyes and mouths only inside each face.
pub struct Detector {
    face: Box<dyn Classifier>,
    eyes: Box<dyn Classifier>,
    mouth: Box<dyn Classifier>,
    params: DetectionConfig,
}

impl Detector {
    pub fn new(
        face: impl Classifier + 'static,
        eyes: impl Classifier + 'static,
        mouth: impl Classifier + 'static,
        params: DetectionConfig,
    ) -> Self {
        Self {
            face: Box::new(face),
            eyes: Box::new(eyes),
            mouth: Box::new(mouth),
            params,
        }
    }

    #[cfg(feature = "opencv")]
    pub fn load(cascades: &crate::common::config::CascadeConfig, params: DetectionConfig) -> Result<Self> {
        use crate::core::cascade::HaarCascade;

        Ok(Self::new(
            HaarCascade::load(&cascades.face)?,
            HaarCascade::load(&cascades.eyes)?,
            HaarCascade::load(&cascades.mouth)?,
            params,
        ))
    }
}

impl Annotator for Detector {
    fn annotate(&mut self, frame: &mut Frame) -> Result<Annotation> {
        let gray = imageops::grayscale(&*frame);
        let (width, height) = frame.dimensions();
        let mut annotation = Annotation::default();

        let faces = self.face.detect(&gray, &self.params.face)?;
        for face in faces.iter().filter_map(|f| f.clip_to(width, height)) {
            draw_box(frame, &face, FACE_COLOR);

            let face_gray = imageops::crop_imm(&gray, face.x, face.y, face.width, face.height).to_image();
            let eyes = self.eyes.detect(&face_gray, &self.params.eyes)?;
            let mouths = self.mouth.detect(&face_gray, &self.params.mouth)?;

            // Eye and mouth boxes are drawn through a view of the face, so
            // they stay in face coordinates and cannot spill outside it.
            let mut face_color = imageops::crop(frame, face.x, face.y, face.width, face.height);
            for eye in &eyes {
                draw_box(&mut *face_color, eye, EYE_COLOR);
            }
            for mouth in &mouths {
                draw_box(&mut *face_color, mouth, MOUTH_COLOR);
            }

            annotation.eyes += eyes.len();
            annotation.mouths += mouths.len();
            annotation.faces.push(face);
        }

        Ok(annotation)
    }
}

/// Two-pixel outline whose outer edge passes through (x, y) and
/// (x + width, y + height).
fn draw_box<C>(canvas: &mut C, region: &Region, color: Rgb<u8>)
where
    C: Canvas<Pixel = Rgb<u8>>,
{
    if region.is_empty() {
        return;
    }

    let outer = Rect::at(region.x as i32, region.y as i32)
        .of_size(region.width + 1, region.height + 1);
    draw_hollow_rect_mut(canvas, outer, color);

    if region.width >= 2 && region.height >= 2 {
        let inner = Rect::at(region.x as i32 + 1, region.y as i32 + 1)
            .of_size(region.width - 1, region.height - 1);
        draw_hollow_rect_mut(canvas, inner, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BACKGROUND: Rgb<u8> = Rgb([50, 50, 50]);

    /// Returns the same regions on every call and records the size of
    /// each image it was shown.
    #[derive(Clone, Default)]
    struct Scripted {
        regions: Vec<Region>,
        seen: Rc<RefCell<Vec<(u32, u32)>>>,
    }

    impl Scripted {
        fn returning(regions: Vec<Region>) -> Self {
            Self { regions, ..Default::default() }
        }
    }

    impl Classifier for Scripted {
        fn detect(&mut self, image: &GrayImage, _params: &DetectionParams) -> Result<Vec<Region>> {
            self.seen.borrow_mut().push(image.dimensions());
            Ok(self.regions.clone())
        }
    }

    fn blank_frame() -> RgbImage {
        RgbImage::from_pixel(200, 150, BACKGROUND)
    }

    #[test]
    fn no_faces_leaves_frame_untouched() {
        let eyes = Scripted::returning(vec![Region::new(1, 1, 5, 5)]);
        let seen = eyes.seen.clone();
        let mut detector = Detector::new(
            Scripted::default(),
            eyes,
            Scripted::default(),
            DetectionConfig::default(),
        );

        let mut frame = blank_frame();
        let annotation = detector.annotate(&mut frame).unwrap();

        assert_eq!(frame, blank_frame());
        assert_eq!(annotation, Annotation::default());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn face_box_corners_are_exact() {
        let face = Region::new(40, 30, 60, 50);
        let mut detector = Detector::new(
            Scripted::returning(vec![face]),
            Scripted::default(),
            Scripted::default(),
            DetectionConfig::default(),
        );

        let mut frame = blank_frame();
        detector.annotate(&mut frame).unwrap();

        for (x, y) in [(40, 30), (100, 30), (40, 80), (100, 80)] {
            assert_eq!(*frame.get_pixel(x, y), FACE_COLOR, "corner ({}, {})", x, y);
        }
        // Second line sits inside the first.
        assert_eq!(*frame.get_pixel(41, 31), FACE_COLOR);
        assert_eq!(*frame.get_pixel(99, 79), FACE_COLOR);
        // Nothing outside the far corner or in the middle.
        assert_eq!(*frame.get_pixel(39, 30), BACKGROUND);
        assert_eq!(*frame.get_pixel(101, 81), BACKGROUND);
        assert_eq!(*frame.get_pixel(70, 55), BACKGROUND);
    }

    #[test]
    fn sub_classifiers_see_the_face_crop() {
        let eyes = Scripted::default();
        let mouth = Scripted::default();
        let (eyes_seen, mouth_seen) = (eyes.seen.clone(), mouth.seen.clone());
        let mut detector = Detector::new(
            Scripted::returning(vec![Region::new(10, 10, 64, 48), Region::new(120, 20, 30, 30)]),
            eyes,
            mouth,
            DetectionConfig::default(),
        );

        detector.annotate(&mut blank_frame()).unwrap();

        assert_eq!(*eyes_seen.borrow(), vec![(64, 48), (30, 30)]);
        assert_eq!(*mouth_seen.borrow(), vec![(64, 48), (30, 30)]);
    }

    #[test]
    fn eye_and_mouth_boxes_use_face_coordinates() {
        let face = Region::new(50, 40, 80, 80);
        let mut detector = Detector::new(
            Scripted::returning(vec![face]),
            Scripted::returning(vec![Region::new(10, 15, 20, 12)]),
            Scripted::returning(vec![Region::new(20, 50, 40, 20)]),
            DetectionConfig::default(),
        );

        let mut frame = blank_frame();
        let annotation = detector.annotate(&mut frame).unwrap();

        assert_eq!(annotation.faces, vec![face]);
        assert_eq!((annotation.eyes, annotation.mouths), (1, 1));
        assert_eq!(*frame.get_pixel(60, 55), EYE_COLOR);
        assert_eq!(*frame.get_pixel(80, 67), EYE_COLOR);
        assert_eq!(*frame.get_pixel(70, 90), MOUTH_COLOR);
        assert_eq!(*frame.get_pixel(110, 110), MOUTH_COLOR);
        // Not drawn at the frame origin.
        assert_eq!(*frame.get_pixel(10, 15), BACKGROUND);
    }

    #[test]
    fn sub_boxes_never_leave_the_face() {
        let face = Region::new(30, 30, 60, 60);
        let mut detector = Detector::new(
            Scripted::returning(vec![face]),
            Scripted::returning(vec![Region::new(40, 40, 50, 50)]),
            Scripted::returning(vec![Region::new(0, 45, 200, 100)]),
            DetectionConfig::default(),
        );

        let mut frame = blank_frame();
        detector.annotate(&mut frame).unwrap();

        let mut drawn = 0;
        for (x, y, pixel) in frame.enumerate_pixels() {
            if *pixel == EYE_COLOR || *pixel == MOUTH_COLOR {
                drawn += 1;
                assert!(
                    face.contains(&Region::new(x, y, 0, 0)),
                    "pixel ({}, {}) outside face {:?}", x, y, face
                );
            }
        }
        assert!(drawn > 0);
    }

    #[test]
    fn face_overhanging_the_frame_is_clipped() {
        let mut detector = Detector::new(
            Scripted::returning(vec![Region::new(180, 130, 50, 50)]),
            Scripted::default(),
            Scripted::default(),
            DetectionConfig::default(),
        );

        let mut frame = blank_frame();
        let annotation = detector.annotate(&mut frame).unwrap();

        assert_eq!(annotation.faces, vec![Region::new(180, 130, 20, 20)]);
        assert_eq!(*frame.get_pixel(180, 130), FACE_COLOR);
    }

    #[test]
    fn classifier_params_are_passed_through() {
        struct Expect(DetectionParams);
        impl Classifier for Expect {
            fn detect(&mut self, _image: &GrayImage, params: &DetectionParams) -> Result<Vec<Region>> {
                assert_eq!(*params, self.0);
                Ok(vec![Region::new(0, 0, 40, 40)])
            }
        }

        let mut detector = Detector::new(
            Expect(DetectionParams::FACE),
            Expect(DetectionParams::EYES),
            Expect(DetectionParams::MOUTH),
            DetectionConfig::default(),
        );
        detector.annotate(&mut blank_frame()).unwrap();
    }
}
