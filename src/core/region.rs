/// Axis-aligned detection rectangle.
///
/// Face regions live in full-frame coordinates; eye and mouth regions live
/// in the coordinate space of the face they were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// x of the far corner, `x + width`.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// y of the far corner, `y + height`.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with a `width` x `height` image, or `None` when nothing
    /// of the region is left.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clipped = Self {
            x: self.x,
            y: self.y,
            width: self.width.min(width - self.x),
            height: self.height.min(height - self.y),
        };
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Map a region expressed relative to `parent` back to the parent's
    /// own coordinate space.
    pub fn offset_by(&self, parent: &Region) -> Self {
        Self {
            x: parent.x + self.x,
            y: parent.y + self.y,
            ..*self
        }
    }

    /// Whether every corner of `other` lies on or inside this rectangle.
    pub fn contains(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[cfg(feature = "opencv")]
impl Region {
    /// Convert a library rectangle, dropping ones with negative geometry.
    pub fn from_cv(rect: &opencv::core::Rect) -> Option<Self> {
        if rect.x < 0 || rect.y < 0 || rect.width <= 0 || rect.height <= 0 {
            return None;
        }
        Some(Self::new(rect.x as u32, rect.y as u32, rect.width as u32, rect.height as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_corner() {
        let r = Region::new(10, 20, 30, 40);
        assert_eq!((r.right(), r.bottom()), (40, 60));
    }

    #[test]
    fn clip_trims_overhang() {
        let r = Region::new(90, 50, 30, 80);
        assert_eq!(r.clip_to(100, 100), Some(Region::new(90, 50, 10, 50)));
    }

    #[test]
    fn clip_outside_is_none() {
        assert_eq!(Region::new(100, 0, 5, 5).clip_to(100, 100), None);
        assert_eq!(Region::new(0, 0, 0, 5).clip_to(100, 100), None);
    }

    #[test]
    fn offset_moves_into_parent_space() {
        let face = Region::new(100, 80, 120, 120);
        let eye = Region::new(20, 30, 25, 20);
        assert_eq!(eye.offset_by(&face), Region::new(120, 110, 25, 20));
    }

    #[test]
    fn containment_is_inclusive_of_edges() {
        let face = Region::new(10, 10, 50, 50);
        assert!(face.contains(&face));
        assert!(face.contains(&Region::new(20, 20, 40, 40)));
        assert!(!face.contains(&Region::new(20, 20, 41, 10)));
        assert!(!face.contains(&Region::new(9, 20, 5, 5)));
    }
}
