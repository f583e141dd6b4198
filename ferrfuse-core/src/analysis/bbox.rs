use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box in page pixel space.
///
/// `min` is the top-left corner and `max` the bottom-right corner, with Y
/// increasing downward. Serialized as `[x0, y0, x1, y1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Bbox {
    /// The minimum point of the bounding box (top-left corner).
    pub min: Vec2,
    /// The maximum point of the bounding box (bottom-right corner).
    pub max: Vec2,
}

impl From<[f32; 4]> for Bbox {
    fn from([x0, y0, x1, y1]: [f32; 4]) -> Self {
        Self::from_xyxy(x0, y0, x1, y1)
    }
}

impl From<Bbox> for [f32; 4] {
    fn from(bbox: Bbox) -> Self {
        [bbox.min.x, bbox.min.y, bbox.max.x, bbox.max.y]
    }
}

impl Bbox {
    /// Creates a new bounding box from minimum and maximum points.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
    /// assert_eq!(bbox.width(), 10.0);
    /// ```
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from `x0, y0, x1, y1` corner coordinates.
    ///
    /// No validation happens here; use [`Bbox::is_well_formed`] before trusting
    /// coordinates that come from an external collaborator.
    ///
    /// # Example
    /// ```
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_xyxy(10.0, 20.0, 30.0, 60.0);
    /// assert_eq!(bbox.area(), 800.0);
    /// ```
    pub fn from_xyxy(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            min: Vec2::new(x0, y0),
            max: Vec2::new(x1, y1),
        }
    }

    /// Creates a new bounding box from a minimum point and size vector.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new_from_min_size(Vec2::new(1.0, 2.0), Vec2::new(5.0, 3.0));
    /// assert_eq!(bbox.max, Vec2::new(6.0, 5.0));
    /// ```
    pub fn new_from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Returns `true` when every coordinate is finite and the box has strictly
    /// positive width and height.
    ///
    /// # Example
    /// ```
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// assert!(Bbox::from_xyxy(0.0, 0.0, 1.0, 1.0).is_well_formed());
    /// assert!(!Bbox::from_xyxy(5.0, 0.0, 1.0, 1.0).is_well_formed());
    /// assert!(!Bbox::from_xyxy(0.0, f32::NAN, 1.0, 1.0).is_well_formed());
    /// ```
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x < self.max.x
            && self.min.y < self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Calculates the area of the bounding box (width × height).
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new_from_min_size(Vec2::ZERO, Vec2::new(4.0, 3.0));
    /// assert_eq!(bbox.area(), 12.0);
    /// ```
    pub fn area(&self) -> f32 {
        let length = self.max - self.min;

        length.x * length.y
    }

    /// Calculates the center point of the bounding box.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0));
    /// assert_eq!(bbox.center(), Vec2::new(2.0, 1.0));
    /// ```
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Calculates the area of intersection between this bounding box and another.
    ///
    /// Boxes that only touch along an edge have no intersection area.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let bbox1 = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0));
    /// let bbox2 = Bbox::new(Vec2::new(2.0, 2.0), Vec2::new(6.0, 6.0));
    /// assert_eq!(bbox1.intersection(&bbox2), 4.0);
    /// ```
    pub fn intersection(&self, other: &Self) -> f32 {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);

        if max.x > min.x && max.y > min.y {
            (max.x - min.x) * (max.y - min.y)
        } else {
            0.
        }
    }

    /// Calculates the Intersection over Union (IoU) between this bounding box and another.
    ///
    /// # Returns
    /// A value in `[0, 1]`: 0.0 for disjoint boxes, 1.0 for identical boxes.
    /// Degenerate boxes with a zero union yield 0.0.
    ///
    /// # Example
    /// ```
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let a = Bbox::from_xyxy(0.0, 0.0, 2.0, 2.0);
    /// assert_eq!(a.iou(&a), 1.0);
    /// ```
    pub fn iou(&self, other: &Self) -> f32 {
        let intersection_area = self.intersection(other);
        let union_area = self.area() + other.area() - intersection_area;

        if union_area > 0.0 {
            intersection_area / union_area
        } else {
            0.0
        }
    }

    /// Fraction of this box's area that lies inside `outer`.
    ///
    /// Not symmetric: a small box fully inside a large one has ratio 1.0, while
    /// the large box has a small ratio inside the small one.
    ///
    /// # Example
    /// ```
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let outer = Bbox::from_xyxy(0.0, 0.0, 100.0, 100.0);
    /// let inner = Bbox::from_xyxy(10.0, 10.0, 20.0, 20.0);
    /// assert_eq!(inner.containment_ratio(&outer), 1.0);
    /// assert_eq!(outer.containment_ratio(&inner), 0.01);
    /// ```
    pub fn containment_ratio(&self, outer: &Self) -> f32 {
        let area = self.area();

        if area > 0.0 {
            (self.intersection(outer) / area).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Euclidean distance between the centers of the two boxes.
    pub fn center_distance(&self, other: &Self) -> f32 {
        self.center().distance(other.center())
    }

    /// Calculates the overlap ratio between this bounding box and another,
    /// using the smaller area as denominator.
    ///
    /// More sensitive than IoU when the boxes have very different sizes: a small
    /// box fully inside a large one scores 1.0.
    ///
    /// # Formula
    /// overlap_ratio = intersection_area / min(area1, area2)
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    ///
    /// let large = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
    /// let small = Bbox::new(Vec2::new(10.0, 10.0), Vec2::new(30.0, 30.0));
    ///
    /// let overlap_ratio = large.overlap_ratio(&small);
    /// assert_eq!(overlap_ratio, 1.0);
    /// assert!(overlap_ratio > large.iou(&small));
    /// ```
    pub fn overlap_ratio(&self, other: &Self) -> f32 {
        let intersection_area = self.intersection(other);
        let min_area = self.area().min(other.area());

        if min_area > 0.0 {
            intersection_area / min_area
        } else {
            0.0
        }
    }

    /// Clamps the bounding box coordinates to stay within the specified bounds.
    ///
    /// The result may be degenerate when the box lies entirely outside the bounds.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(-10.0, -5.0), Vec2::new(1030.0, 1030.0));
    /// let clamped = bbox.clamp(Vec2::new(0.0, 0.0), Vec2::new(1023.0, 1023.0));
    /// assert_eq!(clamped.min, Vec2::new(0.0, 0.0));
    /// assert_eq!(clamped.max, Vec2::new(1023.0, 1023.0));
    /// ```
    pub fn clamp(&self, min_bounds: Vec2, max_bounds: Vec2) -> Self {
        Self {
            min: self.min.max(min_bounds),
            max: self.max.min(max_bounds),
        }
    }

    /// Checks if this bounding box completely contains another bounding box.
    ///
    /// Edges are inclusive: a box contains itself.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    ///
    /// let outer = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
    /// let inner = Bbox::new(Vec2::new(2.0, 3.0), Vec2::new(7.0, 8.0));
    ///
    /// assert!(outer.contains(&inner));
    /// assert!(!inner.contains(&outer));
    /// ```
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    /// Creates a union bounding box that encompasses both this bounding box and another.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use ferrfuse_core::analysis::bbox::Bbox;
    ///
    /// let bbox1 = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0));
    /// let bbox2 = Bbox::new(Vec2::new(3.0, 3.0), Vec2::new(8.0, 8.0));
    /// let union = bbox1.union(&bbox2);
    ///
    /// assert_eq!(union.min, Vec2::new(0.0, 0.0));
    /// assert_eq!(union.max, Vec2::new(8.0, 8.0));
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grows the box by `margin` pixels on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    /// Horizontal and vertical empty space between two boxes.
    ///
    /// Each component is zero when the boxes overlap (or touch) along that axis.
    ///
    /// # Example
    /// ```
    /// use ferrfuse_core::analysis::bbox::Bbox;
    /// let left = Bbox::from_xyxy(0.0, 0.0, 10.0, 10.0);
    /// let right = Bbox::from_xyxy(14.0, 5.0, 20.0, 30.0);
    /// let gap = left.gap(&right);
    /// assert_eq!(gap.x, 4.0);
    /// assert_eq!(gap.y, 0.0);
    /// ```
    pub fn gap(&self, other: &Self) -> Vec2 {
        (self.min.max(other.min) - self.max.min(other.max)).max(Vec2::ZERO)
    }

    /// Returns `true` when the box lies inside `[0, width] × [0, height]`.
    pub fn within_page(&self, width: f32, height: f32) -> bool {
        self.min.x >= 0.0 && self.min.y >= 0.0 && self.max.x <= width && self.max.y <= height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(x0: f32, y0: f32, x1: f32, y1: f32) -> Bbox {
        Bbox::from_xyxy(x0, y0, x1, y1)
    }

    #[test]
    fn test_bbox_area_and_size() {
        let bbox = Bbox::new_from_min_size(Vec2::new(3.0, 4.0), Vec2::new(6.0, 2.5));
        assert_eq!(bbox.width(), 6.0);
        assert_eq!(bbox.height(), 2.5);
        assert_eq!(bbox.area(), 15.0);

        // Degenerate line has no area
        let line = bb(0.0, 7.0, 12.0, 7.0);
        assert_eq!(line.area(), 0.0);
    }

    #[test]
    fn test_bbox_well_formed() {
        assert!(bb(0.0, 0.0, 0.5, 0.5).is_well_formed());
        // Inverted on either axis
        assert!(!bb(10.0, 0.0, 5.0, 5.0).is_well_formed());
        assert!(!bb(0.0, 10.0, 5.0, 5.0).is_well_formed());
        // Zero width
        assert!(!bb(5.0, 0.0, 5.0, 5.0).is_well_formed());
        // Non-finite coordinates
        assert!(!bb(0.0, 0.0, f32::INFINITY, 5.0).is_well_formed());
        assert!(!bb(f32::NAN, 0.0, 5.0, 5.0).is_well_formed());
    }

    #[test]
    fn test_bbox_iou() {
        let a = bb(10.0, 10.0, 50.0, 30.0);
        assert_eq!(a.iou(&a), 1.0);

        // Disjoint and edge-touching boxes
        assert_eq!(a.iou(&bb(60.0, 10.0, 90.0, 30.0)), 0.0);
        assert_eq!(a.iou(&bb(50.0, 10.0, 90.0, 30.0)), 0.0);

        // [0,0,10,10] vs [1,1,11,11]: inter 81, union 119
        let b1 = bb(0.0, 0.0, 10.0, 10.0);
        let b2 = bb(1.0, 1.0, 11.0, 11.0);
        let expected = 81.0 / 119.0;
        assert!((b1.iou(&b2) - expected).abs() < 1e-6);
        assert_eq!(b1.iou(&b2), b2.iou(&b1));

        // Nested: 12 / 100
        let outer = bb(0.0, 0.0, 10.0, 10.0);
        let inner = bb(2.0, 3.0, 5.0, 7.0);
        assert!((outer.iou(&inner) - 0.12).abs() < 1e-6);

        // Two degenerate boxes never divide by zero
        assert_eq!(bb(0.0, 0.0, 5.0, 0.0).iou(&bb(1.0, 0.0, 4.0, 0.0)), 0.0);
    }

    #[test]
    fn test_bbox_containment_ratio() {
        let table = bb(100.0, 100.0, 500.0, 400.0);

        // Fully inside
        let cell = bb(120.0, 120.0, 200.0, 140.0);
        assert_eq!(cell.containment_ratio(&table), 1.0);

        // Half of a 40x10 line sticks out on the right
        let line = bb(480.0, 200.0, 520.0, 210.0);
        assert!((line.containment_ratio(&table) - 0.5).abs() < 1e-6);

        // Outside
        let far = bb(0.0, 0.0, 50.0, 50.0);
        assert_eq!(far.containment_ratio(&table), 0.0);

        // Asymmetric by construction
        assert!(table.containment_ratio(&cell) < cell.containment_ratio(&table));

        // Degenerate inner box
        assert_eq!(bb(150.0, 150.0, 150.0, 160.0).containment_ratio(&table), 0.0);
    }

    #[test]
    fn test_bbox_center_distance() {
        let a = bb(0.0, 0.0, 10.0, 10.0);
        let b = bb(30.0, 40.0, 40.0, 50.0);
        // Centers (5,5) and (35,45): a 30-40-50 triangle
        assert_eq!(a.center_distance(&b), 50.0);
        assert_eq!(b.center_distance(&a), 50.0);
        assert_eq!(a.center_distance(&a), 0.0);
    }

    #[test]
    fn test_bbox_overlap_ratio() {
        let big = bb(0.0, 0.0, 60.0, 60.0);
        let small = bb(40.0, 40.0, 80.0, 80.0);
        // Intersection 20x20 = 400 over the smaller area 1600
        assert!((big.overlap_ratio(&small) - 0.25).abs() < 1e-6);
        assert_eq!(big.overlap_ratio(&small), small.overlap_ratio(&big));

        let point = bb(5.0, 5.0, 5.0, 5.0);
        assert_eq!(point.overlap_ratio(&big), 0.0);
    }

    #[test]
    fn test_bbox_union_and_contains() {
        let a = bb(10.0, 40.0, 30.0, 60.0);
        let b = bb(25.0, 10.0, 70.0, 45.0);
        let union = a.union(&b);
        assert_eq!(union, bb(10.0, 10.0, 70.0, 60.0));
        assert_eq!(union, b.union(&a));
        assert!(union.contains(&a));
        assert!(union.contains(&b));
        assert!(union.contains(&union));
        assert!(!a.contains(&b));
    }

    #[test]
    fn test_bbox_expand_and_clamp() {
        let bbox = bb(2.0, 50.0, 90.0, 60.0).expand(3.0);
        assert_eq!(bbox, bb(-1.0, 47.0, 93.0, 63.0));

        let clamped = bbox.clamp(Vec2::ZERO, Vec2::new(92.0, 100.0));
        assert_eq!(clamped, bb(0.0, 47.0, 92.0, 63.0));
        assert!(clamped.within_page(92.0, 100.0));
        assert!(!bbox.within_page(92.0, 100.0));
    }

    #[test]
    fn test_bbox_gap() {
        let a = bb(0.0, 0.0, 10.0, 10.0);
        // Diagonal neighbour 3px right and 6px below
        let b = bb(13.0, 16.0, 20.0, 20.0);
        assert_eq!(a.gap(&b), Vec2::new(3.0, 6.0));
        assert_eq!(b.gap(&a), Vec2::new(3.0, 6.0));
        // Overlapping boxes have no gap
        assert_eq!(a.gap(&bb(5.0, 5.0, 15.0, 15.0)), Vec2::ZERO);
    }

    #[test]
    fn test_bbox_serde_as_array() {
        let bbox = bb(1.5, 2.0, 3.0, 4.25);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[1.5,2.0,3.0,4.25]");
        let back: Bbox = serde_json::from_str("[1.5,2.0,3.0,4.25]").unwrap();
        assert_eq!(back, bbox);
    }
}
