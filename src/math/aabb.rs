use glam::{Mat4, Vec3};

/// Axis-aligned bounding box
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Inverted box that any point or union replaces
    pub const EMPTY: AABB = AABB {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut aabb, p| {
            aabb.expand_to_point(p);
            aabb
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Width, height and depth
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    pub fn diagonal_length(&self) -> f32 {
        self.size().length()
    }

    /// Box enclosing all eight corners after `transform`
    pub fn transformed(&self, transform: &Mat4) -> AABB {
        if self.is_empty() {
            return *self;
        }
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        });
        AABB::from_points(corners.map(|c| transform.transform_point3(c)))
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_new() {
        let min = Vec3::new(0.0, 0.0, 0.0);
        let max = Vec3::new(1.0, 1.0, 1.0);
        let aabb = AABB::new(min, max);
        assert_eq!(aabb.min, min);
        assert_eq!(aabb.max, max);
    }

    #[test]
    fn test_aabb_center() {
        let aabb = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_aabb_center_negative() {
        let aabb = AABB::new(Vec3::new(-2.0, -4.0, -6.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Vec3::ZERO);
    }

    #[test]
    fn test_empty_box_reports_zero_size() {
        let aabb = AABB::EMPTY;
        assert!(aabb.is_empty());
        assert_eq!(aabb.size(), Vec3::ZERO);
        assert_eq!(aabb.center(), Vec3::ZERO);
        assert_eq!(aabb.max_extent(), 0.0);
    }

    #[test]
    fn test_from_points() {
        let aabb = AABB::from_points([
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 0.0, 0.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_size_and_diagonal() {
        let aabb = AABB::new(Vec3::ZERO, Vec3::new(2.0, 3.0, 6.0));
        assert_eq!(aabb.size(), Vec3::new(2.0, 3.0, 6.0));
        assert_eq!(aabb.max_extent(), 6.0);
        assert!((aabb.diagonal_length() - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let aabb = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(AABB::EMPTY.union(&aabb), aabb);
    }

    #[test]
    fn test_transformed_by_rotation() {
        let aabb = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let rotated = aabb.transformed(&Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert!((rotated.size().x - 1.0).abs() < 1e-5);
        assert!((rotated.size().y - 2.0).abs() < 1e-5);
    }
}
