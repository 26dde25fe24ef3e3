use glam::{Mat4, Vec3};

/// Axis-aligned bounding box. An empty box has `min > max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub const EMPTY: AABB = AABB {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(point1: Vec3, point2: Vec3) -> AABB {
        let min = point1.min(point2);
        let max = point1.max(point2);
        AABB { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> AABB {
        points
            .into_iter()
            .fold(AABB::EMPTY, |aabb, point| aabb.extended(point))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extended(&self, point: Vec3) -> AABB {
        AABB {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    pub fn union(&self, other: &AABB) -> AABB {
        if other.is_empty() {
            return *self;
        }

        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Bounds of this box after `transform`, re-aligned to the axes.
    pub fn transformed(&self, transform: &Mat4) -> AABB {
        if self.is_empty() {
            return *self;
        }

        AABB::from_points(
            self.corners()
                .map(|corner| transform.transform_point3(corner)),
        )
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

impl Default for AABB {
    fn default() -> Self {
        AABB::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_has_zero_size_and_absorbs_unions() {
        let empty = AABB::EMPTY;
        assert!(empty.is_empty());
        assert_eq!(empty.size(), Vec3::ZERO);

        let unit = AABB::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(empty.union(&unit), unit);
        assert_eq!(unit.union(&empty), unit);
    }

    #[test]
    fn transformed_box_covers_rotated_corners() {
        let cube = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let rotation = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let rotated = cube.transformed(&rotation);

        let half_diagonal = 2.0_f32.sqrt();
        assert!((rotated.max.x - half_diagonal).abs() < 1e-5);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
        assert!(rotated.contains_point(Vec3::new(1.4, 0.0, 0.0)));
    }

    #[test]
    fn from_points_tracks_extremes() {
        let aabb = AABB::from_points([
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-3.0, 4.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ]);

        assert_eq!(aabb.min, Vec3::new(-3.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(aabb.center(), Vec3::new(-1.0, 1.0, 1.0));
    }
}
