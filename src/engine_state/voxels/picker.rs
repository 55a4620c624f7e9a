//! # Ray-Voxel Picker
//!
//! Finds the block a view ray hits first, using the slab test against each block's
//! unit bounding box.
//!
//! Degenerate ray directions are not special-cased: a zero direction component turns into
//! an infinite inverse and the slab bounds along that axis become `±inf`, which the
//! min/max reductions handle naturally.

use cgmath::{ElementWise, Point3, Rad, Vector3};

use crate::engine_state::camera_state::camera::Camera;

use super::{block::Block, block_store::BlockId};

/// A ray stored by its origin and component-wise inverse direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray
    pub origin: Point3<f32>,
    /// `1 / direction` per axis, `±inf` where the direction is zero
    pub inverse_direction: Vector3<f32>,
}

/// Result of a successful pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// The block that was hit
    pub block_id: BlockId,
    /// Distance along the ray to the entry point, 0 if the ray starts inside the block
    pub distance: f32,
    /// Outward normal of the face the ray entered through
    pub face_normal: Vector3<i8>,
}

impl Ray {
    /// Creates a ray from an origin and a direction.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            inverse_direction: Vector3::new(
                1.0 / direction.x,
                1.0 / direction.y,
                1.0 / direction.z,
            ),
        }
    }

    /// Creates a ray looking along a yaw/pitch orientation.
    pub fn from_orientation(origin: Point3<f32>, yaw: Rad<f32>, pitch: Rad<f32>) -> Self {
        Self::new(origin, Camera::forward_from(yaw, pitch))
    }

    /// Creates the ray the camera is looking along.
    pub fn from_camera(camera: &Camera) -> Self {
        Self::from_orientation(camera.position, camera.yaw, camera.pitch)
    }

    /// Slab test against the unit box whose minimum corner is `min`.
    ///
    /// # Returns
    /// The entry distance clamped to 0 and the entry face normal, or `None` on a miss
    pub fn intersect_unit_box(&self, min: Point3<f32>) -> Option<(f32, Vector3<i8>)> {
        let max = min + Vector3::new(1.0, 1.0, 1.0);

        let t0 = (min - self.origin).mul_element_wise(self.inverse_direction);
        let t1 = (max - self.origin).mul_element_wise(self.inverse_direction);

        let near = Vector3::new(t0.x.min(t1.x), t0.y.min(t1.y), t0.z.min(t1.z));
        let far = Vector3::new(t0.x.max(t1.x), t0.y.max(t1.y), t0.z.max(t1.z));

        let enter = near.x.max(near.y).max(near.z);
        let exit = far.x.min(far.y).min(far.z);
        let distance = enter.max(0.0);

        if exit < distance {
            return None;
        }

        let mut face_normal = Vector3::new(0, 0, 0);
        for axis in 0..3 {
            if near[axis] == enter {
                face_normal[axis] = if self.inverse_direction[axis] < 0.0 { 1 } else { -1 };
                break;
            }
        }

        Some((distance, face_normal))
    }
}

/// Finds the nearest block hit by `ray`.
///
/// Blocks are tested in iteration order and a later block only replaces the current
/// best hit if it is strictly closer, so equal distances resolve to the earlier block.
pub fn pick<'a>(
    ray: &Ray,
    blocks: impl IntoIterator<Item = (BlockId, &'a Block)>,
) -> Option<PickResult> {
    let mut nearest: Option<PickResult> = None;

    for (block_id, block) in blocks {
        let Some((distance, face_normal)) = ray.intersect_unit_box(block.min_corner()) else {
            continue;
        };

        if nearest.map_or(true, |best| distance < best.distance) {
            nearest = Some(PickResult {
                block_id,
                distance,
                face_normal,
            });
        }
    }

    nearest
}

/// Finds the block at the centre of the camera's view.
pub fn pick_from_camera<'a>(
    camera: &Camera,
    blocks: impl IntoIterator<Item = (BlockId, &'a Block)>,
) -> Option<PickResult> {
    pick(&Ray::from_camera(camera), blocks)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, block_store::BlockStore};

    fn single_block_at_origin() -> (BlockStore, BlockId) {
        let mut store = BlockStore::new();
        let id = store.append(Block::new([0, 0, 0], BlockType::Stone)).unwrap();
        (store, id)
    }

    #[test]
    fn ray_along_positive_x_hits_negative_x_face() {
        let (store, id) = single_block_at_origin();
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0));

        let hit = pick(&ray, store.iter()).unwrap();

        assert_eq!(hit.block_id, id);
        assert_eq!(hit.distance, 5.0);
        assert_eq!(hit.face_normal, Vector3::new(-1, 0, 0));
    }

    #[test]
    fn camera_orientation_produces_the_same_hit() {
        let (store, id) = single_block_at_origin();
        let ray = Ray::from_orientation(Point3::new(-5.0, 0.5, 0.5), Rad(FRAC_PI_2), Rad(0.0));

        let hit = pick(&ray, store.iter()).unwrap();

        assert_eq!(hit.block_id, id);
        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert_eq!(hit.face_normal, Vector3::new(-1, 0, 0));
    }

    #[test]
    fn ray_starting_inside_a_block_reports_zero_distance() {
        let (store, id) = single_block_at_origin();
        let origin = Point3::new(0.5, 0.5, 0.5);

        for (yaw, pitch) in [(0.0, 0.0), (1.0, 0.3), (3.5, -1.2), (5.9, 1.5)] {
            let ray = Ray::from_orientation(origin, Rad(yaw), Rad(pitch));
            let hit = pick(&ray, store.iter()).unwrap();

            assert_eq!(hit.block_id, id);
            assert_eq!(hit.distance, 0.0);
        }
    }

    #[test]
    fn ray_pointing_away_misses() {
        let (store, _) = single_block_at_origin();
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vector3::new(-1.0, 0.0, 0.0));

        assert_eq!(pick(&ray, store.iter()), None);
    }

    #[test]
    fn ray_passing_beside_misses() {
        let (store, _) = single_block_at_origin();
        let ray = Ray::new(Point3::new(-5.0, 1.5, 0.5), Vector3::new(1.0, 0.0, 0.0));

        assert_eq!(pick(&ray, store.iter()), None);
    }

    #[test]
    fn nearest_block_wins_regardless_of_order() {
        let mut store = BlockStore::new();
        store.append(Block::new([4, 0, 0], BlockType::Dirt)).unwrap();
        let near = store.append(Block::new([1, 0, 0], BlockType::Dirt)).unwrap();
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0));

        let hit = pick(&ray, store.iter()).unwrap();

        assert_eq!(hit.block_id, near);
        assert_eq!(hit.distance, 6.0);
    }

    #[test]
    fn equal_distances_keep_the_first_block() {
        let mut store = BlockStore::new();
        let first = store.append(Block::new([2, 0, 0], BlockType::Dirt)).unwrap();
        store.append(Block::new([2, 0, 0], BlockType::Grass)).unwrap();
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0));

        assert_eq!(pick(&ray, store.iter()).unwrap().block_id, first);
    }

    #[test]
    fn looking_down_hits_the_top_face() {
        let (store, _) = single_block_at_origin();
        let ray = Ray::new(Point3::new(0.5, 3.0, 0.5), Vector3::new(0.0, -1.0, 0.0));

        let hit = pick(&ray, store.iter()).unwrap();

        assert_eq!(hit.distance, 2.0);
        assert_eq!(hit.face_normal, Vector3::new(0, 1, 0));
    }

    #[test]
    fn empty_world_has_no_hit() {
        let store = BlockStore::new();
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));

        assert_eq!(pick(&ray, store.iter()), None);
    }
}
