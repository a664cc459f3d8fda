//! Grid-stepping voxel raycast.
//!
//! Walks the cells pierced by a ray one boundary at a time (Amanatides & Woo),
//! so the first occupied cell is found without sampling gaps. The walk is
//! bounded by both the caller's distance and the point where the ray leaves
//! the world box, which makes an infinite distance safe.

use super::{block_coord, VoxelWorld};
use crate::block::BlockKind;
use bevy::math::{IVec3, Vec3};

/// A ray with an arbitrary-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Ray { origin, direction }
    }
}

/// Cube face, named by its outward normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    /// Outward unit normal of the face.
    #[must_use]
    pub fn normal(self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }

    /// Face on `axis` (0 = x, 1 = y, 2 = z) whose normal points toward `sign`.
    fn on_axis(axis: usize, sign: i32) -> Self {
        match (axis, sign >= 0) {
            (0, true) => Face::PosX,
            (0, false) => Face::NegX,
            (1, true) => Face::PosY,
            (1, false) => Face::NegY,
            (_, true) => Face::PosZ,
            (_, false) => Face::NegZ,
        }
    }
}

/// First occupied cell along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub coord: IVec3,
    pub face: Face, // Face the ray entered through.
    pub kind: BlockKind,
    pub distance: f32, // Along the normalized direction.
}

impl RaycastHit {
    /// The empty cell in front of the hit face, where a placed block would go.
    #[must_use]
    pub fn adjacent(&self) -> IVec3 {
        self.coord + self.face.normal()
    }
}

impl VoxelWorld {
    /// Cast a ray and return the first occupied cell within `max_dist`.
    ///
    /// # Arguments
    /// * `origin` - start point in world space
    /// * `direction` - any non-zero finite vector; it is normalized here
    /// * `max_dist` - search limit, may be `f32::INFINITY`
    ///
    /// # Return
    /// * `None` on a miss or when the inputs cannot describe a ray.
    ///
    /// An origin inside an occupied cell hits that cell at distance 0. Its
    /// face is the one opposing the dominant axis of `direction`.
    #[must_use]
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_dist: f32) -> Option<RaycastHit> {
        if !origin.is_finite() || !direction.is_finite() || max_dist.is_nan() || max_dist < 0.0 {
            return None;
        }
        let len = direction.length();
        if len <= f32::EPSILON {
            return None;
        }
        let dir = direction / len;
        let (_, exit) = self.box_span(origin, dir)?;
        let limit = max_dist.min(exit);

        let mut cell = block_coord(origin)?;
        if let Some(kind) = self.get_block(cell) {
            let axis = dominant_axis(dir);
            return Some(RaycastHit {
                coord: cell,
                face: Face::on_axis(axis, if dir[axis] > 0.0 { -1 } else { 1 }),
                kind,
                distance: 0.0,
            });
        }

        let step = IVec3::new(step_of(dir.x), step_of(dir.y), step_of(dir.z));
        let mut t_max = Vec3::ZERO;
        let mut t_delta = Vec3::splat(f32::INFINITY);
        for axis in 0..3 {
            let base = cell[axis] as f32;
            t_max[axis] = match step[axis] {
                1 => (base + 1.0 - origin[axis]) / dir[axis],
                -1 => (origin[axis] - base) / -dir[axis],
                _ => f32::INFINITY,
            };
            if step[axis] != 0 {
                t_delta[axis] = 1.0 / dir[axis].abs();
            }
        }

        loop {
            let axis = if t_max.x <= t_max.y && t_max.x <= t_max.z {
                0
            } else if t_max.y <= t_max.z {
                1
            } else {
                2
            };
            let t = t_max[axis];
            if t > limit {
                return None;
            }
            cell[axis] += step[axis];
            t_max[axis] += t_delta[axis];
            if let Some(kind) = self.get_block(cell) {
                return Some(RaycastHit {
                    coord: cell,
                    face: Face::on_axis(axis, -step[axis]),
                    kind,
                    distance: t,
                });
            }
        }
    }

    /// Parametric span `[enter, exit]` of a unit ray inside the world box,
    /// starting no earlier than `t = 0`.
    fn box_span(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        let max = self.dimensions().as_vec3();
        let mut enter = 0.0_f32;
        let mut exit = f32::INFINITY;
        for axis in 0..3 {
            if dir[axis] == 0.0 {
                if origin[axis] < 0.0 || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir[axis];
            let a = -origin[axis] * inv;
            let b = (max[axis] - origin[axis]) * inv;
            enter = enter.max(a.min(b));
            exit = exit.min(a.max(b));
            if enter > exit {
                return None;
            }
        }
        Some((enter, exit))
    }
}

fn step_of(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Axis with the largest magnitude; ties resolve x, then y, then z.
fn dominant_axis(dir: Vec3) -> usize {
    let a = dir.abs();
    if a.x >= a.y && a.x >= a.z {
        0
    } else if a.y >= a.z {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::WorldSettings;

    fn world() -> VoxelWorld {
        let mut w = VoxelWorld::new(&WorldSettings { width: 16, depth: 16, height: 16, surface_y: 6 });
        w.generate();
        w
    }

    #[test]
    fn straight_down_hits_grass_top() {
        let w = world();
        let hit = w.raycast(Vec3::new(4.5, 10.5, 4.5), Vec3::NEG_Y, 20.0).unwrap();
        assert_eq!(hit.coord, IVec3::new(4, 6, 4));
        assert_eq!(hit.face, Face::PosY);
        assert_eq!(hit.kind, BlockKind::Grass);
        assert!((hit.distance - 3.5).abs() < 1e-5);
        assert_eq!(hit.adjacent(), IVec3::new(4, 7, 4));
    }

    #[test]
    fn horizontal_ray_hits_side_face() {
        let mut w = world();
        assert!(w.place_block(IVec3::new(9, 7, 4), BlockKind::Grass));
        let hit = w.raycast(Vec3::new(4.5, 7.5, 4.5), Vec3::X, 20.0).unwrap();
        assert_eq!(hit.coord, IVec3::new(9, 7, 4));
        assert_eq!(hit.face, Face::NegX);
        assert_eq!(hit.adjacent(), IVec3::new(8, 7, 4));

        let back = w.raycast(Vec3::new(12.5, 7.5, 4.5), Vec3::NEG_X, 20.0).unwrap();
        assert_eq!(back.face, Face::PosX);
    }

    #[test]
    fn diagonal_ray_reports_entry_face() {
        let w = world();
        let hit = w.raycast(Vec3::new(2.2, 9.5, 2.5), Vec3::new(1.0, -1.0, 0.0), 20.0).unwrap();
        assert_eq!(hit.coord.y, 6);
        assert_eq!(hit.face, Face::PosY);
    }

    #[test]
    fn horizontal_ray_over_flat_ground_misses() {
        let w = world();
        assert!(w.raycast(Vec3::new(4.5, 8.6, 4.5), Vec3::X, 20.0).is_none());
        assert!(w.raycast(Vec3::new(4.5, 8.6, 4.5), Vec3::Y, f32::INFINITY).is_none());
    }

    #[test]
    fn distance_limit_is_respected() {
        let w = world();
        assert!(w.raycast(Vec3::new(4.5, 10.5, 4.5), Vec3::NEG_Y, 3.0).is_none());
        assert!(w.raycast(Vec3::new(4.5, 10.5, 4.5), Vec3::NEG_Y, 3.5).is_some());
    }

    #[test]
    fn origin_above_world_box_still_hits() {
        let w = world();
        let hit = w.raycast(Vec3::new(4.5, 40.0, 4.5), Vec3::NEG_Y, f32::INFINITY).unwrap();
        assert_eq!(hit.coord, IVec3::new(4, 6, 4));
        assert_eq!(hit.face, Face::PosY);
    }

    #[test]
    fn origin_inside_solid_hits_own_cell() {
        let w = world();
        let hit = w.raycast(Vec3::new(3.5, 2.5, 3.5), Vec3::new(0.2, -1.0, 0.1), 20.0).unwrap();
        assert_eq!(hit.coord, IVec3::new(3, 2, 3));
        assert_eq!(hit.face, Face::PosY);
        assert_eq!(hit.distance, 0.0);

        let tie = w.raycast(Vec3::new(3.5, 2.5, 3.5), Vec3::new(1.0, 1.0, 0.0), 20.0).unwrap();
        assert_eq!(tie.face, Face::NegX);
    }

    #[test]
    fn degenerate_rays_miss() {
        let w = world();
        let o = Vec3::new(4.5, 10.5, 4.5);
        assert!(w.raycast(o, Vec3::ZERO, 20.0).is_none());
        assert!(w.raycast(o, Vec3::new(f32::NAN, -1.0, 0.0), 20.0).is_none());
        assert!(w.raycast(Vec3::new(f32::INFINITY, 10.0, 4.0), Vec3::NEG_Y, 20.0).is_none());
        assert!(w.raycast(o, Vec3::NEG_Y, -1.0).is_none());
    }

    #[test]
    fn ray_leaving_the_box_misses() {
        let w = world();
        assert!(w.raycast(Vec3::new(-5.0, 10.0, 4.5), Vec3::NEG_X, f32::INFINITY).is_none());
        let hit = w.raycast(Vec3::new(-5.0, 6.5, 4.5), Vec3::X, f32::INFINITY).unwrap();
        assert_eq!(hit.coord, IVec3::new(0, 6, 4));
        assert_eq!(hit.face, Face::NegX);
    }

    #[test]
    fn random_rays_report_adjacent_empty_cells() {
        let w = world();
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..500 {
            let origin = Vec3::new(rng.f32() * 16.0, 7.0 + rng.f32() * 8.0, rng.f32() * 16.0);
            let dir = Vec3::new(rng.f32() - 0.5, -rng.f32(), rng.f32() - 0.5);
            if let Some(hit) = w.raycast(origin, dir, f32::INFINITY) {
                assert!(w.has_block(hit.coord));
                assert!(!w.has_block(hit.adjacent()));
            }
        }
    }
}
