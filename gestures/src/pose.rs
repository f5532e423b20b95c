//! Pose samples: fingertip positions expressed in the hand's local frame.
//!
//! The tracker hands us world-space fingertips plus the hand (palm) pose;
//! templates and live samples are both stored relative to the hand so a
//! gesture matches regardless of where the hand is in the room.

// ── Points ─────────────────────────────────────────────────

/// A 3D position in meters (x, y, z).
pub type Point3 = [f32; 3];

/// Euclidean distance between two 3D points.
pub fn point_distance(a: &Point3, b: &Point3) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

// ── Fingertips ─────────────────────────────────────────────

/// The five fingertips, in the order templates store them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fingertip {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Fingertip {
    pub const ALL: [Fingertip; 5] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Little,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumb => "thumb-tip",
            Self::Index => "index-tip",
            Self::Middle => "middle-tip",
            Self::Ring => "ring-tip",
            Self::Little => "little-tip",
        }
    }
}

// ── Hand frame ─────────────────────────────────────────────

/// World-space pose of the hand reference joint (usually the palm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFrame {
    /// Position in meters (x, y, z).
    pub position: Point3,
    /// Orientation quaternion (x, y, z, w), unit length.
    pub orientation: [f32; 4],
}

impl Default for HandFrame {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl HandFrame {
    pub fn new(position: Point3, orientation: [f32; 4]) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Express a world-space point in this frame's local coordinates.
    ///
    /// Translates by `-position`, then rotates by the conjugate of
    /// `orientation`.
    pub fn inverse_transform_point(&self, world: &Point3) -> Point3 {
        let v = [
            world[0] - self.position[0],
            world[1] - self.position[1],
            world[2] - self.position[2],
        ];
        let [qx, qy, qz, qw] = self.orientation;
        rotate(&[-qx, -qy, -qz, qw], &v)
    }

    /// Map a hand-local point back to world space.
    pub fn transform_point(&self, local: &Point3) -> Point3 {
        let r = rotate(&self.orientation, local);
        [
            r[0] + self.position[0],
            r[1] + self.position[1],
            r[2] + self.position[2],
        ]
    }
}

/// Rotate `v` by unit quaternion `q` (x, y, z, w).
fn rotate(q: &[f32; 4], v: &Point3) -> Point3 {
    let (qx, qy, qz, qw) = (q[0], q[1], q[2], q[3]);
    // t = 2 * cross(q.xyz, v)
    let tx = 2.0 * (qy * v[2] - qz * v[1]);
    let ty = 2.0 * (qz * v[0] - qx * v[2]);
    let tz = 2.0 * (qx * v[1] - qy * v[0]);
    // v' = v + w * t + cross(q.xyz, t)
    [
        v[0] + qw * tx + (qy * tz - qz * ty),
        v[1] + qw * ty + (qz * tx - qx * tz),
        v[2] + qw * tz + (qx * ty - qy * tx),
    ]
}

// ── Pose sample ────────────────────────────────────────────

/// Fingertip positions for one tick, one point per tracked finger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseSample {
    pub points: Vec<Point3>,
}

impl PoseSample {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Build a hand-local sample from world-space fingertip positions.
    pub fn from_world(frame: &HandFrame, world_points: &[Point3]) -> Self {
        Self {
            points: world_points
                .iter()
                .map(|p| frame.inverse_transform_point(p))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Point3] {
        &self.points
    }

    /// Position of a named fingertip, assuming the five-finger layout.
    pub fn fingertip(&self, finger: Fingertip) -> Option<Point3> {
        self.points.get(finger.index()).copied()
    }
}

impl From<Vec<Point3>> for PoseSample {
    fn from(points: Vec<Point3>) -> Self {
        Self::new(points)
    }
}

impl AsRef<[Point3]> for PoseSample {
    fn as_ref(&self) -> &[Point3] {
        &self.points
    }
}
