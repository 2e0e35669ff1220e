use bincode::{Decode, Encode};
use log::warn;
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;
use std::time::Duration;

/// Timestamps are signed nanoseconds. The epoch is up to the user but has to be
/// consistent across a whole tree.
pub type Stamp = i64;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Kind of an edge, fixed when the edge is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum TransformType {
    /// Changes over time
    Dynamic = 0,
    /// Does not change over time
    Static = 1,
}

impl TryFrom<u8> for TransformType {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(TransformType::Dynamic),
            1 => Ok(TransformType::Static),
            other => Err(other),
        }
    }
}

impl fmt::Display for TransformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformType::Static => write!(f, "TransformType.STATIC"),
            TransformType::Dynamic => write!(f, "TransformType.DYNAMIC"),
        }
    }
}

/// A rigid transform (translation + unit quaternion) valid at `stamp`.
///
/// The rotation is always unit norm: constructors renormalize what they are given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "IsometryRepr", into = "IsometryRepr")]
pub struct StampedIsometry {
    isometry: Isometry3<f64>,
    stamp: Stamp,
}

/// Flat representation used on the wire and in files.
/// The rotation is stored as [x, y, z, w].
#[derive(Clone, Debug, Serialize, Deserialize, Encode, Decode)]
struct IsometryRepr {
    translation: [f64; 3],
    rotation: [f64; 4],
    stamp: Stamp,
}

impl From<IsometryRepr> for StampedIsometry {
    fn from(repr: IsometryRepr) -> Self {
        StampedIsometry::new(repr.translation, repr.rotation, repr.stamp)
    }
}

impl From<StampedIsometry> for IsometryRepr {
    fn from(si: StampedIsometry) -> Self {
        IsometryRepr {
            translation: si.translation(),
            rotation: si.rotation(),
            stamp: si.stamp,
        }
    }
}

fn normalized_rotation(rotation: [f64; 4]) -> UnitQuaternion<f64> {
    let [x, y, z, w] = rotation;
    let q = Quaternion::new(w, x, y, z);
    match UnitQuaternion::try_new(q, f64::EPSILON) {
        Some(unit) if unit.coords.iter().all(|c| c.is_finite()) => unit,
        _ => {
            warn!("Degenerate rotation {rotation:?}, falling back to identity");
            UnitQuaternion::identity()
        }
    }
}

impl StampedIsometry {
    /// Create a new StampedIsometry with timestamp in nanoseconds.
    /// `rotation` is an [x, y, z, w] quaternion, it does not need to be normalized.
    pub fn new(translation: [f64; 3], rotation: [f64; 4], stamp_ns: Stamp) -> Self {
        let isometry = Isometry3::from_parts(
            Translation3::new(translation[0], translation[1], translation[2]),
            normalized_rotation(rotation),
        );
        StampedIsometry {
            isometry,
            stamp: stamp_ns,
        }
    }

    /// Same as `new` with the timestamp given in seconds.
    pub fn from_secs(translation: [f64; 3], rotation: [f64; 4], stamp_secs: f64) -> Self {
        Self::new(translation, rotation, (stamp_secs * NANOS_PER_SEC) as Stamp)
    }

    pub fn from_isometry(isometry: Isometry3<f64>, stamp: Stamp) -> Self {
        // The quaternion may have been built with new_unchecked.
        let rotation = UnitQuaternion::new_normalize(isometry.rotation.into_inner());
        StampedIsometry {
            isometry: Isometry3::from_parts(isometry.translation, rotation),
            stamp,
        }
    }

    pub fn identity(stamp: Stamp) -> Self {
        StampedIsometry {
            isometry: Isometry3::identity(),
            stamp,
        }
    }

    /// Get the translation as [x, y, z]
    pub fn translation(&self) -> [f64; 3] {
        let t = self.isometry.translation.vector;
        [t.x, t.y, t.z]
    }

    /// Get the rotation as [x, y, z, w] quaternion
    pub fn rotation(&self) -> [f64; 4] {
        let q = self.isometry.rotation.into_inner();
        [q.i, q.j, q.k, q.w]
    }

    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Timestamp in seconds. Loses precision for large stamps.
    pub fn stamp_secs(&self) -> f64 {
        self.stamp as f64 / NANOS_PER_SEC
    }

    /// Timestamp as a duration since the epoch, negative stamps saturate to zero.
    pub fn stamp_as_duration(&self) -> Duration {
        Duration::from_nanos(self.stamp.max(0) as u64)
    }

    /// Euler angles (roll, pitch, yaw) in radians.
    pub fn euler_angles(&self) -> [f64; 3] {
        let (roll, pitch, yaw) = self.isometry.rotation.euler_angles();
        [roll, pitch, yaw]
    }

    /// Length of the translation.
    pub fn norm(&self) -> f64 {
        self.isometry.translation.vector.norm()
    }

    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.isometry
    }

    /// The inverse transform, same stamp.
    pub fn inverse(&self) -> Self {
        StampedIsometry {
            isometry: self.isometry.inverse(),
            stamp: self.stamp,
        }
    }

    pub fn with_stamp(self, stamp: Stamp) -> Self {
        StampedIsometry { stamp, ..self }
    }
}

/// Composition. The result carries the oldest of both stamps since it is only
/// as recent as its oldest component.
impl Mul<&StampedIsometry> for &StampedIsometry {
    type Output = StampedIsometry;

    fn mul(self, rhs: &StampedIsometry) -> StampedIsometry {
        StampedIsometry {
            isometry: self.isometry * rhs.isometry,
            stamp: self.stamp.min(rhs.stamp),
        }
    }
}

impl fmt::Display for StampedIsometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translation();
        let r = self.rotation();
        write!(
            f,
            "StampedIsometry(translation=[{:.3}, {:.3}, {:.3}], rotation=[{:.3}, {:.3}, {:.3}, {:.3}], stamp={:.6}s)",
            t[0],
            t[1],
            t[2],
            r[0],
            r[1],
            r[2],
            r[3],
            self.stamp_secs()
        )
    }
}

// Bincode goes through the flat representation so decoding renormalizes too.
impl Encode for StampedIsometry {
    fn encode<E: bincode::enc::Encoder>(
        &self,
        encoder: &mut E,
    ) -> Result<(), bincode::error::EncodeError> {
        IsometryRepr::from(self.clone()).encode(encoder)
    }
}

impl Decode<()> for StampedIsometry {
    fn decode<D: bincode::de::Decoder<Context = ()>>(
        decoder: &mut D,
    ) -> Result<Self, bincode::error::DecodeError> {
        let repr: IsometryRepr = Decode::decode(decoder)?;
        Ok(repr.into())
    }
}
