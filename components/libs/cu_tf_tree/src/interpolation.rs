use crate::error::{TfError, TfResult};
use crate::types::{Stamp, StampedIsometry};
use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion};
use std::collections::VecDeque;

/// Spherical linear interpolation along the shorter arc.
///
/// `q` and `-q` encode the same rotation, if the two inputs sit on opposite
/// hemispheres `b` is flipped first so the blend never takes the long way around.
pub fn slerp_shortest(
    a: &UnitQuaternion<f64>,
    b: &UnitQuaternion<f64>,
    alpha: f64,
) -> UnitQuaternion<f64> {
    let b = if a.coords.dot(&b.coords) < 0.0 {
        Unit::new_unchecked(-b.into_inner())
    } else {
        *b
    };
    let q = a
        .try_slerp(&b, alpha, 1.0e-9)
        .unwrap_or_else(|| a.nlerp(&b, alpha));
    UnitQuaternion::new_normalize(q.into_inner())
}

/// Interpolate between two samples at a specific time point.
///
/// The translation is blended linearly and the rotation with `slerp_shortest`.
/// The result is stamped with `time`.
pub fn interpolate(
    before: &StampedIsometry,
    after: &StampedIsometry,
    time: Stamp,
) -> TfResult<StampedIsometry> {
    if time < before.stamp() {
        return Err(TfError::AttemptedLookupInPast(format!(
            "requested time {time} is before the sample at {}",
            before.stamp()
        )));
    }
    if time > after.stamp() {
        return Err(TfError::AttemptedLookUpInFuture(format!(
            "requested time {time} is after the sample at {}",
            after.stamp()
        )));
    }
    let span = after.stamp() as i128 - before.stamp() as i128;
    if span == 0 {
        return Ok(before.clone().with_stamp(time));
    }
    let alpha = (time as i128 - before.stamp() as i128) as f64 / span as f64;

    let (a, b) = (before.isometry(), after.isometry());
    let translation = a.translation.vector.lerp(&b.translation.vector, alpha);
    let rotation = slerp_shortest(&a.rotation, &b.rotation, alpha);

    Ok(StampedIsometry::from_isometry(
        Isometry3::from_parts(Translation3::from(translation), rotation),
        time,
    ))
}

/// Resolve a time-ordered history at `time`.
///
/// Exact hits are returned untouched, times strictly between two samples are
/// interpolated, anything outside of the history is a past/future error.
pub fn sample_at(samples: &VecDeque<StampedIsometry>, time: Stamp) -> TfResult<StampedIsometry> {
    let (oldest, latest) = match (samples.front(), samples.back()) {
        (Some(oldest), Some(latest)) => (oldest, latest),
        _ => {
            return Err(TfError::CouldNotFindTransform(
                "no samples in buffer".to_string(),
            ))
        }
    };

    match samples.binary_search_by_key(&time, |s| s.stamp()) {
        Ok(i) => Ok(samples[i].clone()),
        Err(0) => Err(TfError::AttemptedLookupInPast(format!(
            "requested time {time} is before the oldest sample at {}",
            oldest.stamp()
        ))),
        Err(i) if i >= samples.len() => Err(TfError::AttemptedLookUpInFuture(format!(
            "requested time {time} is after the latest sample at {}",
            latest.stamp()
        ))),
        Err(i) => interpolate(&samples[i - 1], &samples[i], time),
    }
}
