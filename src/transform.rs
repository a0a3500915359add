//! Batch coordinate transformation between two resolved systems.
//!
//! Tuples travel through a fixed pipeline: native axis order to east,
//! north, up; heights to metres; source coordinates to absolute
//! geographic; prime meridian to Greenwich; datum shift; and the same
//! steps mirrored onto the target side. Whole-call preconditions reject
//! the batch before anything is read; per-tuple faults overwrite the
//! offending tuple with the infinity sentinel and the batch keeps going.

use std::f64::consts::FRAC_PI_2;

use crate::datum;
use crate::error::{DomainFault, TransformError};
use crate::pj::{Pj, PjKind};

/// Highest accepted tuple dimension.
pub const DIMENSION_MAX: usize = 100;

/// Latitude slack for the projected range check; latitudes within this
/// of a pole are snapped onto it before projecting.
const FWD_EPS: f64 = 1e-12;

/// Pipeline stage a tuple faulted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultStage {
    /// Reading the source coordinates back to geographic.
    Source,
    /// The datum shift between the two systems.
    Datum,
    /// Producing the target coordinates.
    Target,
}

/// One faulted tuple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault {
    /// Tuple index within the batch, starting at 0.
    pub index: usize,
    pub stage: FaultStage,
    pub fault: DomainFault,
}

/// Outcome of a batch transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Tuples converted in place.
    pub converted: usize,
    /// Tuples overwritten with the infinity sentinel.
    pub failed: usize,
    /// The first fault of the batch, if any.
    pub first_fault: Option<Fault>,
}

/// Transforms `count` packed tuples of `dimension` values in place,
/// starting at `offset`.
pub fn transform(
    source: &Pj,
    target: &Pj,
    dimension: usize,
    values: &mut [f64],
    offset: usize,
    count: usize,
) -> Result<TransformReport, TransformError> {
    transform_strided(source, target, dimension, values, offset, count, dimension)
}

/// Transforms `count` tuples spaced `stride` values apart in place.
///
/// Only the first `min(dimension, 3)` components of a tuple are
/// geometric; the rest ride along untouched. An empty batch succeeds
/// without reading the buffer, so `offset` is not range-checked when
/// `count` is zero.
pub fn transform_strided(
    source: &Pj,
    target: &Pj,
    dimension: usize,
    values: &mut [f64],
    offset: usize,
    count: usize,
    stride: usize,
) -> Result<TransformReport, TransformError> {
    if dimension == 0 || dimension > DIMENSION_MAX {
        return Err(TransformError::BadDimension(dimension));
    }
    if stride < dimension {
        return Err(TransformError::BadStride { stride, dimension });
    }
    if count == 0 {
        return Ok(TransformReport::default());
    }
    let needed = (count - 1)
        .checked_mul(stride)
        .and_then(|span| span.checked_add(dimension));
    let end = needed.and_then(|span| span.checked_add(offset));
    if end.map_or(true, |end| end > values.len()) {
        return Err(TransformError::BufferOverrun {
            needed: needed.unwrap_or(usize::MAX),
            offset,
            len: values.len(),
        });
    }
    let geocentric = matches!(source.kind, PjKind::Geocentric)
        || matches!(target.kind, PjKind::Geocentric);
    if geocentric && dimension < 3 {
        return Err(TransformError::GeocentricDimension);
    }

    let mut report = TransformReport::default();
    for i in 0..count {
        let base = offset + i * stride;
        let tuple = &mut values[base..base + dimension];
        match convert_tuple(source, target, tuple) {
            Ok(()) => report.converted += 1,
            Err((stage, fault)) => {
                for value in &mut tuple[..dimension.min(3)] {
                    *value = f64::INFINITY;
                }
                report.failed += 1;
                if report.first_fault.is_none() {
                    report.first_fault = Some(Fault { index: i, stage, fault });
                }
            }
        }
    }
    Ok(report)
}

/// Runs the full pipeline on one tuple.
fn convert_tuple(
    source: &Pj,
    target: &Pj,
    tuple: &mut [f64],
) -> Result<(), (FaultStage, DomainFault)> {
    let dimension = tuple.len();
    let mut x = tuple[0];
    let mut y = if dimension >= 2 { tuple[1] } else { 0.0 };
    let mut z = if dimension >= 3 { tuple[2] } else { 0.0 };

    source.axes.normalize(&mut x, &mut y, &mut z);
    z *= source.vto_metre;

    match &source.kind {
        PjKind::Geographic => {}
        PjKind::Geocentric => {
            x *= source.to_metre;
            y *= source.to_metre;
            let (lon, lat, height) = datum::geocentric_to_geodetic(&source.ellipsoid, x, y, z);
            x = lon;
            y = lat;
            z = height;
        }
        PjKind::Projected(projection) => {
            x *= source.to_metre;
            y *= source.to_metre;
            if !x.is_finite() || !y.is_finite() {
                return Err((FaultStage::Source, DomainFault::LimitsExceeded));
            }
            let (lon, lat) = projection
                .inverse(x, y)
                .map_err(|fault| (FaultStage::Source, fault))?;
            if !lon.is_finite() || !lat.is_finite() {
                return Err((FaultStage::Source, DomainFault::OutsideDomain));
            }
            x = lon;
            y = lat;
        }
    }

    x += source.prime_meridian;

    if datum::needs_shift(&source.datum, &source.ellipsoid, &target.datum, &target.ellipsoid) {
        let (lon, lat, height) = datum::apply_shift(
            &source.datum,
            &source.ellipsoid,
            &target.datum,
            &target.ellipsoid,
            x,
            y,
            z,
        )
        .map_err(|fault| (FaultStage::Datum, fault))?;
        x = lon;
        y = lat;
        z = height;
    }

    x -= target.prime_meridian;

    match &target.kind {
        PjKind::Geographic => {}
        PjKind::Geocentric => {
            let (gx, gy, gz) = datum::geodetic_to_geocentric(&target.ellipsoid, x, y, z)
                .map_err(|fault| (FaultStage::Target, fault))?;
            x = gx / target.to_metre;
            y = gy / target.to_metre;
            z = gz;
        }
        PjKind::Projected(projection) => {
            let over = y.abs() - FRAC_PI_2;
            if over > FWD_EPS || x.abs() > 10.0 {
                return Err((FaultStage::Target, DomainFault::LimitsExceeded));
            }
            let lat = if over.abs() <= FWD_EPS {
                FRAC_PI_2.copysign(y)
            } else {
                y
            };
            let (px, py) = projection
                .forward(x, lat)
                .map_err(|fault| (FaultStage::Target, fault))?;
            if !px.is_finite() || !py.is_finite() {
                return Err((FaultStage::Target, DomainFault::OutsideDomain));
            }
            x = px / target.to_metre;
            y = py / target.to_metre;
        }
    }

    z /= target.vto_metre;

    target.axes.denormalize(&mut x, &mut y, &mut z);

    tuple[0] = x;
    if dimension >= 2 {
        tuple[1] = y;
    }
    if dimension >= 3 {
        tuple[2] = z;
    }
    Ok(())
}
