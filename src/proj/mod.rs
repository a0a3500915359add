//! Map projection catalogue.
//!
//! Every projection implements [`Projection`] over absolute geographic
//! coordinates in radians and projected coordinates in metres, false
//! origin included. Constructors resolve their parameters from the parsed
//! definition; [`from_params`] dispatches on the `+proj=` name.

pub mod albers_equal_area;
pub mod common;
pub mod ellipsoid;
pub mod equirectangular;
pub mod lambert_conformal;
pub mod mercator;
pub mod sinusoidal;
pub mod stereographic;
pub mod transverse_mercator;

use std::fmt;

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use ellipsoid::Ellipsoid;

/// Trait for map projections supporting forward and inverse transforms.
pub trait Projection: Send + Sync + fmt::Debug {
    /// Forward: (lon_rad, lat_rad) -> (easting, northing)
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault>;

    /// Inverse: (easting, northing) -> (lon_rad, lat_rad)
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), DomainFault>;
}

/// Builds the projection named by `+proj=` from its parameters.
pub fn from_params(
    name: &str,
    params: &ParamList,
    ell: Ellipsoid,
) -> Result<Box<dyn Projection>, ParseError> {
    match name {
        "merc" => Ok(Box::new(mercator::Mercator::from_params(params, ell)?)),
        "tmerc" => Ok(Box::new(
            transverse_mercator::TransverseMercator::from_params(params, ell)?,
        )),
        "utm" => Ok(Box::new(transverse_mercator::TransverseMercator::utm_from_params(params, ell)?)),
        "lcc" => Ok(Box::new(lambert_conformal::LambertConformal::from_params(
            params, ell,
        )?)),
        "eqc" => Ok(Box::new(equirectangular::Equirectangular::from_params(
            params, ell,
        )?)),
        "stere" => Ok(Box::new(stereographic::PolarStereographic::from_params(
            params, ell,
        )?)),
        "sterea" => Ok(Box::new(stereographic::ObliqueStereographic::from_params(
            params, ell,
        )?)),
        "aea" => Ok(Box::new(albers_equal_area::AlbersEqualArea::from_params(
            params, ell,
        )?)),
        "sinu" => Ok(Box::new(sinusoidal::Sinusoidal::from_params(params, ell)?)),
        other => Err(ParseError::UnknownProjection(other.to_owned())),
    }
}

/// Reads `+k_0` (or its alias `+k`), defaulting to 1.
pub(crate) fn scale_factor(params: &ParamList) -> Result<f64, ParseError> {
    let k0 = match params.f64_value("k_0")? {
        Some(k) => k,
        None => params.f64_value("k")?.unwrap_or(1.0),
    };
    if !k0.is_finite() || k0 <= 0.0 {
        return Err(ParseError::InvalidParameter(format!(
            "k_0={k0}: scale factor must be positive"
        )));
    }
    Ok(k0)
}

/// Reads the false easting and northing `+x_0`/`+y_0`, defaulting to 0.
pub(crate) fn false_origin(params: &ParamList) -> Result<(f64, f64), ParseError> {
    Ok((
        params.f64_value("x_0")?.unwrap_or(0.0),
        params.f64_value("y_0")?.unwrap_or(0.0),
    ))
}
