//! Equirectangular (Plate Carrée) projection (`+proj=eqc`).
//!
//! Spherical formulas on the semi-major axis, whatever the figure:
//!   forward: x = a·cos(lat_ts)·(λ - λ₀), y = a·(φ - φ₀)
//!   inverse: λ = λ₀ + x/(a·cos(lat_ts)), φ = φ₀ + y/a

use std::f64::consts::FRAC_PI_2;

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use crate::proj::common::{adjlon, EPS10};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{false_origin, Projection};

#[derive(Debug)]
pub struct Equirectangular {
    a: f64,
    lon0: f64,
    lat0: f64,
    rc: f64, // cos(lat_ts)
    x0: f64,
    y0: f64,
}

impl Equirectangular {
    pub fn from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        let lat_ts = params.angle_value("lat_ts")?.unwrap_or(0.0);
        let rc = lat_ts.cos();
        if rc <= 0.0 {
            return Err(ParseError::InvalidParameter(format!(
                "lat_ts={}: standard parallel must lie between the poles",
                lat_ts.to_degrees()
            )));
        }
        let (x0, y0) = false_origin(params)?;
        Ok(Equirectangular {
            a: ellipsoid.a,
            lon0: params.angle_value("lon_0")?.unwrap_or(0.0),
            lat0: params.angle_value("lat_0")?.unwrap_or(0.0),
            rc,
            x0,
            y0,
        })
    }
}

impl Projection for Equirectangular {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault> {
        let x = self.a * self.rc * adjlon(lon - self.lon0) + self.x0;
        let y = self.a * (lat - self.lat0) + self.y0;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), DomainFault> {
        let lat = self.lat0 + (y - self.y0) / self.a;
        if lat.abs() > FRAC_PI_2 + EPS10 {
            return Err(DomainFault::LimitsExceeded);
        }
        let lon = adjlon(self.lon0 + (x - self.x0) / (self.a * self.rc));
        Ok((lon, lat))
    }
}
