//! Mercator projection (`+proj=merc`).
//!
//! Ellipsoidal Mercator with an optional standard parallel:
//!   forward: x = a·k₀·(λ - λ₀), y = -a·k₀·ln(tsfn(φ, e))
//!   inverse: λ = λ₀ + x/(a·k₀), φ = phi_from_ts(exp(-y/(a·k₀)), e)
//!
//! `+lat_ts` makes the scale true on that parallel, k₀ = msfn(|lat_ts|, e²);
//! without it `+k_0` applies directly. The poles themselves project to
//! infinity and are rejected.

use std::f64::consts::FRAC_PI_2;

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use crate::proj::common::{adjlon, msfn, phi_from_ts, tsfn, EPS10};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{false_origin, scale_factor, Projection};

/// Ellipsoidal Mercator projection with a standard parallel.
#[derive(Debug)]
pub struct Mercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    x0: f64,
    y0: f64,
}

impl Mercator {
    pub fn from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        let lon0 = params.angle_value("lon_0")?.unwrap_or(0.0);
        // An explicit +k_0 must be sane even when +lat_ts replaces it.
        let k0 = scale_factor(params)?;
        let k0 = match params.angle_value("lat_ts")? {
            Some(lat_ts) => {
                let phits = lat_ts.abs();
                if phits >= FRAC_PI_2 {
                    return Err(ParseError::InvalidParameter(format!(
                        "lat_ts={}: standard parallel must lie between the poles",
                        lat_ts.to_degrees()
                    )));
                }
                msfn(phits, ellipsoid.e2)
            }
            None => k0,
        };
        let (x0, y0) = false_origin(params)?;
        Ok(Mercator {
            ellipsoid,
            lon0,
            k0,
            x0,
            y0,
        })
    }
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault> {
        if (lat.abs() - FRAC_PI_2).abs() <= EPS10 {
            return Err(DomainFault::OutsideDomain);
        }
        let ak = self.ellipsoid.a * self.k0;
        let x = ak * adjlon(lon - self.lon0) + self.x0;
        // For positive latitudes tsfn < 1, so -ln(tsfn) > 0 and y > 0.
        let y = ak * (-tsfn(lat, self.ellipsoid.e).ln()) + self.y0;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), DomainFault> {
        let ak = self.ellipsoid.a * self.k0;
        let ts = (-(y - self.y0) / ak).exp();
        let lat = phi_from_ts(ts, self.ellipsoid.e);
        let lon = adjlon(self.lon0 + (x - self.x0) / ak);
        Ok((lon, lat))
    }
}
