//! Stereographic projections: polar (`+proj=stere`) and oblique double
//! (`+proj=sterea`).
//!
//! `stere` covers the polar aspects only (`lat_0 = ±90°`), with true scale
//! either at the pole (apex constant from k₀) or on a `+lat_ts` parallel.
//! `sterea` is the Gauss double projection: geodetic latitude is mapped to
//! a conformal sphere first and the sphere is projected stereographically,
//! which is the formulation behind the Dutch RD grid.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use crate::proj::common::{adjlon, msfn, phi_from_ts, tsfn, EPS10};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{false_origin, scale_factor, Projection};

/// Polar Stereographic projection.
#[derive(Debug)]
pub struct PolarStereographic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    south: bool,
    akm1: f64, // a times the apex scale constant
    x0: f64,
    y0: f64,
}

impl PolarStereographic {
    pub fn from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        let lat0 = params.angle_value("lat_0")?.unwrap_or(0.0);
        if (lat0.abs() - FRAC_PI_2).abs() >= EPS10 {
            return Err(ParseError::InvalidParameter(format!(
                "lat_0={}: stere supports the polar aspects only, use +proj=sterea \
                 for oblique centres",
                lat0.to_degrees()
            )));
        }
        let (x0, y0) = false_origin(params)?;
        let k0 = scale_factor(params)?;
        let e = ellipsoid.e;
        let phits = match params.angle_value("lat_ts")? {
            Some(lat_ts) => lat_ts.abs(),
            None => FRAC_PI_2,
        };
        let akm1 = if (phits - FRAC_PI_2).abs() < EPS10 {
            // True scale at the pole, reduced by k0.
            ellipsoid.a * 2.0 * k0 / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt()
        } else {
            // True scale on the lat_ts parallel; it overrides k0.
            ellipsoid.a * msfn(phits, ellipsoid.e2) / tsfn(phits, e)
        };
        Ok(PolarStereographic {
            ellipsoid,
            lon0: params.angle_value("lon_0")?.unwrap_or(0.0),
            south: lat0 < 0.0,
            akm1,
            x0,
            y0,
        })
    }
}

impl Projection for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault> {
        let lam = adjlon(lon - self.lon0);
        // The south aspect mirrors latitude and flips the northing axis.
        let (phi, ysign) = if self.south { (-lat, 1.0) } else { (lat, -1.0) };
        let rho = self.akm1 * tsfn(phi, self.ellipsoid.e);
        let x = rho * lam.sin() + self.x0;
        let y = ysign * rho * lam.cos() + self.y0;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), DomainFault> {
        let xd = x - self.x0;
        let yd = y - self.y0;
        let rho = xd.hypot(yd);
        let phi = phi_from_ts(rho / self.akm1, self.ellipsoid.e);
        let (lat, lam) = if rho == 0.0 {
            // atan2 of two zeros is direction-dependent; pin the meridian.
            (if self.south { -phi } else { phi }, 0.0)
        } else if self.south {
            (-phi, xd.atan2(yd))
        } else {
            (phi, xd.atan2(-yd))
        };
        Ok((adjlon(self.lon0 + lam), lat))
    }
}

/// Oblique (double) Stereographic projection via the Gauss conformal sphere.
#[derive(Debug)]
pub struct ObliqueStereographic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    x0: f64,
    y0: f64,
    // Gauss sphere constants
    c: f64,
    k: f64,
    ratexp: f64,
    chi0: f64,
    sinc0: f64,
    cosc0: f64,
    r2: f64, // twice the conformal sphere radius, in units of a
}

fn srat(esinp: f64, exponent: f64) -> f64 {
    ((1.0 - esinp) / (1.0 + esinp)).powf(exponent)
}

impl ObliqueStereographic {
    pub fn from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        let lat0 = params.angle_value("lat_0")?.unwrap_or(0.0);
        let (x0, y0) = false_origin(params)?;

        let es = ellipsoid.e2;
        let e = ellipsoid.e;
        let sphi = lat0.sin();
        let cphi2 = lat0.cos() * lat0.cos();
        let rc = (1.0 - es).sqrt() / (1.0 - es * sphi * sphi);
        let c = (1.0 + es * cphi2 * cphi2 / (1.0 - es)).sqrt();
        let chi0 = (sphi / c).asin();
        let ratexp = 0.5 * c * e;
        let k = (0.5 * chi0 + FRAC_PI_4).tan()
            / ((0.5 * lat0 + FRAC_PI_4).tan().powf(c) * srat(e * sphi, ratexp));

        Ok(ObliqueStereographic {
            ellipsoid,
            lon0: params.angle_value("lon_0")?.unwrap_or(0.0),
            k0: scale_factor(params)?,
            x0,
            y0,
            c,
            k,
            ratexp,
            chi0,
            sinc0: chi0.sin(),
            cosc0: chi0.cos(),
            r2: 2.0 * rc,
        })
    }
}

impl Projection for ObliqueStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault> {
        // Geodetic → conformal sphere.
        let lam = self.c * adjlon(lon - self.lon0);
        let chi = 2.0
            * (self.k
                * (0.5 * lat + FRAC_PI_4).tan()
                * srat(self.ellipsoid.e * lat.sin(), self.ratexp))
            .atan()
            - FRAC_PI_2;

        let sinc = chi.sin();
        let cosc = chi.cos();
        let cosl = lam.cos();
        let k = self.ellipsoid.a * self.k0 * self.r2
            / (1.0 + self.sinc0 * sinc + self.cosc0 * cosc * cosl);
        let x = k * cosc * lam.sin() + self.x0;
        let y = k * (self.cosc0 * sinc - self.sinc0 * cosc * cosl) + self.y0;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), DomainFault> {
        let ak = self.ellipsoid.a * self.k0;
        let xd = (x - self.x0) / ak;
        let yd = (y - self.y0) / ak;

        let rho = xd.hypot(yd);
        let (chi, lam) = if rho == 0.0 {
            (self.chi0, 0.0)
        } else {
            let c = 2.0 * rho.atan2(self.r2);
            let sinc = c.sin();
            let cosc = c.cos();
            let chi = (cosc * self.sinc0 + yd * sinc * self.cosc0 / rho).asin();
            let lam = (xd * sinc).atan2(rho * self.cosc0 * cosc - yd * self.sinc0 * sinc);
            (chi, lam)
        };

        // Conformal sphere → geodetic, fixed-point on the latitude.
        let lon = adjlon(self.lon0 + lam / self.c);
        let num = ((0.5 * chi + FRAC_PI_4).tan() / self.k).powf(1.0 / self.c);
        let e = self.ellipsoid.e;
        let mut prev = chi;
        let mut lat = chi;
        for _ in 0..20 {
            lat = 2.0 * (num * srat(e * prev.sin(), -0.5 * e)).atan() - FRAC_PI_2;
            if (lat - prev).abs() < 1e-14 {
                break;
            }
            prev = lat;
        }
        Ok((lon, lat))
    }
}
