//! Albers Equal Area Conic projection (`+proj=aea`).
//!
//! Area-preserving conic on the authalic latitude:
//!   n = (m₁² - m₂²)/(q₂ - q₁)   (secant), sin(lat₁) otherwise
//!   c = m₁² + n·q₁, ρ = (a/n)·sqrt(c - n·q), ρ₀ = ρ at lat₀
//! Both poles map to arcs; the cone apex inverts to the nearer pole by
//! convention. There are no default parallels.

use std::f64::consts::FRAC_PI_2;

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use crate::proj::common::{adjlon, msfn, phi_from_q, qsfn, EPS10};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{false_origin, Projection};

// Authalic q within this of its polar bound counts as the pole.
const TOL7: f64 = 1e-7;

#[derive(Debug)]
pub struct AlbersEqualArea {
    ellipsoid: Ellipsoid,
    lon0: f64,
    n: f64,
    c: f64,
    ec: f64, // q at the pole
    dd: f64, // 1/n
    rho0: f64,
    x0: f64,
    y0: f64,
}

impl AlbersEqualArea {
    pub fn from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        let lat1 = params.angle_value("lat_1")?.unwrap_or(0.0);
        let lat2 = params.angle_value("lat_2")?.unwrap_or(0.0);
        if (lat1 + lat2).abs() < EPS10 {
            return Err(ParseError::InvalidParameter(format!(
                "lat_1={} lat_2={}: conic standard parallels must not be opposite",
                lat1.to_degrees(),
                lat2.to_degrees()
            )));
        }
        let lat0 = params.angle_value("lat_0")?.unwrap_or(0.0);
        let (x0, y0) = false_origin(params)?;

        let e = ellipsoid.e;
        let e2 = ellipsoid.e2;
        let m1 = msfn(lat1, e2);
        let q1 = qsfn(lat1, e);
        let n = if (lat1 - lat2).abs() >= EPS10 {
            let m2 = msfn(lat2, e2);
            let q2 = qsfn(lat2, e);
            (m1 * m1 - m2 * m2) / (q2 - q1)
        } else {
            lat1.sin()
        };
        let ec = if e < 1e-7 {
            2.0
        } else {
            1.0 - 0.5 * (1.0 - e2) * ((1.0 - e) / (1.0 + e)).ln() / e
        };
        let c = m1 * m1 + n * q1;
        let dd = 1.0 / n;
        let rho0 = ellipsoid.a * dd * (c - n * qsfn(lat0, e)).sqrt();

        Ok(AlbersEqualArea {
            ellipsoid,
            lon0: params.angle_value("lon_0")?.unwrap_or(0.0),
            n,
            c,
            ec,
            dd,
            rho0,
            x0,
            y0,
        })
    }
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault> {
        let inner = self.c - self.n * qsfn(lat, self.ellipsoid.e);
        if inner < 0.0 {
            return Err(DomainFault::OutsideDomain);
        }
        let rho = self.ellipsoid.a * self.dd * inner.sqrt();
        let theta = self.n * adjlon(lon - self.lon0);
        let x = rho * theta.sin() + self.x0;
        let y = self.rho0 - rho * theta.cos() + self.y0;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), DomainFault> {
        let mut xd = x - self.x0;
        let mut yd = self.rho0 - (y - self.y0);
        let mut rho = xd.hypot(yd);
        if rho == 0.0 {
            // Cone apex.
            let lat = if self.n > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
            return Ok((self.lon0, lat));
        }
        if self.n < 0.0 {
            rho = -rho;
            xd = -xd;
            yd = -yd;
        }
        let scaled = rho / (self.ellipsoid.a * self.dd);
        let q = (self.c - scaled * scaled) / self.n;
        let lat = if (self.ec - q.abs()).abs() <= TOL7 {
            // On the polar arc the iteration is singular; clamp.
            if q < 0.0 {
                -FRAC_PI_2
            } else {
                FRAC_PI_2
            }
        } else {
            phi_from_q(q, self.ellipsoid.e)
        };
        let lon = adjlon(self.lon0 + xd.atan2(yd) / self.n);
        Ok((lon, lat))
    }
}
