//! Lambert Conformal Conic projection (`+proj=lcc`).
//!
//! The secant (two standard parallels) and tangent (one parallel) cases
//! share one set of cone constants:
//!   n = ln(m₁/m₂) / ln(t₁/t₂)   (secant), sin(lat₁) otherwise
//!   F = m₁/(n·t₁ⁿ), ρ = a·k₀·F·tⁿ, ρ₀ = ρ at lat₀
//! `+lat_2` defaults to `+lat_1`, and `+lat_0` defaults to `+lat_1` when
//! neither is given. Southern cones carry a negative n and a negative ρ,
//! which keeps the forward and inverse formulas sign-correct as written.

use std::f64::consts::FRAC_PI_2;

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use crate::proj::common::{adjlon, msfn, phi_from_ts, tsfn, EPS10};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{false_origin, scale_factor, Projection};

#[derive(Debug)]
pub struct LambertConformal {
    ellipsoid: Ellipsoid,
    lon0: f64,
    n: f64,   // cone constant
    af: f64,  // a·k₀·F, negative for southern cones
    rho0: f64,
    x0: f64,
    y0: f64,
}

impl LambertConformal {
    pub fn from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        let lon0 = params.angle_value("lon_0")?.unwrap_or(0.0);
        let lat1 = params.angle_value("lat_1")?.unwrap_or(0.0);
        let (lat2, lat0) = match params.angle_value("lat_2")? {
            Some(lat2) => (lat2, params.angle_value("lat_0")?.unwrap_or(0.0)),
            // Tangent cone: the origin follows the single parallel unless
            // pinned explicitly.
            None => (lat1, params.angle_value("lat_0")?.unwrap_or(lat1)),
        };
        if (lat1 + lat2).abs() < EPS10 {
            return Err(ParseError::InvalidParameter(format!(
                "lat_1={} lat_2={}: conic standard parallels must not be opposite",
                lat1.to_degrees(),
                lat2.to_degrees()
            )));
        }
        let k0 = scale_factor(params)?;
        let (x0, y0) = false_origin(params)?;

        let e = ellipsoid.e;
        let m1 = msfn(lat1, ellipsoid.e2);
        let t1 = tsfn(lat1, e);
        let n = if (lat1 - lat2).abs() >= EPS10 {
            (m1 / msfn(lat2, ellipsoid.e2)).ln() / (t1 / tsfn(lat2, e)).ln()
        } else {
            lat1.sin()
        };
        let af = ellipsoid.a * k0 * m1 / (n * t1.powf(n));
        let rho0 = if (lat0.abs() - FRAC_PI_2).abs() < EPS10 {
            0.0
        } else {
            af * tsfn(lat0, e).powf(n)
        };

        Ok(LambertConformal {
            ellipsoid,
            lon0,
            n,
            af,
            rho0,
            x0,
            y0,
        })
    }
}

impl Projection for LambertConformal {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault> {
        let rho = if (lat.abs() - FRAC_PI_2).abs() < EPS10 {
            // Only the pole the cone opens towards projects to the apex.
            if lat * self.n <= 0.0 {
                return Err(DomainFault::OutsideDomain);
            }
            0.0
        } else {
            self.af * tsfn(lat, self.ellipsoid.e).powf(self.n)
        };
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
            let lat = if self.n > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
            return Ok((self.lon0, lat));
        }
        if self.n < 0.0 {
            rho = -rho;
            xd = -xd;
            yd = -yd;
        }
        let ts = (rho / self.af).powf(1.0 / self.n);
        let lat = phi_from_ts(ts, self.ellipsoid.e);
        let lon = adjlon(self.lon0 + xd.atan2(yd) / self.n);
        Ok((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid::named;
    use approx::assert_relative_eq;

    fn lcc(definition: &str) -> LambertConformal {
        let params = ParamList::parse(definition).unwrap();
        LambertConformal::from_params(&params, named("WGS84").unwrap()).unwrap()
    }

    #[test]
    fn test_2sp_roundtrip() {
        // France Lambert (similar to EPSG:2154: RGF93 / Lambert-93)
        let proj = lcc(
            "+proj=lcc +lon_0=3 +lat_0=46.5 +lat_1=44 +lat_2=49 +x_0=700000 +y_0=6600000 \
             +ellps=WGS84",
        );

        let cases: &[(f64, f64)] = &[
            (3.0, 46.5),    // origin
            (2.35, 48.86),  // Paris
            (-1.55, 47.22), // Nantes
            (7.75, 48.58),  // Strasbourg
        ];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_1sp_roundtrip() {
        let proj = lcc("+proj=lcc +lat_1=45 +ellps=WGS84");

        let lon = 5.0_f64.to_radians();
        let lat = 48.0_f64.to_radians();
        let (x, y) = proj.forward(lon, lat).unwrap();
        let (lon2, lat2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lon2, lon, epsilon = 1e-9);
        assert_relative_eq!(lat2, lat, epsilon = 1e-9);
    }

    #[test]
    fn test_origin_point() {
        let proj = lcc(
            "+proj=lcc +lon_0=3 +lat_0=46.5 +lat_1=44 +lat_2=49 +x_0=700000 +y_0=6600000 \
             +ellps=WGS84",
        );

        // At the origin, x should be FE, y should be FN
        let (x, y) = proj
            .forward(3.0_f64.to_radians(), 46.5_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 700_000.0, epsilon = 1.0);
        assert_relative_eq!(y, 6_600_000.0, epsilon = 1.0);
    }

    #[test]
    fn test_us_state_plane_like() {
        // US State Plane-like: lat1=33°, lat2=45°, lat0=39°, lon0=-96°
        let proj = lcc("+proj=lcc +lon_0=-96 +lat_0=39 +lat_1=33 +lat_2=45 +ellps=WGS84");

        let cases: &[(f64, f64)] = &[
            (-96.0, 39.0),  // origin
            (-74.0, 40.7),  // NYC
            (-87.6, 41.9),  // Chicago
            (-118.2, 34.0), // LA
        ];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_parallel_defaults() {
        // With lat_2 given, lat_0 defaults to the equator.
        let proj = lcc("+proj=lcc +lat_1=33 +lat_2=45 +ellps=WGS84");
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);

        // Without lat_2 the origin follows lat_1.
        let proj = lcc("+proj=lcc +lat_1=39 +ellps=WGS84");
        let (x, y) = proj.forward(0.0, 39.0_f64.to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_opposite_parallels_rejected() {
        let wgs84 = named("WGS84").unwrap();
        let params = ParamList::parse("+proj=lcc +lat_1=30 +lat_2=-30").unwrap();
        assert!(LambertConformal::from_params(&params, wgs84).is_err());

        // No parallels at all degenerates to lat_1 = lat_2 = 0.
        let params = ParamList::parse("+proj=lcc").unwrap();
        assert!(LambertConformal::from_params(&params, wgs84).is_err());
    }

    #[test]
    fn test_pole_handling() {
        let proj = lcc("+proj=lcc +lat_1=33 +lat_2=45 +ellps=WGS84");

        // The cone opens north: the north pole lands on the apex, the
        // south pole is unreachable.
        let (x, y) = proj.forward(0.3, FRAC_PI_2).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lon, 0.0, epsilon = 1e-12);
        assert_relative_eq!(lat, FRAC_PI_2, epsilon = 1e-12);

        assert_eq!(
            proj.forward(0.0, -FRAC_PI_2),
            Err(DomainFault::OutsideDomain)
        );
    }

    #[test]
    fn test_southern_cone_roundtrip() {
        let proj = lcc("+proj=lcc +lon_0=134 +lat_0=-32 +lat_1=-28 +lat_2=-36 +ellps=WGS84");

        let cases: &[(f64, f64)] = &[
            (134.0, -32.0),
            (151.2, -33.9), // Sydney
            (115.9, -31.9), // Perth
        ];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }

        // Southern cone rejects the north pole.
        assert_eq!(
            proj.forward(0.0, FRAC_PI_2),
            Err(DomainFault::OutsideDomain)
        );
    }
}
