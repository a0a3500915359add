//! Sinusoidal (Sanson–Flamsteed) projection (`+proj=sinu`).
//!
//! Ellipsoidal, equal-area, pseudocylindrical:
//!   forward: x = a·(λ - λ₀)·cos(φ)/sqrt(1 - e²·sin²φ), y = M(φ)
//!   inverse: φ from M by Newton iteration, λ from x at that parallel
//! where M is the meridional arc. On a sphere this collapses to
//! x = a·Δλ·cos(φ), y = a·φ.

use std::f64::consts::FRAC_PI_2;

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use crate::proj::common::{adjlon, meridional_arc, EPS10};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{false_origin, Projection};

#[derive(Debug)]
pub struct Sinusoidal {
    ellipsoid: Ellipsoid,
    lon0: f64,
    x0: f64,
    y0: f64,
}

impl Sinusoidal {
    pub fn from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        let (x0, y0) = false_origin(params)?;
        Ok(Sinusoidal {
            ellipsoid,
            lon0: params.angle_value("lon_0")?.unwrap_or(0.0),
            x0,
            y0,
        })
    }
}

impl Projection for Sinusoidal {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault> {
        let s = lat.sin();
        let x = self.ellipsoid.a * adjlon(lon - self.lon0) * lat.cos()
            / (1.0 - self.ellipsoid.e2 * s * s).sqrt()
            + self.x0;
        let y = meridional_arc(&self.ellipsoid, lat) + self.y0;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), DomainFault> {
        let arc = y - self.y0;
        let a = self.ellipsoid.a;
        let es = self.ellipsoid.e2;

        // Newton on the meridional arc; rarely needs more than two steps.
        let mut lat = arc / a;
        for _ in 0..10 {
            let s = lat.sin();
            let t = 1.0 - es * s * s;
            let delta = (meridional_arc(&self.ellipsoid, lat) - arc) * t * t.sqrt()
                / (a * (1.0 - es));
            lat -= delta;
            if delta.abs() < 1e-11 {
                break;
            }
        }

        let s = lat.abs();
        let lon = if s < FRAC_PI_2 {
            let sp = lat.sin();
            adjlon(
                self.lon0 + (x - self.x0) * (1.0 - es * sp * sp).sqrt() / (a * lat.cos()),
            )
        } else if s - EPS10 < FRAC_PI_2 {
            // Longitude is indeterminate at the pole itself.
            self.lon0
        } else {
            return Err(DomainFault::LimitsExceeded);
        };
        Ok((lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid::named;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sinu(definition: &str) -> Sinusoidal {
        let params = ParamList::parse(definition).unwrap();
        Sinusoidal::from_params(&params, named("WGS84").unwrap()).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let proj = sinu("+proj=sinu +ellps=WGS84");
        let cases: &[(f64, f64)] = &[
            (0.0, 0.0),
            (10.0, 45.0),
            (-73.9857, 40.7484),
            (139.6917, 35.6895),
            (20.0, -77.5),
        ];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-10);
            assert_relative_eq!(lat2, lat, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_origin() {
        let proj = sinu("+proj=sinu +ellps=WGS84");
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_equator_x_is_angle_proportional() {
        // On the equator the parallel factor is exactly 1.
        let proj = sinu("+proj=sinu +ellps=WGS84");
        let a = named("WGS84").unwrap().a;
        let lon = 15.0_f64.to_radians();
        let (x, _) = proj.forward(lon, 0.0).unwrap();
        assert_relative_eq!(x, a * lon, epsilon = 1e-6);
    }

    #[test]
    fn test_modis_sphere_extent() {
        // The MODIS grid runs on an authalic sphere; with e² = 0 the
        // ellipsoidal path must reproduce the exact spherical values.
        let radius = 6_371_007.181;
        let params = ParamList::parse("+proj=sinu +R=6371007.181").unwrap();
        let proj = Sinusoidal::from_params(&params, Ellipsoid::sphere(radius).unwrap()).unwrap();

        let (x, y) = proj.forward(PI, 0.0).unwrap();
        assert_relative_eq!(x, radius * PI, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);

        let (x, y) = proj.forward(0.0, 0.5).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, radius * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_pole_collapses_to_point() {
        let proj = sinu("+proj=sinu +ellps=WGS84");
        let (x, y) = proj.forward(45.0_f64.to_radians(), FRAC_PI_2).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        // WGS84 quarter meridian.
        assert!((y - 10_001_965.73).abs() < 0.5, "y = {y}");

        let (lon, lat) = proj.inverse(0.0, y).unwrap();
        assert_eq!(lon, 0.0);
        assert_relative_eq!(lat, FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_inverse_beyond_pole() {
        let proj = sinu("+proj=sinu +ellps=WGS84");
        assert_eq!(
            proj.inverse(0.0, 10_500_000.0),
            Err(DomainFault::LimitsExceeded)
        );
    }
}
