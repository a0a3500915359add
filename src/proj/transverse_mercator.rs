//! Transverse Mercator projection (`+proj=tmerc`, `+proj=utm`).
//!
//! Implements the Karney (2011) formulation with 6th-order α/β series
//! coefficients. `utm` is the same projection with the zone picking the
//! central meridian and the scale, easting and latitude origin fixed to
//! the UTM convention.

use std::f64::consts::PI;

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use crate::proj::common::adjlon;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{false_origin, scale_factor, Projection};

#[derive(Debug)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    x0: f64,
    y0: f64,
    // Precomputed constants
    a_hat: f64,      // A = a/(1+n) * (1 + n²/4 + n⁴/64)
    alpha: [f64; 6], // Forward series coefficients
    beta: [f64; 6],  // Inverse series coefficients
    m0: f64,         // Normalized meridional arc at lat0
}

impl TransverseMercator {
    pub fn from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        let lon0 = params.angle_value("lon_0")?.unwrap_or(0.0);
        let lat0 = params.angle_value("lat_0")?.unwrap_or(0.0);
        let k0 = scale_factor(params)?;
        let (x0, y0) = false_origin(params)?;
        Ok(Self::new(ellipsoid, lon0, lat0, k0, x0, y0))
    }

    /// Builds a UTM zone: central meridian from `+zone` (or derived from
    /// `+lon_0` when absent), k₀ = 0.9996 and a 500 km false easting always,
    /// plus a 10000 km false northing with `+south`.
    pub fn utm_from_params(params: &ParamList, ellipsoid: Ellipsoid) -> Result<Self, ParseError> {
        if ellipsoid.is_sphere() {
            return Err(ParseError::InvalidParameter(
                "ellps: utm requires an ellipsoidal figure".to_owned(),
            ));
        }
        // Zero-based zone index.
        let zone = match params.f64_value("zone")? {
            Some(z) if (1.0..=60.0).contains(&z) && z.fract() == 0.0 => z - 1.0,
            Some(z) => {
                return Err(ParseError::InvalidParameter(format!(
                    "zone={z}: UTM zone must be an integer between 1 and 60"
                )));
            }
            None => {
                let lon0 = params.angle_value("lon_0")?.unwrap_or(0.0);
                ((adjlon(lon0) + PI) * 30.0 / PI).floor().clamp(0.0, 59.0)
            }
        };
        let lon0 = (zone + 0.5) * PI / 30.0 - PI;
        let y0 = if params.contains("south") {
            10_000_000.0
        } else {
            0.0
        };
        Ok(Self::new(ellipsoid, lon0, 0.0, 0.9996, 500_000.0, y0))
    }

    fn new(ellipsoid: Ellipsoid, lon0: f64, lat0: f64, k0: f64, x0: f64, y0: f64) -> Self {
        let n = ellipsoid.n;
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let a_hat = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

        let alpha = Self::alpha_coefficients(n, n2, n3, n4, n5, n6);
        let beta = Self::beta_coefficients(n, n2, n3, n4, n5, n6);

        let m0 = Self::meridional_arc_normalized(lat0, n);

        Self {
            ellipsoid,
            lon0,
            k0,
            x0,
            y0,
            a_hat,
            alpha,
            beta,
            m0,
        }
    }

    /// Forward series coefficients α₁..α₆ (Krüger, 6th order).
    fn alpha_coefficients(n: f64, n2: f64, n3: f64, n4: f64, n5: f64, n6: f64) -> [f64; 6] {
        [
            // α₁
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            // α₂
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1983433.0 / 1935360.0 * n6,
            // α₃
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4
                + 15061.0 / 26880.0 * n5
                + 167603.0 / 181440.0 * n6,
            // α₄
            49561.0 / 161280.0 * n4 - 179.0 / 168.0 * n5 + 6601661.0 / 7257600.0 * n6,
            // α₅
            34729.0 / 80640.0 * n5 - 3418889.0 / 1995840.0 * n6,
            // α₆
            212378941.0 / 319334400.0 * n6,
        ]
    }

    /// Inverse series coefficients β₁..β₆ (Krüger, 6th order).
    fn beta_coefficients(n: f64, n2: f64, n3: f64, n4: f64, n5: f64, n6: f64) -> [f64; 6] {
        [
            // β₁
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604800.0 * n6,
            // β₂
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1118711.0 / 3870720.0 * n6,
            // β₃
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            // β₄
            4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5 - 830251.0 / 7257600.0 * n6,
            // β₅
            4583.0 / 161280.0 * n5 - 108847.0 / 3991680.0 * n6,
            // β₆
            20648693.0 / 638668800.0 * n6,
        ]
    }

    /// Normalized meridional arc distance (ξ₀).
    fn meridional_arc_normalized(phi: f64, n: f64) -> f64 {
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        let a2 = -3.0 / 2.0 * n + 9.0 / 16.0 * n3;
        let a4 = 15.0 / 16.0 * n2 - 15.0 / 32.0 * n4;
        let a6 = -35.0 / 48.0 * n3;
        let a8 = 315.0 / 512.0 * n4;

        phi + a2 * (2.0 * phi).sin()
            + a4 * (4.0 * phi).sin()
            + a6 * (6.0 * phi).sin()
            + a8 * (8.0 * phi).sin()
    }

    /// Convert geodetic tangent τ to conformal tangent τ'.
    fn tau_to_tau_prime(&self, tau: f64) -> f64 {
        let e = self.ellipsoid.e;
        let tau1 = (1.0 + tau * tau).sqrt(); // = sec(φ) = hypot(1, τ)
        let sigma = (e * (e * tau / tau1).atanh()).sinh();
        tau * (1.0 + sigma * sigma).sqrt() - sigma * tau1
    }

    /// Convert conformal tangent τ' back to geodetic tangent τ via Newton iteration.
    fn tau_prime_to_tau(&self, tau_prime: f64) -> f64 {
        let e = self.ellipsoid.e;
        let e2 = self.ellipsoid.e2;
        let mut tau = tau_prime; // initial guess

        for _ in 0..15 {
            let tau1 = (1.0 + tau * tau).sqrt();
            let sigma = (e * (e * tau / tau1).atanh()).sinh();
            let tau_prime_est = tau * (1.0 + sigma * sigma).sqrt() - sigma * tau1;
            let dtau = (tau_prime - tau_prime_est) * (1.0 + (1.0 - e2) * tau * tau)
                / ((1.0 - e2) * tau1 * (1.0 + tau_prime_est * tau_prime_est).sqrt());
            tau += dtau;
            if dtau.abs() < 1e-12 * (1.0 + tau.abs()) {
                break;
            }
        }
        tau
    }
}

impl Projection for TransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), DomainFault> {
        let dlam = adjlon(lon - self.lon0);

        // Convert geodetic tangent to conformal tangent
        let tau = lat.tan();
        let tau_prime = self.tau_to_tau_prime(tau);

        // ξ' = atan2(τ', cos(Δλ))
        let xi_prime = tau_prime.atan2(dlam.cos());
        // η' = asinh(sin(Δλ) / hypot(τ', cos(Δλ)))
        let eta_prime =
            (dlam.sin() / (tau_prime * tau_prime + dlam.cos() * dlam.cos()).sqrt()).asinh();

        // Apply α series (forward)
        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, &a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        let x = self.k0 * self.a_hat * eta + self.x0;
        let y = self.k0 * self.a_hat * (xi - self.m0) + self.y0;

        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), DomainFault> {
        let eta = (x - self.x0) / (self.k0 * self.a_hat);
        let xi = (y - self.y0) / (self.k0 * self.a_hat) + self.m0;

        // Apply β series (inverse)
        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, &b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_prime -= b * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= b * (k * xi).cos() * (k * eta).sinh();
        }

        // τ' = sin(ξ') / hypot(sinh(η'), cos(ξ'))
        let sinh_eta = eta_prime.sinh();
        let cos_xi = xi_prime.cos();
        let sin_xi = xi_prime.sin();
        let tau_prime = sin_xi / (sinh_eta * sinh_eta + cos_xi * cos_xi).sqrt();

        // Recover geodetic tangent τ from conformal tangent τ'
        let tau = self.tau_prime_to_tau(tau_prime);

        let lat = tau.atan();
        let lon = adjlon(self.lon0 + sinh_eta.atan2(cos_xi));

        Ok((lon, lat))
    }
}
