//! Common helpers for projection math (meridional arc, latitude conversions, etc.).

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::ellipsoid::Ellipsoid;

/// Shared tolerance for the near-pole and near-degenerate checks.
pub const EPS10: f64 = 1e-10;

/// Compute the meridional arc length from the equator to latitude phi.
/// Uses the series expansion in powers of n (third flattening).
pub fn meridional_arc(ellipsoid: &Ellipsoid, phi: f64) -> f64 {
    let n = ellipsoid.n;
    let n2 = n * n;
    let n3 = n2 * n;
    let n4 = n3 * n;

    let a = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

    let a0 = 1.0;
    let a2 = -3.0 / 2.0 * n + 9.0 / 16.0 * n3;
    let a4 = 15.0 / 16.0 * n2 - 15.0 / 32.0 * n4;
    let a6 = -35.0 / 48.0 * n3;
    let a8 = 315.0 / 512.0 * n4;

    a * (a0 * phi + a2 * (2.0 * phi).sin() + a4 * (4.0 * phi).sin()
        + a6 * (6.0 * phi).sin()
        + a8 * (8.0 * phi).sin())
}

/// Compute the isometric latitude function:
/// t = tan(pi/4 - phi/2) / ((1 - e sin phi) / (1 + e sin phi))^(e/2).
///
/// Goes to 0 at the north pole and to infinity at the south pole.
pub fn tsfn(phi: f64, e: f64) -> f64 {
    let con = e * phi.sin();
    (0.5 * (FRAC_PI_2 - phi)).tan() / ((1.0 - con) / (1.0 + con)).powf(0.5 * e)
}

/// Compute the meridional scale function:
/// m = cos phi / sqrt(1 - e^2 sin^2 phi).
pub fn msfn(phi: f64, e2: f64) -> f64 {
    let sinphi = phi.sin();
    phi.cos() / (1.0 - e2 * sinphi * sinphi).sqrt()
}

/// Recover latitude from the isometric latitude function, inverting
/// [`tsfn`] by fixed-point iteration.
pub fn phi_from_ts(ts: f64, e: f64) -> f64 {
    let half_e = 0.5 * e;
    let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
    for _ in 0..15 {
        let con = e * phi.sin();
        let next = FRAC_PI_2 - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(half_e)).atan();
        let delta = next - phi;
        phi = next;
        if delta.abs() < 1e-10 {
            break;
        }
    }
    phi
}

/// Compute the authalic latitude function q(phi):
/// q = (1 - e^2) (sin phi / (1 - e^2 sin^2 phi) - ln((1 - e sin phi) / (1 + e sin phi)) / 2e).
///
/// Reduces to 2 sin phi on a sphere.
pub fn qsfn(phi: f64, e: f64) -> f64 {
    let sinphi = phi.sin();
    if e < 1e-7 {
        return sinphi + sinphi;
    }
    let con = e * sinphi;
    let one_es = 1.0 - e * e;
    one_es * (sinphi / (1.0 - con * con) - (0.5 / e) * ((1.0 - con) / (1.0 + con)).ln())
}

/// Recover latitude from the authalic latitude function, inverting
/// [`qsfn`] by iteration (Snyder 3-16).
pub fn phi_from_q(q: f64, e: f64) -> f64 {
    let mut phi = (0.5 * q).asin();
    if e < 1e-7 {
        return phi;
    }
    let one_es = 1.0 - e * e;
    for _ in 0..15 {
        let sinphi = phi.sin();
        let cosphi = phi.cos();
        let con = e * sinphi;
        let com = 1.0 - con * con;
        let dphi = 0.5 * com * com / cosphi
            * (q / one_es - sinphi / com + (0.5 / e) * ((1.0 - con) / (1.0 + con)).ln());
        phi += dphi;
        if dphi.abs() < 1e-10 {
            break;
        }
    }
    phi
}

/// Reduce a longitude to the [-pi, pi] range.
pub fn adjlon(mut lon: f64) -> f64 {
    // Slightly over pi so that the +/-180 degree meridian itself passes
    // through unchanged.
    const SPI: f64 = 3.141_592_653_59;
    if lon.abs() <= SPI {
        return lon;
    }
    lon += PI;
    lon -= TAU * (lon / TAU).floor();
    lon - PI
}
