//! Datum shifts and prime meridians.
//!
//! Horizontal datums are modelled by their transformation to WGS84: either
//! a zero shift, a three-parameter geocentric translation, or a
//! seven-parameter position-vector Helmert transform. A definition supplies
//! the shift with `+towgs84=` or by naming a `+datum=`, which also implies
//! the ellipsoid. Definitions with neither carry an unknown datum and never
//! take part in datum transformation.
//!
//! Grid-based shifts (`+nadgrids=`) are not carried; such datums degenerate
//! to a known zero shift.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{DomainFault, ParseError};
use crate::params::ParamList;
use crate::proj::ellipsoid::Ellipsoid;

/// Arc-seconds to radians.
const SEC_TO_RAD: f64 = 4.848_136_811_095_36e-6;

/// Transformation from a datum to WGS84.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DatumShift {
    /// No datum information; datum transformation is skipped entirely.
    Unknown,
    /// WGS84 itself, or a zero `+towgs84` shift.
    Wgs84,
    /// Geocentric translation in metres.
    ThreeParam([f64; 3]),
    /// Position-vector Helmert transform: translation in metres, rotations
    /// in radians, scale already folded into a multiplier.
    SevenParam {
        dx: f64,
        dy: f64,
        dz: f64,
        rx: f64,
        ry: f64,
        rz: f64,
        m: f64,
    },
}

impl DatumShift {
    /// Whether this shift actually moves coordinates.
    pub fn has_parameters(&self) -> bool {
        matches!(
            self,
            DatumShift::ThreeParam(_) | DatumShift::SevenParam { .. }
        )
    }

    /// Applies the shift, taking geocentric coordinates into WGS84.
    pub fn to_wgs84(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        match *self {
            DatumShift::Unknown | DatumShift::Wgs84 => (x, y, z),
            DatumShift::ThreeParam([dx, dy, dz]) => (x + dx, y + dy, z + dz),
            DatumShift::SevenParam {
                dx,
                dy,
                dz,
                rx,
                ry,
                rz,
                m,
            } => (
                m * (x - rz * y + ry * z) + dx,
                m * (rz * x + y - rx * z) + dy,
                m * (-ry * x + rx * y + z) + dz,
            ),
        }
    }

    /// Applies the inverse shift, taking WGS84 geocentric coordinates back
    /// into this datum.
    pub fn from_wgs84(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        match *self {
            DatumShift::Unknown | DatumShift::Wgs84 => (x, y, z),
            DatumShift::ThreeParam([dx, dy, dz]) => (x - dx, y - dy, z - dz),
            DatumShift::SevenParam {
                dx,
                dy,
                dz,
                rx,
                ry,
                rz,
                m,
            } => {
                let xt = (x - dx) / m;
                let yt = (y - dy) / m;
                let zt = (z - dz) / m;
                (
                    xt + rz * yt - ry * zt,
                    -rz * xt + yt + rx * zt,
                    ry * xt - rx * yt + zt,
                )
            }
        }
    }
}

enum ShiftDef {
    Zero,
    Grids,
    Three([f64; 3]),
    Seven([f64; 7]),
}

struct NamedDatum {
    id: &'static str,
    ellipse: &'static str,
    def: ShiftDef,
}

#[rustfmt::skip]
const DATUMS: &[NamedDatum] = &[
    NamedDatum { id: "WGS84",    ellipse: "WGS84",  def: ShiftDef::Zero },
    NamedDatum { id: "GGRS87",   ellipse: "GRS80",  def: ShiftDef::Three([-199.87, 74.79, 246.62]) },
    NamedDatum { id: "NAD83",    ellipse: "GRS80",  def: ShiftDef::Zero },
    NamedDatum { id: "NAD27",    ellipse: "clrk66", def: ShiftDef::Grids },
    NamedDatum { id: "potsdam",  ellipse: "bessel", def: ShiftDef::Seven([598.1, 73.7, 418.2, 0.202, 0.045, -2.455, 6.7]) },
    NamedDatum { id: "carthage", ellipse: "clrk80ign", def: ShiftDef::Three([-263.0, 6.0, 431.0]) },
    NamedDatum { id: "hermannskogel", ellipse: "bessel", def: ShiftDef::Seven([577.326, 90.129, 463.919, 5.137, 1.474, 5.297, 2.4232]) },
    NamedDatum { id: "ire65",    ellipse: "mod_airy", def: ShiftDef::Seven([482.530, -130.596, 564.557, -1.042, -0.214, -0.631, 8.15]) },
    NamedDatum { id: "nzgd49",   ellipse: "intl",   def: ShiftDef::Seven([59.47, -5.04, 187.44, 0.47, -0.1, 1.024, -4.5993]) },
    NamedDatum { id: "OSGB36",   ellipse: "airy",   def: ShiftDef::Seven([446.448, -125.157, 542.060, 0.1502, 0.2470, 0.8421, -20.4894]) },
];

/// Outcome of datum resolution for one definition.
pub struct DatumResolution {
    pub shift: DatumShift,
    /// Named ellipsoid implied by `+datum`, if that is where the shift
    /// came from.
    pub ellipsoid_hint: Option<&'static str>,
}

/// Resolves the datum shift of a parameter list.
///
/// `+nadgrids` and `+towgs84` take precedence, in that order, over a named
/// `+datum`; only the named form contributes an implied ellipsoid.
pub fn resolve(params: &ParamList) -> Result<DatumResolution, ParseError> {
    if params.contains("nadgrids") {
        return Ok(DatumResolution {
            shift: DatumShift::Wgs84,
            ellipsoid_hint: None,
        });
    }
    if let Some(values) = params.f64_list("towgs84")? {
        return Ok(DatumResolution {
            shift: shift_from_values(&values)?,
            ellipsoid_hint: None,
        });
    }
    if let Some(name) = params.value("datum") {
        let entry = DATUMS
            .iter()
            .find(|d| d.id == name)
            .ok_or_else(|| ParseError::InvalidParameter(format!("datum={name}: unknown datum")))?;
        let shift = match entry.def {
            ShiftDef::Zero | ShiftDef::Grids => DatumShift::Wgs84,
            ShiftDef::Three(p) => DatumShift::ThreeParam(p),
            ShiftDef::Seven(p) => seven_from_raw(p),
        };
        return Ok(DatumResolution {
            shift,
            ellipsoid_hint: Some(entry.ellipse),
        });
    }
    Ok(DatumResolution {
        shift: DatumShift::Unknown,
        ellipsoid_hint: None,
    })
}

/// Builds a shift from raw `+towgs84` values: up to seven numbers, missing
/// trailing entries taken as zero.
fn shift_from_values(values: &[f64]) -> Result<DatumShift, ParseError> {
    if values.is_empty() || values.len() > 7 {
        return Err(ParseError::InvalidParameter(format!(
            "towgs84: expected 3 or 7 values, got {}",
            values.len()
        )));
    }
    let mut p = [0.0; 7];
    p[..values.len()].copy_from_slice(values);
    if p[3] != 0.0 || p[4] != 0.0 || p[5] != 0.0 || p[6] != 0.0 {
        Ok(seven_from_raw(p))
    } else if p[0] != 0.0 || p[1] != 0.0 || p[2] != 0.0 {
        Ok(DatumShift::ThreeParam([p[0], p[1], p[2]]))
    } else {
        Ok(DatumShift::Wgs84)
    }
}

/// Converts raw table values (metres, arc-seconds, ppm) into the stored
/// form (metres, radians, scale multiplier).
fn seven_from_raw(p: [f64; 7]) -> DatumShift {
    DatumShift::SevenParam {
        dx: p[0],
        dy: p[1],
        dz: p[2],
        rx: p[3] * SEC_TO_RAD,
        ry: p[4] * SEC_TO_RAD,
        rz: p[5] * SEC_TO_RAD,
        m: 1.0 + p[6] * 1e-6,
    }
}

/// Whether two sides describe the same datum on the same figure.
pub fn same_datum(a: &DatumShift, ell_a: &Ellipsoid, b: &DatumShift, ell_b: &Ellipsoid) -> bool {
    a == b && ell_a.a == ell_b.a && (ell_a.e2 - ell_b.e2).abs() < 5e-11
}

/// Whether the datum step of the pipeline has any work to do.
///
/// The step is skipped when either side's datum is unknown, when both
/// sides agree, or when neither side carries actual shift parameters.
pub fn needs_shift(
    src: &DatumShift,
    src_ell: &Ellipsoid,
    dst: &DatumShift,
    dst_ell: &Ellipsoid,
) -> bool {
    if *src == DatumShift::Unknown || *dst == DatumShift::Unknown {
        return false;
    }
    if same_datum(src, src_ell, dst, dst_ell) {
        return false;
    }
    src.has_parameters() || dst.has_parameters()
}

/// Runs the full datum step on one geographic tuple: geocentric conversion
/// on the source figure, shift into and out of WGS84, geodetic conversion
/// on the target figure.
pub fn apply_shift(
    src: &DatumShift,
    src_ell: &Ellipsoid,
    dst: &DatumShift,
    dst_ell: &Ellipsoid,
    lon: f64,
    lat: f64,
    height: f64,
) -> Result<(f64, f64, f64), DomainFault> {
    let (x, y, z) = geodetic_to_geocentric(src_ell, lon, lat, height)?;
    let (x, y, z) = src.to_wgs84(x, y, z);
    let (x, y, z) = dst.from_wgs84(x, y, z);
    Ok(geocentric_to_geodetic(dst_ell, x, y, z))
}

/// Converts geodetic coordinates (radians, metres) to geocentric X, Y, Z
/// in metres.
///
/// Latitudes slightly past a pole are clamped; latitudes further out fault.
pub fn geodetic_to_geocentric(
    ell: &Ellipsoid,
    lon: f64,
    lat: f64,
    height: f64,
) -> Result<(f64, f64, f64), DomainFault> {
    let mut lat = lat;
    if lat < -FRAC_PI_2 && lat > -1.001 * FRAC_PI_2 {
        lat = -FRAC_PI_2;
    } else if lat > FRAC_PI_2 && lat < 1.001 * FRAC_PI_2 {
        lat = FRAC_PI_2;
    } else if !(-FRAC_PI_2..=FRAC_PI_2).contains(&lat) {
        return Err(DomainFault::LimitsExceeded);
    }
    let mut lon = lon;
    if lon > PI {
        lon -= TAU;
    }

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let rn = ell.a / (1.0 - ell.e2 * sin_lat * sin_lat).sqrt();
    Ok((
        (rn + height) * cos_lat * lon.cos(),
        (rn + height) * cos_lat * lon.sin(),
        (rn * (1.0 - ell.e2) + height) * sin_lat,
    ))
}

/// Converts geocentric X, Y, Z in metres to geodetic coordinates (radians,
/// metres) using the non-iterative Toms method.
pub fn geocentric_to_geodetic(ell: &Ellipsoid, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    // Toms region constant and the 67.5 degree cosine bound.
    const AD_C: f64 = 1.0026000;
    const COS_67P5: f64 = 0.382_683_432_365_089_77;

    let mut at_pole = false;
    let lon = if x != 0.0 {
        y.atan2(x)
    } else if y > 0.0 {
        FRAC_PI_2
    } else if y < 0.0 {
        -FRAC_PI_2
    } else {
        at_pole = true;
        if z == 0.0 {
            // Centre of the earth: pick the north pole at depth b.
            return (0.0, FRAC_PI_2, -ell.b);
        }
        0.0
    };

    let w2 = x * x + y * y;
    let w = w2.sqrt();
    let t0 = z * AD_C;
    let s0 = (t0 * t0 + w2).sqrt();
    let sin_b0 = t0 / s0;
    let cos_b0 = w / s0;
    let sin3_b0 = sin_b0 * sin_b0 * sin_b0;
    let t1 = z + ell.b * ell.ep2 * sin3_b0;
    let sum = w - ell.a * ell.e2 * cos_b0 * cos_b0 * cos_b0;
    let s1 = (t1 * t1 + sum * sum).sqrt();
    let sin_p1 = t1 / s1;
    let cos_p1 = sum / s1;
    let rn = ell.a / (1.0 - ell.e2 * sin_p1 * sin_p1).sqrt();

    let height = if cos_p1 >= COS_67P5 {
        w / cos_p1 - rn
    } else if cos_p1 <= -COS_67P5 {
        w / -cos_p1 - rn
    } else {
        z / sin_p1 + rn * (ell.e2 - 1.0)
    };
    let lat = if at_pole {
        if z > 0.0 {
            FRAC_PI_2
        } else {
            -FRAC_PI_2
        }
    } else {
        (sin_p1 / cos_p1).atan()
    };
    (lon, lat, height)
}

struct PrimeMeridian {
    id: &'static str,
    degrees: f64,
}

#[rustfmt::skip]
const PRIME_MERIDIANS: &[PrimeMeridian] = &[
    PrimeMeridian { id: "greenwich", degrees: 0.0 },
    PrimeMeridian { id: "lisbon",    degrees: -9.131_906_111_111_112 },
    PrimeMeridian { id: "paris",     degrees: 2.337_229_166_666_666_7 },
    PrimeMeridian { id: "bogota",    degrees: -74.080_916_666_666_67 },
    PrimeMeridian { id: "madrid",    degrees: -3.687_938_888_888_889 },
    PrimeMeridian { id: "rome",      degrees: 12.452_333_333_333_333 },
    PrimeMeridian { id: "bern",      degrees: 7.439_583_333_333_333 },
    PrimeMeridian { id: "jakarta",   degrees: 106.807_719_444_444_44 },
    PrimeMeridian { id: "ferro",     degrees: -17.666_666_666_666_668 },
    PrimeMeridian { id: "brussels",  degrees: 4.367_975 },
    PrimeMeridian { id: "stockholm", degrees: 18.058_277_777_777_778 },
    PrimeMeridian { id: "athens",    degrees: 23.716_337_5 },
    PrimeMeridian { id: "oslo",      degrees: 10.722_916_666_666_666 },
];

/// Resolves `+pm=` to a longitude offset from Greenwich in radians.
///
/// Accepts a meridian name from the table or a numeric value in decimal
/// degrees, positive east.
pub fn resolve_prime_meridian(params: &ParamList) -> Result<f64, ParseError> {
    let Some(text) = params.value("pm") else {
        return Ok(0.0);
    };
    if let Some(pm) = PRIME_MERIDIANS.iter().find(|p| p.id == text) {
        return Ok(pm.degrees.to_radians());
    }
    text.trim().parse::<f64>().map(f64::to_radians).map_err(|_| {
        ParseError::InvalidParameter(format!("pm={text}: unknown prime meridian"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid;
    use approx::assert_relative_eq;

    fn wgs84() -> Ellipsoid {
        ellipsoid::named("WGS84").unwrap()
    }

    fn parse(def: &str) -> ParamList {
        ParamList::parse(def).unwrap()
    }

    #[test]
    fn test_resolve_named_datums() {
        let r = resolve(&parse("+proj=longlat +datum=WGS84")).unwrap();
        assert_eq!(r.shift, DatumShift::Wgs84);
        assert_eq!(r.ellipsoid_hint, Some("WGS84"));

        let r = resolve(&parse("+proj=longlat +datum=GGRS87")).unwrap();
        assert_eq!(r.shift, DatumShift::ThreeParam([-199.87, 74.79, 246.62]));
        assert_eq!(r.ellipsoid_hint, Some("GRS80"));

        let r = resolve(&parse("+proj=longlat +datum=NAD27")).unwrap();
        assert_eq!(r.shift, DatumShift::Wgs84);
        assert_eq!(r.ellipsoid_hint, Some("clrk66"));

        assert!(resolve(&parse("+proj=longlat +datum=ED1950")).is_err());
    }

    #[test]
    fn test_towgs84_wins_over_datum() {
        let r = resolve(&parse("+proj=longlat +datum=potsdam +towgs84=0,0,0")).unwrap();
        assert_eq!(r.shift, DatumShift::Wgs84);
        // The named datum no longer contributes its ellipsoid either.
        assert_eq!(r.ellipsoid_hint, None);
    }

    #[test]
    fn test_towgs84_forms() {
        let r = resolve(&parse("+proj=longlat +towgs84=1,2,3")).unwrap();
        assert_eq!(r.shift, DatumShift::ThreeParam([1.0, 2.0, 3.0]));

        // Short lists pad with zeros.
        let r = resolve(&parse("+proj=longlat +towgs84=1,2")).unwrap();
        assert_eq!(r.shift, DatumShift::ThreeParam([1.0, 2.0, 0.0]));

        let r = resolve(&parse("+proj=longlat +towgs84=1,2,3,4,5,6,7")).unwrap();
        match r.shift {
            DatumShift::SevenParam { rx, m, .. } => {
                assert_relative_eq!(rx, 4.0 * SEC_TO_RAD, epsilon = 1e-18);
                assert_relative_eq!(m, 1.0 + 7e-6, epsilon = 1e-15);
            }
            other => panic!("expected seven-parameter shift, got {other:?}"),
        }

        assert!(resolve(&parse("+proj=longlat +towgs84=1,2,3,4,5,6,7,8")).is_err());
    }

    #[test]
    fn test_no_datum_information_is_unknown() {
        let r = resolve(&parse("+proj=longlat +ellps=WGS84")).unwrap();
        assert_eq!(r.shift, DatumShift::Unknown);
    }

    #[test]
    fn test_needs_shift_rules() {
        let wgs84 = wgs84();
        let bessel = ellipsoid::named("bessel").unwrap();
        let three = DatumShift::ThreeParam([1.0, 2.0, 3.0]);

        // Unknown on either side disables the step.
        assert!(!needs_shift(&DatumShift::Unknown, &wgs84, &three, &wgs84));
        assert!(!needs_shift(&three, &wgs84, &DatumShift::Unknown, &wgs84));

        // Identical datums on the same figure skip.
        assert!(!needs_shift(&three, &bessel, &three, &bessel));

        // Equivalent zero shifts skip even across figures.
        assert!(!needs_shift(&DatumShift::Wgs84, &wgs84, &DatumShift::Wgs84, &bessel));

        // A real shift on one side runs.
        assert!(needs_shift(&three, &bessel, &DatumShift::Wgs84, &wgs84));

        // The same parameters on different figures still run the
        // geocentric conversion.
        assert!(needs_shift(&three, &bessel, &three, &wgs84));
    }

    #[test]
    fn test_geocentric_reference_points() {
        let ell = wgs84();
        let (x, y, z) = geodetic_to_geocentric(&ell, 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(x, ell.a, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(z, 0.0, epsilon = 1e-6);

        let (x, y, z) = geodetic_to_geocentric(&ell, 0.0, FRAC_PI_2, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(z, ell.b, epsilon = 1e-6);
    }

    #[test]
    fn test_geocentric_round_trip() {
        let ell = wgs84();
        for (lon_deg, lat_deg, h) in [
            (15.0, 52.0, 100.0),
            (-74.0, -33.5, 850.0),
            (179.5, 81.0, -30.0),
            (0.0, -90.0, 0.0),
        ] {
            let lon = lon_deg * PI / 180.0;
            let lat = lat_deg * PI / 180.0;
            let (x, y, z) = geodetic_to_geocentric(&ell, lon, lat, h).unwrap();
            let (lon2, lat2, h2) = geocentric_to_geodetic(&ell, x, y, z);
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
            assert_relative_eq!(h2, h, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_geodetic_latitude_limits() {
        let ell = wgs84();
        // Slightly past the pole clamps.
        assert!(geodetic_to_geocentric(&ell, 0.0, FRAC_PI_2 * 1.0005, 0.0).is_ok());
        // Far past the pole faults.
        assert_eq!(
            geodetic_to_geocentric(&ell, 0.0, 2.0, 0.0),
            Err(DomainFault::LimitsExceeded)
        );
        assert!(geodetic_to_geocentric(&ell, 0.0, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_helmert_round_trip() {
        let r = resolve(&parse("+proj=longlat +datum=OSGB36")).unwrap();
        let (x, y, z) = (3_980_581.0, -11_250.0, 4_966_824.0);
        let (wx, wy, wz) = r.shift.to_wgs84(x, y, z);
        // OSGB36 sits hundreds of metres from WGS84.
        let moved = ((wx - x).powi(2) + (wy - y).powi(2) + (wz - z).powi(2)).sqrt();
        assert!(moved > 100.0 && moved < 1200.0, "moved {moved}");

        let (bx, by, bz) = r.shift.from_wgs84(wx, wy, wz);
        // The rotation inverse is first order, so round trips are close
        // but not exact.
        assert_relative_eq!(bx, x, epsilon = 1e-3);
        assert_relative_eq!(by, y, epsilon = 1e-3);
        assert_relative_eq!(bz, z, epsilon = 1e-3);
    }

    #[test]
    fn test_apply_shift_moves_and_returns() {
        let grs80 = ellipsoid::named("GRS80").unwrap();
        let wgs84 = wgs84();
        let ggrs87 = DatumShift::ThreeParam([-199.87, 74.79, 246.62]);
        let lon = 0.41;
        let lat = 0.68;
        let h = 200.0;

        let (lon2, lat2, h2) =
            apply_shift(&ggrs87, &grs80, &DatumShift::Wgs84, &wgs84, lon, lat, h).unwrap();
        assert!((lon2 - lon).abs() > 1e-7 || (lat2 - lat).abs() > 1e-7);

        let (lon3, lat3, h3) =
            apply_shift(&DatumShift::Wgs84, &wgs84, &ggrs87, &grs80, lon2, lat2, h2).unwrap();
        assert_relative_eq!(lon3, lon, epsilon = 1e-9);
        assert_relative_eq!(lat3, lat, epsilon = 1e-9);
        assert_relative_eq!(h3, h, epsilon = 1e-3);
    }

    #[test]
    fn test_prime_meridians() {
        let pm = resolve_prime_meridian(&parse("+proj=longlat +pm=paris")).unwrap();
        assert_relative_eq!(pm.to_degrees(), 2.337_229_166_666_666_7, epsilon = 1e-12);

        let pm = resolve_prime_meridian(&parse("+proj=longlat +pm=-17.5")).unwrap();
        assert_relative_eq!(pm.to_degrees(), -17.5, epsilon = 1e-12);

        let pm = resolve_prime_meridian(&parse("+proj=longlat")).unwrap();
        assert_eq!(pm, 0.0);

        assert!(resolve_prime_meridian(&parse("+proj=longlat +pm=atlantis")).is_err());
    }
}
