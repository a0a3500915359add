//! Reference ellipsoids.
//!
//! An [`Ellipsoid`] carries the semi-major axis together with every derived
//! constant the projection formulas need, so the per-point code never
//! recomputes them. Figures come from the named table (`+ellps=`), from a
//! datum's implied figure, or from explicit `+a`/`+b`/`+rf`/`+f`/`+es`/`+e`
//! overrides; `+R` forces a sphere.

use crate::error::ParseError;
use crate::params::ParamList;

/// Reference ellipsoid parameters.
#[derive(Clone, Copy, Debug)]
pub struct Ellipsoid {
    /// Semi-major axis (metres)
    pub a: f64,
    /// Flattening (dimensionless)
    pub f: f64,
    /// Semi-minor axis: a * sqrt(1 - e^2)
    pub b: f64,
    /// First eccentricity: sqrt(2f - f^2)
    pub e: f64,
    /// First eccentricity squared
    pub e2: f64,
    /// Second eccentricity squared: e^2 / (1 - e^2)
    pub ep2: f64,
    /// Third flattening: f / (2 - f)
    pub n: f64,
}

impl Ellipsoid {
    /// Builds a figure from semi-major axis and flattening.
    pub fn from_flattening(a: f64, f: f64) -> Result<Self, ParseError> {
        Self::build(a, f * (2.0 - f))
    }

    /// Builds a figure from semi-major axis and reciprocal flattening.
    pub fn from_inverse_flattening(a: f64, rf: f64) -> Result<Self, ParseError> {
        if rf == 0.0 {
            return Err(invalid("rf", rf, "reciprocal flattening must be non-zero"));
        }
        Self::from_flattening(a, 1.0 / rf)
    }

    /// Builds a figure from both semi-axes.
    pub fn from_semi_minor(a: f64, b: f64) -> Result<Self, ParseError> {
        Self::build(a, 1.0 - (b * b) / (a * a))
    }

    /// Builds a figure from semi-major axis and first eccentricity squared.
    pub fn from_eccentricity_squared(a: f64, e2: f64) -> Result<Self, ParseError> {
        Self::build(a, e2)
    }

    /// Builds a sphere of the given radius.
    pub fn sphere(radius: f64) -> Result<Self, ParseError> {
        Self::build(radius, 0.0)
    }

    fn build(a: f64, e2: f64) -> Result<Self, ParseError> {
        if !a.is_finite() || a <= 0.0 {
            return Err(invalid("a", a, "semi-major axis must be positive"));
        }
        if !e2.is_finite() || !(0.0..1.0).contains(&e2) {
            return Err(invalid("es", e2, "eccentricity squared must lie in [0, 1)"));
        }
        let b = a * (1.0 - e2).sqrt();
        let f = 1.0 - b / a;
        Ok(Ellipsoid {
            a,
            f,
            b,
            e: e2.sqrt(),
            e2,
            ep2: e2 / (1.0 - e2),
            n: f / (2.0 - f),
        })
    }

    /// Whether the figure degenerates to a sphere.
    pub fn is_sphere(&self) -> bool {
        self.e2 == 0.0
    }
}

fn invalid(key: &str, value: f64, hint: &str) -> ParseError {
    ParseError::InvalidParameter(format!("{key}={value}: {hint}"))
}

enum Figure {
    InvFlattening(f64),
    SemiMinor(f64),
}

struct NamedFigure {
    id: &'static str,
    a: f64,
    figure: Figure,
}

use Figure::{InvFlattening, SemiMinor};

#[rustfmt::skip]
const FIGURES: &[NamedFigure] = &[
    NamedFigure { id: "MERIT",     a: 6_378_137.0,   figure: InvFlattening(298.257) },
    NamedFigure { id: "GRS80",     a: 6_378_137.0,   figure: InvFlattening(298.257_222_101) },
    NamedFigure { id: "WGS84",     a: 6_378_137.0,   figure: InvFlattening(298.257_223_563) },
    NamedFigure { id: "WGS72",     a: 6_378_135.0,   figure: InvFlattening(298.26) },
    NamedFigure { id: "WGS66",     a: 6_378_145.0,   figure: InvFlattening(298.25) },
    NamedFigure { id: "WGS60",     a: 6_378_165.0,   figure: InvFlattening(298.3) },
    NamedFigure { id: "GRS67",     a: 6_378_160.0,   figure: InvFlattening(298.247_167_427) },
    NamedFigure { id: "aust_SA",   a: 6_378_160.0,   figure: InvFlattening(298.25) },
    NamedFigure { id: "intl",      a: 6_378_388.0,   figure: InvFlattening(297.0) },
    NamedFigure { id: "clrk66",    a: 6_378_206.4,   figure: SemiMinor(6_356_583.8) },
    NamedFigure { id: "clrk80",    a: 6_378_249.145, figure: InvFlattening(293.4663) },
    NamedFigure { id: "clrk80ign", a: 6_378_249.2,   figure: InvFlattening(293.466_021_293_626_9) },
    NamedFigure { id: "bessel",    a: 6_377_397.155, figure: InvFlattening(299.152_812_8) },
    NamedFigure { id: "krass",     a: 6_378_245.0,   figure: InvFlattening(298.3) },
    NamedFigure { id: "airy",      a: 6_377_563.396, figure: SemiMinor(6_356_256.910) },
    NamedFigure { id: "mod_airy",  a: 6_377_340.189, figure: SemiMinor(6_356_034.446) },
    NamedFigure { id: "evrst30",   a: 6_377_276.345, figure: InvFlattening(300.8017) },
    NamedFigure { id: "sphere",    a: 6_370_997.0,   figure: SemiMinor(6_370_997.0) },
];

fn lookup(id: &str) -> Result<&'static NamedFigure, ParseError> {
    FIGURES
        .iter()
        .find(|n| n.id == id)
        .ok_or_else(|| ParseError::InvalidParameter(format!("ellps={id}: unknown ellipsoid")))
}

fn from_figure(named: &NamedFigure, a: f64) -> Result<Ellipsoid, ParseError> {
    match named.figure {
        InvFlattening(rf) => Ellipsoid::from_inverse_flattening(a, rf),
        SemiMinor(b) => Ellipsoid::from_semi_minor(a, b),
    }
}

/// Looks up a named reference ellipsoid such as `WGS84` or `bessel`.
pub fn named(id: &str) -> Result<Ellipsoid, ParseError> {
    let figure = lookup(id)?;
    from_figure(figure, figure.a)
}

/// Resolves the ellipsoid of a parameter list.
///
/// Explicit shape parameters override the named figure, which overrides a
/// datum-implied figure; a definition with no figure information at all
/// falls back to WGS84. A bare `+a` with no shape parameter is a sphere of
/// that radius.
pub fn resolve(params: &ParamList, datum_ellps: Option<&str>) -> Result<Ellipsoid, ParseError> {
    if let Some(radius) = params.f64_value("R")? {
        return Ellipsoid::sphere(radius);
    }

    let seed = match params.value("ellps") {
        Some(name) => Some(lookup(name)?),
        None => match datum_ellps {
            Some(name) => Some(lookup(name)?),
            None if params.contains("a") => None,
            None => Some(lookup("WGS84")?),
        },
    };

    let a = match params.f64_value("a")? {
        Some(a) => a,
        // Seed is always present when no explicit +a was given.
        None => seed.map(|s| s.a).ok_or(ParseError::Missing("a"))?,
    };

    if let Some(e2) = params.f64_value("es")? {
        Ellipsoid::from_eccentricity_squared(a, e2)
    } else if let Some(e) = params.f64_value("e")? {
        Ellipsoid::from_eccentricity_squared(a, e * e)
    } else if let Some(rf) = params.f64_value("rf")? {
        Ellipsoid::from_inverse_flattening(a, rf)
    } else if let Some(f) = params.f64_value("f")? {
        Ellipsoid::from_flattening(a, f)
    } else if let Some(b) = params.f64_value("b")? {
        Ellipsoid::from_semi_minor(a, b)
    } else {
        match seed {
            Some(named) => from_figure(named, a),
            None => Ellipsoid::sphere(a),
        }
    }
}
