//! Cartographic projection engine: definition parsing, a handle
//! registry, and batched coordinate transforms.
//!
//! A coordinate reference system is described by a PROJ-style definition
//! string such as `+proj=utm +zone=33 +datum=WGS84`, resolved once into
//! a [`Pj`], and addressed through an opaque [`Handle`] in a
//! [`Registry`]. Batches of coordinate tuples then transform in place
//! between any two live handles; geographic coordinates are radians,
//! projected and geocentric ones are in the system's linear unit.
//!
//! ```
//! use pjcore::Registry;
//!
//! # fn main() -> Result<(), pjcore::Error> {
//! let registry = Registry::new();
//! let geo = registry.allocate("+proj=longlat +datum=WGS84")?;
//! let utm = registry.allocate("+proj=utm +zone=33 +datum=WGS84")?;
//!
//! let mut values = [15.0_f64.to_radians(), 52.0_f64.to_radians()];
//! registry.transform(geo, utm, 2, &mut values, 0, 1)?;
//! assert!((values[0] - 500_000.0).abs() < 0.01);
//! # Ok(())
//! # }
//! ```

pub mod axis;
pub mod datum;
pub mod error;
pub mod params;
pub mod pj;
pub mod proj;
pub mod registry;
pub mod transform;
pub mod units;

pub use axis::{AxisDirection, AxisOrder};
pub use error::{DomainFault, Error, ParseError, TransformError};
pub use pj::{Pj, PjType};
pub use registry::{Handle, Registry, ScopedHandle};
pub use transform::{Fault, FaultStage, TransformReport, DIMENSION_MAX};
