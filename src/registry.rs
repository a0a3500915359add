//! Handle registry over resolved systems.
//!
//! Callers hold opaque [`Handle`]s instead of the systems themselves.
//! Handles are allocated monotonically and never reused within a
//! registry, so a stale handle stays invalid forever instead of silently
//! picking up a later system. Each live handle carries an error slot
//! holding the most recent failure message recorded against it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::axis::AxisDirection;
use crate::error::Error;
use crate::pj::{Pj, PjType};
use crate::transform::{self, FaultStage, TransformReport};

/// Opaque identifier of a registered system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Entry {
    pj: Arc<Pj>,
    last_error: Option<String>,
}

#[derive(Default)]
struct Tables {
    next: u64,
    live: HashMap<u64, Entry>,
}

/// Thread-safe registry of live coordinate reference systems.
#[derive(Default)]
pub struct Registry {
    tables: Mutex<Tables>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine identification, name and version.
    pub fn version() -> &'static str {
        concat!("pjcore ", env!("CARGO_PKG_VERSION"))
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A poisoned table is still structurally sound; keep serving.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register(&self, pj: Arc<Pj>) -> Handle {
        let mut tables = self.lock();
        tables.next += 1;
        let handle = Handle(tables.next);
        tables.live.insert(
            handle.0,
            Entry {
                pj,
                last_error: None,
            },
        );
        handle
    }

    fn get(&self, handle: Handle) -> Result<Arc<Pj>, Error> {
        let tables = self.lock();
        tables
            .live
            .get(&handle.0)
            .map(|entry| Arc::clone(&entry.pj))
            .ok_or(Error::InvalidHandle(handle.0))
    }

    fn with<T>(&self, handle: Handle, read: impl FnOnce(&Pj) -> T) -> Result<T, Error> {
        let tables = self.lock();
        tables
            .live
            .get(&handle.0)
            .map(|entry| read(&entry.pj))
            .ok_or(Error::InvalidHandle(handle.0))
    }

    fn record(&self, handle: Handle, message: String) {
        let mut tables = self.lock();
        if let Some(entry) = tables.live.get_mut(&handle.0) {
            entry.last_error = Some(message);
        }
    }

    /// Resolves a definition string and registers it under a fresh handle.
    ///
    /// A definition that fails to resolve consumes nothing.
    pub fn allocate(&self, definition: &str) -> Result<Handle, Error> {
        let pj = Arc::new(Pj::from_definition(definition)?);
        let handle = self.register(pj);
        tracing::debug!("allocated {} for {}", handle, definition);
        Ok(handle)
    }

    /// Registers the geographic system on the same datum and ellipsoid as
    /// an existing handle.
    ///
    /// A derivation failure is recorded against the source handle.
    pub fn allocate_geographic(&self, handle: Handle) -> Result<Handle, Error> {
        let source = self.get(handle)?;
        match source.geographic() {
            Ok(geographic) => {
                let derived = self.register(Arc::new(geographic));
                tracing::debug!("derived geographic {} from {}", derived, handle);
                Ok(derived)
            }
            Err(failed) => {
                self.record(handle, failed.to_string());
                Err(Error::Parse(failed))
            }
        }
    }

    /// Allocates a definition whose handle is released again when the
    /// returned guard drops.
    pub fn scoped(&self, definition: &str) -> Result<ScopedHandle<'_>, Error> {
        Ok(ScopedHandle {
            registry: self,
            handle: self.allocate(definition)?,
        })
    }

    /// Releases a handle. Releasing an unknown or already released handle
    /// does nothing.
    pub fn release(&self, handle: Handle) {
        let removed = self.lock().live.remove(&handle.0).is_some();
        if removed {
            tracing::debug!("released {}", handle);
        }
    }

    /// Number of currently live handles.
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// The canonical definition text of a handle.
    pub fn definition(&self, handle: Handle) -> Result<String, Error> {
        self.with(handle, |pj| pj.definition().to_owned())
    }

    /// One-line human readable description of a handle.
    pub fn describe(&self, handle: Handle) -> Result<String, Error> {
        self.with(handle, |pj| pj.to_string())
    }

    /// Coordinate system family of a handle.
    pub fn pj_type(&self, handle: Handle) -> Result<PjType, Error> {
        self.with(handle, Pj::pj_type)
    }

    /// Semi-major axis in metres.
    pub fn semi_major_axis(&self, handle: Handle) -> Result<f64, Error> {
        self.with(handle, Pj::semi_major_axis)
    }

    /// Semi-minor axis in metres.
    pub fn semi_minor_axis(&self, handle: Handle) -> Result<f64, Error> {
        self.with(handle, Pj::semi_minor_axis)
    }

    /// First eccentricity squared of the reference ellipsoid.
    pub fn eccentricity_squared(&self, handle: Handle) -> Result<f64, Error> {
        self.with(handle, Pj::eccentricity_squared)
    }

    /// Prime meridian longitude in radians east of Greenwich.
    pub fn greenwich_longitude(&self, handle: Handle) -> Result<f64, Error> {
        self.with(handle, Pj::greenwich_longitude)
    }

    /// Native axis directions.
    pub fn axis_directions(&self, handle: Handle) -> Result<[AxisDirection; 3], Error> {
        self.with(handle, Pj::axis_directions)
    }

    /// Metres per linear unit of the horizontal or vertical axes.
    pub fn linear_unit_to_metre(&self, handle: Handle, vertical: bool) -> Result<f64, Error> {
        self.with(handle, |pj| pj.linear_unit_to_metre(vertical))
    }

    /// The most recent error recorded against a handle; the empty string
    /// if none has been.
    pub fn last_error(&self, handle: Handle) -> Result<String, Error> {
        let tables = self.lock();
        tables
            .live
            .get(&handle.0)
            .map(|entry| entry.last_error.clone().unwrap_or_default())
            .ok_or(Error::InvalidHandle(handle.0))
    }

    /// Transforms `count` tuples of `dimension` values in place from the
    /// source system to the target system.
    ///
    /// Whole-call rejections and per-tuple source or datum faults are
    /// recorded against the source handle; target faults against the
    /// target handle. Only the first fault of a batch is recorded.
    pub fn transform(
        &self,
        source: Handle,
        target: Handle,
        dimension: usize,
        values: &mut [f64],
        offset: usize,
        count: usize,
    ) -> Result<TransformReport, Error> {
        let (src, dst) = {
            let tables = self.lock();
            let src = tables
                .live
                .get(&source.0)
                .map(|entry| Arc::clone(&entry.pj))
                .ok_or(Error::InvalidHandle(source.0))?;
            let dst = tables
                .live
                .get(&target.0)
                .map(|entry| Arc::clone(&entry.pj))
                .ok_or(Error::InvalidHandle(target.0))?;
            (src, dst)
        };

        match transform::transform(&src, &dst, dimension, values, offset, count) {
            Ok(report) => {
                if let Some(fault) = report.first_fault {
                    let holder = match fault.stage {
                        FaultStage::Source | FaultStage::Datum => source,
                        FaultStage::Target => target,
                    };
                    self.record(holder, format!("tuple {}: {}", fault.index, fault.fault));
                    tracing::debug!(
                        "transform {} -> {}: {} of {} tuples faulted",
                        source,
                        target,
                        report.failed,
                        count
                    );
                }
                Ok(report)
            }
            Err(rejected) => {
                self.record(source, rejected.to_string());
                Err(Error::Transform(rejected))
            }
        }
    }
}

/// Registry handle released on drop.
pub struct ScopedHandle<'a> {
    registry: &'a Registry,
    handle: Handle,
}

impl ScopedHandle<'_> {
    pub fn handle(&self) -> Handle {
        self.handle
    }
}

impl Drop for ScopedHandle<'_> {
    fn drop(&mut self) {
        self.registry.release(self.handle);
    }
}
