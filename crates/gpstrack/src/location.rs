//! Position sources for the route logger.
//!
//! The logger only ever asks a [`LocationProvider`] for the current
//! coordinate, so a hardware-backed reader can replace the simulated source
//! without touching tick or queue logic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of the prime meridian.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// A source of the device's current position.
pub trait LocationProvider: Send {
    /// Read the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if no fix is available.
    fn current_location(&mut self) -> Result<Coordinate>;
}

impl<F> LocationProvider for F
where
    F: FnMut() -> Coordinate + Send,
{
    fn current_location(&mut self) -> Result<Coordinate> {
        Ok(self())
    }
}

/// Simulated position: a fixed base coordinate plus independent positive
/// jitter in `[0, jitter)` on each axis.
#[derive(Debug)]
pub struct SimulatedLocation {
    base: Coordinate,
    jitter: f64,
    rng: StdRng,
}

impl SimulatedLocation {
    /// Create a simulated source seeded from system entropy.
    #[must_use]
    pub fn new(base: Coordinate, jitter: f64) -> Self {
        Self::with_rng(base, jitter, StdRng::from_entropy())
    }

    /// Create a simulated source with a fixed seed, for reproducible runs.
    #[must_use]
    pub fn seeded(base: Coordinate, jitter: f64, seed: u64) -> Self {
        Self::with_rng(base, jitter, StdRng::seed_from_u64(seed))
    }

    fn with_rng(base: Coordinate, jitter: f64, rng: StdRng) -> Self {
        Self { base, jitter, rng }
    }

    /// The coordinate the jitter is added to.
    #[must_use]
    pub fn base(&self) -> Coordinate {
        self.base
    }
}

impl LocationProvider for SimulatedLocation {
    fn current_location(&mut self) -> Result<Coordinate> {
        let lat = self.base.latitude + self.rng.gen::<f64>() * self.jitter;
        let lon = self.base.longitude + self.rng.gen::<f64>() * self.jitter;
        Ok(Coordinate::new(lat, lon))
    }
}
