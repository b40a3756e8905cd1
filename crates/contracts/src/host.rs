//! SimHost trait - telemetry input interface

use crate::{ContractError, HostEnvironment, TelemetrySnapshot};

/// Simulation host abstraction
///
/// Unifies the real simulator bindings and the scripted host used in tests.
pub trait SimHost: Send + Sync {
    /// Track, layout, car and capability information
    fn environment(&self) -> HostEnvironment;

    /// Whether the player's car has finished loading
    fn is_car_connected(&self) -> bool;

    /// Read this tick's telemetry
    ///
    /// # Errors
    /// Returns `HostUnavailable` when the host cannot provide data this tick.
    fn snapshot(&self) -> Result<TelemetrySnapshot, ContractError>;
}
