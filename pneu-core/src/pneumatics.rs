//! Gas chamber thermodynamics.
//!
//! Each chamber is an isothermal ideal-gas volume with a proportional
//! valve. Valve commands in [-1, 1] meter flow from the supply (positive)
//! or to ambient (negative); mass is integrated with sub-stepped explicit
//! Euler, and pressure follows from p V = m R T.
//!
//! Chamber mass never drops below the amount that fills the dead volume at
//! ambient pressure. Hitting that floor is reported as starvation, a
//! warning rather than an error.

use pneu_types::{GasChamberState, PneumaticConfig};

/// Result of one tick of chamber integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChamberUpdate {
    /// Chamber state after the tick.
    pub state: GasChamberState,
    /// Whether the mass floor clamped the integration.
    pub starved: bool,
}

/// Pressure from the ideal-gas law (Pa).
#[must_use]
pub fn pressure(config: &PneumaticConfig, mass: f64, volume: f64) -> f64 {
    mass * config.gas_constant * config.temperature / volume
}

/// Mass that fills `volume` at `pressure` (kg).
#[must_use]
pub fn fill_mass(config: &PneumaticConfig, pressure: f64, volume: f64) -> f64 {
    pressure * volume / (config.gas_constant * config.temperature)
}

/// Minimum admissible chamber mass: the dead volume at ambient pressure.
#[must_use]
pub fn mass_floor(config: &PneumaticConfig, dead_volume: f64) -> f64 {
    fill_mass(config, config.ambient_pressure, dead_volume)
}

/// Advance one chamber by one tick.
///
/// `volume` is the chamber volume for this tick (held constant across the
/// sub-steps; kinematics only changes it between ticks) and `command` is
/// the valve opening, clamped to [-1, 1].
#[must_use]
pub fn update_chamber(
    config: &PneumaticConfig,
    mass: f64,
    volume: f64,
    dead_volume: f64,
    command: f64,
    dt: f64,
) -> ChamberUpdate {
    let command = command.clamp(-1.0, 1.0);
    let floor = mass_floor(config, dead_volume);
    let h = dt / f64::from(config.substeps);
    let gain = config.flow_coefficient * config.valve_area;

    let mut mass = mass.max(floor);
    let mut starved = false;
    for _ in 0..config.substeps {
        let p = pressure(config, mass, volume);
        let mdot = if command >= 0.0 {
            gain * command * (config.supply_pressure - p)
        } else {
            gain * command * (p - config.ambient_pressure)
        };
        mass += mdot * h;
        if mass < floor {
            mass = floor;
            starved = true;
        }
    }

    ChamberUpdate {
        state: GasChamberState {
            pressure: pressure(config, mass, volume),
            mass,
            volume,
            temperature: config.temperature,
        },
        starved,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 240.0;

    fn chamber_volume() -> f64 {
        // Head chamber of the default cylinder at mid stroke.
        6.280528e-4
    }

    #[test]
    fn test_ideal_gas_round_trip() {
        let config = PneumaticConfig::default();
        let m = fill_mass(&config, 101_325.0, 1.0e-3);
        assert_relative_eq!(m, 1.2041e-3, epsilon = 1e-6);
        assert_relative_eq!(pressure(&config, m, 1.0e-3), 101_325.0, epsilon = 1e-6);
    }

    #[test]
    fn test_closed_valve_holds_mass() {
        let config = PneumaticConfig::default();
        let volume = chamber_volume();
        let mass = fill_mass(&config, 300_000.0, volume);
        let update = update_chamber(&config, mass, volume, 50.0e-6, 0.0, DT);
        assert_relative_eq!(update.state.mass, mass, epsilon = 1e-15);
        assert_relative_eq!(update.state.pressure, 300_000.0, epsilon = 1e-6);
        assert!(!update.starved);
    }

    #[test]
    fn test_charging_approaches_supply() {
        let config = PneumaticConfig::default();
        let volume = chamber_volume();
        let mut mass = fill_mass(&config, 200_000.0, volume);
        let mut previous = 200_000.0;

        // One second of full charge.
        for _ in 0..240 {
            let update = update_chamber(&config, mass, volume, 50.0e-6, 1.0, DT);
            assert!(update.state.pressure >= previous - 1e-9, "monotonic charge");
            assert!(update.state.pressure <= config.supply_pressure + 1e-6);
            previous = update.state.pressure;
            mass = update.state.mass;
        }
        assert!(previous > 0.95 * config.supply_pressure);
    }

    #[test]
    fn test_venting_approaches_ambient() {
        let config = PneumaticConfig::default();
        let volume = chamber_volume();
        let mut mass = fill_mass(&config, 600_000.0, volume);

        for _ in 0..480 {
            let update = update_chamber(&config, mass, volume, 50.0e-6, -1.0, DT);
            mass = update.state.mass;
        }
        let p = pressure(&config, mass, volume);
        assert!(p < 1.1 * config.ambient_pressure);
        assert!(p >= config.ambient_pressure - 1e-6);
    }

    #[test]
    fn test_half_command_charges_slower() {
        let config = PneumaticConfig::default();
        let volume = chamber_volume();
        let mass = fill_mass(&config, 200_000.0, volume);
        let full = update_chamber(&config, mass, volume, 50.0e-6, 1.0, DT);
        let half = update_chamber(&config, mass, volume, 50.0e-6, 0.5, DT);
        assert!(full.state.mass > half.state.mass);
        assert!(half.state.mass > mass);
    }

    #[test]
    fn test_command_is_clamped() {
        let config = PneumaticConfig::default();
        let volume = chamber_volume();
        let mass = fill_mass(&config, 200_000.0, volume);
        let clamped = update_chamber(&config, mass, volume, 50.0e-6, 5.0, DT);
        let unit = update_chamber(&config, mass, volume, 50.0e-6, 1.0, DT);
        assert_relative_eq!(clamped.state.mass, unit.state.mass, epsilon = 1e-15);
    }

    #[test]
    fn test_starvation_clamp() {
        // A coarse step on a dead-volume-sized chamber overshoots the
        // ambient asymptote and lands on the floor.
        let config = PneumaticConfig {
            substeps: 1,
            ..Default::default()
        };
        let volume = 50.0e-6;
        let mass = fill_mass(&config, 150_000.0, volume);
        let update = update_chamber(&config, mass, volume, volume, -1.0, 0.1);
        assert!(update.starved);
        assert_relative_eq!(
            update.state.mass,
            mass_floor(&config, volume),
            epsilon = 1e-15
        );
        assert_relative_eq!(
            update.state.pressure,
            config.ambient_pressure,
            epsilon = 1e-6
        );
    }
}
