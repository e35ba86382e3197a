//! Numerical integration of the frame modes.
//!
//! The frame state is three independent second-order modes (heave, roll,
//! pitch) driven by accelerations that are held constant over a step, so
//! every method here is exact for constant acceleration and they differ
//! only in how velocity feeds back into position within the step.

use crate::dynamics::FrameAcceleration;
use pneu_types::{FrameState, IntegrationMethod};

/// Trait for frame integration methods.
pub trait Integrator {
    /// Advance the frame state by `dt` under a constant acceleration.
    fn integrate(state: &mut FrameState, accel: &FrameAcceleration, dt: f64);
}

/// Dispatch to the appropriate integrator based on the method enum.
pub fn integrate_with_method(
    method: IntegrationMethod,
    state: &mut FrameState,
    accel: &FrameAcceleration,
    dt: f64,
) {
    match method {
        IntegrationMethod::ExplicitEuler => ExplicitEuler::integrate(state, accel, dt),
        IntegrationMethod::SemiImplicitEuler => SemiImplicitEuler::integrate(state, accel, dt),
        IntegrationMethod::RungeKutta4 => RungeKutta4::integrate(state, accel, dt),
    }
}

/// Explicit Euler (first-order).
///
/// ```text
/// x(t+dt) = x(t) + v(t) * dt
/// v(t+dt) = v(t) + a * dt
/// ```
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn integrate(state: &mut FrameState, accel: &FrameAcceleration, dt: f64) {
        state.heave += state.heave_rate * dt;
        state.roll += state.roll_rate * dt;
        state.pitch += state.pitch_rate * dt;

        state.heave_rate += accel.heave * dt;
        state.roll_rate += accel.roll * dt;
        state.pitch_rate += accel.pitch * dt;
    }
}

/// Semi-implicit (symplectic) Euler: velocity first, then position with the
/// new velocity. Stable for the oscillatory gas-spring modes.
///
/// ```text
/// v(t+dt) = v(t) + a * dt
/// x(t+dt) = x(t) + v(t+dt) * dt
/// ```
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn integrate(state: &mut FrameState, accel: &FrameAcceleration, dt: f64) {
        state.heave_rate += accel.heave * dt;
        state.roll_rate += accel.roll * dt;
        state.pitch_rate += accel.pitch * dt;

        state.heave += state.heave_rate * dt;
        state.roll += state.roll_rate * dt;
        state.pitch += state.pitch_rate * dt;
    }
}

/// Fourth-order Runge-Kutta.
///
/// With the acceleration held constant over the step, the four stages
/// collapse to the closed form:
///
/// ```text
/// x(t+dt) = x(t) + v(t) * dt + 0.5 * a * dt^2
/// v(t+dt) = v(t) + a * dt
/// ```
pub struct RungeKutta4;

impl Integrator for RungeKutta4 {
    fn integrate(state: &mut FrameState, accel: &FrameAcceleration, dt: f64) {
        let half_dt_sq = 0.5 * dt * dt;

        state.heave += state.heave_rate * dt + accel.heave * half_dt_sq;
        state.roll += state.roll_rate * dt + accel.roll * half_dt_sq;
        state.pitch += state.pitch_rate * dt + accel.pitch * half_dt_sq;

        state.heave_rate += accel.heave * dt;
        state.roll_rate += accel.roll * dt;
        state.pitch_rate += accel.pitch * dt;
    }
}
