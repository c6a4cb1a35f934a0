//! Exact critically damped spring (analytical solution).
//!
//! Frame-rate independent and unconditionally stable. Parameterized by
//! half-life: the time in seconds for the spring to cover 50% of the
//! remaining distance to its target at rest. This is the sole tuning
//! parameter for all camera motion.

const LN_2: f64 = std::f64::consts::LN_2;
const EPSILON: f64 = 1e-5;

/// One degree of freedom of critically damped motion.
#[derive(Debug, Clone)]
pub struct Spring {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
}

impl Spring {
    pub fn new(initial: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    /// Advance by `dt` seconds using the closed-form solution.
    ///
    /// `half_life` values at or below zero collapse to a small epsilon
    /// (instant snap). Negative `dt` is a programming error.
    pub fn update(&mut self, half_life: f64, dt: f64) {
        assert!(dt >= 0.0, "spring stepped backwards: dt={dt}");
        let (position, velocity) = self.step(half_life, dt);
        self.position = position;
        self.velocity = velocity;
    }

    /// Compute the position `dt` seconds ahead without mutating state.
    /// Used for lookahead queries.
    pub fn predict(&self, half_life: f64, dt: f64) -> f64 {
        assert!(dt >= 0.0, "spring predicted backwards: dt={dt}");
        self.step(half_life, dt).0
    }

    fn step(&self, half_life: f64, dt: f64) -> (f64, f64) {
        let y = (4.0 * LN_2) / half_life.max(EPSILON);
        let y_half = y / 2.0;
        let j0 = self.position - self.target;
        let j1 = self.velocity + j0 * y_half;
        let eydt = (-y_half * dt).exp();

        (
            eydt * (j0 + j1 * dt) + self.target,
            eydt * (self.velocity - j1 * y_half * dt),
        )
    }

    /// Teleport: position and target set to `value`, velocity cleared.
    pub fn snap(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn is_settled(&self, threshold: f64) -> bool {
        (self.position - self.target).abs() < threshold && self.velocity.abs() < threshold
    }
}
