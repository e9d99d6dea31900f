//! Output transfer curve
//!
//! Two-segment curve in the dcraw/LibRaw style: a linear toe of slope `slope`
//! joined to a power segment `x^(1/power)`, offset so both the value and the
//! derivative are continuous at the joint. With `(2.222, 4.5)` this is the
//! BT.709 curve (toe below ~0.018, offset ~0.099).

use super::config::Gamma;

/// Bisection steps used to locate the joint between the two segments.
const SOLVE_ITERATIONS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaCurve {
    exponent: f64,
    slope: f64,
    /// Input value where the toe ends
    threshold: f64,
    /// Offset applied to the power segment
    offset: f64,
}

impl GammaCurve {
    pub fn new(gamma: Gamma) -> Self {
        let exponent = 1.0 / gamma.power;
        let slope = gamma.slope;

        let mut threshold = 0.0;
        let mut offset = 0.0;

        if slope > 0.0 && (slope - 1.0) * (exponent - 1.0) <= 0.0 {
            let mut bounds = [0.0f64, 0.0f64];
            bounds[usize::from(slope >= 1.0)] = 1.0;

            let mut joint = 0.0;
            for _ in 0..SOLVE_ITERATIONS {
                joint = (bounds[0] + bounds[1]) / 2.0;
                let above =
                    ((joint / slope).powf(-exponent) - 1.0) / exponent - 1.0 / joint > -1.0;
                bounds[usize::from(above)] = joint;
            }

            threshold = joint / slope;
            offset = joint * (1.0 / exponent - 1.0);
        }

        Self {
            exponent,
            slope,
            threshold,
            offset,
        }
    }

    /// Map a linear value in `[0, 1]` to its encoded value in `[0, 1]`.
    pub fn apply(&self, linear: f64) -> f64 {
        if linear <= 0.0 {
            return 0.0;
        }
        if linear >= 1.0 {
            return 1.0;
        }
        if linear < self.threshold {
            linear * self.slope
        } else {
            linear.powf(self.exponent) * (1.0 + self.offset) - self.offset
        }
    }

    /// Precompute the curve for 16-bit linear input.
    pub fn lookup_table(&self) -> Vec<f32> {
        (0..=u16::MAX)
            .map(|i| self.apply(i as f64 / u16::MAX as f64) as f32)
            .collect()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}
