//! Grade computation and formatting.

use std::fmt;

use serde::Serialize;

use crate::flags::ResolvedFlags;

/// How a found/total ratio maps onto a grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeScale {
    /// Grade given for a perfect run.
    pub max: f64,
    /// Decimal places kept when rounding.
    pub precision: u32,
    /// Fraction of `max` from which a grade is good.
    pub good: f64,
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            max: 20.0,
            precision: 2,
            good: 0.5,
        }
    }
}

impl GradeScale {
    pub fn from_flags(flags: &ResolvedFlags) -> Self {
        Self {
            max: flags.grade_max(),
            precision: flags.grade_precision(),
            good: flags.good_grade(),
        }
    }

    /// Grade `found` out of `total`. `None` when there is nothing to grade.
    pub fn grade(&self, found: usize, total: usize) -> Option<Grade> {
        if total == 0 {
            return None;
        }
        let raw = found as f64 / total as f64 * self.max;
        Some(Grade {
            value: round_to(raw, self.precision),
            found,
            total,
            scale: *self,
        })
    }
}

/// A computed grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grade {
    pub value: f64,
    pub found: usize,
    pub total: usize,
    pub scale: GradeScale,
}

impl Grade {
    /// `12/20`, `0.80/1`, or `40%` on a 100 scale.
    pub fn display_score(&self) -> String {
        let value = format_number(self.value, self.scale.precision);
        if self.scale.max == 100.0 {
            format!("{value}%")
        } else {
            format!("{value}/{}", format_number(self.scale.max, self.scale.precision))
        }
    }

    pub fn is_good(&self) -> bool {
        self.value >= self.scale.max * self.scale.good
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Your grade: {} ({}/{})",
            self.display_score(),
            self.found,
            self.total
        )
    }
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Integral values without decimals, others with `precision` decimals.
fn format_number(value: f64, precision: u32) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.prec$}", prec = precision as usize)
    }
}
