//! Closed set of arithmetic rules a KPI may declare.
//!
//! Keeping formulas as a tagged enum (rather than callables embedded in
//! configuration data) lets the catalog validate arity and positional index
//! requirements against the declared role lists at load time.

/// High/low 32-bit counter pairs wrap at 2^31 on the network elements.
pub const HI_COUNTER_WRAP: f64 = 2_147_483_648.0;

/// Arithmetic rule evaluated over the accumulated role values of one KPI.
///
/// `scale` multiplies the final result (1.0 for raw ratios, 100.0 for
/// percentages). `complement` variants compute `1 - ratio` before scaling.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// `offset + scale * sum(numerator)`
    LinearOfSum { scale: f64, offset: f64 },
    /// `scale * sum(numerator) / sum(denominator)`, optionally complemented
    RatioOfSums { scale: f64, complement: bool },
    /// `scale * sum(numerator) / (den[0] * den[1])`
    SumOverPositionalProduct { scale: f64 },
    /// `scale * sum(numerator) / (den[0] - den[1])`, optionally complemented
    SumOverPositionalDifference { scale: f64, complement: bool },
    /// `scale * (sum(num) / sum(den)) / (add[0] - add[1] / sum(den))`
    RatioOverAdjustedCapacity { scale: f64 },
    /// `add[0] - sum(numerator) / sum(denominator)`
    CapacityMinusRatio,
    /// `scale * (num[0] * 2^31 + num[1])`
    CombineHiLo { scale: f64 },
    /// `num[0] - num[1]`
    PositionalDifference,
    /// `scale * sum(numerator) / (den[0] * 2^31 + den[1] + den[2])`
    SumOverHiLoTotal { scale: f64 },
}

/// Minimum number of declared prefixes each role must carry for a formula
/// to be evaluable. A zero denominator/additional requirement means the
/// formula does not consume that role at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleArity {
    pub numerator: usize,
    pub denominator: usize,
    pub additional: usize,
}

impl Formula {
    /// Role requirements used for load-time catalog validation.
    pub fn arity(&self) -> RoleArity {
        match self {
            Self::LinearOfSum { .. } => RoleArity { numerator: 1, denominator: 0, additional: 0 },
            Self::RatioOfSums { .. } => RoleArity { numerator: 1, denominator: 1, additional: 0 },
            Self::SumOverPositionalProduct { .. } => {
                RoleArity { numerator: 1, denominator: 2, additional: 0 }
            },
            Self::SumOverPositionalDifference { .. } => {
                RoleArity { numerator: 1, denominator: 2, additional: 0 }
            },
            Self::RatioOverAdjustedCapacity { .. } => {
                RoleArity { numerator: 1, denominator: 1, additional: 2 }
            },
            Self::CapacityMinusRatio => RoleArity { numerator: 1, denominator: 1, additional: 1 },
            Self::CombineHiLo { .. } => RoleArity { numerator: 2, denominator: 0, additional: 0 },
            Self::PositionalDifference => RoleArity { numerator: 2, denominator: 0, additional: 0 },
            Self::SumOverHiLoTotal { .. } => {
                RoleArity { numerator: 1, denominator: 3, additional: 0 }
            },
        }
    }

    pub fn uses_denominator(&self) -> bool {
        self.arity().denominator > 0
    }

    pub fn uses_additional(&self) -> bool {
        self.arity().additional > 0
    }
}
