//! Damage formulas.
//!
//! A formula is a small expression tree over the subject's (`a`) and the
//! target's (`b`) parameters and vitals, evaluated at resolution time.
//!
//! ## Examples
//!
//! ```ignore
//! // a.atk * 4 - b.def * 2
//! Formula::Sub(
//!     Box::new(Formula::Mul(vec![Formula::Subject(Operand::Param(Param::Attack)), Formula::Constant(4.0)])),
//!     Box::new(Formula::Mul(vec![Formula::Target(Operand::Param(Param::Defense)), Formula::Constant(2.0)])),
//! )
//! ```

use super::snapshot::CombatSnapshot;
use crate::stats::Param;

/// Value read from one side of the exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    Param(Param),
    Hp,
    Mp,
    Tp,
    Level,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formula {
    #[default]
    Zero,
    Constant(f64),
    Subject(Operand),
    Target(Operand),
    Add(Vec<Formula>),
    Sub(Box<Formula>, Box<Formula>),
    Mul(Vec<Formula>),
    Div(Box<Formula>, Box<Formula>),
    Min(Vec<Formula>),
    Max(Vec<Formula>),
}

impl Formula {
    /// Evaluate against subject `a` and target `b`.
    ///
    /// Division by zero yields zero so a malformed formula degrades to no damage.
    pub fn evaluate(&self, a: &CombatSnapshot, b: &CombatSnapshot) -> f64 {
        match self {
            Formula::Zero => 0.0,
            Formula::Constant(value) => *value,
            Formula::Subject(operand) => read(a, *operand),
            Formula::Target(operand) => read(b, *operand),
            Formula::Add(terms) => terms.iter().map(|f| f.evaluate(a, b)).sum(),
            Formula::Sub(lhs, rhs) => lhs.evaluate(a, b) - rhs.evaluate(a, b),
            Formula::Mul(terms) => terms.iter().map(|f| f.evaluate(a, b)).product(),
            Formula::Div(lhs, rhs) => {
                let divisor = rhs.evaluate(a, b);
                if divisor == 0.0 {
                    0.0
                } else {
                    lhs.evaluate(a, b) / divisor
                }
            }
            Formula::Min(terms) => terms
                .iter()
                .map(|f| f.evaluate(a, b))
                .reduce(f64::min)
                .unwrap_or(0.0),
            Formula::Max(terms) => terms
                .iter()
                .map(|f| f.evaluate(a, b))
                .reduce(f64::max)
                .unwrap_or(0.0),
        }
    }
}

fn read(side: &CombatSnapshot, operand: Operand) -> f64 {
    match operand {
        Operand::Param(param) => f64::from(side.param(param)),
        Operand::Hp => f64::from(side.hp),
        Operand::Mp => f64::from(side.mp),
        Operand::Tp => f64::from(side.tp),
        Operand::Level => f64::from(side.level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(atk: i32, def: i32) -> CombatSnapshot {
        let mut snapshot = CombatSnapshot::default();
        snapshot.params[Param::Attack.index()] = atk;
        snapshot.params[Param::Defense.index()] = def;
        snapshot.level = 5;
        snapshot
    }

    #[test]
    fn classic_attack_formula() {
        let formula = Formula::Sub(
            Box::new(Formula::Mul(vec![
                Formula::Subject(Operand::Param(Param::Attack)),
                Formula::Constant(4.0),
            ])),
            Box::new(Formula::Mul(vec![
                Formula::Target(Operand::Param(Param::Defense)),
                Formula::Constant(2.0),
            ])),
        );
        assert_eq!(formula.evaluate(&side(20, 0), &side(0, 15)), 50.0);
    }

    #[test]
    fn division_by_zero_is_zero() {
        let formula = Formula::Div(Box::new(Formula::Constant(10.0)), Box::new(Formula::Zero));
        assert_eq!(formula.evaluate(&side(1, 1), &side(1, 1)), 0.0);
    }

    #[test]
    fn min_max_and_level() {
        let a = side(10, 0);
        let b = side(0, 0);
        let formula = Formula::Max(vec![Formula::Subject(Operand::Level), Formula::Constant(3.0)]);
        assert_eq!(formula.evaluate(&a, &b), 5.0);
        let formula = Formula::Min(vec![Formula::Subject(Operand::Level), Formula::Constant(3.0)]);
        assert_eq!(formula.evaluate(&a, &b), 3.0);
    }
}
