//! Time and experience accounting for one attempt.
//!
//! All arithmetic is exact decimal; the literal digits of the map survive
//! every operation. The ledger records, it does not judge: a spend may drive
//! the balance negative, and noticing that is the state machine's job.

use rust_decimal::Decimal;

use crate::consts::STARTING_TIME;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    remaining_time: Decimal,
    total_exp: u32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A fresh attempt's books: the full starting budget, no experience.
    pub fn new() -> Self {
        Ledger {
            remaining_time: STARTING_TIME,
            total_exp: 0,
        }
    }

    /// Consumes time and returns the new balance. The balance may go
    /// negative.
    pub fn spend(&mut self, amount: Decimal) -> Decimal {
        self.remaining_time -= amount;
        self.remaining_time
    }

    /// Adds experience and returns the new total. Experience has no cap and
    /// never decreases.
    pub fn credit(&mut self, exp: u32) -> u32 {
        self.total_exp += exp;
        self.total_exp
    }

    pub fn remaining_time(&self) -> Decimal {
        self.remaining_time
    }

    pub fn total_exp(&self) -> u32 {
        self.total_exp
    }

    /// True once the budget has run out. Callers decide what that means.
    pub fn is_flooded(&self) -> bool {
        self.remaining_time <= Decimal::ZERO
    }
}
