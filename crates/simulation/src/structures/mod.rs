//! Structure ledger: every placed building with simulated economic or
//! occupancy behaviour is an entity carrying a [`Structure`] component.

pub mod kinds;
pub mod ledger;
pub mod payload;

pub use kinds::*;
pub use ledger::{demolish_structure, place_structure, Accrual, Structure};
pub use payload::*;
