//! Toll rating and record reconciliation rules

mod rates;
mod reconcile;

pub use rates::*;
pub use reconcile::*;
