//! Toll rate table

use autotoll_types::VehicleType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flat fee charged when even the Unknown rate has been removed from the table
pub const PENALTY_RATE: f64 = 10.00;

/// Editable per-vehicle-type toll rates.
///
/// Lookups never fail: a type missing from the table falls back to the
/// Unknown rate, and a missing Unknown rate falls back to [`PENALTY_RATE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TollTable {
    rates: HashMap<VehicleType, f64>,
}

impl Default for TollTable {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(VehicleType::Car, 5.00);
        rates.insert(VehicleType::Truck, 12.50);
        rates.insert(VehicleType::Bus, 8.00);
        rates.insert(VehicleType::Van, 6.00);
        rates.insert(VehicleType::Motorcycle, 2.50);
        rates.insert(VehicleType::Unknown, 10.00);
        TollTable { rates }
    }
}

impl TollTable {
    /// Rate for a vehicle type, falling back to Unknown then the penalty rate
    pub fn rate(&self, vehicle_type: VehicleType) -> f64 {
        self.rates
            .get(&vehicle_type)
            .or_else(|| self.rates.get(&VehicleType::Unknown))
            .copied()
            .unwrap_or(PENALTY_RATE)
    }

    pub fn set(&mut self, vehicle_type: VehicleType, amount: f64) {
        self.rates.insert(vehicle_type, amount);
    }

    /// Restore the factory defaults
    pub fn reset(&mut self) {
        *self = TollTable::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleType, f64)> + '_ {
        VehicleType::ALL.iter().map(|&t| (t, self.rate(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rates_match_schedule() {
        let table = TollTable::default();
        assert_eq!(table.rate(VehicleType::Car), 5.00);
        assert_eq!(table.rate(VehicleType::Truck), 12.50);
        assert_eq!(table.rate(VehicleType::Bus), 8.00);
        assert_eq!(table.rate(VehicleType::Van), 6.00);
        assert_eq!(table.rate(VehicleType::Motorcycle), 2.50);
        assert_eq!(table.rate(VehicleType::Unknown), 10.00);
    }

    #[test]
    fn missing_type_falls_back_to_unknown_rate() {
        let mut table = TollTable::default();
        table.rates.remove(&VehicleType::Bus);
        table.set(VehicleType::Unknown, 20.0);
        assert_eq!(table.rate(VehicleType::Bus), 20.0);
    }

    #[test]
    fn empty_table_charges_penalty_rate() {
        let table = TollTable {
            rates: HashMap::new(),
        };
        assert_eq!(table.rate(VehicleType::Car), PENALTY_RATE);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut table = TollTable::default();
        table.set(VehicleType::Car, 99.0);
        table.reset();
        assert_eq!(table.rate(VehicleType::Car), 5.00);
    }
}
