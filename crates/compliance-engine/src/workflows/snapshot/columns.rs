pub(crate) const REGISTRATION_NUMBER: &str = "Registration Number";

pub(crate) const CITY: &str = "City";
pub(crate) const PROVINCE: &str = "Province";
pub(crate) const ENTITY_TYPE: &str = "Entity Type";
pub(crate) const OWNERSHIP_TYPE: &str = "Ownership Type";
pub(crate) const OCCUPANCY: &str = "Occupancy Classification";
pub(crate) const BILLING_TYPE: &str = "Billing Type";
pub(crate) const METERING_TYPE: &str = "Metering Type";
pub(crate) const SIZE: &str = "Size";
pub(crate) const FLOORS: &str = "No. of Floors";
pub(crate) const SMART_METERED: &str = "Is Smart Metered?";

pub(crate) const GRID_USAGE: &str = "Grid Usage";
pub(crate) const GAS_USAGE: &str = "Gas Usage";
pub(crate) const LIQUID_FUEL_USAGE: &str = "Liquid Fuel Usage";
pub(crate) const SOLID_FUEL_USAGE: &str = "Solid Fuel Usage";
pub(crate) const RENEWABLE_USAGE: &str = "Renewable Usage";
pub(crate) const OTHER_USAGE: &str = "Other Usage";

pub(crate) const ENERGY_COLUMNS: [&str; 6] = [
    GRID_USAGE,
    GAS_USAGE,
    LIQUID_FUEL_USAGE,
    SOLID_FUEL_USAGE,
    RENEWABLE_USAGE,
    OTHER_USAGE,
];

pub(crate) const REGISTERED_TEXT_COLUMNS: [&str; 7] = [
    CITY,
    PROVINCE,
    ENTITY_TYPE,
    OWNERSHIP_TYPE,
    OCCUPANCY,
    BILLING_TYPE,
    METERING_TYPE,
];

pub(crate) const CERTIFIED_TEXT_COLUMNS: [&str; 5] =
    [CITY, PROVINCE, ENTITY_TYPE, OWNERSHIP_TYPE, OCCUPANCY];
