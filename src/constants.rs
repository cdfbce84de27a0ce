/// Points granted on first registration of a barcode.
pub const REGISTRATION_BONUS_POINTS: i64 = 10;

/// One point per this many currency units, rounded to the nearest point.
pub const CURRENCY_UNITS_PER_POINT: f64 = 2.0;

pub mod limits {

    /// Bounded retries for transient storage failures before surfacing
    /// `StorageUnavailable`. Never retried on domain errors.
    pub const MAX_STORAGE_RETRIES: u32 = 3;

    /// Bounded regeneration attempts when a freshly generated barcode
    /// collides with an existing one.
    pub const MAX_BARCODE_ATTEMPTS: u32 = 5;
}
