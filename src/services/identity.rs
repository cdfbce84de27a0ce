//! Maps barcodes to customer identities, creating them when needed.
//!
//! Resolution is a pure decision (`Found` / `NotFound`); registration relies
//! on the barcode unique constraint rather than a read-then-write pre-check,
//! regenerating on collision.

use tracing::{info, warn};

use crate::barcode;
use crate::constants::{REGISTRATION_BONUS_POINTS, limits};
use crate::db::{CustomerProfile, Store};
use crate::entities::customers;
use crate::services::error::{LedgerError, is_unique_violation};

#[derive(Clone)]
pub struct IdentityService {
    store: Store,
}

impl IdentityService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolve a barcode to a customer. When `scope` is given, only a
    /// customer owned by that store owner resolves; any other match is
    /// reported as not found.
    pub async fn resolve_by_barcode(
        &self,
        barcode: &str,
        scope: Option<i32>,
    ) -> Result<customers::Model, LedgerError> {
        self.store
            .get_customer_by_barcode(barcode, scope)
            .await?
            .ok_or(LedgerError::CustomerNotFound)
    }

    /// Register a customer under a caller-supplied barcode. The registration
    /// bonus is granted and a deterministic display name derived from the
    /// barcode is used when the profile carries none.
    pub async fn register_new(
        &self,
        barcode: &str,
        profile: &CustomerProfile,
        store_owner_id: Option<i32>,
    ) -> Result<customers::Model, LedgerError> {
        if !barcode::is_valid(barcode) {
            return Err(LedgerError::Validation(format!(
                "Barcode '{barcode}' is not of the form {}{}",
                barcode::BARCODE_PREFIX,
                "0".repeat(barcode::BARCODE_DIGITS)
            )));
        }

        match self
            .store
            .insert_customer(barcode, profile, store_owner_id, REGISTRATION_BONUS_POINTS)
            .await
        {
            Ok(customer) => {
                info!("Registered customer {} ({})", customer.id, customer.barcode);
                Ok(customer)
            }
            Err(err) if is_unique_violation(&err) => Err(LedgerError::DuplicateBarcode),
            Err(err) => Err(err.into()),
        }
    }

    /// Register a customer with a freshly generated barcode, regenerating on
    /// collision a bounded number of times. The unique constraint is the
    /// arbiter; a pre-check lookup would race with concurrent registrations.
    pub async fn register_with_generated_barcode(
        &self,
        profile: &CustomerProfile,
        store_owner_id: Option<i32>,
    ) -> Result<customers::Model, LedgerError> {
        for attempt in 0..limits::MAX_BARCODE_ATTEMPTS {
            let candidate = barcode::generate();

            match self
                .store
                .insert_customer(
                    &candidate,
                    profile,
                    store_owner_id,
                    REGISTRATION_BONUS_POINTS,
                )
                .await
            {
                Ok(customer) => {
                    info!("Registered customer {} ({})", customer.id, customer.barcode);
                    return Ok(customer);
                }
                Err(err) if is_unique_violation(&err) => {
                    warn!(
                        "Barcode collision on {} (attempt {}), regenerating",
                        candidate,
                        attempt + 1
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(LedgerError::Validation(
            "Could not generate a unique barcode".to_string(),
        ))
    }
}
