//! The ledger engine: purchase recording and balance maintenance.
//!
//! Every purchase runs inside one database transaction covering the purchase
//! row, the balance increments, and the discount consumption. Balances are
//! mutated with storage-level `col = col + delta` expressions so concurrent
//! purchases for the same customer never lose updates, and discount
//! consumption is a compare-and-swap on `is_used`.

use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{info, warn};

use crate::constants::{CURRENCY_UNITS_PER_POINT, limits};
use crate::db::Store;
use crate::entities::{customers, discounts, prelude::*, purchases};
use crate::services::error::LedgerError;

/// Points earned for a net amount: 1 point per 2 currency units, rounded to
/// the nearest point. Rust's `f64::round` rounds half away from zero, which
/// for the non-negative amounts here is round-half-up.
#[must_use]
pub fn points_for_amount(net_amount: f64) -> i64 {
    (net_amount / CURRENCY_UNITS_PER_POINT).round() as i64
}

#[derive(Clone)]
pub struct LedgerService {
    store: Store,
}

impl LedgerService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Record a purchase, optionally consuming a discount. All-or-nothing:
    /// on any failure no purchase row, balance change, or discount
    /// consumption persists. Transient storage failures are retried a
    /// bounded number of times.
    pub async fn record_purchase(
        &self,
        customer_id: i32,
        gross_amount: f64,
        discount_id: Option<i32>,
    ) -> Result<purchases::Model, LedgerError> {
        if !gross_amount.is_finite() || gross_amount < 0.0 {
            return Err(LedgerError::Validation(
                "Purchase amount must be a non-negative number".to_string(),
            ));
        }

        let mut attempt = 0;
        loop {
            match self
                .record_purchase_once(customer_id, gross_amount, discount_id)
                .await
            {
                Err(err) if err.is_transient() && attempt + 1 < limits::MAX_STORAGE_RETRIES => {
                    attempt += 1;
                    warn!(
                        "Transient storage failure recording purchase for customer {} \
                         (attempt {}), retrying",
                        customer_id, attempt
                    );
                }
                other => return other,
            }
        }
    }

    async fn record_purchase_once(
        &self,
        customer_id: i32,
        gross_amount: f64,
        discount_id: Option<i32>,
    ) -> Result<purchases::Model, LedgerError> {
        let purchase = self
            .store
            .conn
            .transaction::<_, purchases::Model, LedgerError>(move |txn| {
                Box::pin(async move {
                    // Validate the discount inside the transaction so a
                    // concurrent consumer cannot slip between check and use.
                    let discount = match discount_id {
                        Some(id) => {
                            let discount = Discounts::find_by_id(id)
                                .one(txn)
                                .await?
                                .ok_or(LedgerError::DiscountNotFound)?;

                            if discount.customer_id != customer_id {
                                return Err(LedgerError::DiscountWrongCustomer);
                            }
                            if discount.is_used {
                                return Err(LedgerError::DiscountAlreadyUsed);
                            }
                            if discount.expiry_date < chrono::Utc::now().to_rfc3339() {
                                return Err(LedgerError::DiscountExpired);
                            }

                            Some(discount)
                        }
                        None => None,
                    };

                    let discount_amount = discount.as_ref().map(|d| d.amount);
                    let net_amount = discount_amount
                        .map_or(gross_amount, |d| (gross_amount - d).max(0.0));
                    let points_earned = points_for_amount(net_amount);

                    // Atomic read-modify-write evaluated by the storage layer,
                    // never against values cached in application memory. This
                    // runs before the purchase insert: zero matched rows is
                    // the missing-customer signal, ahead of the foreign key.
                    let updated = Customers::update_many()
                        .col_expr(
                            customers::Column::PointsBalance,
                            Expr::col(customers::Column::PointsBalance).add(points_earned),
                        )
                        .col_expr(
                            customers::Column::TotalSpent,
                            Expr::col(customers::Column::TotalSpent).add(net_amount),
                        )
                        .filter(customers::Column::Id.eq(customer_id))
                        .exec(txn)
                        .await?;

                    if updated.rows_affected == 0 {
                        return Err(LedgerError::CustomerNotFound);
                    }

                    let purchase = purchases::ActiveModel {
                        customer_id: Set(customer_id),
                        amount: Set(net_amount),
                        points_earned: Set(points_earned),
                        discount_applied: Set(discount_amount),
                        created_at: Set(chrono::Utc::now().to_rfc3339()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    if let Some(discount) = &discount {
                        // Compare-and-swap: losing a race to another purchase
                        // means zero rows and the whole transaction unwinds.
                        let consumed = Discounts::update_many()
                            .col_expr(discounts::Column::IsUsed, Expr::value(true))
                            .filter(discounts::Column::Id.eq(discount.id))
                            .filter(discounts::Column::IsUsed.eq(false))
                            .exec(txn)
                            .await?;

                        if consumed.rows_affected == 0 {
                            return Err(LedgerError::DiscountAlreadyUsed);
                        }
                    }

                    Ok(purchase)
                })
            })
            .await
            .map_err(LedgerError::from)?;

        info!(
            "Recorded purchase {} for customer {}: amount {:.2}, {} points",
            purchase.id, purchase.customer_id, purchase.amount, purchase.points_earned
        );

        Ok(purchase)
    }

    /// Manual point adjustment by staff. Uses the same storage-level
    /// increment as purchases; an adjustment that would drive the balance
    /// negative matches zero rows and is rejected.
    pub async fn adjust_points(
        &self,
        customer_id: i32,
        delta: i64,
    ) -> Result<customers::Model, LedgerError> {
        let updated = Customers::update_many()
            .col_expr(
                customers::Column::PointsBalance,
                Expr::col(customers::Column::PointsBalance).add(delta),
            )
            .filter(customers::Column::Id.eq(customer_id))
            .filter(Expr::col(customers::Column::PointsBalance).add(delta).gte(0))
            .exec(&self.store.conn)
            .await?;

        if updated.rows_affected == 0 {
            // Either no such customer or the balance would go negative.
            return match self.store.get_customer(customer_id).await? {
                Some(_) => Err(LedgerError::Validation(
                    "Adjustment would make the points balance negative".to_string(),
                )),
                None => Err(LedgerError::CustomerNotFound),
            };
        }

        info!(
            "Adjusted points for customer {} by {}",
            customer_id, delta
        );

        self.store
            .get_customer(customer_id)
            .await?
            .ok_or(LedgerError::CustomerNotFound)
    }
}
