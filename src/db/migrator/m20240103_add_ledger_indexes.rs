use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_customers_store_owner")
                    .table(Customers)
                    .col(crate::entities::customers::Column::StoreOwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_purchases_customer")
                    .table(Purchases)
                    .col(crate::entities::purchases::Column::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_discounts_customer")
                    .table(Discounts)
                    .col(crate::entities::discounts::Column::CustomerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_discounts_customer").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_purchases_customer").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_customers_store_owner").to_owned())
            .await?;

        Ok(())
    }
}
