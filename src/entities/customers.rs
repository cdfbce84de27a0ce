use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Loyalty card identifier, `LC` followed by 7 zero-padded digits.
    #[sea_orm(unique)]
    pub barcode: String,

    pub name: String,

    pub email: Option<String>,

    pub phone: Option<String>,

    pub address: Option<String>,

    pub birthdate: Option<String>,

    /// Derived aggregate: registration bonus plus the sum of earned points.
    /// Mutated only through storage-level increments.
    pub points_balance: i64,

    /// Derived aggregate: sum of net purchase amounts.
    pub total_spent: f64,

    /// Owning store, null for unaffiliated customers.
    pub store_owner_id: Option<i32>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::store_owners::Entity",
        from = "Column::StoreOwnerId",
        to = "super::store_owners::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    StoreOwners,

    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,

    #[sea_orm(has_many = "super::discounts::Entity")]
    Discounts,
}

impl Related<super::store_owners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreOwners.def()
    }
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::discounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Discounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
