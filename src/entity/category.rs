use sea_orm::entity::prelude::*;

#[derive(Debug, PartialEq, Eq, Clone, DeriveEntityModel)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique, indexed)]
    pub slug: String,
    /// Server-relative path under `/uploads/icons`
    pub icon: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item_category::Entity")]
    ItemCategory,
}

impl Related<super::item_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
