use sea_orm::entity::prelude::*;

#[derive(Debug, PartialEq, Eq, Clone, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub unit: String,
    #[sea_orm(indexed)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item_image::Entity")]
    Image,
    #[sea_orm(has_many = "super::item_category::Entity")]
    ItemCategory,
    #[sea_orm(has_many = "super::item_price::Entity")]
    Price,
}

impl Related<super::item_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Image.def()
    }
}

impl Related<super::item_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemCategory.def()
    }
}

impl Related<super::item_price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Price.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
