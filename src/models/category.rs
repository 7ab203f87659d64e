use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    // Auto-référence pour former un arbre de catégories.
    // Aucune détection de cycle: la hiérarchie n'est pas vérifiée.
    pub parent_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::category_value::Entity")]
    CategoryValue,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        super::category_value::Relation::Recipe.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::category_value::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
