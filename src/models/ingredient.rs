use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes_ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ingredient_value::Entity")]
    IngredientValue,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        super::ingredient_value::Relation::Recipe.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::ingredient_value::Relation::Ingredient.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
