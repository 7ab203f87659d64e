use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub cooking_time: i32, // en minutes
    pub author_id: i32,

    // Concaténation dénormalisée (titre + description sans HTML + noms des
    // catégories/ingrédients, tout en minuscules). Calculée à la création,
    // PAS recalculée à la mise à jour.
    #[serde(skip_serializing)]
    pub searchable_content: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,

    #[sea_orm(has_many = "super::category_value::Entity")]
    CategoryValue,

    #[sea_orm(has_many = "super::ingredient_value::Entity")]
    IngredientValue,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::category_value::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::category_value::Relation::Recipe.def().rev())
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        super::ingredient_value::Relation::Ingredient.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::ingredient_value::Relation::Recipe.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
