use async_trait::async_trait;
use sea_orm::{ActiveValue, DatabaseConnection, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use seacrud::{MergeIntoActiveModel, RecordResource, Related, ServiceError};

use super::agency_entity::{self, Agency};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum HeroType {
    #[sea_orm(num_value = 0)]
    Student,
    #[sea_orm(num_value = 1)]
    Teacher,
    #[sea_orm(num_value = 2)]
    ProHero,
    #[sea_orm(num_value = 3)]
    Villain,
    #[sea_orm(num_value = 4)]
    Vigilante,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "heroes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub nickname: Option<String>,
    pub individuality: Option<String>,
    pub age: Option<i32>,
    pub hero_type: HeroType,
    pub agency_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::agency_entity::Entity",
        from = "Column::AgencyId",
        to = "super::agency_entity::Column::Id"
    )]
    Agency,
}

impl ActiveModelBehavior for ActiveModel {}

impl sea_orm::Related<agency_entity::Entity> for Entity {
    fn to() -> sea_orm::RelationDef {
        Relation::Agency.def()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hero {
    pub id: Uuid,
    pub name: String,
    pub nickname: Option<String>,
    pub individuality: Option<String>,
    pub age: Option<i32>,
    pub hero_type: HeroType,
    pub agency_id: Option<Uuid>,
    #[serde(default)]
    pub agency: Related<Agency>,
}

impl From<Model> for Hero {
    fn from(model: Model) -> Self {
        Hero {
            id: model.id,
            name: model.name,
            nickname: model.nickname,
            individuality: model.individuality,
            age: model.age,
            hero_type: model.hero_type,
            agency_id: model.agency_id,
            agency: Related::NotLoaded,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HeroCreate {
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub individuality: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub hero_type: Option<HeroType>,
    #[serde(default)]
    pub agency_id: Option<Uuid>,
}

impl From<HeroCreate> for ActiveModel {
    fn from(create: HeroCreate) -> Self {
        ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(create.name),
            nickname: ActiveValue::Set(create.nickname),
            individuality: ActiveValue::Set(create.individuality),
            age: ActiveValue::Set(create.age),
            hero_type: ActiveValue::Set(create.hero_type.unwrap_or(HeroType::Student)),
            agency_id: ActiveValue::Set(create.agency_id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct HeroUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "seacrud::serde_with::rust::double_option"
    )]
    pub name: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "seacrud::serde_with::rust::double_option"
    )]
    pub nickname: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "seacrud::serde_with::rust::double_option"
    )]
    pub individuality: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "seacrud::serde_with::rust::double_option"
    )]
    pub age: Option<Option<i32>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "seacrud::serde_with::rust::double_option"
    )]
    pub hero_type: Option<Option<HeroType>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "seacrud::serde_with::rust::double_option"
    )]
    pub agency_id: Option<Option<Uuid>>,
}

impl MergeIntoActiveModel<ActiveModel> for HeroUpdate {
    fn merge_into_activemodel(self, mut model: ActiveModel) -> Result<ActiveModel, ServiceError> {
        model.name = match self.name {
            Some(Some(value)) => ActiveValue::Set(value),
            Some(None) => {
                return Err(ServiceError::validation(
                    "Field 'name' is required and cannot be set to null",
                ));
            }
            None => ActiveValue::NotSet,
        };
        model.nickname = match self.nickname {
            Some(Some(value)) => ActiveValue::Set(Some(value)),
            Some(None) => ActiveValue::Set(None),
            None => ActiveValue::NotSet,
        };
        model.individuality = match self.individuality {
            Some(Some(value)) => ActiveValue::Set(Some(value)),
            Some(None) => ActiveValue::Set(None),
            None => ActiveValue::NotSet,
        };
        model.age = match self.age {
            Some(Some(value)) => ActiveValue::Set(Some(value)),
            Some(None) => ActiveValue::Set(None),
            None => ActiveValue::NotSet,
        };
        model.hero_type = match self.hero_type {
            Some(Some(value)) => ActiveValue::Set(value),
            Some(None) => {
                return Err(ServiceError::validation(
                    "Field 'hero_type' is required and cannot be set to null",
                ));
            }
            None => ActiveValue::NotSet,
        };
        model.agency_id = match self.agency_id {
            Some(Some(value)) => ActiveValue::Set(Some(value)),
            Some(None) => ActiveValue::Set(None),
            None => ActiveValue::NotSet,
        };
        Ok(model)
    }
}

#[async_trait]
impl RecordResource for Hero {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = HeroCreate;
    type UpdateModel = HeroUpdate;

    const RESOURCE_NAME_SINGULAR: &'static str = "hero";
    const RESOURCE_NAME_PLURAL: &'static str = "heroes";

    fn record_id(&self) -> Uuid {
        self.id
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("nickname", Column::Nickname),
            ("age", Column::Age),
            ("hero_type", Column::HeroType),
            ("agency_id", Column::AgencyId),
        ]
    }

    fn relation_names() -> &'static [&'static str] {
        &["agency"]
    }

    async fn load_relation(
        db: &DatabaseConnection,
        records: &mut [Self],
        relation: &str,
    ) -> Result<(), ServiceError> {
        match relation {
            "agency" => {
                let wanted: Vec<Uuid> = records.iter().filter_map(|hero| hero.agency_id).collect();
                if wanted.is_empty() {
                    return Ok(());
                }
                let agencies = agency_entity::Entity::find()
                    .filter(agency_entity::Column::Id.is_in(wanted))
                    .all(db)
                    .await?;
                let by_id: HashMap<Uuid, Agency> = agencies
                    .into_iter()
                    .map(|model| (model.id, Agency::from(model)))
                    .collect();
                for hero in records.iter_mut() {
                    if let Some(agency) = hero.agency_id.and_then(|id| by_id.get(&id)) {
                        hero.agency.set(agency.clone());
                    }
                }
                Ok(())
            }
            other => Err(ServiceError::validation(format!(
                "unknown relation '{other}' for hero"
            ))),
        }
    }
}
