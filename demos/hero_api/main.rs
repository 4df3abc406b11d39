//! Hero registry API
//!
//! ```bash
//! cargo run --example hero_api
//! ```
//!
//! Then try:
//! - `GET  http://localhost:3000/heroes`
//! - `GET  http://localhost:3000/heroes?filter={"eq":{"field":"name","value":"Eraserhead"}}`
//! - `GET  http://localhost:3000/heroes/{id}?include=agency`

use async_trait::async_trait;
use sea_orm::{ActiveValue, Database, DatabaseConnection, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use utoipa::ToSchema;

use seacrud::{MergeIntoActiveModel, RecordResource, RecordService, Related, ServiceError};

mod agency {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "agencies")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "Text", unique)]
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::hero::Entity")]
        Hero,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

mod hero {
    use super::*;

    #[derive(
        Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
        ToSchema,
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

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
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
            belongs_to = "super::agency::Entity",
            from = "Column::AgencyId",
            to = "super::agency::Column::Id"
        )]
        Agency,
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl sea_orm::Related<super::agency::Entity> for Entity {
        fn to() -> sea_orm::RelationDef {
            Relation::Agency.def()
        }
    }
}

use hero::HeroType;

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
}

impl From<agency::Model> for Agency {
    fn from(model: agency::Model) -> Self {
        Agency {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AgencyCreate {
    pub name: String,
}

impl From<AgencyCreate> for agency::ActiveModel {
    fn from(create: AgencyCreate) -> Self {
        agency::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(create.name),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AgencyUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "seacrud::serde_with::rust::double_option"
    )]
    pub name: Option<Option<String>>,
}

impl MergeIntoActiveModel<agency::ActiveModel> for AgencyUpdate {
    fn merge_into_activemodel(
        self,
        mut model: agency::ActiveModel,
    ) -> Result<agency::ActiveModel, ServiceError> {
        model.name = match self.name {
            Some(Some(value)) => ActiveValue::Set(value),
            Some(None) => {
                return Err(ServiceError::validation(
                    "Field 'name' is required and cannot be set to null",
                ));
            }
            None => ActiveValue::NotSet,
        };
        Ok(model)
    }
}

#[async_trait]
impl RecordResource for Agency {
    type EntityType = agency::Entity;
    type ColumnType = agency::Column;
    type ActiveModelType = agency::ActiveModel;
    type CreateModel = AgencyCreate;
    type UpdateModel = AgencyUpdate;

    const RESOURCE_NAME_SINGULAR: &'static str = "agency";
    const RESOURCE_NAME_PLURAL: &'static str = "agencies";

    fn record_id(&self) -> Uuid {
        self.id
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", agency::Column::Id), ("name", agency::Column::Name)]
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

impl From<hero::Model> for Hero {
    fn from(model: hero::Model) -> Self {
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

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
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

impl From<HeroCreate> for hero::ActiveModel {
    fn from(create: HeroCreate) -> Self {
        hero::ActiveModel {
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

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
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

impl MergeIntoActiveModel<hero::ActiveModel> for HeroUpdate {
    fn merge_into_activemodel(
        self,
        mut model: hero::ActiveModel,
    ) -> Result<hero::ActiveModel, ServiceError> {
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
    type EntityType = hero::Entity;
    type ColumnType = hero::Column;
    type ActiveModelType = hero::ActiveModel;
    type CreateModel = HeroCreate;
    type UpdateModel = HeroUpdate;

    const RESOURCE_NAME_SINGULAR: &'static str = "hero";
    const RESOURCE_NAME_PLURAL: &'static str = "heroes";

    fn record_id(&self) -> Uuid {
        self.id
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", hero::Column::Id),
            ("name", hero::Column::Name),
            ("nickname", hero::Column::Nickname),
            ("age", hero::Column::Age),
            ("hero_type", hero::Column::HeroType),
            ("agency_id", hero::Column::AgencyId),
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
                let agencies = agency::Entity::find()
                    .filter(agency::Column::Id.is_in(wanted))
                    .all(db)
                    .await?;
                let by_id: HashMap<Uuid, Agency> = agencies
                    .into_iter()
                    .map(|model| (model.id, Agency::from(model)))
                    .collect();
                for hero in records.iter_mut() {
                    if let Some(found) = hero.agency_id.and_then(|id| by_id.get(&id)) {
                        hero.agency.set(found.clone());
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db: DatabaseConnection = Database::connect(&database_url).await?;

    db.execute(sea_orm::Statement::from_string(
        db.get_database_backend(),
        r"CREATE TABLE IF NOT EXISTS agencies (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE
        );"
        .to_owned(),
    ))
    .await?;
    db.execute(sea_orm::Statement::from_string(
        db.get_database_backend(),
        r"CREATE TABLE IF NOT EXISTS heroes (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            nickname TEXT NULL,
            individuality TEXT NULL,
            age INTEGER NULL,
            hero_type INTEGER NOT NULL DEFAULT 0,
            agency_id TEXT NULL
        );"
        .to_owned(),
    ))
    .await?;

    let heroes = RecordService::<Hero>::new(db.clone())?;
    let agencies = RecordService::<Agency>::new(db)?;

    let app = seacrud::routes::router(heroes).merge(seacrud::routes::router(agencies));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("🚀 API: http://0.0.0.0:3000/heroes");
    axum::serve(listener, app).await?;
    Ok(())
}
