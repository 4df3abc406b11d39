use axum::Router;
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;

use seacrud::RecordService;

pub mod hero_entity;

use agency_entity::Agency;
use hero_entity::Hero;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub fn setup_app(db: DatabaseConnection) -> Router {
    let heroes = RecordService::<Hero>::new(db.clone()).expect("hero key resolution");
    let agencies = RecordService::<Agency>::new(db).expect("agency key resolution");

    let api = seacrud::routes::router(heroes).merge(seacrud::routes::router(agencies));

    Router::new().nest("/api/v1", api)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateAgencyTable), Box::new(CreateHeroTable)]
    }
}

pub struct CreateAgencyTable;

#[async_trait::async_trait]
impl MigrationName for CreateAgencyTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_agency_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateAgencyTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(AgencyTable)
            .if_not_exists()
            .col(
                ColumnDef::new(AgencyColumn::Id)
                    .uuid()
                    .not_null()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(AgencyColumn::Name)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AgencyTable).to_owned())
            .await?;
        Ok(())
    }
}

pub struct CreateHeroTable;

#[async_trait::async_trait]
impl MigrationName for CreateHeroTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_hero_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateHeroTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(HeroTable)
            .if_not_exists()
            .col(
                ColumnDef::new(HeroColumn::Id)
                    .uuid()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(HeroColumn::Name).string().not_null())
            .col(ColumnDef::new(HeroColumn::Nickname).string().null())
            .col(ColumnDef::new(HeroColumn::Individuality).string().null())
            .col(ColumnDef::new(HeroColumn::Age).integer().null())
            .col(
                ColumnDef::new(HeroColumn::HeroType)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(ColumnDef::new(HeroColumn::AgencyId).uuid().null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HeroTable).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum AgencyColumn {
    Id,
    Name,
}

impl Iden for AgencyColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Name => "name",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct AgencyTable;

impl Iden for AgencyTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "agencies").unwrap();
    }
}

#[derive(Debug)]
pub enum HeroColumn {
    Id,
    Name,
    Nickname,
    Individuality,
    Age,
    HeroType,
    AgencyId,
}

impl Iden for HeroColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::Nickname => "nickname",
                Self::Individuality => "individuality",
                Self::Age => "age",
                Self::HeroType => "hero_type",
                Self::AgencyId => "agency_id",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct HeroTable;

impl Iden for HeroTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "heroes").unwrap();
    }
}
