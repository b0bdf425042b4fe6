use sea_orm_migration::prelude::*;

mod m20260801_000001_create_roles;
mod m20260801_000002_create_users;
mod m20260801_000003_create_products;
mod m20260801_000004_seed_roles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_roles::Migration),
            Box::new(m20260801_000002_create_users::Migration),
            Box::new(m20260801_000003_create_products::Migration),
            Box::new(m20260801_000004_seed_roles::Migration),
        ]
    }
}
