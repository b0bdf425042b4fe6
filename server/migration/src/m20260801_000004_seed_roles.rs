use sea_orm_migration::prelude::*;

use crate::m20260801_000001_create_roles::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let insert = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::Id, Roles::Name])
            .values_panic([1.into(), "unregistered".into()])
            .values_panic([2.into(), "admin".into()])
            .to_owned();
        manager.exec_stmt(insert).await?;

        // Seeding with explicit ids leaves the serial sequence behind.
        manager
            .get_connection()
            .execute_unprepared(
                "SELECT setval(pg_get_serial_sequence('roles', 'id'), (SELECT MAX(id) FROM roles))",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Roles::Table)
            .cond_where(Expr::col(Roles::Id).is_in([1, 2]))
            .to_owned();
        manager.exec_stmt(delete).await?;
        Ok(())
    }
}
