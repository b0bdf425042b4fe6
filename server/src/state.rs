use sea_orm::DatabaseConnection;

use crate::infra::db::{DbProductRepository, DbRoleRepository, DbUserRepository};
use crate::usecase::token::TokenService;

/// Shared application state passed to every handler via axum `State`.
///
/// The connection pool lives here and nowhere else: constructed at
/// startup, injected into handlers, closed on shutdown.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenService,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn role_repo(&self) -> DbRoleRepository {
        DbRoleRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }
}
