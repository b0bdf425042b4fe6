#![allow(async_fn_in_trait)]

use crate::domain::sort::SortSpec;
use crate::domain::types::{
    NewProduct, NewRole, NewUser, Product, ProductChanges, ProductFilter, Role, RoleChanges,
    RoleFilter, User, UserChanges, UserFilter,
};
use crate::error::AppError;

/// One partial update in a bulk batch. Entries without an id are skipped.
#[derive(Debug, Clone)]
pub struct BulkUpdate<U> {
    pub id: Option<i32>,
    pub changes: U,
}

/// Uniform data-access contract over one entity type with an integer
/// primary key. Implemented once per entity by the SeaORM layer.
pub trait Repository: Send + Sync {
    type Entity;
    type Create;
    type Update;
    type Filter;

    /// Row by primary key. Absence is `Ok(None)`, never an error.
    async fn get_by_id(&self, id: i32) -> Result<Option<Self::Entity>, AppError>;

    /// At most one row matching every set filter field exactly. More than
    /// one match is [`AppError::Ambiguous`], never silently resolved.
    async fn get_by_filter(
        &self,
        filter: &Self::Filter,
    ) -> Result<Option<Self::Entity>, AppError>;

    /// All rows matching the filter (all rows when `None`), unordered.
    async fn list(&self, filter: Option<&Self::Filter>) -> Result<Vec<Self::Entity>, AppError>;

    /// Persist a new row and return it with generated id and timestamps.
    /// A unique-column violation is [`AppError::AlreadyExists`].
    async fn create(&self, fields: Self::Create) -> Result<Self::Entity, AppError>;

    /// Batch insert inside one transaction: all rows land or none do.
    async fn create_many(
        &self,
        fields: Vec<Self::Create>,
    ) -> Result<Vec<Self::Entity>, AppError>;

    /// Apply only the provided fields; returns the refreshed row, `None`
    /// when no row has this id.
    async fn update(
        &self,
        id: i32,
        changes: Self::Update,
    ) -> Result<Option<Self::Entity>, AppError>;

    /// Rows removed (0 or 1). Deleting a missing id is not an error.
    async fn delete(&self, id: i32) -> Result<u64, AppError>;

    /// Number of rows matching the filter (all rows when `None`).
    async fn count(&self, filter: Option<&Self::Filter>) -> Result<u64, AppError>;

    /// Best-effort batch of partial updates: entries without an id are
    /// skipped and failed entries do not roll back earlier ones. Returns
    /// total rows affected.
    async fn bulk_update(&self, entries: Vec<BulkUpdate<Self::Update>>) -> Result<u64, AppError>;
}

/// User-specific lookups layered over the generic contract.
pub trait UserLookup: Send + Sync {
    /// Filtered, optionally sorted listing. Name fields match as
    /// case-insensitive substrings; id/email/phone match exactly. A sort
    /// field outside the allowlist leaves the result unsorted.
    async fn find_all(
        &self,
        filter: &UserFilter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<User>, AppError>;

    /// Registration fast path: [`AppError::AlreadyExists`] when either
    /// value is already taken. The store's unique constraints stay the
    /// authoritative guard against concurrent registrations.
    async fn check_unique(&self, phone: &str, email: &str) -> Result<(), AppError>;
}

/// The full user data-access surface.
pub trait UserRepository:
    Repository<Entity = User, Create = NewUser, Update = UserChanges, Filter = UserFilter> + UserLookup
{
}

impl<T> UserRepository for T where
    T: Repository<Entity = User, Create = NewUser, Update = UserChanges, Filter = UserFilter>
        + UserLookup
{
}

pub trait RoleRepository:
    Repository<Entity = Role, Create = NewRole, Update = RoleChanges, Filter = RoleFilter>
{
}

impl<T> RoleRepository for T where
    T: Repository<Entity = Role, Create = NewRole, Update = RoleChanges, Filter = RoleFilter>
{
}

pub trait ProductRepository:
    Repository<Entity = Product, Create = NewProduct, Update = ProductChanges, Filter = ProductFilter>
{
}

impl<T> ProductRepository for T where
    T: Repository<Entity = Product, Create = NewProduct, Update = ProductChanges, Filter = ProductFilter>
{
}
