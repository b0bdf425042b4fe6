use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionError,
    TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};

use lavka_schema::{products, roles, users};

use crate::domain::repository::{BulkUpdate, Repository, UserLookup};
use crate::domain::sort::{Direction, SortSpec};
use crate::domain::types::{
    DEFAULT_ROLE_ID, NewProduct, NewRole, NewUser, Product, ProductChanges, ProductFilter, Role,
    RoleChanges, RoleFilter, User, UserChanges, UserFilter,
};
use crate::error::AppError;

/// Store write errors: a unique-column violation is the caller's conflict,
/// everything else is internal.
fn map_write_err(e: DbErr, what: &'static str) -> AppError {
    match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyExists,
        _ => AppError::Internal(anyhow::Error::new(e).context(what)),
    }
}

fn map_txn_err(e: TransactionError<DbErr>, what: &'static str) -> AppError {
    match e {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => {
            map_write_err(e, what)
        }
    }
}

/// Escape LIKE wildcards in a user-supplied fragment and wrap it for a
/// substring match.
fn substring_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

/// Allowlisted sort columns for user listings. Unknown names yield `None`
/// and the listing stays unsorted; that is the documented policy, not an error.
fn user_sort_column(field: &str) -> Option<users::Column> {
    match field {
        "id" => Some(users::Column::Id),
        "phone_number" => Some(users::Column::PhoneNumber),
        "first_name" => Some(users::Column::FirstName),
        "last_name" => Some(users::Column::LastName),
        "email" => Some(users::Column::Email),
        "role_id" => Some(users::Column::RoleId),
        "created_at" => Some(users::Column::CreatedAt),
        "updated_at" => Some(users::Column::UpdatedAt),
        _ => None,
    }
}

/// Exact-equality filter, as the generic repository contract requires.
fn filter_users_exact(query: Select<users::Entity>, filter: &UserFilter) -> Select<users::Entity> {
    let mut query = query;
    if let Some(id) = filter.id {
        query = query.filter(users::Column::Id.eq(id));
    }
    if let Some(v) = &filter.first_name {
        query = query.filter(users::Column::FirstName.eq(v.clone()));
    }
    if let Some(v) = &filter.last_name {
        query = query.filter(users::Column::LastName.eq(v.clone()));
    }
    if let Some(v) = &filter.email {
        query = query.filter(users::Column::Email.eq(v.clone()));
    }
    if let Some(v) = &filter.phone {
        query = query.filter(users::Column::PhoneNumber.eq(v.clone()));
    }
    query
}

fn user_active_model(fields: NewUser) -> users::ActiveModel {
    users::ActiveModel {
        phone_number: Set(fields.phone_number),
        first_name: Set(fields.first_name),
        last_name: Set(fields.last_name),
        email: Set(fields.email),
        password: Set(fields.password_hash),
        role_id: Set(fields.role_id.unwrap_or(DEFAULT_ROLE_ID)),
        ..Default::default()
    }
}

fn user_from_models(user: users::Model, role: Option<roles::Model>) -> Result<User, AppError> {
    let role = role
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user {} has no role row", user.id)))?;
    Ok(User {
        id: user.id,
        phone_number: user.phone_number,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        password_hash: user.password,
        role: Role {
            id: role.id,
            name: role.name,
        },
        created_at: user.created_at,
        updated_at: user.updated_at,
    })
}

impl DbUserRepository {
    async fn fetch_created(&self, id: i32) -> Result<User, AppError> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("inserted user {id} disappeared")))
    }
}

impl Repository for DbUserRepository {
    type Entity = User;
    type Create = NewUser;
    type Update = UserChanges;
    type Filter = UserFilter;

    async fn get_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let row = users::Entity::find_by_id(id)
            .find_also_related(roles::Entity)
            .one(&self.db)
            .await
            .context("get user by id")?;
        row.map(|(user, role)| user_from_models(user, role))
            .transpose()
    }

    async fn get_by_filter(&self, filter: &UserFilter) -> Result<Option<User>, AppError> {
        let mut rows = filter_users_exact(users::Entity::find(), filter)
            .find_also_related(roles::Entity)
            .limit(2)
            .all(&self.db)
            .await
            .context("get user by filter")?;
        if rows.len() > 1 {
            return Err(AppError::Ambiguous);
        }
        rows.pop()
            .map(|(user, role)| user_from_models(user, role))
            .transpose()
    }

    async fn list(&self, filter: Option<&UserFilter>) -> Result<Vec<User>, AppError> {
        let mut query = users::Entity::find();
        if let Some(filter) = filter {
            query = filter_users_exact(query, filter);
        }
        let rows = query
            .find_also_related(roles::Entity)
            .all(&self.db)
            .await
            .context("list users")?;
        rows.into_iter()
            .map(|(user, role)| user_from_models(user, role))
            .collect()
    }

    async fn create(&self, fields: NewUser) -> Result<User, AppError> {
        let model = user_active_model(fields)
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err(e, "create user"))?;
        self.fetch_created(model.id).await
    }

    async fn create_many(&self, fields: Vec<NewUser>) -> Result<Vec<User>, AppError> {
        let models = self
            .db
            .transaction::<_, Vec<users::Model>, DbErr>(|txn| {
                Box::pin(async move {
                    let mut inserted = Vec::with_capacity(fields.len());
                    for fields in fields {
                        inserted.push(user_active_model(fields).insert(txn).await?);
                    }
                    Ok(inserted)
                })
            })
            .await
            .map_err(|e| map_txn_err(e, "create many users"))?;

        let mut created = Vec::with_capacity(models.len());
        for model in models {
            created.push(self.fetch_created(model.id).await?);
        }
        Ok(created)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(email) = changes.email {
            am.email = Set(email);
        }
        if let Some(phone) = changes.phone_number {
            am.phone_number = Set(phone);
        }
        if let Some(first_name) = changes.first_name {
            am.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            am.last_name = Set(last_name);
        }
        if let Some(role_id) = changes.role_id {
            am.role_id = Set(role_id);
        }
        am.updated_at = Set(Utc::now());
        match am.update(&self.db).await {
            Ok(_) => self.get_by_id(id).await,
            Err(DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(map_write_err(e, "update user")),
        }
    }

    async fn delete(&self, id: i32) -> Result<u64, AppError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected)
    }

    async fn count(&self, filter: Option<&UserFilter>) -> Result<u64, AppError> {
        let mut query = users::Entity::find();
        if let Some(filter) = filter {
            query = filter_users_exact(query, filter);
        }
        let count = query.count(&self.db).await.context("count users")?;
        Ok(count)
    }

    async fn bulk_update(&self, entries: Vec<BulkUpdate<UserChanges>>) -> Result<u64, AppError> {
        let mut affected = 0;
        for entry in entries {
            let Some(id) = entry.id else { continue };
            let mut query = users::Entity::update_many().filter(users::Column::Id.eq(id));
            if let Some(email) = entry.changes.email {
                query = query.col_expr(users::Column::Email, Expr::value(email));
            }
            if let Some(phone) = entry.changes.phone_number {
                query = query.col_expr(users::Column::PhoneNumber, Expr::value(phone));
            }
            if let Some(first_name) = entry.changes.first_name {
                query = query.col_expr(users::Column::FirstName, Expr::value(first_name));
            }
            if let Some(last_name) = entry.changes.last_name {
                query = query.col_expr(users::Column::LastName, Expr::value(last_name));
            }
            if let Some(role_id) = entry.changes.role_id {
                query = query.col_expr(users::Column::RoleId, Expr::value(role_id));
            }
            query = query.col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()));
            let result = query
                .exec(&self.db)
                .await
                .map_err(|e| map_write_err(e, "bulk update users"))?;
            affected += result.rows_affected;
        }
        Ok(affected)
    }
}

impl UserLookup for DbUserRepository {
    async fn find_all(
        &self,
        filter: &UserFilter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<User>, AppError> {
        let mut query = users::Entity::find();
        if let Some(id) = filter.id {
            query = query.filter(users::Column::Id.eq(id));
        }
        if let Some(fragment) = &filter.first_name {
            query = query.filter(
                Expr::col((users::Entity, users::Column::FirstName))
                    .ilike(substring_pattern(fragment)),
            );
        }
        if let Some(fragment) = &filter.last_name {
            query = query.filter(
                Expr::col((users::Entity, users::Column::LastName))
                    .ilike(substring_pattern(fragment)),
            );
        }
        if let Some(email) = &filter.email {
            query = query.filter(users::Column::Email.eq(email.clone()));
        }
        if let Some(phone) = &filter.phone {
            query = query.filter(users::Column::PhoneNumber.eq(phone.clone()));
        }
        if let Some(spec) = sort {
            if let Some(column) = user_sort_column(&spec.field) {
                query = match spec.direction {
                    Direction::Asc => query.order_by_asc(column),
                    Direction::Desc => query.order_by_desc(column),
                };
            }
        }
        let rows = query
            .find_also_related(roles::Entity)
            .all(&self.db)
            .await
            .context("find all users")?;
        rows.into_iter()
            .map(|(user, role)| user_from_models(user, role))
            .collect()
    }

    async fn check_unique(&self, phone: &str, email: &str) -> Result<(), AppError> {
        let taken = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(email))
                    .add(users::Column::PhoneNumber.eq(phone)),
            )
            .one(&self.db)
            .await
            .context("check unique user")?;
        if taken.is_some() {
            return Err(AppError::AlreadyExists);
        }
        Ok(())
    }
}

// ── Role repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

fn filter_roles(query: Select<roles::Entity>, filter: &RoleFilter) -> Select<roles::Entity> {
    let mut query = query;
    if let Some(id) = filter.id {
        query = query.filter(roles::Column::Id.eq(id));
    }
    if let Some(name) = &filter.name {
        query = query.filter(roles::Column::Name.eq(name.clone()));
    }
    query
}

fn role_from_model(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
    }
}

impl Repository for DbRoleRepository {
    type Entity = Role;
    type Create = NewRole;
    type Update = RoleChanges;
    type Filter = RoleFilter;

    async fn get_by_id(&self, id: i32) -> Result<Option<Role>, AppError> {
        let model = roles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("get role by id")?;
        Ok(model.map(role_from_model))
    }

    async fn get_by_filter(&self, filter: &RoleFilter) -> Result<Option<Role>, AppError> {
        let mut rows = filter_roles(roles::Entity::find(), filter)
            .limit(2)
            .all(&self.db)
            .await
            .context("get role by filter")?;
        if rows.len() > 1 {
            return Err(AppError::Ambiguous);
        }
        Ok(rows.pop().map(role_from_model))
    }

    async fn list(&self, filter: Option<&RoleFilter>) -> Result<Vec<Role>, AppError> {
        let mut query = roles::Entity::find();
        if let Some(filter) = filter {
            query = filter_roles(query, filter);
        }
        let models = query.all(&self.db).await.context("list roles")?;
        Ok(models.into_iter().map(role_from_model).collect())
    }

    async fn create(&self, fields: NewRole) -> Result<Role, AppError> {
        let model = roles::ActiveModel {
            name: Set(fields.name),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_write_err(e, "create role"))?;
        Ok(role_from_model(model))
    }

    async fn create_many(&self, fields: Vec<NewRole>) -> Result<Vec<Role>, AppError> {
        let models = self
            .db
            .transaction::<_, Vec<roles::Model>, DbErr>(|txn| {
                Box::pin(async move {
                    let mut inserted = Vec::with_capacity(fields.len());
                    for fields in fields {
                        let model = roles::ActiveModel {
                            name: Set(fields.name),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        inserted.push(model);
                    }
                    Ok(inserted)
                })
            })
            .await
            .map_err(|e| map_txn_err(e, "create many roles"))?;
        Ok(models.into_iter().map(role_from_model).collect())
    }

    async fn update(&self, id: i32, changes: RoleChanges) -> Result<Option<Role>, AppError> {
        let mut am = roles::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = changes.name {
            am.name = Set(name);
        }
        am.updated_at = Set(Utc::now());
        match am.update(&self.db).await {
            Ok(model) => Ok(Some(role_from_model(model))),
            Err(DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(map_write_err(e, "update role")),
        }
    }

    async fn delete(&self, id: i32) -> Result<u64, AppError> {
        let result = roles::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete role")?;
        Ok(result.rows_affected)
    }

    async fn count(&self, filter: Option<&RoleFilter>) -> Result<u64, AppError> {
        let mut query = roles::Entity::find();
        if let Some(filter) = filter {
            query = filter_roles(query, filter);
        }
        let count = query.count(&self.db).await.context("count roles")?;
        Ok(count)
    }

    async fn bulk_update(&self, entries: Vec<BulkUpdate<RoleChanges>>) -> Result<u64, AppError> {
        let mut affected = 0;
        for entry in entries {
            let Some(id) = entry.id else { continue };
            let mut query = roles::Entity::update_many().filter(roles::Column::Id.eq(id));
            if let Some(name) = entry.changes.name {
                query = query.col_expr(roles::Column::Name, Expr::value(name));
            }
            query = query.col_expr(roles::Column::UpdatedAt, Expr::value(Utc::now()));
            let result = query
                .exec(&self.db)
                .await
                .map_err(|e| map_write_err(e, "bulk update roles"))?;
            affected += result.rows_affected;
        }
        Ok(affected)
    }
}

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

fn filter_products(
    query: Select<products::Entity>,
    filter: &ProductFilter,
) -> Select<products::Entity> {
    let mut query = query;
    if let Some(id) = filter.id {
        query = query.filter(products::Column::Id.eq(id));
    }
    if let Some(title) = &filter.title {
        query = query.filter(products::Column::Title.eq(title.clone()));
    }
    if let Some(article) = &filter.article {
        query = query.filter(products::Column::Article.eq(article.clone()));
    }
    query
}

fn product_from_model(model: products::Model) -> Product {
    Product {
        id: model.id,
        title: model.title,
        article: model.article,
        price: model.price,
        description: model.description,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn product_active_model(fields: NewProduct) -> products::ActiveModel {
    products::ActiveModel {
        title: Set(fields.title),
        article: Set(fields.article),
        price: Set(fields.price),
        description: Set(fields.description),
        ..Default::default()
    }
}

impl Repository for DbProductRepository {
    type Entity = Product;
    type Create = NewProduct;
    type Update = ProductChanges;
    type Filter = ProductFilter;

    async fn get_by_id(&self, id: i32) -> Result<Option<Product>, AppError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("get product by id")?;
        Ok(model.map(product_from_model))
    }

    async fn get_by_filter(&self, filter: &ProductFilter) -> Result<Option<Product>, AppError> {
        let mut rows = filter_products(products::Entity::find(), filter)
            .limit(2)
            .all(&self.db)
            .await
            .context("get product by filter")?;
        if rows.len() > 1 {
            return Err(AppError::Ambiguous);
        }
        Ok(rows.pop().map(product_from_model))
    }

    async fn list(&self, filter: Option<&ProductFilter>) -> Result<Vec<Product>, AppError> {
        let mut query = products::Entity::find();
        if let Some(filter) = filter {
            query = filter_products(query, filter);
        }
        let models = query.all(&self.db).await.context("list products")?;
        Ok(models.into_iter().map(product_from_model).collect())
    }

    async fn create(&self, fields: NewProduct) -> Result<Product, AppError> {
        let model = product_active_model(fields)
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err(e, "create product"))?;
        Ok(product_from_model(model))
    }

    async fn create_many(&self, fields: Vec<NewProduct>) -> Result<Vec<Product>, AppError> {
        let models = self
            .db
            .transaction::<_, Vec<products::Model>, DbErr>(|txn| {
                Box::pin(async move {
                    let mut inserted = Vec::with_capacity(fields.len());
                    for fields in fields {
                        inserted.push(product_active_model(fields).insert(txn).await?);
                    }
                    Ok(inserted)
                })
            })
            .await
            .map_err(|e| map_txn_err(e, "create many products"))?;
        Ok(models.into_iter().map(product_from_model).collect())
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> Result<Option<Product>, AppError> {
        let mut am = products::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(title) = changes.title {
            am.title = Set(title);
        }
        if let Some(article) = changes.article {
            am.article = Set(article);
        }
        if let Some(price) = changes.price {
            am.price = Set(price);
        }
        if let Some(description) = changes.description {
            am.description = Set(description);
        }
        am.updated_at = Set(Utc::now());
        match am.update(&self.db).await {
            Ok(model) => Ok(Some(product_from_model(model))),
            Err(DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(map_write_err(e, "update product")),
        }
    }

    async fn delete(&self, id: i32) -> Result<u64, AppError> {
        let result = products::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete product")?;
        Ok(result.rows_affected)
    }

    async fn count(&self, filter: Option<&ProductFilter>) -> Result<u64, AppError> {
        let mut query = products::Entity::find();
        if let Some(filter) = filter {
            query = filter_products(query, filter);
        }
        let count = query.count(&self.db).await.context("count products")?;
        Ok(count)
    }

    async fn bulk_update(&self, entries: Vec<BulkUpdate<ProductChanges>>) -> Result<u64, AppError> {
        let mut affected = 0;
        for entry in entries {
            let Some(id) = entry.id else { continue };
            let mut query = products::Entity::update_many().filter(products::Column::Id.eq(id));
            if let Some(title) = entry.changes.title {
                query = query.col_expr(products::Column::Title, Expr::value(title));
            }
            if let Some(article) = entry.changes.article {
                query = query.col_expr(products::Column::Article, Expr::value(article));
            }
            if let Some(price) = entry.changes.price {
                query = query.col_expr(products::Column::Price, Expr::value(price));
            }
            if let Some(description) = entry.changes.description {
                query = query.col_expr(products::Column::Description, Expr::value(description));
            }
            query = query.col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()));
            let result = query
                .exec(&self.db)
                .await
                .map_err(|e| map_write_err(e, "bulk update products"))?;
            affected += result.rows_affected;
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn product_model(id: i32) -> products::Model {
        products::Model {
            id,
            title: "Teapot".into(),
            article: "TP-001".into(),
            price: 19.90,
            description: "A teapot".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user_model(id: i32) -> users::Model {
        users::Model {
            id,
            phone_number: "+79991234567".into(),
            first_name: "Anna".into(),
            last_name: "Petrova".into(),
            email: "anna@example.com".into(),
            password: "$argon2id$hash".into(),
            role_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn should_allowlist_known_sort_fields() {
        assert!(user_sort_column("email").is_some());
        assert!(user_sort_column("first_name").is_some());
        assert!(user_sort_column("created_at").is_some());
    }

    #[test]
    fn should_reject_unknown_sort_fields() {
        assert!(user_sort_column("bogus").is_none());
        assert!(user_sort_column("password").is_none());
        assert!(user_sort_column("").is_none());
    }

    #[test]
    fn should_escape_like_wildcards_in_substring_patterns() {
        assert_eq!(substring_pattern("an"), "%an%");
        assert_eq!(substring_pattern("100%"), "%100\\%%");
        assert_eq!(substring_pattern("a_b"), "%a\\_b%");
        assert_eq!(substring_pattern("a\\b"), "%a\\\\b%");
    }

    #[tokio::test]
    async fn should_return_none_for_missing_product() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<products::Model>::new()])
            .into_connection();
        let repo = DbProductRepository { db };
        assert_eq!(repo.get_by_id(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_fail_ambiguous_filter_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_model(1), product_model(2)]])
            .into_connection();
        let repo = DbProductRepository { db };
        let filter = ProductFilter {
            title: Some("Teapot".into()),
            ..ProductFilter::default()
        };
        let err = repo.get_by_filter(&filter).await.unwrap_err();
        assert!(matches!(err, AppError::Ambiguous));
    }

    #[tokio::test]
    async fn should_return_single_filter_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_model(7)]])
            .into_connection();
        let repo = DbProductRepository { db };
        let filter = ProductFilter {
            article: Some("TP-001".into()),
            ..ProductFilter::default()
        };
        let found = repo.get_by_filter(&filter).await.unwrap().unwrap();
        assert_eq!(found.id, 7);
    }

    #[tokio::test]
    async fn should_report_zero_rows_deleted_for_missing_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = DbProductRepository { db };
        assert_eq!(repo.delete(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_skip_bulk_update_entries_without_an_id() {
        // No scripted exec results: touching the store would error, so an
        // all-skipped batch proves nothing was executed.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = DbProductRepository { db };
        let entries = vec![
            BulkUpdate {
                id: None,
                changes: ProductChanges {
                    title: Some("ignored".into()),
                    ..ProductChanges::default()
                },
            },
            BulkUpdate {
                id: None,
                changes: ProductChanges::default(),
            },
        ];
        assert_eq!(repo.bulk_update(entries).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_sum_rows_affected_across_bulk_entries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = DbProductRepository { db };
        let entries = vec![
            BulkUpdate {
                id: Some(1),
                changes: ProductChanges {
                    price: Some(9.90),
                    ..ProductChanges::default()
                },
            },
            BulkUpdate {
                id: Some(999),
                changes: ProductChanges {
                    price: Some(9.90),
                    ..ProductChanges::default()
                },
            },
        ];
        assert_eq!(repo.bulk_update(entries).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_apply_ilike_for_name_filters() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let repo = DbUserRepository { db: db.clone() };
        let filter = UserFilter {
            first_name: Some("an".into()),
            ..UserFilter::default()
        };
        repo.find_all(&filter, None).await.unwrap();
        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains("ILIKE"), "expected ILIKE in: {sql}");
        assert!(sql.contains("%an%"), "expected substring pattern in: {sql}");
    }

    #[tokio::test]
    async fn should_sort_by_allowlisted_column() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let repo = DbUserRepository { db: db.clone() };
        let sort = SortSpec::parse("email:desc");
        repo.find_all(&UserFilter::default(), Some(&sort))
            .await
            .unwrap();
        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains("ORDER BY"), "expected ORDER BY in: {sql}");
        assert!(sql.contains("DESC"), "expected DESC in: {sql}");
    }

    #[tokio::test]
    async fn should_skip_sorting_for_unknown_field() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let repo = DbUserRepository { db: db.clone() };
        let sort = SortSpec::parse("bogus:asc");
        let result = repo
            .find_all(&UserFilter::default(), Some(&sort))
            .await
            .unwrap();
        assert!(result.is_empty());
        let sql = format!("{:?}", db.into_transaction_log());
        assert!(!sql.contains("ORDER BY"), "unexpected ORDER BY in: {sql}");
    }

    #[tokio::test]
    async fn should_pass_check_unique_when_values_are_free() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let repo = DbUserRepository { db };
        repo.check_unique("+79991234567", "anna@example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn should_fail_check_unique_when_a_value_is_taken() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(1)]])
            .into_connection();
        let repo = DbUserRepository { db };
        let err = repo
            .check_unique("+79991234567", "anna@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists));
    }
}
