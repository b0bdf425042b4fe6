use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::domain::sort::SortSpec;
use crate::domain::types::{Role, User, UserChanges, UserFilter};
use crate::error::AppError;
use crate::extract::{AccessToken, FilterQuery};
use crate::state::AppState;
use crate::usecase::token::{CurrentUserUseCase, require_role};
use crate::usecase::user::{
    DeleteUserUseCase, GetUserUseCase, ListRolesUseCase, ListUsersUseCase, RegisterInput,
    RegisterUserUseCase, UpdateUserUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: i32,
    pub name: String,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
        }
    }
}

/// Public user representation. The password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub role: RoleResponse,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            phone_number: user.phone_number,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.into(),
        }
    }
}

// ── GET /users/roles ─────────────────────────────────────────────────────────

pub async fn get_roles(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let usecase = ListRolesUseCase {
        roles: state.role_repo(),
    };
    let roles = usecase.execute().await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

// ── GET /users ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserListQuery {
    pub id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub sorting: Option<String>,
}

pub async fn get_users(
    State(state): State<AppState>,
    FilterQuery(query): FilterQuery<UserListQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let sort = SortSpec::parse(query.sorting.as_deref().unwrap_or("id:asc"));
    let filter = UserFilter {
        id: query.id,
        first_name: query.first_name,
        last_name: query.last_name,
        email: query.email,
        phone: query.phone,
    };
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(filter, Some(sort)).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(id).await?;
    Ok(Json(user.into()))
}

// ── POST /users/register ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let usecase = RegisterUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterInput {
            email: body.email,
            phone_number: body.phone_number,
            first_name: body.first_name,
            last_name: body.last_name,
            password: body.password,
            confirm_password: body.confirm_password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /me ──────────────────────────────────────────────────────────────────

pub async fn get_me(
    token: AccessToken,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let usecase = CurrentUserUseCase {
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    };
    let user = usecase.execute(&token.0).await?;
    Ok(Json(user.into()))
}

// ── PUT/PATCH /users/{id} ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: Option<i32>,
}

pub async fn update_user(
    token: AccessToken,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    // The token must resolve to a live account; any authenticated user may update.
    CurrentUserUseCase {
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    }
    .execute(&token.0)
    .await?;

    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(
            id,
            UserChanges {
                email: body.email,
                phone_number: body.phone_number,
                first_name: body.first_name,
                last_name: body.last_name,
                role_id: body.role_id,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── DELETE /users/{id} ───────────────────────────────────────────────────────

pub async fn delete_user(
    token: AccessToken,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<u64>, AppError> {
    let current = CurrentUserUseCase {
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    }
    .execute(&token.0)
    .await?;
    require_role(&current, "admin")?;

    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    let removed = usecase.execute(id).await?;
    Ok(Json(removed))
}
