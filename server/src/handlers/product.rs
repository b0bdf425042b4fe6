use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::domain::types::{NewProduct, Product, ProductChanges};
use crate::error::AppError;
use crate::extract::AccessToken;
use crate::state::AppState;
use crate::usecase::product::{
    CreateProductUseCase, DeleteProductUseCase, GetProductUseCase, ListProductsUseCase,
    UpdateProductUseCase,
};

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i32,
    pub title: String,
    pub article: String,
    pub price: f64,
    pub description: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            article: product.article,
            price: product.price,
            description: product.description,
        }
    }
}

// ── GET /products ────────────────────────────────────────────────────────────

pub async fn get_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let usecase = ListProductsUseCase {
        products: state.product_repo(),
    };
    let products = usecase.execute().await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

// ── GET /products/{id} ───────────────────────────────────────────────────────

pub async fn get_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    let usecase = GetProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase.execute(id).await?;
    Ok(Json(product.into()))
}

// ── POST /products ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub article: String,
    pub price: f64,
    pub description: String,
}

pub async fn create_product(
    token: AccessToken,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    state.tokens.validate_access_token(&token.0)?;
    let usecase = CreateProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase
        .execute(NewProduct {
            title: body.title,
            article: body.article,
            price: body.price,
            description: body.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

// ── PUT/PATCH /products/{id} ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub article: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

pub async fn update_product(
    token: AccessToken,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    state.tokens.validate_access_token(&token.0)?;
    let usecase = UpdateProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase
        .execute(
            id,
            ProductChanges {
                title: body.title,
                article: body.article,
                price: body.price,
                description: body.description,
            },
        )
        .await?;
    Ok(Json(product.into()))
}

// ── DELETE /products/{id} ────────────────────────────────────────────────────

pub async fn delete_product(
    token: AccessToken,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<u64>, AppError> {
    state.tokens.validate_access_token(&token.0)?;
    let usecase = DeleteProductUseCase {
        products: state.product_repo(),
    };
    let removed = usecase.execute(id).await?;
    Ok(Json(removed))
}
