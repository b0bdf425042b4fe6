use crate::domain::repository::ProductRepository;
use crate::domain::types::{NewProduct, Product, ProductChanges};
use crate::error::AppError;

pub struct ListProductsUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> ListProductsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Product>, AppError> {
        self.products.list(None).await
    }
}

pub struct GetProductUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> GetProductUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Product, AppError> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

pub struct CreateProductUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> CreateProductUseCase<R> {
    pub async fn execute(&self, fields: NewProduct) -> Result<Product, AppError> {
        self.products.create(fields).await
    }
}

pub struct UpdateProductUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> UpdateProductUseCase<R> {
    pub async fn execute(&self, id: i32, changes: ProductChanges) -> Result<Product, AppError> {
        self.products
            .update(id, changes)
            .await?
            .ok_or(AppError::NotFound)
    }
}

pub struct DeleteProductUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> DeleteProductUseCase<R> {
    /// Returns the removed-row count; a missing id is the caller's 404.
    pub async fn execute(&self, id: i32) -> Result<u64, AppError> {
        let removed = self.products.delete(id).await?;
        if removed == 0 {
            return Err(AppError::NotFound);
        }
        Ok(removed)
    }
}
