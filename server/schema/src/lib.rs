//! SeaORM entity definitions for the lavka store.

pub mod products;
pub mod roles;
pub mod users;
