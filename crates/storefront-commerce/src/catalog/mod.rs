//! Catalog: categories, products and their services.

mod category;
mod category_service;
mod product;
mod product_service;

pub use category::{
    Category, CategoryAddRequest, CategoryResponse, CategoryUpdateRequest, CATEGORY_NAME_MAX,
    CATEGORY_NAME_MIN,
};
pub use category_service::CategoryService;
pub use product::{
    Product, ProductAddRequest, ProductResponse, ProductUpdateRequest, SpecialProperty,
    SpecialPropertyAddRequest, SpecialPropertyResponse, SpecialPropertyUpdateRequest,
};
pub use product_service::ProductService;
