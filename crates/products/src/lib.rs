//! Product catalog models and product form validation.

pub mod product;
pub mod validate;

pub use product::{Category, Product, ProductDraft, ProductList, WarehouseStockEntry};
pub use validate::{
    DESCRIPTION_MAX_LEN, NAME_MAX_LEN, is_valid_id, is_valid_price, is_valid_quantity, is_valid_string,
    parse_price, parse_quantity, sanitize_string,
};
