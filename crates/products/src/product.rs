use serde::{Deserialize, Serialize};

use storeadmin_core::{CategoryId, DomainError, DomainResult, ProductId, WarehouseId};

use crate::validate::{
    DESCRIPTION_MAX_LEN, NAME_MAX_LEN, is_valid_id, is_valid_price, is_valid_quantity, is_valid_string,
    sanitize_string,
};

/// Product as listed by `/product/all` and `/product/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub subcategory_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub featured: bool,
}

/// `featured` is stored as 0/1 by the backend.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        None => false,
    })
}

/// Envelope of `GET /product/all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
}

/// Initial stock of a new product in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseStockEntry {
    pub warehouse_id: WarehouseId,
    pub quantity: i64,
}

/// Body of `POST /product/add` and `PUT /product/{id}/update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    pub stock_quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<CategoryId>,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warehouse_stock: Vec<WarehouseStockEntry>,
}

impl ProductDraft {
    /// Sanitize text fields, then validate. Returns the draft to submit.
    pub fn validated(self) -> DomainResult<Self> {
        let draft = Self {
            name: sanitize_string(&self.name),
            description: sanitize_string(&self.description),
            size: self.size.as_deref().map(sanitize_string).filter(|s| !s.is_empty()),
            color: self.color.as_deref().map(sanitize_string).filter(|s| !s.is_empty()),
            material: self.material.as_deref().map(sanitize_string).filter(|s| !s.is_empty()),
            ..self
        };

        if !is_valid_string(&draft.name, NAME_MAX_LEN) {
            return Err(DomainError::validation(format!(
                "name is required and must be at most {NAME_MAX_LEN} characters"
            )));
        }
        if !is_valid_string(&draft.description, DESCRIPTION_MAX_LEN) {
            return Err(DomainError::validation(format!(
                "description is required and must be at most {DESCRIPTION_MAX_LEN} characters"
            )));
        }
        if !is_valid_price(draft.price) {
            return Err(DomainError::validation("price must be greater than zero"));
        }
        if !is_valid_quantity(draft.stock_quantity) {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }
        for (field, id) in [("category_id", draft.category_id), ("subcategory_id", draft.subcategory_id)] {
            if id.is_some_and(|id| id.get() < 0) {
                return Err(DomainError::validation(format!("{field} cannot be negative")));
            }
        }
        for entry in &draft.warehouse_stock {
            if !is_valid_id(entry.warehouse_id.get()) || !is_valid_quantity(entry.quantity) {
                return Err(DomainError::validation("Invalid warehouse stock entry"));
            }
        }

        Ok(draft)
    }
}

impl From<&Product> for ProductDraft {
    /// Pre-fill an edit form from an existing product.
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price,
            size: product.size.clone(),
            color: product.color.clone(),
            material: product.material.clone(),
            stock_quantity: product.stock_quantity,
            category_id: product.category_id,
            subcategory_id: product.subcategory_id,
            featured: product.featured,
            warehouse_stock: Vec::new(),
        }
    }
}
