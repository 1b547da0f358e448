use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use sweetshop_core::{DomainError, DomainResult, Entity, ItemId, Price};

/// A sellable catalog entry.
///
/// `quantity >= 0` holds for every value a store hands out. Quantity changes
/// only through [`crate::StockAdjustment`]; [`DetailsPatch`] has no quantity
/// field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Price,
    pub quantity: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for CatalogItem {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Unvalidated input for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
    pub image_url: Option<String>,
}

impl NewItem {
    /// Validate and materialize with a fresh id.
    pub fn into_item(self, now: DateTime<Utc>) -> DomainResult<CatalogItem> {
        let name = required("name", &self.name)?;
        let category = required("category", &self.category)?;
        let price = Price::new(self.price)?;
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }

        Ok(CatalogItem {
            id: ItemId::new(),
            name,
            category,
            description: self.description,
            price,
            quantity: self.quantity,
            image_url: self.image_url,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Unvalidated partial update as it arrives from a caller.
///
/// `quantity` is accepted here only so it can be refused: stock moves through
/// purchase and restock, never through a field overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
}

impl ItemPatch {
    pub fn validate(self) -> DomainResult<DetailsPatch> {
        if let Some(quantity) = self.quantity {
            if quantity < 0 {
                return Err(DomainError::validation("quantity cannot be negative"));
            }
            return Err(DomainError::validation(
                "quantity can only be changed through purchase or restock",
            ));
        }

        Ok(DetailsPatch {
            name: self.name.as_deref().map(|n| required("name", n)).transpose()?,
            category: self
                .category
                .as_deref()
                .map(|c| required("category", c))
                .transpose()?,
            description: self.description,
            price: self.price.map(Price::new).transpose()?,
            image_url: self.image_url,
        })
    }
}

/// Validated update of the non-contended fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailsPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
}

impl DetailsPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
    }

    /// Apply onto a record. Never touches `quantity`.
    pub fn apply_to(&self, item: &mut CatalogItem, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(description) = &self.description {
            item.description = Some(description.clone());
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = Some(image_url.clone());
        }
        item.updated_at = now;
    }
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
