use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sweetshop_auth::{Registration, UserProfile};
use sweetshop_core::{DomainError, DomainResult, Email};
use sweetshop_inventory::{ItemPatch, NewItem, SearchFilter};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    pub fn validate(self) -> DomainResult<Registration> {
        Email::parse(&self.email)?;
        check_len("password", &self.password, 6, 100)?;
        check_len("firstName", self.first_name.trim(), 1, 50)?;
        check_len("lastName", self.last_name.trim(), 1, 50)?;

        Ok(Registration {
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> DomainResult<()> {
        Email::parse(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i64,
    pub image_url: Option<String>,
}

impl CreateItemRequest {
    pub fn validate(self) -> DomainResult<NewItem> {
        check_len("name", self.name.trim(), 1, 100)?;
        check_len("category", self.category.trim(), 1, 50)?;
        if let Some(description) = &self.description {
            check_len("description", description, 0, 500)?;
        }
        if let Some(image_url) = &self.image_url {
            check_image_url(image_url)?;
        }

        Ok(NewItem {
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            quantity: self.quantity,
            image_url: self.image_url,
        })
    }
}

/// Partial update. `quantity` is parsed so it can be refused with a clear error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
}

impl UpdateItemRequest {
    pub fn validate(self) -> DomainResult<ItemPatch> {
        if let Some(name) = &self.name {
            check_len("name", name.trim(), 1, 100)?;
        }
        if let Some(category) = &self.category {
            check_len("category", category.trim(), 1, 50)?;
        }
        if let Some(description) = &self.description {
            check_len("description", description, 0, 500)?;
        }
        if let Some(image_url) = &self.image_url {
            check_image_url(image_url)?;
        }

        Ok(ItemPatch {
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            quantity: self.quantity,
            image_url: self.image_url,
        })
    }
}

/// Body of purchase and restock.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl SearchQuery {
    pub fn validate(self) -> DomainResult<SearchFilter> {
        Ok(SearchFilter {
            search: self.search,
            category: self.category,
            min_price: parse_price_bound("minPrice", self.min_price)?,
            max_price: parse_price_bound("maxPrice", self.max_price)?,
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

// -------------------------
// Helpers
// -------------------------

fn check_len(field: &str, value: &str, min: usize, max: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(if min == 1 {
            DomainError::validation(format!("{field} is required"))
        } else {
            DomainError::validation(format!("{field} must be at least {min} characters"))
        });
    }
    if len > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn check_image_url(raw: &str) -> DomainResult<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|_| DomainError::validation("imageUrl must be a valid URL"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(DomainError::validation("imageUrl must use http or https")),
    }
}

fn parse_price_bound(field: &str, raw: Option<String>) -> DomainResult<Option<Decimal>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<Decimal>()
        .map(Some)
        .map_err(|_| DomainError::validation(format!("{field} must be a number")))
}
