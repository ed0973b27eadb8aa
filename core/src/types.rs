//! Domain DTOs for the products and orders endpoints.
//!
//! # Design
//! Only the write payloads are fully typed. Listed products and orders stay
//! `serde_json::Value`: the smoke test counts them and reads one `id`, so it
//! must not reject rows whose other columns have unexpected shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A server-assigned identifier, kept in the JSON form the server sent.
///
/// The PHP backend emits ids as strings (`"12"`) while other producers use
/// numbers; whichever arrives is sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Number(n.into())
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

/// Request payload for `POST products.php`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    pub image: String,
}

/// What a successful `POST products.php` told us. A missing or null `id`
/// stays `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedProduct {
    pub id: Option<EntityId>,
    pub message: Option<String>,
}

/// Request payload for `PUT products.php`. `id` serializes as `null` when the
/// create response carried none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPriceUpdate {
    pub id: Option<EntityId>,
    pub price: f64,
}

/// Request payload for `DELETE products.php`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDelete {
    pub id: Option<EntityId>,
}

/// Lifecycle states an order moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pendiente,
    Enviado,
    Entregado,
    Cancelado,
}

/// Request payload for `PUT orders.php`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub id: EntityId,
    pub status: OrderStatus,
}
