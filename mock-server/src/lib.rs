use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Stock below this marks a product as `low`.
const LOW_STOCK: i64 = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: Option<String>,
    pub stock: i64,
    pub image: Option<String>,
    #[serde(rename = "sizeStock", default)]
    pub size_stock: BTreeMap<String, i64>,
    #[serde(default)]
    pub status: String,
}

impl Product {
    /// `out` when nothing is left, `low` under ten units, `active` otherwise.
    pub fn stock_status(stock: i64) -> &'static str {
        if stock <= 0 {
            "out"
        } else if stock < LOW_STOCK {
            "low"
        } else {
            "active"
        }
    }

    fn listed(mut self) -> Self {
        self.status = Self::stock_status(self.stock).to_string();
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub product_id: String,
    pub product_name: String,
    pub size: String,
    pub quantity: i64,
    pub total: f64,
    pub status: String,
}

fn order_number(id: i64) -> String {
    format!("ORD-{id}")
}

impl Order {
    /// A fresh `pendiente` order numbered `ORD-<id>`.
    pub fn new(id: i64, product: &Product, size: &str, quantity: i64) -> Self {
        Self {
            id: id.to_string(),
            order_number: order_number(id),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            size: size.to_string(),
            quantity,
            total: product.price * quantity as f64,
            status: "pendiente".to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    #[serde(rename = "sizeStock")]
    pub size_stock: Option<BTreeMap<String, i64>>,
}

#[derive(Deserialize)]
pub struct ProductChanges {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    #[serde(rename = "sizeStock")]
    pub size_stock: Option<BTreeMap<String, i64>>,
}

#[derive(Deserialize)]
pub struct ProductRef {
    pub id: Option<Value>,
}

#[derive(Deserialize)]
pub struct Customer {
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Option<Value>,
    pub size: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

#[derive(Deserialize)]
pub struct NewOrder {
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub customer: Option<Customer>,
}

#[derive(Deserialize)]
pub struct OrderStatusChange {
    pub id: Option<Value>,
    pub status: Option<String>,
}

/// In-memory stand-in for the `productos`, `stock` and `compras` tables.
#[derive(Debug, Default)]
pub struct Store {
    pub products: BTreeMap<i64, Product>,
    pub orders: BTreeMap<i64, Order>,
    next_product_id: i64,
    next_order_id: i64,
}

impl Store {
    pub fn insert_product(&mut self, input: NewProduct) -> i64 {
        self.next_product_id += 1;
        let id = self.next_product_id;
        let size_stock = input.size_stock.unwrap_or_default();
        let stock = if size_stock.is_empty() {
            input.stock.unwrap_or(0)
        } else {
            size_stock.values().sum()
        };
        let product = Product {
            id: id.to_string(),
            name: input.name.unwrap_or_default(),
            price: input.price.unwrap_or_default(),
            category: input.category,
            stock,
            image: input.image,
            size_stock,
            status: String::new(),
        };
        self.products.insert(id, product);
        id
    }

    /// Seeds a `pendiente` order under an explicit id.
    pub fn insert_order(&mut self, id: i64, product: &Product, size: &str, quantity: i64) {
        self.put_order(id, Order::new(id, product, size, quantity));
    }

    fn put_order(&mut self, id: i64, order: Order) {
        self.next_order_id = self.next_order_id.max(id);
        self.orders.insert(id, order);
    }

    /// Books one order row per item and takes the quantities off the sized
    /// stock, never below zero. Every item is checked before anything
    /// changes, so a rejected order leaves the store untouched.
    ///
    /// Returns the id of the first row; all rows share its order number.
    pub fn place_order(&mut self, items: &[OrderItem]) -> Result<i64, String> {
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let size = item.size.clone().unwrap_or_default();
            let quantity = item.quantity.unwrap_or(1);
            let found = parse_id(item.product_id.as_ref()).and_then(|pid| {
                let product = self.products.get(&pid)?;
                Some((product.clone(), *product.size_stock.get(&size)?))
            });
            let Some((product, available)) = found else {
                let shown = match &item.product_id {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                return Err(format!("Producto no encontrado: {shown} talla {size}"));
            };
            if available < quantity {
                return Err(format!(
                    "Stock insuficiente para {size}. \
                     Disponible: {available}, Solicitado: {quantity}"
                ));
            }
            lines.push((product, size, quantity, item.price));
        }

        let first_id = self.next_order_id + 1;
        for (product, size, quantity, price) in lines {
            let id = self.next_order_id + 1;
            let mut order = Order::new(id, &product, &size, quantity);
            order.order_number = order_number(first_id);
            order.total = price.unwrap_or(product.price) * quantity as f64;
            self.put_order(id, order);

            let stored = product.id.parse::<i64>().ok();
            if let Some(product) = stored.and_then(|pid| self.products.get_mut(&pid)) {
                let left = product.size_stock.entry(size).or_insert(0);
                *left = (*left - quantity).max(0);
                product.stock = product.size_stock.values().sum();
            }
        }
        Ok(first_id)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Db::default())
}

/// Builds the router over an existing store so callers can seed or inspect it.
pub fn app_with(db: Db) -> Router {
    Router::new()
        .route(
            "/products.php",
            get(list_products)
                .post(create_product)
                .put(update_product)
                .delete(delete_product),
        )
        .route(
            "/orders.php",
            get(list_orders).post(create_order).put(update_order_status),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Db::default()).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

type Reply = (StatusCode, Json<Value>);

fn message(status: StatusCode, text: &str) -> Reply {
    (status, Json(json!({ "message": text })))
}

/// Ids arrive as JSON numbers or numeric strings.
fn parse_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

async fn list_products(State(db): State<Db>) -> Json<Vec<Product>> {
    let store = db.read().await;
    Json(store.products.values().rev().cloned().map(Product::listed).collect())
}

async fn create_product(State(db): State<Db>, Json(input): Json<NewProduct>) -> Reply {
    let has_name = input.name.as_deref().is_some_and(|n| !n.is_empty());
    let has_price = input.price.is_some_and(|p| p != 0.0);
    if !has_name || !has_price {
        return message(StatusCode::BAD_REQUEST, "Incomplete data.");
    }
    let id = db.write().await.insert_product(input);
    tracing::info!(id, "product created");
    (
        StatusCode::OK,
        Json(json!({ "message": "Product created.", "id": id.to_string() })),
    )
}

async fn update_product(State(db): State<Db>, Json(input): Json<ProductChanges>) -> Reply {
    let Some(id) = parse_id(input.id.as_ref()) else {
        return message(StatusCode::BAD_REQUEST, "Incomplete data.");
    };
    let mut store = db.write().await;
    let Some(product) = store.products.get_mut(&id) else {
        return message(StatusCode::NOT_FOUND, "Product not found.");
    };
    if let Some(name) = input.name {
        product.name = name;
    }
    if let Some(price) = input.price {
        product.price = price;
    }
    if let Some(category) = input.category {
        product.category = Some(category);
    }
    if let Some(image) = input.image {
        product.image = Some(image);
    }
    if let Some(stock) = input.stock {
        product.stock = stock;
    }
    if let Some(size_stock) = input.size_stock {
        product.stock = size_stock.values().sum();
        product.size_stock = size_stock;
    }
    tracing::info!(id, "product updated");
    message(StatusCode::OK, "Product updated.")
}

async fn delete_product(State(db): State<Db>, Json(input): Json<ProductRef>) -> Reply {
    let Some(id) = parse_id(input.id.as_ref()) else {
        return message(StatusCode::BAD_REQUEST, "Incomplete data.");
    };
    if db.write().await.products.remove(&id).is_none() {
        return message(StatusCode::NOT_FOUND, "Product not found.");
    }
    tracing::info!(id, "product deleted");
    message(StatusCode::OK, "Product deleted.")
}

async fn list_orders(State(db): State<Db>) -> Json<Vec<Order>> {
    let store = db.read().await;
    Json(store.orders.values().rev().cloned().collect())
}

async fn create_order(State(db): State<Db>, Json(input): Json<NewOrder>) -> Reply {
    if input.items.is_empty() {
        return message(StatusCode::BAD_REQUEST, "No items in order");
    }
    let email = input.customer.as_ref().and_then(|c| c.email.as_deref());
    if !email.is_some_and(|e| !e.is_empty()) {
        return message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error creating order: Email is required for guest checkout",
        );
    }
    let placed = db.write().await.place_order(&input.items);
    match placed {
        Ok(first_id) => {
            tracing::info!(first_id, items = input.items.len(), "order created");
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Order created successfully and stock updated",
                    "orderNumber": order_number(first_id),
                    "transactionId": format!("TR-{first_id}"),
                })),
            )
        }
        Err(reason) => {
            tracing::warn!(%reason, "order rejected");
            message(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error creating order: {reason}"),
            )
        }
    }
}

async fn update_order_status(
    State(db): State<Db>,
    Json(input): Json<OrderStatusChange>,
) -> Reply {
    let (Some(id), Some(status)) = (parse_id(input.id.as_ref()), input.status) else {
        return message(StatusCode::BAD_REQUEST, "Incomplete data");
    };
    let mut store = db.write().await;
    let Some(order) = store.orders.get_mut(&id) else {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Order not found");
    };

    let stock_returned = status == "cancelado" && order.status != "cancelado";
    order.status = status;
    let (product_id, size, quantity) =
        (order.product_id.clone(), order.size.clone(), order.quantity);

    if stock_returned {
        let product = product_id
            .parse::<i64>()
            .ok()
            .and_then(|pid| store.products.get_mut(&pid));
        if let Some(product) = product {
            *product.size_stock.entry(size).or_insert(0) += quantity;
            product.stock += quantity;
        }
    }
    tracing::info!(id, stock_returned, "order status updated");
    (
        StatusCode::OK,
        Json(json!({ "message": "Order status updated", "stockReturned": stock_returned })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, stock: Option<i64>, sizes: &[(&str, i64)]) -> NewProduct {
        NewProduct {
            name: Some(name.to_string()),
            price: Some(10.0),
            category: None,
            stock,
            image: None,
            size_stock: if sizes.is_empty() {
                None
            } else {
                Some(sizes.iter().map(|(s, n)| (s.to_string(), *n)).collect())
            },
        }
    }

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(Product::stock_status(0), "out");
        assert_eq!(Product::stock_status(9), "low");
        assert_eq!(Product::stock_status(10), "active");
    }

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        assert_eq!(parse_id(Some(&json!(42))), Some(42));
        assert_eq!(parse_id(Some(&json!("42"))), Some(42));
        assert_eq!(parse_id(Some(&json!("abc"))), None);
        assert_eq!(parse_id(Some(&Value::Null)), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn size_stock_overrides_flat_stock() {
        let mut store = Store::default();
        let id = store.insert_product(new_product("Tee", Some(99), &[("S", 2), ("M", 3)]));
        assert_eq!(store.products[&id].stock, 5);
    }

    #[test]
    fn flat_stock_used_without_sizes() {
        let mut store = Store::default();
        let first = store.insert_product(new_product("Tee", Some(10), &[]));
        let second = store.insert_product(new_product("Cap", None, &[]));
        assert_eq!(store.products[&first].stock, 10);
        assert_eq!(store.products[&second].stock, 0);
        assert_eq!(second, first + 1);
    }

    fn item(product_id: Value, size: &str, quantity: i64) -> OrderItem {
        OrderItem {
            product_id: Some(product_id),
            size: Some(size.to_string()),
            quantity: Some(quantity),
            price: None,
        }
    }

    #[test]
    fn order_numbers_follow_id() {
        let mut store = Store::default();
        let id = store.insert_product(new_product("Tee", Some(10), &[]));
        let product = store.products[&id].clone();
        store.insert_order(5, &product, "M", 2);
        let order = &store.orders[&5];
        assert_eq!(order.id, "5");
        assert_eq!(order.order_number, "ORD-5");
        assert_eq!(order.status, "pendiente");
        assert_eq!(order.total, 20.0);
    }

    #[test]
    fn placed_orders_continue_after_seeded_ids() {
        let mut store = Store::default();
        let id = store.insert_product(new_product("Tee", None, &[("M", 5), ("L", 1)]));
        let product = store.products[&id].clone();
        store.insert_order(7, &product, "M", 1);

        let first = store
            .place_order(&[item(json!(id), "M", 2), item(json!(id.to_string()), "L", 1)])
            .unwrap();
        assert_eq!(first, 8);
        assert_eq!(store.orders[&9].order_number, "ORD-8");
        assert_eq!(store.products[&id].size_stock["M"], 3);
        assert_eq!(store.products[&id].size_stock["L"], 0);
        assert_eq!(store.products[&id].stock, 3);
    }

    #[test]
    fn rejected_order_changes_nothing() {
        let mut store = Store::default();
        let id = store.insert_product(new_product("Tee", None, &[("M", 5), ("L", 1)]));
        let err = store
            .place_order(&[item(json!(id), "M", 2), item(json!(id), "L", 3)])
            .unwrap_err();
        assert_eq!(err, "Stock insuficiente para L. Disponible: 1, Solicitado: 3");
        assert!(store.orders.is_empty());
        assert_eq!(store.products[&id].stock, 6);

        let err = store.place_order(&[item(json!("99"), "M", 1)]).unwrap_err();
        assert_eq!(err, "Producto no encontrado: 99 talla M");
    }
}
