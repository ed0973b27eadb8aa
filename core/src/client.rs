//! Stateless HTTP request builder and response parser for the shop API.
//!
//! # Design
//! `ShopClient` holds only a `base_url`. Each call against `products.php` or
//! `orders.php` is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The backend signals success with 200 on every route, so that is the only
//! status the parsers accept.
//!
//! The status check and body decoding are also exposed separately
//! (`check_status`, `decode_*`) for callers that report a step as passed
//! before looking at its body.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreatedProduct, EntityId, NewProduct, OrderStatusUpdate, ProductDelete, ProductPriceUpdate,
};

pub const PRODUCTS_ENDPOINT: &str = "products.php";
pub const ORDERS_ENDPOINT: &str = "orders.php";

/// Synchronous, stateless client for the products and orders endpoints.
#[derive(Debug, Clone)]
pub struct ShopClient {
    base_url: String,
}

impl ShopClient {
    /// The base URL may contain spaces (the stock deployment lives under a
    /// directory with spaces in its name); they are percent-encoded here.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').replace(' ', "%20"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    pub fn build_list_products(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(PRODUCTS_ENDPOINT),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_product(&self, input: &NewProduct) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, self.url(PRODUCTS_ENDPOINT), input)
    }

    pub fn build_update_product_price(
        &self,
        input: &ProductPriceUpdate,
    ) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, self.url(PRODUCTS_ENDPOINT), input)
    }

    pub fn build_delete_product(&self, input: &ProductDelete) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Delete, self.url(PRODUCTS_ENDPOINT), input)
    }

    pub fn build_list_orders(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(ORDERS_ENDPOINT),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_update_order_status(
        &self,
        input: &OrderStatusUpdate,
    ) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, self.url(ORDERS_ENDPOINT), input)
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        let response = check_status(response)?;
        decode_list(&response.body)
    }

    pub fn parse_create_product(
        &self,
        response: HttpResponse,
    ) -> Result<CreatedProduct, ApiError> {
        let response = check_status(response)?;
        decode_created_product(&response.body)
    }

    pub fn parse_update_product_price(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(|_| ())
    }

    pub fn parse_delete_product(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(|_| ())
    }

    pub fn parse_list_orders(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        let response = check_status(response)?;
        decode_list(&response.body)
    }

    pub fn parse_update_order_status(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(|_| ())
    }
}

fn json_request<T: Serialize>(
    method: HttpMethod,
    url: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body =
        serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// Anything but 200 becomes `HttpError` carrying the raw status and body.
pub fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.status == 200 {
        return Ok(response);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body,
    })
}

fn deserialization(message: impl Into<String>) -> ApiError {
    ApiError::DeserializationError(message.into())
}

/// A JSON array of rows of any shape.
pub fn decode_list(body: &str) -> Result<Vec<Value>, ApiError> {
    serde_json::from_str(body).map_err(|e| deserialization(e.to_string()))
}

/// The create response must be a JSON object; its `id` may be absent.
pub fn decode_created_product(body: &str) -> Result<CreatedProduct, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|e| deserialization(e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(deserialization("create response is not a JSON object"));
    };
    let id = match fields.remove("id") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(entity_id(raw)?),
    };
    let message = fields
        .remove("message")
        .and_then(|m| m.as_str().map(str::to_string));
    Ok(CreatedProduct { id, message })
}

/// The `id` of the first listed order, or `None` when the list is empty.
///
/// Later rows are never inspected. A first row without a usable `id` is an
/// error.
pub fn first_order_id(orders: &[Value]) -> Result<Option<EntityId>, ApiError> {
    let Some(first) = orders.first() else {
        return Ok(None);
    };
    let raw = first
        .get("id")
        .cloned()
        .ok_or_else(|| deserialization("first order has no `id`"))?;
    entity_id(raw).map(Some)
}

fn entity_id(raw: Value) -> Result<EntityId, ApiError> {
    serde_json::from_value(raw).map_err(|e| deserialization(format!("unusable id: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;

    fn client() -> ShopClient {
        ShopClient::new("http://localhost:3000/api")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_products_produces_correct_request() {
        let req = client().build_list_products();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/products.php");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_product_produces_correct_request() {
        let input = NewProduct {
            name: "Test Product".to_string(),
            price: 99.99,
            category: "Test".to_string(),
            stock: 10,
            image: "https://via.placeholder.com/150".to_string(),
        };
        let req = client().build_create_product(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/products.php");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Test Product");
        assert_eq!(body["price"], 99.99);
        assert_eq!(body["stock"], 10);
    }

    #[test]
    fn build_delete_product_carries_json_body() {
        let input = ProductDelete {
            id: Some(EntityId::from(42)),
        };
        let req = client().build_delete_product(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"id": 42}));
    }

    #[test]
    fn build_update_order_status_targets_orders() {
        let input = OrderStatusUpdate {
            id: EntityId::from("7"),
            status: OrderStatus::Entregado,
        };
        let req = client().build_update_order_status(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/api/orders.php");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"id": "7", "status": "entregado"}));
    }

    #[test]
    fn spaces_in_base_url_are_encoded() {
        let client = ShopClient::new("http://localhost/E-commerce Fashion Store Mockup 2/api/");
        let req = client.build_list_orders();
        assert_eq!(
            req.url,
            "http://localhost/E-commerce%20Fashion%20Store%20Mockup%202/api/orders.php"
        );
    }

    #[test]
    fn parse_list_products_counts_rows_of_any_shape() {
        let body = r#"[{"id":1,"price":"9.99"},{"id":2,"stock":"4"},3]"#;
        let products = client().parse_list_products(response(200, body)).unwrap();
        assert_eq!(products.len(), 3);
    }

    #[test]
    fn parse_list_products_requires_an_array() {
        let err = client()
            .parse_list_products(response(200, r#"{"message":"ok"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_create_product_rejects_201() {
        let err = client()
            .parse_create_product(response(201, r#"{"id":"5"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 201, .. }));
    }

    #[test]
    fn created_product_without_id() {
        let created = decode_created_product(r#"{"message":"Product created."}"#).unwrap();
        assert!(created.id.is_none());
        assert_eq!(created.message.as_deref(), Some("Product created."));
    }

    #[test]
    fn created_product_null_id_is_absent() {
        let created = decode_created_product(r#"{"id":null}"#).unwrap();
        assert!(created.id.is_none());
    }

    #[test]
    fn created_product_must_be_an_object() {
        let err = decode_created_product("[]").unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn first_order_id_reads_only_the_first_row() {
        let orders: Vec<Value> =
            serde_json::from_str(r#"[{"id":7},{"status":"pendiente"}]"#).unwrap();
        assert_eq!(first_order_id(&orders).unwrap(), Some(EntityId::from(7)));
        assert_eq!(first_order_id(&[]).unwrap(), None);
    }

    #[test]
    fn first_order_without_id_is_an_error() {
        let orders: Vec<Value> =
            serde_json::from_str(r#"[{"status":"pendiente"},{"id":2}]"#).unwrap();
        let err = first_order_id(&orders).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_update_keeps_error_body() {
        let err = client()
            .parse_update_product_price(response(500, r#"{"message":"boom"}"#))
            .unwrap_err();
        match err {
            ApiError::HttpError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, r#"{"message":"boom"}"#);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_delete_ignores_body() {
        assert!(client().parse_delete_product(response(200, "not json")).is_ok());
    }

    #[test]
    fn parse_list_orders_bad_json() {
        let err = client().parse_list_orders(response(200, "<html>")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
