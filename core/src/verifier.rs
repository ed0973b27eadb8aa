//! Sequential smoke test over the products and orders endpoints.
//!
//! # Design
//! `Verifier` drives a fixed script of requests through a `Transport` and
//! writes a line-oriented report to any `io::Write`. A step is reported as
//! passed or failed from its status alone; a status other than 200 is
//! reported inline. Anything else that goes wrong (no response, a passed step
//! whose body is not the expected JSON) ends the run and is printed once by
//! `run`.
//!
//! The products flow stops after a failed GET or POST, but the PUT and DELETE
//! steps always both run. A failed PUT or DELETE leaves the test product on
//! the server; nothing cleans it up.

use std::io::Write;

use crate::client::{
    check_status, decode_created_product, decode_list, first_order_id, ShopClient,
    ORDERS_ENDPOINT, PRODUCTS_ENDPOINT,
};
use crate::error::{ApiError, VerifyError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{
    EntityId, NewProduct, OrderStatus, OrderStatusUpdate, ProductDelete, ProductPriceUpdate,
};

/// Price the test product is moved to by the update step.
pub const UPDATED_PRICE: f64 = 199.99;

/// Status written to the first listed order.
pub const ORDER_TARGET_STATUS: OrderStatus = OrderStatus::Entregado;

/// The product created (and then deleted) by the products flow.
pub fn test_product() -> NewProduct {
    NewProduct {
        name: "Test Product".to_string(),
        price: 99.99,
        category: "Test".to_string(),
        stock: 10,
        image: "https://via.placeholder.com/150".to_string(),
    }
}

pub struct Verifier<T, W> {
    client: ShopClient,
    transport: T,
    out: W,
}

impl<T: Transport, W: Write> Verifier<T, W> {
    pub fn new(client: ShopClient, transport: T, out: W) -> Self {
        Self {
            client,
            transport,
            out,
        }
    }

    pub fn into_parts(self) -> (T, W) {
        (self.transport, self.out)
    }

    /// Runs the products flow, then the orders flow.
    ///
    /// Errors from either flow are printed as `An error occurred: ...` and
    /// swallowed. Only a failure to write that very line is returned.
    pub fn run(&mut self) -> Result<(), VerifyError> {
        if let Err(e) = self.run_flows() {
            tracing::error!(error = %e, "verification aborted");
            writeln!(self.out, "An error occurred: {e}")?;
        }
        Ok(())
    }

    fn run_flows(&mut self) -> Result<(), VerifyError> {
        self.verify_products()?;
        self.verify_orders()
    }

    pub fn verify_products(&mut self) -> Result<(), VerifyError> {
        writeln!(self.out, "Testing Products API...")?;

        let request = self.client.build_list_products();
        let response = self.send(request)?;
        let Some(response) = self.step(HttpMethod::Get, PRODUCTS_ENDPOINT, response, false)? else {
            return Ok(());
        };
        let products = decode_list(&response.body)?;
        writeln!(self.out, "Found {} products", products.len())?;

        let request = self.client.build_create_product(&test_product())?;
        let response = self.send(request)?;
        let Some(response) = self.step(HttpMethod::Post, PRODUCTS_ENDPOINT, response, true)? else {
            return Ok(());
        };
        let created = decode_created_product(&response.body)?;
        let shown = created
            .id
            .as_ref()
            .map_or_else(|| "<none>".to_string(), EntityId::to_string);
        writeln!(self.out, "Created product ID: {shown}")?;
        let product_id = created.id;

        let update = ProductPriceUpdate {
            id: product_id.clone(),
            price: UPDATED_PRICE,
        };
        let request = self.client.build_update_product_price(&update)?;
        let response = self.send(request)?;
        self.step(HttpMethod::Put, PRODUCTS_ENDPOINT, response, true)?;

        let delete = ProductDelete { id: product_id };
        let request = self.client.build_delete_product(&delete)?;
        let response = self.send(request)?;
        self.step(HttpMethod::Delete, PRODUCTS_ENDPOINT, response, true)?;
        Ok(())
    }

    pub fn verify_orders(&mut self) -> Result<(), VerifyError> {
        writeln!(self.out)?;
        writeln!(self.out, "Testing Orders API...")?;

        let request = self.client.build_list_orders();
        let response = self.send(request)?;
        let Some(response) = self.step(HttpMethod::Get, ORDERS_ENDPOINT, response, true)? else {
            return Ok(());
        };
        let orders = decode_list(&response.body)?;
        writeln!(self.out, "Found {} orders", orders.len())?;

        let Some(order_id) = first_order_id(&orders)? else {
            return Ok(());
        };
        writeln!(self.out, "Testing update on order ID: {order_id}")?;

        let update = OrderStatusUpdate {
            id: order_id,
            status: ORDER_TARGET_STATUS,
        };
        let request = self.client.build_update_order_status(&update)?;
        let response = self.send(request)?;
        self.step(HttpMethod::Put, ORDERS_ENDPOINT, response, true)?;
        Ok(())
    }

    fn send(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, "response received");
        Ok(response)
    }

    /// Prints the pass/fail line for one request. The response is handed back
    /// only when it passed; its body has not been looked at yet.
    fn step(
        &mut self,
        method: HttpMethod,
        endpoint: &str,
        response: HttpResponse,
        echo_body: bool,
    ) -> Result<Option<HttpResponse>, VerifyError> {
        match check_status(response) {
            Ok(response) => {
                self.success(method, endpoint)?;
                Ok(Some(response))
            }
            Err(ApiError::HttpError { status, body }) => {
                let body = echo_body.then_some(body.as_str());
                self.failure(method, endpoint, status, body)?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn success(&mut self, method: HttpMethod, endpoint: &str) -> Result<(), VerifyError> {
        writeln!(self.out, "{} /{endpoint}: Success", method.as_str())?;
        Ok(())
    }

    fn failure(
        &mut self,
        method: HttpMethod,
        endpoint: &str,
        status: u16,
        body: Option<&str>,
    ) -> Result<(), VerifyError> {
        tracing::warn!(method = method.as_str(), endpoint, status, "step failed");
        writeln!(self.out, "{} /{endpoint}: Failed ({status})", method.as_str())?;
        if let Some(body) = body {
            writeln!(self.out, "{body}")?;
        }
        Ok(())
    }
}
