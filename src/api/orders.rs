use super::{ApiClient, ApiError, Query};
use serde::Deserialize;
use serde_json::{json, Value};

/// The API refuses to return more than this many orders per page.
pub const MAX_ORDERS_PAGE_SIZE: u32 = 10;

/// A new order. Optional fields are only sent when present and non-empty.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Products to order, each with a `productId` and `quantity`.
    pub products: Vec<Value>,
    #[serde(default)]
    pub delivery_address: Option<Value>,
    #[serde(default)]
    pub customer_reference: Option<String>,
}

impl NewOrder {
    fn to_body(&self) -> Value {
        let mut body = json!({ "products": self.products });
        if let Some(address) = self.delivery_address.as_ref().filter(|a| !is_blank(a)) {
            body["delivery_address"] = address.clone();
        }
        if let Some(reference) = self.customer_reference.as_ref().filter(|r| !r.is_empty()) {
            body["customer_reference"] = json!(reference);
        }
        body
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

impl ApiClient {
    /// Lists orders for the current account, one page at a time.
    pub async fn list_orders(
        &self,
        page: u32,
        page_size: u32,
        sort: &str,
    ) -> Result<Value, ApiError> {
        let query: Query = vec![
            ("page", page.to_string()),
            ("pageSize", page_size.min(MAX_ORDERS_PAGE_SIZE).to_string()),
            ("sort", sort.to_string()),
        ];
        self.get("v1/orders", Some(&query)).await
    }

    pub async fn get_order(&self, order_number: u64) -> Result<Value, ApiError> {
        self.get(&format!("v1/orders/{order_number}"), None).await
    }

    pub async fn create_order(&self, order: &NewOrder) -> Result<Value, ApiError> {
        self.post("v1/orders", Some(&order.to_body())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client_for, mock_token};
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_list_orders_clamps_page_size() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let mock = server
            .mock("GET", "/v1/orders")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".to_string(), "3".to_string()),
                Matcher::UrlEncoded("pageSize".to_string(), "10".to_string()),
                Matcher::UrlEncoded("sort".to_string(), "order_status,order_date".to_string()),
            ]))
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        client
            .list_orders(3, 50, "order_status,order_date")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_order_by_number() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let _mock = server
            .mock("GET", "/v1/orders/4711")
            .with_status(200)
            .with_body(r#"{"order_number":4711,"order_status":"COMPLETED"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let order = client.get_order(4711).await.unwrap();
        assert_eq!(order["order_status"], "COMPLETED");
    }

    #[tokio::test]
    async fn test_create_order_omits_absent_fields() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, "token-1", 3600, 1).await;
        let mock = server
            .mock("POST", "/v1/orders")
            .match_body(Matcher::Json(json!({
                "products": [{"productId": 1001, "quantity": 5}],
                "customer_reference": "PO-12",
            })))
            .with_status(201)
            .with_body(r#"{"order_number":4712}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let order = NewOrder {
            products: vec![json!({"productId": 1001, "quantity": 5})],
            delivery_address: None,
            customer_reference: Some("PO-12".to_string()),
        };
        let created = client.create_order(&order).await.unwrap();

        assert_eq!(created, json!({"order_number": 4712}));
        mock.assert_async().await;
    }

    #[test]
    fn test_blank_optionals_are_dropped() {
        let order = NewOrder {
            products: vec![json!({"productId": 1, "quantity": 1})],
            delivery_address: Some(json!({})),
            customer_reference: Some(String::new()),
        };
        assert_eq!(
            order.to_body(),
            json!({"products": [{"productId": 1, "quantity": 1}]})
        );
    }
}
