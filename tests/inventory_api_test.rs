mod common;

use axum::{body, http::Method, response::Response};
use serde_json::{json, Value};

use common::TestApp;

async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

fn item_payload(name: &str, number: &str, component: &str, quantity: i64, price: f64) -> Value {
    json!({
        "partsName": name,
        "partsNumber": number,
        "component": component,
        "quantity": quantity,
        "itemPrice": price,
        "rack": "A1",
        "tax": 0,
        "totalAmount": price * quantity as f64,
        "pic": "Warehouse Lead",
        "poNumber": "PO-1001",
        "ctplNumber": "CTPL-1001",
        "acquiredDate": "2025-06-01"
    })
}

async fn create_item(app: &TestApp, payload: Value) -> Value {
    let response = app
        .request(Method::POST, "/api/v1/inventory", Some(payload))
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    body["data"].clone()
}

#[tokio::test]
async fn inventory_item_lifecycle() {
    let app = TestApp::new().await;

    // Create
    let item = create_item(
        &app,
        item_payload("Crankshaft Assembly", "ENG-104", "Engine", 10, 420.0),
    )
    .await;
    assert_eq!(item["partsNumber"], "ENG-104");
    assert_eq!(item["component"], "Engine");
    assert_eq!(item["quantity"], 10);
    assert_eq!(item["version"], 1);
    assert_eq!(item["createdBy"], "system");
    let item_id = item["id"].as_str().expect("item id").to_string();

    // Fetch it back
    let response = app
        .request(Method::GET, &format!("/api/v1/inventory/{item_id}"), None)
        .await;
    assert_eq!(response.status(), 200);
    let fetched = response_json(response).await;
    assert_eq!(fetched["success"], true);
    assert_eq!(fetched["data"]["partsName"], "Crankshaft Assembly");

    // Update fields and lower the quantity through the override path
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/inventory/{item_id}"),
            Some(json!({
                "rack": "B4",
                "quantity": 6
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["data"]["rack"], "B4");
    assert_eq!(updated["data"]["quantity"], 6);
    assert_eq!(updated["data"]["version"], 2);

    // Record a stock movement against it
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/transaction",
            Some(json!({
                "itemId": item_id,
                "transactionType": "in",
                "quantity": 4,
                "performedBy": "clerk-7"
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let recorded = response_json(response).await;
    assert_eq!(recorded["success"], true);
    assert_eq!(recorded["data"]["item"]["quantity"], 10);
    assert_eq!(recorded["data"]["item"]["version"], 3);
    assert_eq!(recorded["data"]["transaction"]["transactionType"], "in");
    assert_eq!(recorded["data"]["transaction"]["previousQuantity"], 6);
    assert_eq!(recorded["data"]["transaction"]["newQuantity"], 10);
    assert_eq!(recorded["data"]["transaction"]["performedBy"], "clerk-7");

    // Delete and confirm it is gone
    let response = app
        .request(Method::DELETE, &format!("/api/v1/inventory/{item_id}"), None)
        .await;
    assert_eq!(response.status(), 200);
    let deleted = response_json(response).await;
    assert_eq!(deleted["success"], true);

    let response = app
        .request(Method::GET, &format!("/api/v1/inventory/{item_id}"), None)
        .await;
    assert_eq!(response.status(), 404);
    let missing = response_json(response).await;
    assert_eq!(missing["success"], false);
    assert_eq!(missing["message"], "Inventory item not found");
}

#[tokio::test]
async fn create_rejects_bad_payloads() {
    let app = TestApp::new().await;

    // Empty parts name trips field validation
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory",
            Some(item_payload("", "ENG-900", "Engine", 1, 10.0)),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please add a parts name");

    // Unknown component category
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory",
            Some(item_payload("Gearbox", "MEC-711", "Chassis", 1, 10.0)),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Invalid component \"Chassis\""));

    // Negative quantity
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory",
            Some(item_payload("Gearbox", "MEC-711", "Mechanical", -2, 10.0)),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Quantity cannot be negative");

    // Negative price
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory",
            Some(item_payload("Gearbox", "MEC-711", "Mechanical", 2, -10.0)),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Price cannot be negative");

    // Malformed inline image
    let mut payload = item_payload("Gearbox", "MEC-711", "Mechanical", 2, 10.0);
    payload["imageData"] = json!("definitely-not-a-data-uri");
    let response = app
        .request(Method::POST, "/api/v1/inventory", Some(payload))
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Invalid image format");

    // Duplicate parts number
    create_item(&app, item_payload("Gearbox", "MEC-711", "Mechanical", 2, 10.0)).await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory",
            Some(item_payload("Gearbox Copy", "MEC-711", "Mechanical", 1, 12.0)),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Duplicate field value entered: partsNumber");
}

#[tokio::test]
async fn listing_supports_filters_and_pagination() {
    let app = TestApp::new().await;

    create_item(&app, item_payload("Crankshaft", "ENG-104", "Engine", 12, 420.0)).await;
    create_item(&app, item_payload("Oil Filter", "ENG-221", "Engine", 60, 12.0)).await;
    create_item(&app, item_payload("Fuel Pump", "ENG-305", "Engine", 4, 180.0)).await;
    create_item(&app, item_payload("Door Panel", "BOD-301", "Body", 6, 240.0)).await;
    create_item(&app, item_payload("Mirror", "BOD-415", "Body", 14, 78.0)).await;

    // Unfiltered listing with default pagination
    let response = app.request(Method::GET, "/api/v1/inventory", None).await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["pagination"]["pages"], 1);

    // Component filter
    let response = app
        .request(Method::GET, "/api/v1/inventory?component=Engine", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    // Case-insensitive search over name and number
    let response = app
        .request(Method::GET, "/api/v1/inventory?search=pump", None)
        .await;
    let body = response_json(response).await;
    let matches = body["data"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["partsName"], "Fuel Pump");

    let response = app
        .request(Method::GET, "/api/v1/inventory?search=bod-", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Price and quantity windows
    let response = app
        .request(Method::GET, "/api/v1/inventory?minPrice=100", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let response = app
        .request(
            Method::GET,
            "/api/v1/inventory?minQuantity=10&maxQuantity=20",
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Page windows carry correct metadata
    let response = app
        .request(Method::GET, "/api/v1/inventory?page=1&limit=2", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["limit"], 2);
    assert_eq!(body["pagination"]["pages"], 3);

    let response = app
        .request(Method::GET, "/api/v1/inventory?page=3&limit=2", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Oversized limits are clamped to the configured maximum
    let response = app
        .request(Method::GET, "/api/v1/inventory?limit=1000", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["pagination"]["limit"], 100);
}

#[tokio::test]
async fn transaction_endpoint_enforces_stock_rules() {
    let app = TestApp::new().await;

    let item = create_item(
        &app,
        item_payload("Seal Kit", "HYD-200", "Hydraulic", 2, 38.0),
    )
    .await;
    let item_id = item["id"].as_str().expect("item id");

    // Overdraw is rejected and reports the on-hand quantity
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/transaction",
            Some(json!({
                "itemId": item_id,
                "transactionType": "out",
                "quantity": 5
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not enough stock. Current quantity: 2");

    // Unknown item
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/transaction",
            Some(json!({
                "itemId": "2f2b8f2e-8f2e-4f2e-8f2e-2f2b8f2e4f2e",
                "transactionType": "in",
                "quantity": 1
            })),
        )
        .await;
    assert_eq!(response.status(), 404);

    // Incomplete body
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/transaction",
            Some(json!({ "transactionType": "in" })),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Please provide itemId, transactionType, and quantity"
    );

    // Bad direction
    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/transaction",
            Some(json!({
                "itemId": item_id,
                "transactionType": "sideways",
                "quantity": 1
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Transaction type must be either \"in\" or \"out\""
    );
}

#[tokio::test]
async fn error_responses_carry_request_ids() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/inventory/7e3f8c7c-4a86-4bbd-9a6c-9f57c2ab03de",
            None,
        )
        .await;
    assert_eq!(response.status(), 404);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("request id header");

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["request_id"].as_str(), Some(request_id.as_str()));
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn health_endpoints_report_status() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health/live", None).await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "up");

    let response = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"]["status"], "up");

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["details"]["database"]["status"], "up");
    assert!(body["version"].as_str().is_some());
}
