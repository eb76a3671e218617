//! Integration tests for `CrmClient` using wiremock HTTP mocks.
//!
//! Each test stands up its own `MockServer` under an `/api/` root and checks
//! the request the client sends, the value or error it returns, and the log
//! records it delivers.

use std::sync::{Arc, Mutex};

use ccrm_client::{
    ClientConfig, CrmClient, CrmError, CustomerInput, LogRecord, OrderSearch, PartialInput,
    PaymentInput, ProductLine,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

type Records = Arc<Mutex<Vec<LogRecord>>>;

/// Builds a client against `server` whose log records land in the returned vec.
fn recording_client(server: &MockServer) -> (CrmClient, Records) {
    recording_client_at(&format!("{}/api/", server.uri()))
}

fn recording_client_at(base_url: &str) -> (CrmClient, Records) {
    let records: Records = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&records);
    let config = ClientConfig::new("test-key")
        .with_base_url(base_url)
        .with_timeout_secs(5);
    let client = CrmClient::with_logger(&config, move |r: &LogRecord| {
        sink.lock().unwrap().push(r.clone());
    })
    .expect("client construction should not fail");
    (client, records)
}

async fn only_request(server: &MockServer) -> Request {
    let mut requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests.remove(0)
}

fn customer() -> CustomerInput {
    CustomerInput {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        address1: "1 Analytical Way".to_owned(),
        city: "New York".to_owned(),
        country: "US".to_owned(),
        state: "US-NY".to_owned(),
        postal_code: "10001".to_owned(),
        phone: Some("555-0100".to_owned()),
        email: Some("ada@example.com".to_owned()),
        ..CustomerInput::default()
    }
}

fn payment(brand: &str) -> PaymentInput {
    PaymentInput {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        address1: "1 Analytical Way".to_owned(),
        city: "New York".to_owned(),
        country: "US".to_owned(),
        state: "US-NY".to_owned(),
        postal_code: "10001".to_owned(),
        cvv: "123".to_owned(),
        credit_card_type: brand.to_owned(),
        credit_card_number: "4444444444444445".to_owned(),
        exp_month: 1,
        exp_year: 2030,
        shipping_method_id: 4,
        ..PaymentInput::default()
    }
}

fn order_body(order_id: i64) -> Value {
    json!({
        "OrderId": order_id,
        "IsTest": true,
        "ShippingFirstName": "Ada",
        "IPAddress": "127.0.0.1",
        "Total": 19.99,
        "OrderProducts": [{
            "ProductId": 2,
            "Quantity": 1,
            "Price": 19.99,
            "ProductName": "Starter Kit",
            "CurrencyInIso4217Format": "USD",
            "NextDate": "2020-05-01T00:00:00",
            "NextProductId": 7,
            "BillValue": 30
        }]
    })
}

#[tokio::test]
async fn create_partial_renames_fields_and_camel_cases_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/partials"))
        .and(header("apikey", "test-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "PartialId": 55 })))
        .mount(&server)
        .await;

    let (client, records) = recording_client(&server);
    let partial = PartialInput {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        address1: "1 Analytical Way".to_owned(),
        city: "New York".to_owned(),
        country: "US".to_owned(),
        state: "US-NY".to_owned(),
        postal_code: "10001".to_owned(),
        phone: "555-0100".to_owned(),
        email: "ada@example.com".to_owned(),
        affid: Some("aff-1".to_owned()),
        product_id: 2,
        ip: Some("10.0.0.1".to_owned()),
        ..PartialInput::default()
    };

    let created = client
        .create_partial(&partial)
        .await
        .expect("partial should be created");
    assert_eq!(created, json!({ "partialId": 55 }));

    let sent: Value = only_request(&server).await.body_json().unwrap();
    assert_eq!(
        sent,
        json!({
            "FirstName": "Ada",
            "LastName": "Lovelace",
            "Address1": "1 Analytical Way",
            "City": "New York",
            "Country": "US",
            "Province": "US-NY",
            "PostalCode": "10001",
            "Phone": "555-0100",
            "Email": "ada@example.com",
            "AffiliateId": "aff-1",
            "ProductId": 2,
            "IPAddress": "10.0.0.1"
        })
    );

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].endpoint, "partials");
    assert_eq!(records[0].http_response_code, Some(200));
    assert_eq!(records[0].request_body, sent);
    assert_eq!(records[0].response_body, json!({ "PartialId": 55 }));
    assert!(records[0].latency >= 0.0);
}

#[tokio::test]
async fn create_order_merges_customer_payment_and_products() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body(1001)))
        .mount(&server)
        .await;

    let (client, _records) = recording_client(&server);
    let products = [ProductLine {
        price: Some(19.99),
        promo_price: Some(9.99),
        ..ProductLine::new(2, 1)
    }];

    let order = client
        .create_order(&customer(), &products, &payment("mastercard"))
        .await
        .expect("order should be created");

    assert_eq!(order.order_id, 1001);
    assert_eq!(order.ip_address.as_deref(), Some("127.0.0.1"));
    assert_eq!(order.order_products[0].next_product_id, Some(7));

    let sent: Value = only_request(&server).await.body_json().unwrap();
    assert_eq!(sent["ShippingFirstName"], json!("Ada"));
    assert_eq!(sent["ShippingProvince"], json!("US-NY"));
    assert_eq!(sent["Email"], json!("ada@example.com"));
    assert_eq!(sent["BillingFirstName"], json!("Ada"));
    assert_eq!(sent["BillingProvince"], json!("US-NY"));
    assert_eq!(sent["CreditCardNumber"], json!("4444444444444445"));
    assert_eq!(sent["PaymentType"], json!(3));
    assert_eq!(
        sent["OrderProducts"],
        json!([{
            "ProductId": 2,
            "Quantity": 1,
            "Price": 19.99,
            "RebillDiscount": 10.0,
            "DiscountCycleCount": 1
        }])
    );
    assert!(sent.get("firstName").is_none());
}

#[tokio::test]
async fn create_order_with_unknown_card_brand_sends_nothing() {
    let server = MockServer::start().await;
    let (client, records) = recording_client(&server);

    let err = client
        .create_order(&customer(), &[ProductLine::new(2, 1)], &payment("diners"))
        .await
        .unwrap_err();

    assert!(matches!(err, CrmError::UnknownPaymentType(ref b) if b == "diners"));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_order_on_partial_posts_to_partial_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/partials/order/55"))
        .and(body_partial_json(json!({ "PaymentType": 4, "BillingCity": "New York" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body(1002)))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _records) = recording_client(&server);
    let order = client
        .create_order_on_partial(55, &[ProductLine::new(2, 1)], &payment("visa"))
        .await
        .expect("order should be created");

    assert_eq!(order.order_id, 1002);
}

#[tokio::test]
async fn upsell_on_order_sends_pascal_cased_products() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders/upsell/1001"))
        .and(body_partial_json(json!({
            "OrderProducts": [{ "ProductId": 9, "Quantity": 2 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "OrderId": 1001, "Total": 39.98 })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _records) = recording_client(&server);
    let updated = client
        .upsell_on_order(1001, &[ProductLine::new(9, 2)])
        .await
        .expect("upsell should succeed");

    assert_eq!(updated, json!({ "orderId": 1001, "total": 39.98 }));
}

#[tokio::test]
async fn find_orders_sends_query_and_camel_cases_each_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/find"))
        .and(query_param("fromDate", "2020-04-01T00:00:00.000Z"))
        .and(query_param("toDate", "2020-04-03T00:00:00.000Z"))
        .and(query_param("email", "ada@example.com"))
        .and(query_param("orderView", "true"))
        .and(query_param("depth", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_body(1), order_body(2)])))
        .mount(&server)
        .await;

    let (client, records) = recording_client(&server);
    let search = OrderSearch {
        email: Some("ada@example.com".to_owned()),
        order_view: Some(true),
        ..OrderSearch::new(
            Utc.with_ymd_and_hms(2020, 4, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 4, 3, 0, 0, 0).unwrap(),
        )
    };

    let orders = client.find_orders(&search).await.expect("search should succeed");

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1].order_id, 2);
    for order in &orders {
        let product = &order.order_products[0];
        assert_eq!(product.next_date.as_deref(), Some("2020-05-01T00:00:00"));
        assert_eq!(product.next_product_id, Some(7));
        assert_eq!(product.bill_value, Some(30));
    }

    assert!(only_request(&server).await.body.is_empty());
    assert_eq!(records.lock().unwrap()[0].request_body["depth"], json!(0));
}

#[tokio::test]
async fn get_order_has_no_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/1001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body(1001)))
        .mount(&server)
        .await;

    let (client, records) = recording_client(&server);
    let order = client.get_order(1001).await.expect("order should load");

    assert_eq!(order.order_id, 1001);
    assert_eq!(order.shipping_first_name.as_deref(), Some("Ada"));
    assert!(only_request(&server).await.url.query().is_none());
    assert_eq!(records.lock().unwrap()[0].request_body, Value::Null);
}

#[tokio::test]
async fn get_provinces_returns_camel_cased_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/getProvinces/US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Code": "US-NY", "Name": "New York" },
            { "Code": "US-NJ", "Name": "New Jersey" }
        ])))
        .mount(&server)
        .await;

    let (client, _records) = recording_client(&server);
    let provinces = client.get_provinces("US").await.expect("provinces should load");

    assert_eq!(
        provinces,
        json!([
            { "code": "US-NY", "name": "New York" },
            { "code": "US-NJ", "name": "New Jersey" }
        ])
    );
}

#[tokio::test]
async fn get_provinces_leaves_scalar_lists_alone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/getProvinces/CA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["CA-ON", "CA-QC"])))
        .mount(&server)
        .await;

    let (client, _records) = recording_client(&server);
    let provinces = client.get_provinces("CA").await.unwrap();
    assert_eq!(provinces, json!(["CA-ON", "CA-QC"]));
}

#[tokio::test]
async fn get_tax_for_product_upper_cases_country() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/calculateTaxForProduct"))
        .and(query_param("ProductId", "2"))
        .and(query_param("ShippingCountry", "CA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "TaxRate": 0.13, "Tax": 2.6 })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _records) = recording_client(&server);
    let quote = client.get_tax_for_product(2, "ca").await.unwrap();
    assert_eq!(quote, json!({ "taxRate": 0.13, "tax": 2.6 }));
}

#[tokio::test]
async fn patch_order_products_uses_patch_with_rebill_fields() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/orders/orderProducts/1001"))
        .and(body_partial_json(json!({
            "OrderProducts": [{ "ProductId": 2, "NextProductId": 7, "NextDate": "2020-06-01T00:00:00.000Z" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _records) = recording_client(&server);
    let mut line = ProductLine::new(2, 1);
    line.extra.insert("nextProductId".to_owned(), json!(7));
    line.extra.insert("nextDate".to_owned(), json!("2020-06-01T00:00:00.000Z"));

    let result = client.patch_order_products(1001, &[line]).await.unwrap();
    assert_eq!(result, json!(true));
}

#[tokio::test]
async fn cancel_subscription_posts_empty_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders/cancelSubscription/1001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Success": true })))
        .mount(&server)
        .await;

    let (client, _records) = recording_client(&server);
    let result = client.cancel_subscription(1001).await.unwrap();

    assert_eq!(result, json!({ "success": true }));
    let sent: Value = only_request(&server).await.body_json().unwrap();
    assert_eq!(sent, json!({}));
}

#[tokio::test]
async fn payment_required_is_an_order_decline_with_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({ "Message": "Card declined" })))
        .mount(&server)
        .await;

    let (client, records) = recording_client(&server);
    let err = client
        .create_order(&customer(), &[ProductLine::new(2, 1)], &payment("visa"))
        .await
        .unwrap_err();

    assert!(err.is_domain());
    assert!(err.is_order_decline());
    assert_eq!(err.status(), Some(402));

    let sent: Value = only_request(&server).await.body_json().unwrap();
    assert_eq!(err.request_body(), Some(&sent));
    assert_eq!(err.response_body(), Some(&json!({ "Message": "Card declined" })));

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].http_response_code, Some(402));
}

#[tokio::test]
async fn model_state_error_reports_first_validation_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/partials"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "Message": "The request is invalid.",
            "ModelState": { "partial.Email": ["The Email field is not a valid e-mail address."] }
        })))
        .mount(&server)
        .await;

    let (client, records) = recording_client(&server);
    let err = client
        .create_partial(&PartialInput::default())
        .await
        .unwrap_err();

    match &err {
        CrmError::Crm(failure) => {
            assert_eq!(failure.message, "The Email field is not a valid e-mail address.");
            assert_eq!(failure.status, 400);
        }
        other => panic!("expected domain error, got {other:?}"),
    }
    assert!(!err.is_order_decline());
    assert_eq!(records.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn non_json_server_error_is_operational_and_logged_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/1001"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Server Error</html>"))
        .mount(&server)
        .await;

    let (client, records) = recording_client(&server);
    let err = client.get_order(1001).await.unwrap_err();

    let placeholder = json!({ "bogusResponse": "<html>Server Error</html>" });
    assert!(err.is_operational());
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.response_body(), Some(&placeholder));

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].http_response_code, Some(500));
    assert_eq!(records[0].response_body, placeholder);
    assert!(records[0].info.is_some());
}

#[tokio::test]
async fn non_json_success_passes_decode_error_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/getProvinces/US"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (client, records) = recording_client(&server);
    let err = client.get_provinces("US").await.unwrap_err();

    assert!(matches!(err, CrmError::Decode { ref endpoint, .. } if endpoint == "orders/getProvinces/US"));
    assert!(!err.is_domain() && !err.is_operational());

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].response_body, json!({ "bogusResponse": "not json" }));
}

#[tokio::test]
async fn transport_failure_is_operational_without_status() {
    // Nothing listens on port 1, so the connection is refused.
    let (client, records) = recording_client_at("http://127.0.0.1:1/api/");

    let err = client.get_order(1001).await.unwrap_err();

    assert!(err.is_operational());
    assert_eq!(err.status(), None);
    assert!(err.response_body().unwrap().get("bogusResponse").is_some());

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].http_response_code, None);
    assert!(records[0]
        .info
        .as_deref()
        .is_some_and(|info| info.starts_with("transport error")));
}

#[tokio::test]
async fn truncated_body_is_operational_with_known_status() {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().expect("listener address");
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut seen = Vec::new();
        let mut buf = [0u8; 1024];
        while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).expect("read request");
            if n == 0 {
                break;
            }
            seen.extend_from_slice(&buf[..n]);
        }
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"a\":")
            .expect("write partial response");
    });

    let (client, records) = recording_client_at(&format!("http://{addr}/api/"));

    let err = client.get_order(1001).await.unwrap_err();
    server.join().expect("server thread");

    assert!(err.is_operational());
    assert_eq!(err.status(), Some(200));

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].http_response_code, Some(200));
    assert!(records[0]
        .info
        .as_deref()
        .is_some_and(|info| info.starts_with("transport error")));
}

#[tokio::test]
async fn panicking_logger_does_not_change_the_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/1001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body(1001)))
        .mount(&server)
        .await;

    let config = ClientConfig::new("test-key").with_base_url(format!("{}/api/", server.uri()));
    let client = CrmClient::with_logger(&config, |_: &LogRecord| panic!("logger failed"))
        .expect("client construction should not fail");

    let order = client.get_order(1001).await.expect("call should still succeed");
    assert_eq!(order.order_id, 1001);
}

#[tokio::test]
async fn default_client_works_without_a_logger() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/1001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body(1001)))
        .mount(&server)
        .await;

    let config = ClientConfig::new("test-key").with_base_url(format!("{}/api", server.uri()));
    let client = CrmClient::new(&config).expect("client construction should not fail");
    assert_eq!(client.get_order(1001).await.unwrap().order_id, 1001);
}
