// End-to-end: JSON-RPC in, RentCast HTTP out, against a mock provider.

use rentcast_core::{ConfigOverrides, GatewayConfig, QuotaGuard};
use rentcast_mcp::{Dispatcher, McpServer, ToolRegistry};
use rentcast_sdk::RentcastClient;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer, session_call_limit: u64) -> McpServer {
    let config = GatewayConfig::default().with_overrides(ConfigOverrides {
        api_key: Some("integration-key".to_string()),
        base_url: Some(format!("{}/v1", server.uri())),
        timeout_secs: Some(5),
        session_call_limit: Some(session_call_limit),
        ..Default::default()
    });
    config.validate().unwrap();

    let client = RentcastClient::from_gateway_config(&config).unwrap();
    let quota = Arc::new(QuotaGuard::new(config.quota.clone()));
    let dispatcher = Arc::new(Dispatcher::new(client, quota));
    McpServer::new(ToolRegistry::with_gateway(dispatcher))
}

fn tool_call(id: u64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
    .to_string()
}

async fn run(server: &McpServer, lines: &[String]) -> Vec<Value> {
    let input = lines.join("\n") + "\n";
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_search_properties_end_to_end() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/properties"))
        .and(header("x-api-key", "integration-key"))
        .and(query_param("city", "Austin"))
        .and(query_param("state", "TX"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "12345", "formattedAddress": "1 Main St, Austin, TX 78701", "bedrooms": 3}
        ])))
        .expect(1)
        .mount(&provider)
        .await;

    let server = gateway(&provider, 40);
    let responses = run(
        &server,
        &[tool_call(
            1,
            "search_properties",
            json!({"city": "Austin", "state": "TX", "limit": 60}),
        )],
    )
    .await;

    assert_eq!(responses.len(), 1);
    assert!(responses[0]["result"].get("isError").is_none());
    let records: Value = serde_json::from_str(text(&responses[0])).unwrap();
    assert_eq!(records[0]["id"], "12345");
    assert_eq!(records[0]["formattedAddress"], "1 Main St, Austin, TX 78701");
}

#[tokio::test]
async fn test_provider_error_is_reported_as_tool_error() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/properties/123"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&provider)
        .await;

    let server = gateway(&provider, 40);
    let responses = run(
        &server,
        &[tool_call(7, "get_property_details", json!({"id": "123"}))],
    )
    .await;

    assert_eq!(responses[0]["id"], 7);
    assert_eq!(responses[0]["result"]["isError"], true);
    let envelope: Value = serde_json::from_str(text(&responses[0])).unwrap();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"], "API Error 404: Not found");
    assert_eq!(envelope["endpoint"], "/properties/123");
    assert!(envelope["timestamp"].is_string());
}

#[tokio::test]
async fn test_session_ceiling_across_tools() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/markets"))
        .and(query_param("dataType", "All"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "78701"})))
        .expect(2)
        .mount(&provider)
        .await;

    let server = gateway(&provider, 2);
    let market = json!({"zipCode": "78701"});
    let responses = run(
        &server,
        &[
            tool_call(1, "analyze_market", market.clone()),
            tool_call(2, "analyze_market", json!({"dataType": "Bogus"})),
            tool_call(3, "analyze_market", market.clone()),
            tool_call(4, "analyze_market", market),
        ],
    )
    .await;

    assert_eq!(responses.len(), 4);
    assert!(responses[0]["result"].get("isError").is_none());

    let rejected: Value = serde_json::from_str(text(&responses[1])).unwrap();
    assert_eq!(rejected["category"], "validation");

    assert!(responses[2]["result"].get("isError").is_none());

    let over_quota: Value = serde_json::from_str(text(&responses[3])).unwrap();
    assert_eq!(over_quota["category"], "quota");
    assert_eq!(over_quota["kind"], "session_quota_exceeded");
}

#[tokio::test]
async fn test_rental_listing_details_route() {
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/listings/rental/long-term/rent-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "rent-9", "price": 2100, "status": "Active"})),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let server = gateway(&provider, 40);
    let responses = run(
        &server,
        &[tool_call(
            1,
            "get_property_details",
            json!({"id": "rent-9", "listingType": "rental"}),
        )],
    )
    .await;

    let listing: Value = serde_json::from_str(text(&responses[0])).unwrap();
    assert_eq!(listing["id"], "rent-9");
    assert_eq!(listing["status"], "Active");
}
