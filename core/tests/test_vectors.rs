//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector describes an operation's input, the request it must build, a
//! simulated response and either the parsed result or the exact error
//! message. Bodies are compared as parsed JSON so field order in the vector
//! file does not matter.

use samples_core::{
    ApiError, ClientConfig, HttpMethod, HttpResponse, SampleClient, SampleFilter, SampleQuery,
};
use serde_json::Value;

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn query_from(input: &Value) -> SampleQuery {
    let defaults = SampleQuery::default();
    SampleQuery {
        limit: input["limit"].as_u64().map_or(defaults.limit, |n| n as u32),
        offset: input["offset"].as_u64().map_or(defaults.offset, |n| n as u32),
        from_time: text(&input["from_time"]),
        to_time: text(&input["to_time"]),
    }
}

fn filter_from(input: &Value) -> SampleFilter {
    let mut filter = SampleFilter::new(input["polygon"].clone());
    if let Some(limit) = input["limit"].as_u64() {
        filter.limit = limit as u32;
    }
    if let Some(offset) = input["offset"].as_u64() {
        filter.offset = offset as u32;
    }
    filter.from_time = text(&input["from_time"]);
    filter.to_time = text(&input["to_time"]);
    filter
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(sim: &Value) -> HttpResponse {
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: text(&sim["content_type"])
            .map(|ct| vec![("Content-Type".to_string(), ct)])
            .unwrap_or_default(),
        body: text(&sim["body"]),
    }
}

#[test]
fn samples_test_vectors() {
    let raw = include_str!("../../test-vectors/samples.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base = vectors["base_url"].as_str().unwrap();
    // No transport: vectors drive `build_*` and `parse_json` directly.
    let client = SampleClient::new(&ClientConfig::new(base), ()).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];

        let req = match case["operation"].as_str().unwrap() {
            "get_samples" => client.build_get_samples(&query_from(input)),
            "ingest_samples" => client.build_ingest_samples(input),
            "filter_samples" => client.build_filter_samples(&filter_from(input)),
            other => panic!("{name}: unknown operation {other}"),
        }
        .unwrap();

        // Verify build
        let expected_req = &case["expected_request"];
        assert_eq!(
            req.effective_method(),
            parse_method(expected_req["method"].as_str().unwrap()),
            "{name}: method"
        );
        assert_eq!(req.url, expected_req["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body"),
        }

        // Verify parse
        let response = simulated(&case["simulated_response"]);
        let parsed: Result<Value, ApiError> = client.parse_json(&req, &response);
        match case.get("expected_error") {
            Some(expected) => {
                let err = parsed.expect_err(name);
                assert_eq!(err.to_string(), expected.as_str().unwrap(), "{name}: error");
            }
            None => {
                let value = parsed.unwrap_or_else(|e| panic!("{name}: {e}"));
                assert_eq!(value, case["expected_result"], "{name}: parsed result");
            }
        }
    }
}
