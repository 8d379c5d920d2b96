//! wiremock 模拟的 OpenSearch 域，仅用于测试。

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use flate2::read::GzDecoder;
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, Request, ResponseTemplate};

use super::{SearchClient, Unsigned};

pub(crate) fn test_client(server: &MockServer) -> SearchClient {
    SearchClient::new(&server.uri(), Arc::new(Unsigned), Duration::from_secs(5)).unwrap()
}

/// `_cat/indices` 返回给定的 (index, status) 列表
pub(crate) async fn mount_catalog(server: &MockServer, entries: &[(&str, &str)]) {
    let body: Vec<_> = entries
        .iter()
        .map(|(index, status)| {
            json!({
                "health": "green",
                "status": status,
                "index": index,
                "pri": "1",
                "rep": "1",
                "docs.count": "42"
            })
        })
        .collect();
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/_cat/indices"))
        .and(matchers::query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// 某个索引的 collapse 查询返回给定的 webaclId
pub(crate) async fn mount_acl_ids(server: &MockServer, index: &str, ids: &[&str]) {
    let hits: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "_index": index,
                "_id": format!("doc-{id}"),
                "_score": 1.0,
                "fields": { "webaclId.keyword": [id] }
            })
        })
        .collect();
    Mock::given(matchers::method("POST"))
        .and(matchers::path(format!("/{index}/_search")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 3,
            "timed_out": false,
            "hits": { "total": { "value": ids.len(), "relation": "eq" }, "hits": hits }
        })))
        .mount(server)
        .await;
}

/// 任意 `/<index>/_bulk` 都回 200
pub(crate) async fn mount_bulk_ok(server: &MockServer) {
    Mock::given(matchers::method("POST"))
        .and(matchers::path_regex(r"^/[^/]+/_bulk$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "took": 7, "errors": false, "items": [] })),
        )
        .mount(server)
        .await;
}

pub(crate) fn gunzip(data: &[u8]) -> String {
    let mut out = String::new();
    GzDecoder::new(data).read_to_string(&mut out).unwrap();
    out
}

fn is_bulk(request: &Request) -> bool {
    request.url.path().ends_with("/_bulk")
}

/// 已收到的 bulk 请求：(路径, 解压后的请求体)
pub(crate) async fn bulk_requests(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(is_bulk)
        .map(|r| {
            let gzipped = r
                .headers
                .get("content-encoding")
                .map(|v| v.as_bytes() == b"gzip")
                .unwrap_or(false);
            let body = if gzipped {
                gunzip(&r.body)
            } else {
                String::from_utf8(r.body.clone()).unwrap()
            };
            (r.url.path().to_string(), body)
        })
        .collect()
}
