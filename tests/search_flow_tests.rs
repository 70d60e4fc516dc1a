use app_lib::{connect, sp_invoke};
use serde_json::{json, Value};
use sorng_sharepoint::{SearchOptions, SharePointConfig, SortSpec};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> SharePointConfig {
  SharePointConfig {
    graph_base_url: server.uri(),
    ..SharePointConfig::default()
  }
}

fn site_hit(url: &str, id: &str) -> Value {
  json!({
    "hitId": id,
    "rank": 1,
    "resource": {
      "@odata.type": "#microsoft.graph.site",
      "id": id,
      "displayName": id,
      "webUrl": url
    }
  })
}

#[tokio::test]
async fn test_site_listing_dedups_across_containers() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/search/query"))
    .and(body_partial_json(json!({"requests": [{
      "entityTypes": ["site"],
      "query": {"queryString": "*"}
    }]})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "value": [{
        "searchTerms": [],
        "hitsContainers": [
          {"hits": [site_hit("https://contoso.sharepoint.com/sites/Engineering", "eng")], "total": 1},
          {"hits": [
            site_hit("https://contoso.sharepoint.com/sites/Engineering", "eng-dup"),
            site_hit("https://contoso.sharepoint.com/sites/Human_Resources", "hr")
          ], "total": 2}
        ]
      }]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let service = connect(config_for(&server), "token").unwrap();
  let env = service.search_sites(&SearchOptions::default()).await;

  assert!(env.success);
  assert!(env.error.is_none());
  assert!(env.message.as_deref().unwrap().contains('2'));

  let data = env.data.unwrap();
  assert_eq!(data["count"], 2);
  let items = data["items"].as_array().unwrap();
  assert_eq!(items.len(), 2);
  assert_eq!(items[0]["id"], "eng");
  assert_eq!(items[0]["title"], "Engineering");
  assert_eq!(items[1]["title"], "Human Resources");
}

#[tokio::test]
async fn test_page_search_clamps_and_sorts() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/search/query"))
    .and(body_partial_json(json!({"requests": [{
      "entityTypes": ["listItem"],
      "query": {"queryString": "onboarding"},
      "size": 50,
      "from": 10,
      "sortProperties": [{"name": "lastModifiedDateTime", "isDescending": true}]
    }]})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "value": [{"hitsContainers": [{"hits": [{
        "resource": {
          "id": "p1",
          "webUrl": "https://contoso.sharepoint.com/sites/eng/SitePages/KT-Session.aspx",
          "parentReference": {"siteId": "contoso.sharepoint.com,1,2"},
          "sharepointIds": {"listItemId": "12"}
        }
      }], "moreResultsAvailable": true}]}]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let service = connect(config_for(&server), "token").unwrap();
  let options = SearchOptions {
    query: Some("onboarding".into()),
    top: Some(10_000),
    offset: 10,
    sort: Some(SortSpec::descending("lastModifiedDateTime")),
  };
  let env = service.search_pages(&options).await;

  assert!(env.success);
  let data = env.data.unwrap();
  assert_eq!(data["more_results_available"], true);
  assert_eq!(data["items"][0]["title"], "KT Session");
  assert_eq!(data["items"][0]["site_id"], "contoso.sharepoint.com,1,2");
  assert_eq!(data["items"][0]["list_item_id"], "12");
}

#[tokio::test]
async fn test_invoke_passthrough_with_odata() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/sites/s1/lists/l1/items"))
    .and(query_param("$expand", "fields"))
    .and(query_param("$filter", "fields/Status eq 'Open'"))
    .and(header("authorization", "Bearer token"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"id": "1"}]})))
    .expect(1)
    .mount(&server)
    .await;

  let service = connect(config_for(&server), "token").unwrap();
  let out = sp_invoke(
    &service,
    "list_items",
    r#"{"path": {"site_id": "s1", "list_id": "l1"},
        "query": {"expand": ["fields"], "filter": "fields/Status eq 'Open'"}}"#,
  )
  .await;

  let v: Value = serde_json::from_str(&out).unwrap();
  assert_eq!(v["success"], true);
  assert_eq!(v["data"]["value"][0]["id"], "1");
}

#[tokio::test]
async fn test_invoke_soft_failures() {
  let server = MockServer::start().await;
  let service = connect(config_for(&server), "token").unwrap();

  let v: Value = serde_json::from_str(&sp_invoke(&service, "get_site", "not json").await).unwrap();
  assert_eq!(v["success"], false);
  assert!(v["error"].as_str().unwrap().starts_with("Invalid arguments for get_site"));

  let v: Value = serde_json::from_str(&sp_invoke(&service, "get_list", "").await).unwrap();
  assert_eq!(v["success"], false);
  assert_eq!(v["error"], "Missing required parameter: site_id");
  assert!(v.get("data").is_none());
}

#[tokio::test]
async fn test_invoke_list_all_pages() {
  let server = MockServer::start().await;
  let next = format!("{}/sites/s1/lists/next", server.uri());
  Mock::given(method("GET"))
    .and(path("/sites/s1/lists"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "value": [{"id": "a"}],
      "@odata.nextLink": next
    })))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/sites/s1/lists/next"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"id": "b"}]})))
    .mount(&server)
    .await;

  let service = connect(config_for(&server), "token").unwrap();
  let out = sp_invoke(&service, "list_all:list_lists", r#"{"path": {"site_id": "s1"}}"#).await;
  let v: Value = serde_json::from_str(&out).unwrap();
  assert_eq!(v["success"], true);
  assert_eq!(v["data"]["count"], 2);
}

#[tokio::test]
async fn test_invoke_list_all_reports_graph_errors() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/sites/s1/lists"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "error": {"code": "generalException", "message": "Something broke"}
    })))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/sites/s1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "s1"})))
    .mount(&server)
    .await;

  let service = connect(config_for(&server), "token").unwrap();
  let args = r#"{"path": {"site_id": "s1"}}"#;

  let single: Value = serde_json::from_str(&sp_invoke(&service, "list_lists", args).await).unwrap();
  let paged: Value = serde_json::from_str(&sp_invoke(&service, "list_all:list_lists", args).await).unwrap();
  assert_eq!(paged["success"], false);
  assert_eq!(paged["error"], single["error"]);
  assert_eq!(paged["error"], "generalException: Something broke");

  let v: Value = serde_json::from_str(&sp_invoke(&service, "list_all:get_site", args).await).unwrap();
  assert_eq!(v["success"], false);
  assert!(v["error"].as_str().unwrap().contains("get_site"));
}

#[tokio::test]
async fn test_invoke_search_with_options() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/search/query"))
    .and(body_partial_json(json!({"requests": [{"entityTypes": ["driveItem"], "size": 500}]})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"hitsContainers": []}]})))
    .expect(1)
    .mount(&server)
    .await;

  let service = connect(config_for(&server), "token").unwrap();
  let out = sp_invoke(&service, "search_files", r#"{"query": "budget", "top": 9999}"#).await;
  let v: Value = serde_json::from_str(&out).unwrap();
  assert_eq!(v["success"], true);
  assert_eq!(v["message"], "Found 0 files");
}
