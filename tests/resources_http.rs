//
//  bitbucket-provider
//  tests/resources_http.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Resource lifecycles against a mock Bitbucket server.

use bitbucket_provider::api::common::collect_pages;
use bitbucket_provider::config::ProviderConfig;
use bitbucket_provider::provider::{Provider, StateDocument};
use bitbucket_provider::resources::ProviderContext;
use bitbucket_provider::ProviderError;
use mockito::{Matcher, Server};
use serde_json::{json, Value};

fn context(server: &Server) -> ProviderContext {
    ProviderContext::new(ProviderConfig {
        username: Some("ada".to_string()),
        password: Some("app-password".to_string()),
        base_url: server.url(),
        create_timeout_secs: 5,
        retry_interval_secs: 1,
        ..Default::default()
    })
    .unwrap()
}

fn state(id: &str, attributes: Value) -> StateDocument {
    StateDocument {
        id: Some(id.to_string()),
        attributes,
    }
}

#[tokio::test]
async fn test_collector_follows_next_links() {
    let mut server = Server::new_async().await;
    let next = format!("{}/2.0/things?page=2", server.url());
    let first = server
        .mock("GET", "/2.0/things")
        .with_header("content-type", "application/json")
        .with_body(json!({"values": [1, 2], "page": 1, "next": next}).to_string())
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/2.0/things")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_header("content-type", "application/json")
        .with_body(json!({"values": [3], "page": 2}).to_string())
        .expect(1)
        .create_async()
        .await;

    let ctx = context(&server);
    let items: Vec<u32> = collect_pages(&ctx.client, "2.0/things").await.unwrap();

    assert_eq!(items, vec![1, 2, 3]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_collector_single_page_makes_one_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2.0/things")
        .with_header("content-type", "application/json")
        .with_body(r#"{"values": ["a"], "page": 1, "next": ""}"#)
        .expect(1)
        .create_async()
        .await;

    let ctx = context(&server);
    let items: Vec<String> = collect_pages(&ctx.client, "2.0/things").await.unwrap();

    assert_eq!(items, vec!["a"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_collector_stops_at_page_limit() {
    let mut server = Server::new_async().await;
    let next = format!("{}/2.0/things?page=99", server.url());
    let mock = server
        .mock("GET", "/2.0/things")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(json!({"values": [1], "next": next}).to_string())
        .expect(2)
        .create_async()
        .await;

    let ctx = ProviderContext::new(ProviderConfig {
        base_url: server.url(),
        max_pages: 2,
        ..Default::default()
    })
    .unwrap();
    let err = collect_pages::<u32>(&ctx.client, "2.0/things")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::PaginationLimit { max_pages: 2, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_repository_create_derives_slug_and_id() {
    let mut server = Server::new_async().await;
    let repo_body = json!({
        "uuid": "{r}",
        "name": "demo",
        "full_name": "acme/demo",
        "slug": "demo",
        "scm": "git",
        "is_private": true,
        "fork_policy": "allow_forks",
        "links": {"clone": [{"name": "https", "href": "https://bitbucket.org/acme/demo.git"}]}
    })
    .to_string();
    let create = server
        .mock("POST", "/2.0/repositories/acme/demo")
        .match_body(Matcher::PartialJson(json!({"slug": "demo", "scm": "git"})))
        .with_header("content-type", "application/json")
        .with_body(&repo_body)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("PUT", "/2.0/repositories/acme/demo/pipelines_config")
        .with_body(r#"{"enabled": false}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo")
        .with_header("content-type", "application/json")
        .with_body(&repo_body)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/pipelines_config")
        .with_status(404)
        .create_async()
        .await;

    let ctx = context(&server);
    let created = Provider::new()
        .resource("bitbucket_repository")
        .unwrap()
        .create(&ctx, &json!({"owner": "acme", "name": "demo"}))
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("acme/demo"));
    assert_eq!(created.attributes["slug"], "demo");
    assert_eq!(created.attributes["uuid"], "{r}");
    assert_eq!(created.attributes["pipelines_enabled"], false);
    create.assert_async().await;
}

#[tokio::test]
async fn test_pipelines_enablement_retries_until_accepted() {
    let mut server = Server::new_async().await;
    let repo_body = json!({"uuid": "{r}", "name": "demo", "slug": "demo"}).to_string();
    server
        .mock("POST", "/2.0/repositories/acme/demo")
        .with_header("content-type", "application/json")
        .with_body(&repo_body)
        .create_async()
        .await;
    let rejected = server
        .mock("PUT", "/2.0/repositories/acme/demo/pipelines_config")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("PUT", "/2.0/repositories/acme/demo/pipelines_config")
        .with_body(r#"{"enabled": true}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo")
        .with_header("content-type", "application/json")
        .with_body(&repo_body)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/pipelines_config")
        .with_header("content-type", "application/json")
        .with_body(r#"{"enabled": true}"#)
        .create_async()
        .await;

    let ctx = context(&server);
    let created = Provider::new()
        .resource("bitbucket_repository")
        .unwrap()
        .create(
            &ctx,
            &json!({"owner": "acme", "name": "demo", "pipelines_enabled": true}),
        )
        .await
        .unwrap();

    assert_eq!(created.attributes["pipelines_enabled"], true);
    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_read_of_missing_object_clears_id() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/2.0/workspaces/acme/projects/OPS")
        .with_status(404)
        .with_body(r#"{"type": "error", "error": {"message": "No such project"}}"#)
        .create_async()
        .await;

    let ctx = context(&server);
    let refreshed = Provider::new()
        .resource("bitbucket_project")
        .unwrap()
        .read(
            &ctx,
            &state("acme/OPS", json!({"owner": "acme", "key": "OPS", "name": "Ops"})),
        )
        .await
        .unwrap();

    assert_eq!(refreshed.id, None);
}

#[tokio::test]
async fn test_secured_variable_keeps_local_value() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/pipelines_config/variables/v1")
        .with_header("content-type", "application/json")
        .with_body(r#"{"uuid": "v1", "key": "TOKEN", "secured": true}"#)
        .create_async()
        .await;

    let ctx = context(&server);
    let refreshed = Provider::new()
        .resource("bitbucket_repository_variable")
        .unwrap()
        .read(
            &ctx,
            &state(
                "v1",
                json!({
                    "repository": "acme/demo",
                    "key": "TOKEN",
                    "value": "s3cret",
                    "secured": true,
                    "uuid": "v1"
                }),
            ),
        )
        .await
        .unwrap();

    assert_eq!(refreshed.id.as_deref(), Some("v1"));
    assert_eq!(refreshed.attributes["value"], "s3cret");
}

#[tokio::test]
async fn test_delete_of_absent_object_succeeds() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/2.0/repositories/acme/demo")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let ctx = context(&server);
    Provider::new()
        .resource("bitbucket_repository")
        .unwrap()
        .delete(&ctx, &state("acme/demo", json!({"owner": "acme", "name": "demo"})))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_credentials_surface_as_unauthorized() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/2.0/workspaces/acme/projects/OPS")
        .with_status(401)
        .with_body(r#"{"type": "error", "error": {"message": "Invalid credentials"}}"#)
        .create_async()
        .await;

    let ctx = context(&server);
    let err = Provider::new()
        .resource("bitbucket_project")
        .unwrap()
        .read(&ctx, &state("acme/OPS", json!({})))
        .await
        .unwrap_err();

    match err {
        ProviderError::Unauthorized(message) => assert_eq!(message, "Invalid credentials"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_group_membership_lifecycle() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("PUT", "/1.0/groups/acme/devs/members/u1")
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/1.0/groups/acme/devs/members")
        .with_header("content-type", "application/json")
        .with_body(r#"[{"uuid": "u1", "display_name": "Ada"}, {"uuid": "u2"}]"#)
        .create_async()
        .await;

    let ctx = context(&server);
    let provider = Provider::new();
    let membership = provider.resource("bitbucket_group_membership").unwrap();

    let created = membership
        .create(
            &ctx,
            &json!({"workspace": "acme", "group_slug": "devs", "uuid": "u1"}),
        )
        .await
        .unwrap();
    assert_eq!(created.id.as_deref(), Some("acme/devs/u1"));
    assert_eq!(created.attributes["slug"], "devs");
    add.assert_async().await;

    let unchanged = membership
        .update(
            &ctx,
            &created,
            &json!({"workspace": "acme", "group_slug": "devs", "uuid": "u1"}),
        )
        .await
        .unwrap();
    assert_eq!(unchanged.id.as_deref(), Some("acme/devs/u1"));

    let gone = membership
        .read(
            &ctx,
            &state(
                "acme/devs/u3",
                json!({"workspace": "acme", "group_slug": "devs", "uuid": "u3"}),
            ),
        )
        .await
        .unwrap();
    assert_eq!(gone.id, None);
}

#[tokio::test]
async fn test_import_of_missing_object_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/2.0/workspaces/acme/projects/NOPE")
        .with_status(404)
        .create_async()
        .await;

    let ctx = context(&server);
    let err = Provider::new()
        .resource("bitbucket_project")
        .unwrap()
        .import(&ctx, "acme/NOPE")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_default_reviewers_update_applies_set_difference() {
    let mut server = Server::new_async().await;
    let added = server
        .mock("PUT", "/2.0/repositories/acme/demo/default-reviewers/u3")
        .expect(1)
        .create_async()
        .await;
    let removed = server
        .mock("DELETE", "/2.0/repositories/acme/demo/default-reviewers/u1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let kept = server
        .mock("PUT", "/2.0/repositories/acme/demo/default-reviewers/u2")
        .expect(0)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo/default-reviewers")
        .with_header("content-type", "application/json")
        .with_body(r#"{"values": [{"uuid": "u2"}, {"user": {"uuid": "u3"}}], "page": 1}"#)
        .create_async()
        .await;

    let ctx = context(&server);
    let updated = Provider::new()
        .resource("bitbucket_default_reviewers")
        .unwrap()
        .update(
            &ctx,
            &state(
                "acme/demo/reviewers",
                json!({"owner": "acme", "repository": "demo", "reviewers": ["u1", "u2"]}),
            ),
            &json!({"owner": "acme", "repository": "demo", "reviewers": ["u2", "u3"]}),
        )
        .await
        .unwrap();

    assert_eq!(updated.attributes["reviewers"], json!(["u2", "u3"]));
    added.assert_async().await;
    removed.assert_async().await;
    kept.assert_async().await;
}

#[tokio::test]
async fn test_deployment_variable_read_selects_by_uuid() {
    let mut server = Server::new_async().await;
    let next = format!(
        "{}/2.0/repositories/acme/demo/deployments_config/environments/env1/variables?page=2",
        server.url()
    );
    server
        .mock(
            "GET",
            "/2.0/repositories/acme/demo/deployments_config/environments/env1/variables",
        )
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "values": [{"uuid": "v1", "key": "A", "value": "1", "secured": false}],
                "page": 1,
                "next": next
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;
    server
        .mock(
            "GET",
            "/2.0/repositories/acme/demo/deployments_config/environments/env1/variables",
        )
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"values": [{"uuid": "v2", "key": "B", "value": "2", "secured": false}], "page": 2}"#)
        .expect(2)
        .create_async()
        .await;

    let ctx = context(&server);
    let provider = Provider::new();
    let variable = provider.resource("bitbucket_deployment_variable").unwrap();
    let attributes = |uuid: &str| {
        json!({
            "deployment": "acme/demo:env1",
            "key": "B",
            "value": "old",
            "secured": false,
            "uuid": uuid
        })
    };

    let found = variable
        .read(&ctx, &state("v2", attributes("v2")))
        .await
        .unwrap();
    assert_eq!(found.id.as_deref(), Some("v2"));
    assert_eq!(found.attributes["value"], "2");

    let missing = variable
        .read(&ctx, &state("v9", attributes("v9")))
        .await
        .unwrap();
    assert_eq!(missing.id, None);
}

#[tokio::test]
async fn test_fork_rejects_differing_scm() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/2.0/repositories/up/demo")
        .with_header("content-type", "application/json")
        .with_body(r#"{"slug": "demo", "name": "demo", "scm": "hg"}"#)
        .create_async()
        .await;
    let fork = server
        .mock("POST", "/2.0/repositories/up/demo/forks")
        .expect(0)
        .create_async()
        .await;

    let ctx = context(&server);
    let err = Provider::new()
        .resource("bitbucket_forked_repository")
        .unwrap()
        .create(
            &ctx,
            &json!({
                "owner": "acme",
                "name": "demo",
                "scm": "git",
                "parent": {"owner": "up", "slug": "demo"}
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Validation(_)));
    fork.assert_async().await;
}

#[tokio::test]
async fn test_fork_posts_to_parent_with_target_workspace() {
    let mut server = Server::new_async().await;
    let fork_body = json!({
        "uuid": "{f}",
        "name": "demo-fork",
        "slug": "demo-fork",
        "scm": "git",
        "parent": {"full_name": "up/demo"}
    })
    .to_string();
    server
        .mock("GET", "/2.0/repositories/up/demo")
        .with_header("content-type", "application/json")
        .with_body(r#"{"slug": "demo", "name": "demo", "scm": "git"}"#)
        .create_async()
        .await;
    let fork = server
        .mock("POST", "/2.0/repositories/up/demo/forks")
        .match_body(Matcher::PartialJson(
            json!({"workspace": {"slug": "acme"}, "slug": "demo-fork"}),
        ))
        .with_header("content-type", "application/json")
        .with_body(&fork_body)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("PUT", "/2.0/repositories/acme/demo-fork/pipelines_config")
        .with_body(r#"{"enabled": false}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo-fork")
        .with_header("content-type", "application/json")
        .with_body(&fork_body)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/repositories/acme/demo-fork/pipelines_config")
        .with_status(404)
        .create_async()
        .await;

    let ctx = context(&server);
    let created = Provider::new()
        .resource("bitbucket_forked_repository")
        .unwrap()
        .create(
            &ctx,
            &json!({
                "owner": "acme",
                "name": "demo-fork",
                "parent": {"owner": "up", "slug": "demo"}
            }),
        )
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("acme/demo-fork"));
    assert_eq!(created.attributes["parent"], json!({"owner": "up", "slug": "demo"}));
    fork.assert_async().await;
}

#[tokio::test]
async fn test_workspace_members_collects_every_page() {
    let mut server = Server::new_async().await;
    let next = format!("{}/2.0/workspaces/acme/members?page=2", server.url());
    server
        .mock("GET", "/2.0/workspaces/acme/members")
        .with_header("content-type", "application/json")
        .with_body(
            json!({"values": [{"user": {"uuid": "{a}"}}], "page": 1, "next": next}).to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/2.0/workspaces/acme/members")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"values": [{"user": {"uuid": "{b}"}}, {"user": {}}], "page": 2}"#)
        .expect(1)
        .create_async()
        .await;

    let ctx = context(&server);
    let members = Provider::new()
        .data_source("bitbucket_workspace_members")
        .unwrap()
        .read(&ctx, &json!({"workspace": "acme"}))
        .await
        .unwrap();

    assert_eq!(members.id.as_deref(), Some("acme"));
    assert_eq!(members.attributes["members"], json!(["{a}", "{b}"]));
}

#[tokio::test]
async fn test_ip_ranges_are_fetched_without_credentials() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/ip-ranges")
        .match_header("authorization", Matcher::Missing)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "syncToken": 1700000000,
                "items": [{
                    "network": "104.192.136.0",
                    "mask_len": 21,
                    "cidr": "104.192.136.0/21",
                    "mask": "255.255.248.0",
                    "region": ["us-east-1"],
                    "product": ["bitbucket"],
                    "direction": ["ingress"]
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let ctx = ProviderContext::new(ProviderConfig {
        username: Some("ada".to_string()),
        password: Some("app-password".to_string()),
        base_url: server.url(),
        ip_ranges_url: format!("{}/ip-ranges", server.url()),
        ..Default::default()
    })
    .unwrap();
    let ranges = Provider::new()
        .data_source("bitbucket_ip_ranges")
        .unwrap()
        .read(&ctx, &json!({}))
        .await
        .unwrap();

    assert_eq!(ranges.id.as_deref(), Some("1700000000"));
    assert_eq!(ranges.attributes["ranges"][0]["cidr"], "104.192.136.0/21");
    assert_eq!(ranges.attributes["ranges"][0]["products"], json!(["bitbucket"]));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_data_source_treats_missing_object_as_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/2.0/workspaces/ghost")
        .with_status(404)
        .create_async()
        .await;

    let ctx = context(&server);
    let err = Provider::new()
        .data_source("bitbucket_workspace")
        .unwrap()
        .read(&ctx, &json!({"workspace": "ghost"}))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
