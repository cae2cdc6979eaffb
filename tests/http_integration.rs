//! Integration tests for the Coolify client using wiremock
//!
//! These tests drive the real client against mocked endpoints, checking
//! version fallback, cache behavior and response decoding. Request counts
//! are asserted through `Mock::expect`, verified when the server drops.

use coolify_client::{ApiError, CoolifyClient, PageShape};
use serde_json::json;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> CoolifyClient {
    CoolifyClient::builder(&server.uri(), "test-token")
        .build()
        .expect("client should build")
}

fn uncached_client(server: &MockServer) -> CoolifyClient {
    CoolifyClient::builder(&server.uri(), "test-token")
        .without_cache()
        .build()
        .expect("client should build")
}

fn apps_body() -> serde_json::Value {
    json!({
        "data": [
            {"id": 1, "uuid": "app-1", "name": "web", "fqdn": "https://web.example.com", "status": "running"},
            {"id": 2, "uuid": "app-2", "name": "worker", "fqdn": null, "status": "exited"}
        ],
        "pagination": {"current_page": 1, "last_page": 2, "per_page": 2, "total": 4}
    })
}

/// Version fallback and pinning
mod version_fallback_tests {
    use super::*;

    /// A 404 on v4 falls through to v3, which is then pinned
    #[tokio::test]
    async fn test_not_found_falls_back_and_pins() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found."})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v3/applications"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(apps_body()))
            .expect(2)
            .mount(&server)
            .await;

        let client = uncached_client(&server);
        assert_eq!(client.api_version().as_str(), "v4");

        let first = client.list_applications(1, 2).await.expect("v3 should answer");
        assert_eq!(first.items().len(), 2);
        assert_eq!(first.items()[0].uuid, "app-1");
        assert_eq!(client.api_version().as_str(), "v3");

        // Pinned: goes straight to v3, v4 is not asked again
        let second = client.list_applications(1, 2).await.expect("v3 should answer");
        assert_eq!(second.items().len(), 2);
    }

    /// Unauthorized stops the probe immediately
    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v3/applications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(apps_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client.list_applications(1, 2).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(client.api_version().as_str(), "v4");
    }

    /// Server errors are surfaced with status and body, without probing
    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/databases"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v3/databases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server).list_databases(1, 5).await.unwrap_err();
        match err {
            ApiError::UnexpectedStatus { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    /// Bad request is its own error kind
    #[tokio::test]
    async fn test_bad_request_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/environments"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid token"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).list_environments(1, 5).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    /// When every candidate says not found, the last not-found is returned
    #[tokio::test]
    async fn test_last_candidate_not_found_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("v4 missing"))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v3/applications/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("v3 missing"))
            .expect(2)
            .mount(&server)
            .await;

        let client = CoolifyClient::builder(&server.uri(), "test-token")
            .fallback_versions(["v4", "v3"])
            .build()
            .unwrap();

        match client.get_application("gone").await.unwrap_err() {
            ApiError::NotFound { body } => assert_eq!(body, "v3 missing"),
            other => panic!("expected NotFound, got {other:?}"),
        }

        // Nothing succeeded, so the pin is unchanged and the probe repeats
        assert_eq!(client.api_version().as_str(), "v4");
        assert!(client.get_application("gone").await.unwrap_err().is_not_found());
    }

    /// A pinned version that starts returning 404 re-probes and re-pins
    #[tokio::test]
    async fn test_pinned_version_can_move() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/deployments"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"uuid": "dep-1", "status": "finished"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoolifyClient::builder(&server.uri(), "test-token")
            .api_version("3")
            .build()
            .unwrap();

        let listing = client.list_deployments(1, 5).await.unwrap();
        assert_eq!(listing.items()[0].uuid, "dep-1");
        assert_eq!(client.api_version().as_str(), "v4");
    }

    /// Concurrent cold calls all succeed and settle on a working version
    #[tokio::test]
    async fn test_concurrent_probes_settle_on_working_version() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v3/applications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(apps_body()))
            .mount(&server)
            .await;

        let client = uncached_client(&server);
        let calls = (0..8).map(|_| {
            let client = client.clone();
            async move { client.list_applications(1, 2).await }
        });
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(client.api_version().as_str(), "v3");
    }

    /// Network failures surface as transport errors
    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let client = CoolifyClient::builder("http://127.0.0.1:1", "test-token")
            .build()
            .unwrap();
        let err = client.list_applications(1, 5).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(client.api_version().as_str(), "v4");
    }
}

/// Cache hits and invalidation
mod cache_tests {
    use super::*;

    /// List reads are cached per (page, per_page)
    #[tokio::test]
    async fn test_list_is_served_from_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "2"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(apps_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let first = client.list_applications(1, 2).await.unwrap();
        let second = client.list_applications(1, 2).await.unwrap();

        assert_eq!(first.current_page, 1);
        assert_eq!(first.total_pages, 2);
        assert!(std::sync::Arc::ptr_eq(first.page(), second.page()));
    }

    /// A successful delete evicts the detail entry
    #[tokio::test]
    async fn test_delete_invalidates_detail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications/app-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "uuid": "app-1", "name": "web", "status": "running",
                "git_repository": "org/web", "git_branch": "main"
            })))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/api/v4/applications/app-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Deletion request queued."})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let detail = client.get_application("app-1").await.unwrap();
        assert_eq!(detail.git_branch.as_deref(), Some("main"));

        // cached
        client.get_application("app-1").await.unwrap();

        client.delete_application("app-1").await.unwrap();

        // cache miss, second network call
        client.get_application("app-1").await.unwrap();
    }

    /// A failed mutation leaves the cache untouched
    #[tokio::test]
    async fn test_failed_delete_keeps_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications/app-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uuid": "app-1", "name": "web"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/api/v4/applications/app-1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client.get_application("app-1").await.unwrap();
        assert!(client.delete_application("app-1").await.is_err());
        client.get_application("app-1").await.unwrap();
    }

    /// Starting a deployment sends its flags and evicts app and deployment lists
    #[tokio::test]
    async fn test_start_invalidates_lists() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(apps_body()))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications/app-1/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/databases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications/app-1/start"))
            .and(query_param("force", "true"))
            .and(query_param("instant_deploy", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Deployment request queued.",
                "deployment_uuid": "dep-9"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client.list_applications(1, 2).await.unwrap();
        client.list_application_deployments("app-1", 1, 5).await.unwrap();
        client.list_databases(1, 5).await.unwrap();

        let started = client.start_application("app-1", true, true).await.unwrap();
        assert_eq!(started.deployment_uuid.as_deref(), Some("dep-9"));

        client.list_applications(1, 2).await.unwrap();
        client.list_application_deployments("app-1", 1, 5).await.unwrap();
        // unrelated family stays cached
        client.list_databases(1, 5).await.unwrap();
    }

    /// Database actions evict the database detail
    #[tokio::test]
    async fn test_database_stop_invalidates_detail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/databases/db-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": "db-1", "name": "pg", "status": "running", "port": 5432
            })))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/databases/db-1/stop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Database stopping request queued."})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let db = client.get_database("db-1").await.unwrap();
        assert_eq!(db.port.as_deref(), Some("5432"));

        let stopped = client.stop_database("db-1").await.unwrap();
        assert!(stopped.message.contains("stopping"));

        client.get_database("db-1").await.unwrap();
    }
}

/// Response shapes and query parameters
mod decoding_tests {
    use super::*;

    /// Bare arrays decode with empty pagination; per_page is back-filled
    #[tokio::test]
    async fn test_bare_array_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/environments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "production", "project_id": 3},
                {"id": 2, "name": "staging", "project_id": 3}
            ])))
            .mount(&server)
            .await;

        let listing = client(&server).list_environments(2, 2).await.unwrap();
        assert_eq!(listing.page().shape, PageShape::BareArray);
        assert_eq!(listing.items()[1].name, "staging");
        assert_eq!(listing.pagination().per_page, 2);
        // full page without metadata: assume one more
        assert_eq!((listing.current_page, listing.total_pages), (2, 3));
    }

    /// meta.pagination is honored
    #[tokio::test]
    async fn test_meta_pagination_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"uuid": "d1", "status": "finished"}],
                "meta": {"pagination": {"current_page": 3, "last_page": 7, "per_page": 1, "total": 7}}
            })))
            .mount(&server)
            .await;

        let listing = client(&server).list_deployments(3, 1).await.unwrap();
        assert_eq!(listing.page().shape, PageShape::Envelope);
        assert_eq!((listing.current_page, listing.total_pages), (3, 7));
    }

    /// Page parameters are omitted when not positive
    #[tokio::test]
    async fn test_zero_page_omits_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/databases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let listing = client(&server).list_databases(0, 0).await.unwrap();
        assert!(listing.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), None);
    }

    /// Logs default to every line
    #[tokio::test]
    async fn test_logs_request_all_lines() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications/app-1/logs"))
            .and(query_param("lines", "-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logs": "line one\nline two"})))
            .expect(1)
            .mount(&server)
            .await;

        let logs = client(&server).get_application_logs("app-1", None).await.unwrap();
        assert_eq!(logs, "line one\nline two");
    }

    /// Env vars accept a bare array
    #[tokio::test]
    async fn test_envs_bare_array() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications/app-1/envs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"key": "DATABASE_URL", "value": "postgres://", "is_build_time": false},
                {"key": "NODE_ENV", "value": "production", "is_build_time": true}
            ])))
            .mount(&server)
            .await;

        let envs = client(&server).get_application_envs("app-1").await.unwrap();
        assert_eq!(envs.len(), 2);
        assert_eq!(envs[1].key, "NODE_ENV");
        assert!(envs[1].is_build_time);
    }

    /// A body in no known shape is a decode failure, not an empty result
    #[tokio::test]
    async fn test_unknown_shape_is_decode_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client(&server).list_applications(1, 5).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    /// An object with no items and no pagination is not an empty list
    #[tokio::test]
    async fn test_message_object_is_decode_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Service under maintenance"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/applications/app-1/envs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Unauthenticated."})))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client.list_applications(1, 5).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));

        let err = client.get_application_envs("app-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));

        // nothing was cached for the failed list
        assert!(client.cache().unwrap().is_empty());
    }

    /// Base URLs with a trailing slash still produce clean paths
    #[tokio::test]
    async fn test_trailing_slash_base_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/deployments/dep-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "deployment_uuid": "dep-1", "status": "in_progress", "application_name": "web"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoolifyClient::builder(&format!("{}/", server.uri()), "test-token")
            .build()
            .unwrap();
        let dep = client.get_deployment("dep-1").await.unwrap();
        assert_eq!(dep.deployment_uuid.as_deref(), Some("dep-1"));
        assert_eq!(dep.application_name.as_deref(), Some("web"));
    }
}
