//! Quota Command Integration Tests
//!
//! Parses `lenses quota ...` command lines and runs them against a mock
//! administration API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write as _;
use std::time::Duration;

use clap::Parser;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lenses_client::infrastructure::cli::args::ListQuotasArgs;
use lenses_client::infrastructure::cli::{Cli, Command, run_list, run_quota};
use lenses_client::infrastructure::rest::TOKEN_HEADER;
use lenses_client::{CommandError, LensesHttpClient, QuotaCommands, RestConfig};

fn commands(server: &MockServer) -> QuotaCommands<LensesHttpClient> {
    let client = LensesHttpClient::new(&RestConfig {
        host: server.uri(),
        token: "tok".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    QuotaCommands::new(client)
}

async fn run(server: &MockServer, argv: &[&str]) -> Result<String, CommandError> {
    let cli = Cli::try_parse_from(argv).unwrap();
    let Command::Quota { scope } = cli.command else {
        panic!("expected a quota command");
    };
    run_quota(&commands(server), scope).await
}

#[tokio::test]
async fn users_set_for_all_clients() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/quotas/users/bob/clients"))
        .and(header(TOKEN_HEADER, "tok"))
        .and(body_json(serde_json::json!({
            "producer_byte_rate": "100000",
            "consumer_byte_rate": "200000"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let message = run(
        &server,
        &[
            "lenses",
            "quota",
            "users",
            "set",
            "--quota-user",
            "bob",
            "--quota-client",
            "all",
            "--quota-config",
            r#"{"producer_byte_rate":"100000","consumer_byte_rate":"200000"}"#,
        ],
    )
    .await
    .unwrap();

    assert_eq!(message, "Quota for user bob and all clients set");
}

#[tokio::test]
async fn users_set_from_file() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/quotas/users/bob/clients/app"))
        .and(body_json(serde_json::json!({"request_percentage": "75"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Config:\n  request_percentage: \"75\"\nUser: bob\nClient: app"
    )
    .unwrap();
    let file_path = file.path().to_str().unwrap().to_string();

    let message = run(
        &server,
        &["lenses", "quota", "users", "set", "--file", &file_path],
    )
    .await
    .unwrap();

    assert_eq!(message, "Quota for user bob and client app set");
}

#[tokio::test]
async fn users_set_without_config_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = run(&server, &["lenses", "quota", "users", "set"])
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::MissingFlag("quota-config")));
}

#[tokio::test]
async fn clients_set_default() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/quotas/clients"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let message = run(
        &server,
        &[
            "lenses",
            "quota",
            "clients",
            "update",
            "--quota-client",
            "*",
            "--quota-config",
            r#"{"producer_byte_rate":"1"}"#,
        ],
    )
    .await
    .unwrap();

    assert_eq!(message, "Default client quota created/updated");
}

#[tokio::test]
async fn users_delete_whole_quota() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/quotas/users/bob"))
        .and(body_json(serde_json::json!([
            "producer_byte_rate",
            "consumer_byte_rate",
            "request_percentage"
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let message = run(
        &server,
        &["lenses", "quota", "users", "delete", "--quota-user", "bob"],
    )
    .await
    .unwrap();

    assert_eq!(message, "Quota for user bob deleted");
}

#[tokio::test]
async fn clients_delete_keys_is_an_update() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/quotas/clients/app"))
        .and(body_json(serde_json::json!(["consumer_byte_rate"])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let message = run(
        &server,
        &[
            "lenses",
            "quota",
            "clients",
            "delete",
            "--quota-client",
            "app",
            "consumer_byte_rate",
        ],
    )
    .await
    .unwrap();

    assert_eq!(message, "Quota for client app updated");
}

#[tokio::test]
async fn delete_missing_quota_is_friendly() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/quotas/users/ghost/clients/app"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = run(
        &server,
        &[
            "lenses",
            "quota",
            "users",
            "delete",
            "--quota-user",
            "ghost",
            "--quota-client",
            "app",
        ],
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unable to delete, quota for user: 'ghost' and client: 'app' does not exist"
    );
}

#[tokio::test]
async fn delete_without_rights_is_friendly() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/quotas/users"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = run(
        &server,
        &["lenses", "quota", "users", "delete", "request_percentage"],
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unable to update quota, user has no rights for this action"
    );
}

#[tokio::test]
async fn list_prints_lines_and_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/quotas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "entityType": "CLIENT",
                "entityName": "app",
                "properties": {"producer_byte_rate": "100"},
                "url": "/api/quotas/clients/app",
                "isAuthorized": true
            }
        ])))
        .mount(&server)
        .await;

    let commands = commands(&server);

    let mut out = Vec::new();
    run_list(&commands, &ListQuotasArgs { json: false }, &mut out)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "CLIENT app producer_byte_rate=100\n"
    );

    let mut out = Vec::new();
    run_list(&commands, &ListQuotasArgs { json: true }, &mut out)
        .await
        .unwrap();
    let listed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(listed[0]["entityName"], "app");
    assert_eq!(listed[0]["isAuthorized"], true);
}
