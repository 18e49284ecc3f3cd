//! Contest commands: listing, lookup, and admin edits loaded from JSON files.

use std::fs;
use std::path::Path;

use anyhow::Context;
use contestdesk_client::{ContestCreate, ContestUpdate};
use serde::de::DeserializeOwned;

use crate::cli::{
    ContestAddArgs, ContestIdArgs, ContestListArgs, ContestUpdateArgs, OutputFormat,
};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_contest, render_contest_list};

pub(crate) async fn handle_contest_list(
    ctx: &AppContext,
    args: ContestListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let api = ctx.client.contests();
    let contests = match (args.class_level, args.year) {
        (Some(level), _) => api.by_class(level).await?,
        (None, Some(year)) => api.by_year(year).await?,
        (None, None) => api.list().await?,
    };
    render_contest_list(&contests, format)
}

pub(crate) async fn handle_contest_get(
    ctx: &AppContext,
    args: ContestIdArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let contest = ctx.client.contests().get(args.id).await?;
    render_contest(&contest, format)
}

pub(crate) async fn handle_contest_add(
    ctx: &AppContext,
    args: ContestAddArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let payload: ContestCreate = read_payload(&args.file)?;
    let contest = ctx.client.contests().create(&payload).await?;
    tracing::info!(id = contest.id, "contest created");
    render_contest(&contest, format)
}

pub(crate) async fn handle_contest_update(
    ctx: &AppContext,
    args: ContestUpdateArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let payload: ContestUpdate = read_payload(&args.file)?;
    if payload.is_empty() {
        return Err(CliError::validation(
            "update file must set at least one field",
        ));
    }
    let contest = ctx.client.contests().update(args.id, &payload).await?;
    tracing::info!(id = contest.id, "contest updated");
    render_contest(&contest, format)
}

pub(crate) async fn handle_contest_remove(ctx: &AppContext, args: ContestIdArgs) -> CliResult<()> {
    ctx.client.contests().delete(args.id).await?;
    println!("Contest {} removed", args.id);
    Ok(())
}

/// Load a JSON payload; unreadable files are failures, malformed ones are
/// validation errors.
fn read_payload<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)?;
    serde_json::from_str(&raw)
        .map_err(|err| CliError::validation(format!("invalid payload in {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use contestdesk_client::{
        ADMIN_TOKEN_KEY, ClassLevel, SessionEvent, SessionStream, TokenStore,
    };
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        ctx: AppContext,
        events: SessionStream,
        dir: TempDir,
    }

    fn fixture(server: &MockServer, page_path: &str) -> anyhow::Result<Fixture> {
        let dir = tempfile::tempdir()?;
        let store_path = dir.path().join("storage.json");
        let cli = Cli::try_parse_from([
            "contestdesk".to_string(),
            "--api-url".to_string(),
            server.base_url(),
            "--page-path".to_string(),
            page_path.to_string(),
            "--token-store".to_string(),
            store_path.display().to_string(),
            "token".to_string(),
            "status".to_string(),
        ])?;
        let (ctx, events) = AppContext::from_cli(&cli, "trace-test")
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        Ok(Fixture { ctx, events, dir })
    }

    fn contest_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "class_level": "11",
            "year": 2023,
            "contest_name": "Winter round",
            "contest_url": "https://example.org/winter",
            "solutions": []
        })
    }

    #[tokio::test]
    async fn list_uses_class_endpoint_and_request_id() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/contests/class/11")
                    .header("x-request-id", "trace-test");
                then.status(200).json_body(json!([contest_json(1)]));
            })
            .await;

        let fx = fixture(&server, "/contests")?;
        let args = ContestListArgs {
            class_level: Some(ClassLevel::Eleven),
            year: None,
        };
        assert!(
            handle_contest_list(&fx.ctx, args, OutputFormat::Json)
                .await
                .is_ok()
        );
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn list_by_year_hits_year_endpoint() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/contests/year/2023");
                then.status(200).json_body(json!([]));
            })
            .await;

        let fx = fixture(&server, "/contests")?;
        let args = ContestListArgs {
            class_level: None,
            year: Some(2023),
        };
        assert!(
            handle_contest_list(&fx.ctx, args, OutputFormat::Table)
                .await
                .is_ok()
        );
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn add_sends_file_contents_with_bearer() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/contests")
                    .header("authorization", "Bearer secret-token")
                    .json_body(json!({
                        "class_level": "11",
                        "year": 2023,
                        "contest_name": "Winter round",
                        "contest_url": "https://example.org/winter",
                        "solutions": []
                    }));
                then.status(201).json_body(contest_json(8));
            })
            .await;

        let fx = fixture(&server, "/admin")?;
        fx.ctx.store.set(ADMIN_TOKEN_KEY, "secret-token")?;
        let file = fx.dir.path().join("contest.json");
        fs::write(
            &file,
            r#"{"class_level": 11, "year": 2023, "contest_name": "Winter round", "contest_url": "https://example.org/winter"}"#,
        )?;

        let result = handle_contest_add(&fx.ctx, ContestAddArgs { file }, OutputFormat::Table).await;
        assert!(result.is_ok());
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn add_rejects_malformed_file_as_validation() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let fx = fixture(&server, "/admin")?;
        let file = fx.dir.path().join("broken.json");
        fs::write(&file, r#"{"class_level": "8"}"#)?;

        let result = handle_contest_add(&fx.ctx, ContestAddArgs { file }, OutputFormat::Table).await;
        assert!(matches!(result, Err(CliError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn add_missing_file_is_failure() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let fx = fixture(&server, "/admin")?;
        let file = fx.dir.path().join("absent.json");

        let result = handle_contest_add(&fx.ctx, ContestAddArgs { file }, OutputFormat::Table).await;
        assert!(matches!(result, Err(CliError::Failure(_))));
        Ok(())
    }

    #[tokio::test]
    async fn empty_update_is_rejected_locally() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/contests/2");
                then.status(200).json_body(contest_json(2));
            })
            .await;

        let fx = fixture(&server, "/admin")?;
        let file = fx.dir.path().join("update.json");
        fs::write(&file, "{}")?;

        let result = handle_contest_update(
            &fx.ctx,
            ContestUpdateArgs { id: 2, file },
            OutputFormat::Table,
        )
        .await;
        assert!(matches!(result, Err(CliError::Validation(_))));
        assert_eq!(mock.hits_async().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn get_not_found_maps_to_failure() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/contests/404");
                then.status(404)
                    .json_body(json!({"detail": "Contest with id 404 not found"}));
            })
            .await;

        let fx = fixture(&server, "/contests")?;
        let err = handle_contest_get(&fx.ctx, ContestIdArgs { id: 404 }, OutputFormat::Table)
            .await
            .err();
        let err = err.ok_or_else(|| anyhow::anyhow!("expected an error"))?;
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("Contest with id 404 not found"));
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_remove_clears_stored_token() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/contests/5")
                    .header("authorization", "Bearer stale");
                then.status(401)
                    .json_body(json!({"detail": "Invalid or expired token"}));
            })
            .await;

        let mut fx = fixture(&server, "/admin/contests")?;
        fx.ctx.store.set(ADMIN_TOKEN_KEY, "stale")?;

        let result = handle_contest_remove(&fx.ctx, ContestIdArgs { id: 5 }).await;
        mock.assert_async().await;
        assert!(matches!(result, Err(CliError::Failure(_))));
        assert_eq!(fx.ctx.store.get(ADMIN_TOKEN_KEY)?, None);
        assert_eq!(
            fx.events.try_next(),
            Some(SessionEvent::Expired {
                path: "/admin/contests".to_string()
            })
        );
        Ok(())
    }
}
