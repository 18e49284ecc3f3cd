//! Admin token management. The CLI stands in for the sign-in flow that
//! writes the token; the client itself only ever reads and deletes it.

use contestdesk_client::{ADMIN_TOKEN_KEY, TokenStore};

use crate::cli::TokenSetArgs;
use crate::client::{AppContext, CliError, CliResult};

pub(crate) fn handle_token_set(ctx: &AppContext, args: TokenSetArgs) -> CliResult<()> {
    let token = args.value.trim();
    if token.is_empty() {
        return Err(CliError::validation("token must not be empty"));
    }
    ctx.store.set(ADMIN_TOKEN_KEY, token)?;
    tracing::info!(store = %ctx.store.path().display(), "admin token stored");
    println!("Admin token stored in {}", ctx.store.path().display());
    Ok(())
}

pub(crate) fn handle_token_clear(ctx: &AppContext) -> CliResult<()> {
    ctx.store.delete(ADMIN_TOKEN_KEY)?;
    println!("Admin token cleared");
    Ok(())
}

pub(crate) fn handle_token_status(ctx: &AppContext) -> CliResult<()> {
    let present = ctx
        .store
        .get(ADMIN_TOKEN_KEY)?
        .is_some_and(|token| !token.trim().is_empty());
    if present {
        println!("Admin token present ({})", ctx.store.path().display());
    } else {
        println!("No admin token stored");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn context() -> anyhow::Result<(AppContext, TempDir)> {
        let dir = tempfile::tempdir()?;
        let store_path = dir.path().join("nested").join("storage.json");
        let cli = Cli::try_parse_from([
            "contestdesk".to_string(),
            "--token-store".to_string(),
            store_path.display().to_string(),
            "token".to_string(),
            "status".to_string(),
        ])?;
        let (ctx, _events) = AppContext::from_cli(&cli, "trace-test")
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        Ok((ctx, dir))
    }

    #[test]
    fn set_trims_and_persists_token() -> anyhow::Result<()> {
        let (ctx, _dir) = context()?;
        let result = handle_token_set(
            &ctx,
            TokenSetArgs {
                value: "  fresh-token \n".to_string(),
            },
        );
        assert!(result.is_ok());
        assert_eq!(
            ctx.store.get(ADMIN_TOKEN_KEY)?.as_deref(),
            Some("fresh-token")
        );
        let raw = fs::read_to_string(ctx.store.path())?;
        let parsed: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(parsed[ADMIN_TOKEN_KEY], "fresh-token");
        Ok(())
    }

    #[test]
    fn blank_token_is_validation_error() -> anyhow::Result<()> {
        let (ctx, _dir) = context()?;
        let result = handle_token_set(
            &ctx,
            TokenSetArgs {
                value: "   ".to_string(),
            },
        );
        assert!(matches!(result, Err(CliError::Validation(_))));
        assert_eq!(ctx.store.get(ADMIN_TOKEN_KEY)?, None);
        Ok(())
    }

    #[test]
    fn clear_removes_token_and_tolerates_absence() -> anyhow::Result<()> {
        let (ctx, _dir) = context()?;
        assert!(handle_token_clear(&ctx).is_ok());
        ctx.store.set(ADMIN_TOKEN_KEY, "to-remove")?;
        assert!(handle_token_clear(&ctx).is_ok());
        assert_eq!(ctx.store.get(ADMIN_TOKEN_KEY)?, None);
        Ok(())
    }

    #[test]
    fn status_fails_on_corrupt_store() -> anyhow::Result<()> {
        let (ctx, _dir) = context()?;
        assert!(handle_token_status(&ctx).is_ok());
        if let Some(parent) = ctx.store.path().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(ctx.store.path(), "not json")?;
        let result = handle_token_status(&ctx);
        assert!(matches!(result, Err(CliError::Failure(_))));
        Ok(())
    }
}
