//! Subcommand dispatch. Every command returns the JSON value to print.

use crate::{Command, FolderAction, ItemAction, LibraryAction, MetadataAction, ScopeAction};
use anyhow::{anyhow, Result};
use metaext_core::matching::{closest_library, switch_library};
use metaext_core::MetaExt;
use serde_json::{json, Value};
use tracing::info;

pub(crate) async fn run(ctx: &MetaExt, command: Command) -> Result<Value> {
    match command {
        Command::App { action } => app(ctx, action),
        Command::Item { action } => item(ctx, action),
        Command::Library { action } => library(ctx, action).await,
        Command::Folder { action } => folder(ctx, action).await,
        Command::Metadata { action } => metadata(ctx, action).await,
        Command::Scores { query } => {
            let scores = closest_library(ctx.web_api().as_ref(), &query).await?;
            Ok(scores
                .into_iter()
                .map(|m| json!({ "path": m.path, "name": m.name, "score": m.score }))
                .collect())
        }
        Command::Switch {
            query,
            exact,
            threshold,
        } => match ctx.switch_library(&query, exact, threshold).await? {
            Some(result) => Ok(result),
            None => Err(anyhow!("No library named {:?} in history", query)),
        },
    }
}

/// Parse a command-line value as JSON, falling back to a string.
pub(crate) fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn app(ctx: &MetaExt, action: ScopeAction) -> Result<Value> {
    let config = ctx.app_config()?;
    match action {
        ScopeAction::Get { scope } => Ok(Value::Object(config.scope(scope.as_deref())?)),
        ScopeAction::Set { scope, key, value } => {
            config.set_scope_value(scope.as_deref(), &key, parse_value(&value))?;
            info!("Updated {}", config.path().display());
            Ok(Value::Object(config.scope(scope.as_deref())?))
        }
    }
}

fn item(ctx: &MetaExt, action: ItemAction) -> Result<Value> {
    match action {
        ItemAction::Show { item_file } => {
            let doc = ctx.item_metaext(&item_file)?;
            Ok(Value::Object((*doc.read()?).clone()))
        }
        ItemAction::Set {
            item_file,
            key,
            value,
        } => {
            let doc = ctx.item_metaext(&item_file)?;
            let updated = doc.update(|map| {
                map.insert(key, parse_value(&value));
                map.clone()
            })?;
            Ok(Value::Object(updated))
        }
    }
}

async fn library(ctx: &MetaExt, action: LibraryAction) -> Result<Value> {
    let config = ctx.library_config().await?;
    match action {
        LibraryAction::Show => Ok(serde_json::to_value(&*config.data()?)?),
        LibraryAction::Set { key, value } => {
            config.set_config_value(&key, parse_value(&value))?;
            Ok(Value::Object(config.config()?))
        }
        LibraryAction::Tag { tag_id } => Ok(config.tag_config(&tag_id)?.unwrap_or(Value::Null)),
    }
}

async fn folder(ctx: &MetaExt, action: FolderAction) -> Result<Value> {
    let config = ctx.library_config().await?;
    match action {
        FolderAction::List => Ok(json!(config.folder_ids()?)),
        FolderAction::Get { folder_id } => Ok(config
            .folder_config(&folder_id)
            .config()?
            .map(Value::Object)
            .unwrap_or(Value::Null)),
        FolderAction::Set {
            folder_id,
            key,
            value,
        } => {
            let folder = config.folder_config(&folder_id);
            folder.set(&key, parse_value(&value))?;
            Ok(folder.config()?.map(Value::Object).unwrap_or(Value::Null))
        }
        FolderAction::Remove { folder_id } => {
            Ok(json!({ "removed": config.folder_config(&folder_id).remove()? }))
        }
    }
}

async fn metadata(ctx: &MetaExt, action: MetadataAction) -> Result<Value> {
    let library = ctx.library_directory().await?;
    let found = match action {
        MetadataAction::Folder { folder_id } => library
            .folder_by_id(&folder_id)?
            .map(serde_json::to_value)
            .transpose()?,
        MetadataAction::TagGroup { name } => library
            .tags_group_by_name(&name)?
            .map(serde_json::to_value)
            .transpose()?,
    };
    Ok(found.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("3"), json!(3));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value(r#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(parse_value("hello world"), json!("hello world"));
    }
}
