//! Model discovery commands for Offchat
//!
//! This module provides the `models list` and `models info` commands,
//! which query the inference server directly without starting a chat.

use crate::config::Config;
use crate::error::{OffchatError, Result};
use crate::inference::{InferenceBackend, ModelInfo, OllamaClient};
use crate::registry::ModelRegistry;
use prettytable::{row, Table};

/// List the models available on the inference server
///
/// # Arguments
///
/// * `config` - Configuration containing the server settings
/// * `json` - Print a JSON array instead of a table
///
/// # Returns
///
/// Returns Ok(()) on success, error if the server cannot be queried
///
/// # Examples
///
/// ```no_run
/// use offchat::config::Config;
/// use offchat::commands::models::list_models;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load("config/config.yaml", &Default::default())?;
/// list_models(&config, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn list_models(config: &Config, json: bool) -> Result<()> {
    tracing::info!("Listing models from {}", config.inference.host);

    let client = OllamaClient::new(config.inference.host.clone())?;
    let models = client
        .list_models(config.inference.metadata_timeout())
        .await
        .map_err(OffchatError::from)?;

    if json {
        let json = serde_json::to_string_pretty(&models).map_err(OffchatError::Serialization)?;
        println!("{}", json);
        return Ok(());
    }

    if models.is_empty() {
        println!("No models available on {}", config.inference.host);
        return Ok(());
    }

    println!("\nAvailable models on {}:\n", config.inference.host);
    models_table(&models, &config.inference.default_model).printstd();
    println!();
    Ok(())
}

/// Show details about one model
///
/// The model alias table is applied before the server is asked, so
/// `qwen3` is described as `qwen3:0.6b`.
///
/// # Errors
///
/// Returns an error if the server does not know the model.
pub async fn show_model_info(config: &Config, model_name: &str, json: bool) -> Result<()> {
    let client = OllamaClient::new(config.inference.host.clone())?;
    let mut registry = ModelRegistry::new(
        config.inference.default_model.clone(),
        config.inference.model_aliases.clone(),
    );

    let info = registry
        .describe(&client, model_name, config.inference.metadata_timeout())
        .await
        .ok_or_else(|| OffchatError::ModelNotFound(model_name.to_string()))?;

    if json {
        let json = serde_json::to_string_pretty(&info).map_err(OffchatError::Serialization)?;
        println!("{}", json);
    } else {
        println!();
        model_info_table(&info, registry.resolve(model_name)).printstd();
        println!();
    }

    Ok(())
}

/// Build the model list table, marking the configured default
fn models_table(models: &[String], default_model: &str) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Model", "Default"]);
    for model in models {
        let marker = if model == default_model { "*" } else { "" };
        table.add_row(row![model, marker]);
    }
    table
}

fn model_info_table(info: &ModelInfo, resolved: &str) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Name", info.name]);
    if resolved != info.name {
        table.add_row(row!["Requested As", resolved]);
    }
    table.add_row(row!["Parameters", info.parameter_size_label()]);
    table
}
