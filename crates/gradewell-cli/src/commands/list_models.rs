//! The `gradewell list-models` command.

use anyhow::Result;

use gradewell_providers::create_provider;
use gradewell_providers::ollama::OllamaProvider;
use gradewell_providers::ProviderConfig;

use crate::GlobalArgs;

pub async fn execute(global: &GlobalArgs, provider_filter: Option<String>) -> Result<()> {
    let config = global.load_config()?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;

    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }
        let provider_config = &config.providers[name];

        let models = match provider_config {
            // Installed models are only known by asking the server.
            ProviderConfig::Ollama { base_url } => {
                match OllamaProvider::new(base_url)?.list_models_async().await {
                    Ok(models) => models,
                    Err(e) => {
                        tracing::warn!(provider = name.as_str(), "{e:#}");
                        continue;
                    }
                }
            }
            other => create_provider(other, config.timeout_secs)?.available_models(),
        };

        if models.is_empty() {
            continue;
        }
        found_any = true;
        let marker = if *name == config.default_provider {
            " (default)"
        } else {
            ""
        };
        println!("Provider: {name}{marker}");
        for model in &models {
            if model.max_context > 0 {
                println!(
                    "  {} - {} ({}K context)",
                    model.id,
                    model.name,
                    model.max_context / 1000
                );
            } else {
                println!("  {} - {}", model.id, model.name);
            }
        }
        println!();
    }

    if !found_any {
        println!("No providers configured. Run `gradewell init` to create a config file.");
    }

    Ok(())
}
