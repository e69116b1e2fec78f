//! Implementação dos comandos CLI do secradar.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use super::{CacheCommand, HistoryCommand};
use crate::assessor::Assessor;
use crate::cache::ResultStore;
use crate::history::HistoryLog;
use crate::types::config::Config;
use crate::types::requests::AssessmentRequest;
use crate::types::responses::{trust_score_of, RiskLevel};
use crate::RadarResult;

/// Creates `secradar.toml` and the `.secradar/` data directory.
///
/// Both databases live under `.secradar/`, which is added to `.gitignore`
/// so cached assessments never end up in version control.
pub async fn init(path: Option<PathBuf>) -> RadarResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("secradar.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Edit [provider] to switch between the baseline and an external model CLI.");
        return Ok(());
    }

    let config = Config::default_config();

    // Data directory for both databases
    let data_dir = target_dir.join(".secradar");
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!(".secradar/ directory created");
    }

    update_gitignore(&target_dir)?;
    config.save(&config_path)?;

    println!("secradar initialized successfully!");
    println!("Configuration: {}", config_path.display());
    println!(
        "Result cache:  {} (entries kept {} days)",
        config.cache.db_path.display(),
        config.cache.retention_days
    );
    println!("History:       {}", config.history.db_path.display());
    println!(
        "Provider:      baseline (offline, trust score {})",
        config.provider.default_trust_score
    );
    println!();
    println!("Next steps:");
    println!("  1. Assess a product: secradar assess \"FileZilla\" --company \"Tim Kosse\"");
    println!("  2. Plug in a model CLI: set kind = \"command\" and command under [provider]");
    println!("  3. Keep the cache lean: secradar cache purge");

    Ok(())
}

/// Updates or creates .gitignore to include .secradar/
fn update_gitignore(target_dir: &Path) -> RadarResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = ".secradar/";
    let comment = "# secradar - cached assessments and assessment history (SQLite)";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == ".secradar")
        {
            tracing::debug!(".gitignore already contains .secradar/");
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with .secradar/");
    } else {
        std::fs::write(&gitignore_path, format!("{}\n{}\n", comment, entry))?;
        println!(".gitignore created with .secradar/");
    }

    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("secradar {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Avaliações de segurança de software com cache por fingerprint");
}

/// Avalia um produto, servindo do cache quando possível.
pub async fn assess(
    request: AssessmentRequest,
    force_refresh: bool,
    save: bool,
    quiet: bool,
    config: &Config,
) -> RadarResult<()> {
    let store = Arc::new(ResultStore::open(&config.cache.db_path)?);
    let assessor = Assessor::from_config(store, config);

    let spinner = (!quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!(
            "Avaliando {} ({})...",
            request.product_name,
            assessor.provider_name()
        ));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let outcome = assessor.assess(&request, force_refresh).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let outcome = outcome?;
    print_json(&outcome)?;

    if save {
        if outcome.is_degraded() {
            eprintln!("Avaliação degradada; não gravada no histórico.");
            return Ok(());
        }

        let score = trust_score_of(&outcome.result)
            .unwrap_or_else(|| i64::from(config.provider.default_trust_score));
        let id = uuid::Uuid::new_v4().to_string();

        let history = HistoryLog::open(&config.history.db_path)?;
        history.save(
            &id,
            &request.product_name,
            score,
            &RiskLevel::from_score(score).to_string(),
            &outcome.result,
        )?;

        eprintln!("Gravado no histórico: {}", id);
    }

    Ok(())
}

/// Executa um subcomando de `cache`.
pub async fn cache(command: CacheCommand, config: &Config) -> RadarResult<()> {
    let store = ResultStore::open(&config.cache.db_path)?;

    match command {
        CacheCommand::Get { key } => match store.get(&key)? {
            Some(hit) => print_json(&hit.into_annotated())?,
            None => println!("Nenhuma entrada para: {}", key),
        },
        CacheCommand::List { limit, offset } => {
            print_json(&store.list(limit, offset)?)?;
        }
        CacheCommand::Search { query } => {
            print_json(&store.search_by_product(&query)?)?;
        }
        CacheCommand::Stats => {
            let stats = store.stats()?;

            println!("Entradas: {}", stats.total_entries);
            println!("Acessos: {}", stats.total_accesses);
            if let Some(oldest) = stats.oldest_entry {
                println!("Mais antiga: {}", oldest.to_rfc3339());
            }
            if let Some(newest) = stats.newest_entry {
                println!("Mais recente: {}", newest.to_rfc3339());
            }
        }
        CacheCommand::Purge { days } => {
            let window = match days {
                Some(d) => chrono::Duration::days(i64::from(d)),
                None => config.retention(),
            };
            let removed = store.purge_older_than(window)?;
            println!("Entradas removidas: {}", removed);
        }
        CacheCommand::Delete { key } => {
            if store.delete(&key)? {
                println!("Entrada removida: {}", key);
            } else {
                println!("Nenhuma entrada para: {}", key);
            }
        }
    }

    Ok(())
}

/// Executa um subcomando de `history`.
pub async fn history(command: HistoryCommand, config: &Config) -> RadarResult<()> {
    let log = HistoryLog::open(&config.history.db_path)?;

    match command {
        HistoryCommand::Save {
            id,
            product,
            score,
            risk_level,
            data,
        } => {
            let document: serde_json::Value = serde_json::from_str(&data)?;
            let risk = risk_level.unwrap_or_else(|| RiskLevel::from_score(score).to_string());

            log.save(&id, &product, score, &risk, &document)?;
            println!("Registro gravado: {}", id);
        }
        HistoryCommand::List { limit, offset } => {
            let limit = limit.unwrap_or(config.history.default_page_size);
            print_json(&log.list(limit, offset)?)?;
        }
        HistoryCommand::Get { id } => match log.get(&id)? {
            Some(entry) => print_json(&entry)?,
            None => println!("Registro não encontrado: {}", id),
        },
        HistoryCommand::Delete { id } => {
            if log.delete(&id)? {
                println!("Registro removido: {}", id);
            } else {
                println!("Registro não encontrado: {}", id);
            }
        }
        HistoryCommand::Clear { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Remover {} registros do histórico?", log.count()?))
                    .default(false)
                    .interact()?;

            if confirmed {
                let removed = log.clear()?;
                println!("Registros removidos: {}", removed);
            } else {
                println!("Nada removido.");
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> RadarResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
