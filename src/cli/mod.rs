//! Interface de linha de comando do secradar.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// secradar - avaliações de segurança com cache por fingerprint.
#[derive(Parser, Debug)]
#[command(name = "secradar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "secradar.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Avalia um produto, usando o cache quando possível.
    Assess {
        /// Nome do produto.
        product: String,

        /// Fornecedor.
        #[arg(long)]
        company: Option<String>,

        /// SHA-1 do binário.
        #[arg(long)]
        sha1: Option<String>,

        /// URL do produto.
        #[arg(long)]
        url: Option<String>,

        /// Ignora o cache e recalcula.
        #[arg(long)]
        force_refresh: bool,

        /// Grava o resultado também no histórico.
        #[arg(long)]
        save: bool,
    },

    /// Inspeciona e mantém o cache de resultados.
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Gerencia o histórico de avaliações.
    #[command(subcommand)]
    History(HistoryCommand),

    /// Mostra versão.
    Version,
}

/// Subcomandos de `cache`.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Lê uma entrada (conta como acesso).
    Get {
        /// Fingerprint da entrada.
        key: String,
    },

    /// Lista entradas, mais recentes primeiro.
    List {
        #[arg(short, long, default_value_t = 50)]
        limit: usize,

        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },

    /// Busca por trecho do nome do produto.
    Search {
        query: String,
    },

    /// Estatísticas agregadas.
    Stats,

    /// Remove entradas mais antigas que a janela de retenção.
    Purge {
        /// Janela em dias (padrão: `cache.retention_days`).
        #[arg(long)]
        days: Option<u32>,
    },

    /// Remove uma entrada.
    Delete {
        key: String,
    },
}

/// Subcomandos de `history`.
#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Grava (ou substitui) um registro.
    Save {
        /// ID do registro.
        id: String,

        /// Nome do produto.
        #[arg(long)]
        product: String,

        /// Trust score (0-100).
        #[arg(long)]
        score: i64,

        /// Nível de risco (padrão: derivado do score).
        #[arg(long)]
        risk_level: Option<String>,

        /// Documento da avaliação em JSON.
        #[arg(long, default_value = "{}")]
        data: String,
    },

    /// Lista registros, mais recentes primeiro.
    List {
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },

    /// Mostra um registro.
    Get {
        id: String,
    },

    /// Remove um registro.
    Delete {
        id: String,
    },

    /// Remove todos os registros.
    Clear {
        /// Não pede confirmação.
        #[arg(short, long)]
        yes: bool,
    },
}
