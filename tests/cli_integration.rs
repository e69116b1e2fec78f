//! Testes de integração para a CLI do secradar.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binário rodando dentro de um diretório temporário (config e bancos locais).
fn secradar(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_secradar"));
    cmd.current_dir(dir.path()).arg("--quiet");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("Failed to execute command");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();

    secradar(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("secradar"));
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();

    secradar(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("assess"))
        .stdout(predicate::str::contains("cache"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();

    secradar(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"))
        .stdout(predicate::str::contains(".secradar/cache.db (entries kept 30 days)"))
        .stdout(predicate::str::contains("secradar cache purge"));

    let config = std::fs::read_to_string(dir.path().join("secradar.toml")).unwrap();
    assert!(config.contains("[cache]"));
    assert!(config.contains("retention_days = 30"));
    assert!(dir.path().join(".secradar").is_dir());
}

#[test]
fn test_assess_computes_then_serves_from_cache() {
    let dir = TempDir::new().unwrap();

    let first = stdout_json(secradar(&dir).args(["assess", "FileZilla", "--company", "Tim Kosse"]));
    assert_eq!(first["source"], "computed");
    assert_eq!(first["result"]["category"], "File Sharing");

    let second = stdout_json(secradar(&dir).args(["assess", "FILEZILLA", "--company", "tim kosse"]));
    assert_eq!(second["source"], "cached");
    assert_eq!(second["cache_key"], first["cache_key"]);
    assert_eq!(second["metadata"]["access_count"], 1);

    let refreshed = stdout_json(secradar(&dir).args([
        "assess",
        "FileZilla",
        "--company",
        "Tim Kosse",
        "--force-refresh",
    ]));
    assert_eq!(refreshed["source"], "computed");
}

#[test]
fn test_assess_rejects_empty_product() {
    let dir = TempDir::new().unwrap();

    secradar(&dir)
        .args(["assess", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("product_name"));
}

#[test]
fn test_cache_subcommands() {
    let dir = TempDir::new().unwrap();

    let outcome = stdout_json(secradar(&dir).args(["assess", "7-Zip"]));
    let key = outcome["cache_key"].as_str().unwrap().to_string();
    stdout_json(secradar(&dir).args(["assess", "WinSCP"]));

    let listed = stdout_json(secradar(&dir).args(["cache", "list", "--limit", "10"]));
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let found = stdout_json(secradar(&dir).args(["cache", "search", "zip"]));
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["product_name"], "7-Zip");

    let cached = stdout_json(secradar(&dir).args(["cache", "get", &key]));
    assert_eq!(cached["_cache_metadata"]["access_count"], 1);

    secradar(&dir)
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entradas: 2"));

    secradar(&dir)
        .args(["cache", "delete", &key])
        .assert()
        .success()
        .stdout(predicate::str::contains("removida"));

    secradar(&dir)
        .args(["cache", "purge", "--days", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entradas removidas: 1"));
}

#[test]
fn test_cache_purge_beyond_calendar_keeps_entries() {
    let dir = TempDir::new().unwrap();
    stdout_json(secradar(&dir).args(["assess", "7-Zip"]));

    secradar(&dir)
        .args(["cache", "purge", "--days", &u32::MAX.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entradas removidas: 0"));

    secradar(&dir)
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entradas: 1"));
}

#[test]
fn test_history_subcommands() {
    let dir = TempDir::new().unwrap();

    secradar(&dir)
        .args(["history", "save", "id1", "--product", "Acme", "--score", "70"])
        .assert()
        .success();
    secradar(&dir)
        .args([
            "history", "save", "id1", "--product", "Acme", "--score", "80", "--data",
            r#"{"rev": 2}"#,
        ])
        .assert()
        .success();

    let entry = stdout_json(secradar(&dir).args(["history", "get", "id1"]));
    assert_eq!(entry["trustScore"], 80);
    assert_eq!(entry["riskLevel"], "Low");
    assert_eq!(entry["assessmentData"]["rev"], 2);

    let listed = stdout_json(secradar(&dir).args(["history", "list"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // sem terminal a confirmação falha e nada é removido
    secradar(&dir).args(["history", "clear"]).assert().failure();

    secradar(&dir)
        .args(["history", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registros removidos: 1"));
}

#[cfg(unix)]
mod command_provider {
    use super::*;

    fn write_config(dir: &TempDir, command: &str, args: &[&str]) {
        let args = args
            .iter()
            .map(|a| format!("{:?}", a))
            .collect::<Vec<_>>()
            .join(", ");
        let config = format!(
            "[provider]\nkind = \"command\"\ncommand = {:?}\nargs = [{}]\ntimeout_secs = 10\n",
            command, args
        );
        std::fs::write(dir.path().join("secradar.toml"), config).unwrap();
    }

    #[test]
    fn test_assess_with_external_model_and_save() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "sh",
            &["-c", r#"echo 'Result: {"trust_score": {"score": 81}}'"#],
        );

        let outcome = stdout_json(secradar(&dir).args(["assess", "Acme Agent", "--save"]));
        assert_eq!(outcome["source"], "computed");
        assert_eq!(outcome["result"]["trust_score"]["score"], 81);

        let history = stdout_json(secradar(&dir).args(["history", "list"]));
        assert_eq!(history[0]["productName"], "Acme Agent");
        assert_eq!(history[0]["trustScore"], 81);
        assert_eq!(history[0]["riskLevel"], "Low");
    }

    #[test]
    fn test_missing_model_cli_degrades() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "secradar-no-such-model-cli", &[]);

        let outcome = stdout_json(secradar(&dir).args(["assess", "Acme Agent", "--save"]));
        assert_eq!(outcome["source"], "degraded");
        assert!(outcome["result"]["error"].is_string());
        assert_eq!(outcome["result"]["trust_score"]["score"], 50);

        secradar(&dir)
            .args(["cache", "stats"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Entradas: 0"));

        let history = stdout_json(secradar(&dir).args(["history", "list"]));
        assert!(history.as_array().unwrap().is_empty());
    }
}
