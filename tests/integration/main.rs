//! Integration tests for jobs-queue

mod pipeline;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn jobs_queue() -> Command {
        let mut cmd = cargo_bin_cmd!("jobs-queue");
        cmd.env_remove("JOBS_QUEUE_CONFIG");
        cmd
    }

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config_arg(path: &Path) -> String {
        path.display().to_string()
    }

    #[test]
    fn help_displays() {
        jobs_queue()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("queue limiter"));
    }

    #[test]
    fn version_displays() {
        jobs_queue()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("jobs-queue"));
    }

    #[test]
    fn check_valid_config() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
                workers = 2
                cache_delete_mode = "expire_complete"
                cache_expire = 30
                jobs = ["echo"]
            "#,
        );

        jobs_queue()
            .args(["check", "--config", &config_arg(&path)])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration OK"))
            .stdout(predicate::str::contains("workers = 2"));
    }

    #[test]
    fn check_rejects_unknown_delete_mode() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, r#"cache_delete_mode = "later""#);

        jobs_queue()
            .args(["check", "--config", &config_arg(&path)])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn serve_without_config_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");

        jobs_queue()
            .args(["serve", "--config", &config_arg(&missing)])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"));
    }

    #[test]
    fn send_without_daemon_fails() {
        let temp = TempDir::new().unwrap();
        let socket = temp.path().join("nobody.sock");

        jobs_queue()
            .current_dir(temp.path())
            .args(["send", "--socket", &config_arg(&socket), "echo", "hi"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Is the daemon running?"));
    }
}
