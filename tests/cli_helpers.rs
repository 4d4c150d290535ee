#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn portfolio_path(home: &TempDir) -> PathBuf {
    home.path().join(".payday").join("portfolio.csv")
}

/// Command isolated in a temporary HOME, offline and without colors
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("payday"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd.env_remove("PAYDAY_CONFIG");
    cmd.env_remove("PAYDAY_PORTFOLIO");
    cmd.env_remove("RUST_LOG");
    cmd.env("PAYDAY_OFFLINE", "1");
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_cmd(home, &full)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

pub fn add_lot(home: &TempDir, ticker: &str, quantity: u32, date: &str, account: &str) -> Result<()> {
    let quantity = quantity.to_string();
    run_cmd(home, &["portfolio", "add", ticker, &quantity, date, account])?;
    Ok(())
}
