use crate::common::{TestEnv, mida_setup, running_as_root};
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_help_lists_flags() {
    mida_setup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--instrumented-browser"))
        .stdout(predicate::str::contains("--install-deps"));
}

#[test]
fn test_version() {
    mida_setup()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_conflicting_verbosity_flags() {
    mida_setup().args(["--verbose", "--quiet"]).assert().failure();
}

#[test]
fn test_missing_config_file_is_fatal() -> Result<()> {
    let env = TestEnv::new()?;
    mida_setup()
        .arg("--config")
        .arg(env.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
    Ok(())
}

#[test]
fn test_invalid_config_file_is_fatal() -> Result<()> {
    let env = TestEnv::new()?;
    let path = env.path().join("setup.toml");
    std::fs::write(&path, "not_a_setting = true\n")?;

    mida_setup()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not_a_setting"));
    Ok(())
}

#[test]
fn test_unprivileged_run_is_refused() -> Result<()> {
    if running_as_root() {
        return Ok(());
    }
    let env = TestEnv::new()?;
    env.publish_linux_binary(b"mida 2.0")?;
    let config = env.write_config_file()?;

    mida_setup()
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("root privileges"));
    assert!(!env.binary().exists());
    Ok(())
}
