use crate::common::TestEnv;
use anyhow::Result;
use mida_setup::core::InstallResult;
use mida_setup::installer::{ARCHIVE_DOWNLOAD_FAILED, ArchiveInstallSpec, ArchiveInstaller};
use mida_setup::source::HttpSource;
use mida_setup::test_utils::ZipFixture;
use std::os::unix::fs::PermissionsExt;

fn spec(env: &TestEnv, selector: &str) -> ArchiveInstallSpec {
    let config = env.config();
    ArchiveInstallSpec::new(
        selector,
        &config.archive_url_template,
        "tester",
        config.browser_base_dir(&env.home()),
    )
}

#[test]
fn test_browser_install_layout_and_ownership() -> Result<()> {
    let env = TestEnv::new()?;
    env.publish_browser("chromium")?;
    let host = env.host();
    let source = HttpSource::new()?;

    let report = ArchiveInstaller::new(&source, &host, env.config().archive_layout())
        .install(&spec(&env, "chromium"));

    assert_eq!(report.result, InstallResult::Success);
    let dest = env.browser_dir("chromium");
    let mode = std::fs::metadata(dest.join("chrome"))?.permissions().mode();
    assert_eq!(mode & 0o755, 0o755);
    assert!(dest.join("locales/en-US.pak").is_file());
    assert!(!dest.join("testing").exists());
    assert!(!dest.join("out").exists());

    let calls = host.chown_calls();
    assert!(calls.iter().all(|c| c.user == "tester"));
    assert!(calls.iter().any(|c| c.recursive && c.path == dest));
    Ok(())
}

#[test]
fn test_two_selectors_install_side_by_side() -> Result<()> {
    let env = TestEnv::new()?;
    env.publish_browser("chromium")?;
    env.mirror.publish_archive(
        "chromium-debug",
        &ZipFixture::new().file("out/release-1/chrome", b"debug build"),
    )?;
    let host = env.host();
    let source = HttpSource::new()?;
    let installer = ArchiveInstaller::new(&source, &host, env.config().archive_layout());

    assert!(installer.install(&spec(&env, "chromium")).is_success());
    assert!(installer.install(&spec(&env, "chromium-debug")).is_success());

    assert_eq!(std::fs::read(env.browser_dir("chromium").join("chrome"))?, b"\x7fELF chrome");
    assert_eq!(std::fs::read(env.browser_dir("chromium-debug").join("chrome"))?, b"debug build");
    Ok(())
}

#[test]
fn test_failed_download_keeps_previous_browser() -> Result<()> {
    let env = TestEnv::new()?;
    let dest = env.browser_dir("chromium");
    std::fs::create_dir_all(&dest)?;
    std::fs::write(dest.join("chrome"), b"previous")?;
    let host = env.host();
    let source = HttpSource::new()?;

    let report = ArchiveInstaller::new(&source, &host, env.config().archive_layout())
        .install(&spec(&env, "chromium"));

    assert_eq!(report.result, InstallResult::Failure(ARCHIVE_DOWNLOAD_FAILED.to_string()));
    assert_eq!(std::fs::read(dest.join("chrome"))?, b"previous");
    Ok(())
}

#[test]
fn test_archive_with_traversal_entry_is_rejected() -> Result<()> {
    let env = TestEnv::new()?;
    env.mirror.publish_archive(
        "evil",
        &ZipFixture::new().file("out/release-1/chrome", b"c").file("../../escape", b"x"),
    )?;
    let host = env.host();
    let source = HttpSource::new()?;

    let report = ArchiveInstaller::new(&source, &host, env.config().archive_layout())
        .install(&spec(&env, "evil"));

    assert!(!report.is_success());
    assert!(!env.browser_dir("evil").exists());
    assert!(!env.home().join("escape").exists());
    assert!(!env.path().join("escape").exists());
    Ok(())
}
