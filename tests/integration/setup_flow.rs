use crate::common::{LINUX_ARTIFACT, TestEnv};
use anyhow::Result;
use mida_setup::core::{InstallResult, SetupError};
use mida_setup::packages::{PackageManager, PackageStatus};
use mida_setup::setup::{Setup, SetupOptions};
use mida_setup::source::HttpSource;
use mida_setup::upgrade::{DOWNLOAD_FAILED, InstallVerdict};
use std::cell::RefCell;

#[derive(Default)]
struct FakeApt {
    installed: RefCell<Vec<String>>,
}

impl PackageManager for FakeApt {
    fn install(&self, package: &str) -> Result<(), SetupError> {
        self.installed.borrow_mut().push(package.to_string());
        Ok(())
    }
}

fn options(selector: &str, install_deps: bool) -> SetupOptions {
    SetupOptions {
        selector: selector.to_string(),
        install_deps,
    }
}

#[test]
fn test_fresh_host_gets_binary_and_browser() -> Result<()> {
    let env = TestEnv::new()?;
    env.publish_linux_binary(b"mida 2.0")?;
    env.publish_browser("chromium")?;
    let host = env.host();
    let source = HttpSource::new()?;
    let config = env.config();

    let summary = Setup::new(&host, &source, &FakeApt::default(), &config)
        .with_os("linux")
        .run(&options("chromium", false))?;

    assert_eq!(summary.verdict, InstallVerdict::NotInstalled);
    assert!(summary.all_succeeded());
    assert_eq!(std::fs::read(env.binary())?, b"mida 2.0");
    assert!(env.browser_dir("chromium").join("chrome").is_file());
    Ok(())
}

#[test]
fn test_second_run_is_a_no_op_for_the_binary() -> Result<()> {
    let env = TestEnv::new()?;
    env.publish_linux_binary(b"mida 2.0")?;
    std::fs::write(env.binary(), b"mida 2.0")?;
    let host = env.host().with_executable("mida", env.binary());
    let source = HttpSource::new()?;
    let config = env.config();

    let summary = Setup::new(&host, &source, &FakeApt::default(), &config)
        .with_os("linux")
        .run(&SetupOptions::default())?;

    assert_eq!(summary.verdict, InstallVerdict::UpToDate);
    assert!(summary.binary.is_none());
    assert!(summary.archive.is_none());
    Ok(())
}

#[test]
fn test_binary_failure_does_not_skip_browser() -> Result<()> {
    let env = TestEnv::new()?;
    // Listed in the manifest but never published
    env.mirror.publish_manifest(&[(LINUX_ARTIFACT, "00ff")])?;
    env.publish_browser("chromium")?;
    let host = env.host();
    let source = HttpSource::new()?;
    let config = env.config();

    let summary = Setup::new(&host, &source, &FakeApt::default(), &config)
        .with_os("linux")
        .run(&options("chromium", false))?;

    let binary = summary.binary.as_ref().expect("binary install attempted");
    assert_eq!(binary.result, InstallResult::Failure(DOWNLOAD_FAILED.to_string()));
    assert!(summary.archive.as_ref().is_some_and(|r| r.is_success()));
    assert!(!summary.all_succeeded());
    Ok(())
}

#[test]
fn test_missing_manifest_aborts_without_changes() -> Result<()> {
    let env = TestEnv::new()?;
    env.publish_browser("chromium")?;
    let host = env.host();
    let source = HttpSource::new()?;
    let config = env.config();

    let err = Setup::new(&host, &source, &FakeApt::default(), &config)
        .with_os("linux")
        .run(&options("chromium", false))
        .unwrap_err();

    assert!(matches!(err, SetupError::ManifestUnavailable { .. }));
    assert!(err.to_string().contains("Unable to get SHA256 sums"));
    assert!(!env.binary().exists());
    assert!(!env.home().join(".mida").exists());
    Ok(())
}

#[test]
fn test_dependencies_installed_before_browser() -> Result<()> {
    let env = TestEnv::new()?;
    env.publish_linux_binary(b"mida 2.0")?;
    let host = env.host().with_executable("chromium-browser", "/usr/bin/chromium-browser");
    let source = HttpSource::new()?;
    let apt = FakeApt::default();
    let config = env.config();

    let summary =
        Setup::new(&host, &source, &apt, &config).with_os("linux").run(&options("", true))?;

    assert_eq!(summary.packages.len(), 2);
    assert_eq!(summary.packages[0].status, PackageStatus::Installed);
    assert_eq!(summary.packages[1].status, PackageStatus::AlreadyInstalled);
    assert_eq!(*apt.installed.borrow(), vec!["xvfb".to_string()]);
    Ok(())
}
