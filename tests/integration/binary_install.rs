use crate::common::{LINUX_ARTIFACT, TestEnv};
use anyhow::Result;
use mida_setup::core::InstallResult;
use mida_setup::manifest::ManifestFetcher;
use mida_setup::source::HttpSource;
use mida_setup::upgrade::{BinaryInstaller, DOWNLOAD_FAILED, InstallVerdict, hash_file, reconcile};
use std::os::unix::fs::PermissionsExt;

#[test]
fn test_outdated_binary_is_replaced_and_then_up_to_date() -> Result<()> {
    let env = TestEnv::new()?;
    let source = HttpSource::new()?;
    std::fs::write(env.binary(), b"mida 1.0")?;
    env.publish_linux_binary(b"mida 2.0")?;

    let manifest = ManifestFetcher::new(&source).fetch(&env.mirror.url("sha256sums.txt"))?;
    let verdict = reconcile(LINUX_ARTIFACT, &manifest, Some(&env.binary()), hash_file);
    assert_eq!(verdict, InstallVerdict::Outdated);

    let installer = BinaryInstaller::new(&source, env.install_dir(), "mida");
    let report = installer.install(&env.mirror.url(LINUX_ARTIFACT), manifest.get(LINUX_ARTIFACT));

    assert_eq!(report.result, InstallResult::Success);
    assert!(report.warnings.is_empty(), "unexpected warnings: {:?}", report.warnings);
    assert_eq!(std::fs::read(env.binary())?, b"mida 2.0");
    assert_eq!(std::fs::metadata(env.binary())?.permissions().mode() & 0o777, 0o755);

    let verdict = reconcile(LINUX_ARTIFACT, &manifest, Some(&env.binary()), hash_file);
    assert_eq!(verdict, InstallVerdict::UpToDate);
    Ok(())
}

#[test]
fn test_manifest_with_noise_and_duplicates() -> Result<()> {
    let env = TestEnv::new()?;
    let source = HttpSource::new()?;
    let text = "\
# published builds
AAAA mida_linux_amd64
bbbb mida_darwin_amd64 extra-token

cccc mida_linux_amd64
";
    env.mirror.publish("sha256sums.txt", text.as_bytes())?;

    let manifest = ManifestFetcher::new(&source).fetch(&env.mirror.url("sha256sums.txt"))?;

    assert_eq!(manifest.get(LINUX_ARTIFACT), Some("cccc"));
    assert!(!manifest.contains("mida_darwin_amd64"));
    Ok(())
}

#[test]
fn test_missing_artifact_leaves_existing_binary() -> Result<()> {
    let env = TestEnv::new()?;
    let source = HttpSource::new()?;
    std::fs::write(env.binary(), b"mida 1.0")?;

    let installer = BinaryInstaller::new(&source, env.install_dir(), "mida");
    let report = installer.install(&env.mirror.url(LINUX_ARTIFACT), None);

    assert_eq!(report.result, InstallResult::Failure(DOWNLOAD_FAILED.to_string()));
    assert_eq!(std::fs::read(env.binary())?, b"mida 1.0");
    let leftovers: Vec<_> = std::fs::read_dir(env.install_dir())?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".mida"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}
