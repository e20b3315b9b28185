//! Global constants used throughout the mida-setup codebase.
//!
//! Default remote locations, filesystem layout, and buffer sizes live here so
//! that the configuration defaults and the components agree on one value.
//! Every path or URL below is only a default: [`crate::config::SetupConfig`]
//! carries the values actually used at runtime.

/// Default location of the published integrity manifest.
pub const DEFAULT_MANIFEST_URL: &str = "https://files.mida.sprai.org/sha256sums.txt";

/// Base URL the platform-specific binary artifact names are appended to.
pub const DEFAULT_BINARY_BASE_URL: &str = "https://files.mida.sprai.org";

/// URL template for browser archives; `{selector}` is replaced by the
/// caller-supplied archive name.
pub const DEFAULT_ARCHIVE_URL_TEMPLATE: &str = "https://files.mida.sprai.org/{selector}.zip";

/// Placeholder substituted in [`DEFAULT_ARCHIVE_URL_TEMPLATE`].
pub const SELECTOR_PLACEHOLDER: &str = "{selector}";

/// Name of the installed executable.
pub const DEFAULT_BINARY_NAME: &str = "mida";

/// Directory the executable is installed into.
pub const DEFAULT_INSTALL_DIR: &str = "/usr/local/bin";

/// Per-user archive base directory, relative to the invoking user's home.
pub const DEFAULT_BROWSER_DIR: &str = ".mida/browsers";

/// Directory inside the extracted archive that becomes the installed tree.
pub const DEFAULT_ARCHIVE_ROOT: &str = "out/release-1";

/// Non-essential subtree removed from every extracted archive.
pub const DEFAULT_PRUNE_DIR: &str = "testing";

/// Entry point inside the installed archive that must be executable.
pub const DEFAULT_BROWSER_EXECUTABLE: &str = "chrome";

/// Manifest key of the Linux build.
pub const LINUX_ARTIFACT: &str = "mida_linux_amd64";

/// Manifest key of the macOS build.
pub const DARWIN_ARTIFACT: &str = "mida_darwin_amd64";

/// Chunk size used when hashing local files (64 KiB).
pub const HASH_BUF_SIZE: usize = 64 * 1024;

/// Prefix of the temporary manifest download.
pub const MANIFEST_TEMP_PREFIX: &str = ".sha256sums";

/// Prefix of the temporary binary download.
pub const BINARY_TEMP_PREFIX: &str = ".mida";

/// Prefix of the temporary archive download and extraction directory.
pub const ARCHIVE_TEMP_PREFIX: &str = ".browser";

/// Suffix of the temporary manifest download.
pub const MANIFEST_TEMP_SUFFIX: &str = ".txt";

/// Suffix of the temporary binary and archive artifacts.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Mode applied to the installed executable.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Mode applied to an installed archive directory.
pub const DIRECTORY_MODE: u32 = 0o755;

/// Environment variable set by `sudo` with the name of the invoking user.
pub const SUDO_USER_ENV: &str = "SUDO_USER";

/// Generic current-user environment variable.
pub const USER_ENV: &str = "USER";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "MIDA_SETUP_CONFIG";

/// Environment variable disabling progress indicators.
pub const NO_PROGRESS_ENV: &str = "MIDA_SETUP_NO_PROGRESS";

/// System-wide configuration file, read when present.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mida/setup.toml";
