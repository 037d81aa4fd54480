//! Application tree layout inside an extracted build.
//!
//! Stable and Insiders builds ship under different application names on
//! Windows and macOS; Linux tarballs use the same folder for both.
//!
//! ```text
//! win32-x64-archive   azuredatastudio.exe
//!                     azuredatastudio-insiders.exe
//!                     resources/app/product.json
//!                     bin/azuredatastudio(-insiders).cmd
//! darwin              Azure Data Studio.app/Contents/MacOS/Electron
//!                     Azure Data Studio - Insiders.app/Contents/MacOS/Electron
//!                     <bundle>/Contents/Resources/app/product.json
//!                     <bundle>/Contents/Resources/app/bin/code
//! linux-x64           azuredatastudio-linux-x64/azuredatastudio
//!                     azuredatastudio-linux-x64/resources/app/product.json
//!                     azuredatastudio-linux-x64/bin/azuredatastudio(-insiders)
//! ```

use std::path::{Path, PathBuf};

use crate::platform::Platform;

const WINDOWS_STABLE_EXE: &str = "azuredatastudio.exe";
const WINDOWS_INSIDERS_EXE: &str = "azuredatastudio-insiders.exe";
const MAC_STABLE_BUNDLE: &str = "Azure Data Studio.app";
const MAC_INSIDERS_BUNDLE: &str = "Azure Data Studio - Insiders.app";
const LINUX_DIR: &str = "azuredatastudio-linux-x64";
const LINUX_STABLE_EXE: &str = "azuredatastudio";
const LINUX_INSIDERS_EXE: &str = "azuredatastudio-insiders";

/// Returns the launchable binary inside an extracted build.
///
/// Pure path arithmetic; the file is not checked for existence.
#[must_use = "returns the path without side effects"]
pub fn executable_path(entry_dir: &Path, platform: Platform, rolling: bool) -> PathBuf {
    match (platform, rolling) {
        (Platform::WindowsX64Archive, false) => entry_dir.join(WINDOWS_STABLE_EXE),
        (Platform::WindowsX64Archive, true) => entry_dir.join(WINDOWS_INSIDERS_EXE),
        (Platform::Darwin, rolling) => entry_dir
            .join(mac_bundle(rolling))
            .join("Contents")
            .join("MacOS")
            .join("Electron"),
        (Platform::LinuxX64, _) => entry_dir.join(LINUX_DIR).join(LINUX_STABLE_EXE),
    }
}

/// Returns the `product.json` descriptor of an extracted Insiders build.
#[must_use = "returns the path without side effects"]
pub fn product_descriptor_path(entry_dir: &Path, platform: Platform) -> PathBuf {
    let app_dir = match platform {
        Platform::WindowsX64Archive => entry_dir.join("resources"),
        Platform::Darwin => entry_dir
            .join(MAC_INSIDERS_BUNDLE)
            .join("Contents")
            .join("Resources"),
        Platform::LinuxX64 => entry_dir.join(LINUX_DIR).join("resources"),
    };
    app_dir.join("app").join("product.json")
}

/// Resolves the command-line launcher that ships next to an executable.
///
/// The launcher is what extension management commands such as
/// `--install-extension` are run through.
#[must_use = "returns the path without side effects"]
pub fn cli_path(executable: &Path, platform: Platform) -> PathBuf {
    let file_name = executable
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let exe_dir = executable.parent().unwrap_or_else(|| Path::new(""));

    match platform {
        Platform::WindowsX64Archive => {
            let launcher = if file_name.ends_with(WINDOWS_INSIDERS_EXE) {
                "azuredatastudio-insiders.cmd"
            } else {
                "azuredatastudio.cmd"
            };
            exe_dir.join("bin").join(launcher)
        }
        Platform::Darwin => {
            // <bundle>/Contents/MacOS/Electron -> <bundle>
            let bundle = executable
                .ancestors()
                .nth(3)
                .unwrap_or_else(|| Path::new(""));
            bundle
                .join("Contents")
                .join("Resources")
                .join("app")
                .join("bin")
                .join("code")
        }
        Platform::LinuxX64 => {
            let launcher = if file_name.ends_with(LINUX_INSIDERS_EXE) {
                LINUX_INSIDERS_EXE
            } else {
                LINUX_STABLE_EXE
            };
            exe_dir.join("bin").join(launcher)
        }
    }
}

fn mac_bundle(rolling: bool) -> &'static str {
    if rolling {
        MAC_INSIDERS_BUNDLE
    } else {
        MAC_STABLE_BUNDLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> PathBuf {
        PathBuf::from("cache").join("ads-1.32.0")
    }

    #[test]
    fn windows_executables_differ_by_channel() {
        let stable = executable_path(&entry(), Platform::WindowsX64Archive, false);
        let insiders = executable_path(&entry(), Platform::WindowsX64Archive, true);
        assert_eq!(stable, entry().join("azuredatastudio.exe"));
        assert_eq!(insiders, entry().join("azuredatastudio-insiders.exe"));
    }

    #[test]
    fn mac_executables_live_in_channel_bundles() {
        let stable = executable_path(&entry(), Platform::Darwin, false);
        let insiders = executable_path(&entry(), Platform::Darwin, true);
        assert!(stable.ends_with("Azure Data Studio.app/Contents/MacOS/Electron"));
        assert!(insiders.ends_with("Azure Data Studio - Insiders.app/Contents/MacOS/Electron"));
        assert_ne!(stable, insiders);
    }

    #[test]
    fn linux_executable_is_shared_by_channels() {
        let stable = executable_path(&entry(), Platform::LinuxX64, false);
        let insiders = executable_path(&entry(), Platform::LinuxX64, true);
        assert_eq!(
            stable,
            entry().join("azuredatastudio-linux-x64").join("azuredatastudio")
        );
        assert_eq!(stable, insiders);
    }

    #[test]
    fn product_descriptor_paths() {
        assert!(
            product_descriptor_path(&entry(), Platform::WindowsX64Archive)
                .ends_with("resources/app/product.json")
        );
        assert!(
            product_descriptor_path(&entry(), Platform::Darwin).ends_with(
                "Azure Data Studio - Insiders.app/Contents/Resources/app/product.json"
            )
        );
        assert!(
            product_descriptor_path(&entry(), Platform::LinuxX64)
                .ends_with("azuredatastudio-linux-x64/resources/app/product.json")
        );
    }

    #[test]
    fn windows_cli_path_follows_channel() {
        let stable = executable_path(&entry(), Platform::WindowsX64Archive, false);
        let insiders = executable_path(&entry(), Platform::WindowsX64Archive, true);
        assert_eq!(
            cli_path(&stable, Platform::WindowsX64Archive),
            entry().join("bin").join("azuredatastudio.cmd")
        );
        assert_eq!(
            cli_path(&insiders, Platform::WindowsX64Archive),
            entry().join("bin").join("azuredatastudio-insiders.cmd")
        );
    }

    #[test]
    fn mac_cli_path_is_inside_bundle_resources() {
        let exe = executable_path(&entry(), Platform::Darwin, false);
        assert_eq!(
            cli_path(&exe, Platform::Darwin),
            entry()
                .join("Azure Data Studio.app")
                .join("Contents/Resources/app/bin/code")
        );
    }

    #[test]
    fn linux_cli_path_sits_next_to_executable() {
        let exe = executable_path(&entry(), Platform::LinuxX64, false);
        assert_eq!(
            cli_path(&exe, Platform::LinuxX64),
            entry()
                .join("azuredatastudio-linux-x64")
                .join("bin")
                .join("azuredatastudio")
        );

        let insiders = PathBuf::from("/opt/ads/azuredatastudio-insiders");
        assert_eq!(
            cli_path(&insiders, Platform::LinuxX64),
            PathBuf::from("/opt/ads/bin/azuredatastudio-insiders")
        );
    }
}
