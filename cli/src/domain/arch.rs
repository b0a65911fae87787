//! Host architecture detection for the cloudflared release variant.
//!
//! Pure mapping from a `uname -m` machine string to the release asset
//! published on GitHub.

use crate::domain::error::ProvisionError;

/// Base URL of the latest cloudflared release assets.
pub const CLOUDFLARED_RELEASE_URL: &str =
    "https://github.com/cloudflare/cloudflared/releases/latest/download";

/// cloudflared Linux release variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudflaredArch {
    Amd64,
    Arm64,
    Arm,
    I386,
}

impl CloudflaredArch {
    /// Map a `uname -m` value to a release variant.
    ///
    /// `armv8l` is a 32-bit userland on a 64-bit core and takes the `arm` build.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::UnsupportedArchitecture` for anything else.
    pub fn from_machine(machine: &str) -> Result<Self, ProvisionError> {
        match machine.trim() {
            "x86_64" | "amd64" => Ok(Self::Amd64),
            "aarch64" | "arm64" => Ok(Self::Arm64),
            "armv6l" | "armv7l" | "armv8l" | "armhf" | "arm" => Ok(Self::Arm),
            "i386" | "i686" => Ok(Self::I386),
            other => Err(ProvisionError::UnsupportedArchitecture(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::I386 => "386",
        }
    }

    #[must_use]
    pub fn asset_name(self) -> String {
        format!("cloudflared-linux-{}", self.as_str())
    }

    #[must_use]
    pub fn download_url(self) -> String {
        format!("{CLOUDFLARED_RELEASE_URL}/{}", self.asset_name())
    }
}

impl std::fmt::Display for CloudflaredArch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
