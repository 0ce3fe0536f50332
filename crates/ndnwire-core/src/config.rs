//! Process-wide wire configuration.
//!
//! A handful of behaviors (how numeric name components are encoded, which
//! encodings are accepted when reading them, how URIs are rendered by
//! default, whether Interest parameter digests are checked on decode) are
//! governed by a single [`WireConfig`]. The installed instance is read with
//! [`WireConfig::current`]; every operation that consults it also has an
//! explicit variant that takes the setting as an argument.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Encoding used when producing numeric name components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    /// Generic component whose first value byte is a marker octet.
    Marker,
    /// Dedicated component TLV-TYPE.
    Typed,
}

/// Encodings accepted when recognizing numeric name components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConventionDecoding {
    Either,
    MarkerOnly,
    TypedOnly,
}

impl ConventionDecoding {
    /// Whether marker-style components are recognized.
    pub fn accepts_marker(self) -> bool {
        matches!(self, Self::Either | Self::MarkerOnly)
    }

    /// Whether typed components are recognized.
    pub fn accepts_typed(self) -> bool {
        matches!(self, Self::Either | Self::TypedOnly)
    }
}

/// URI rendering of name components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UriFormat {
    /// Always `<type>=<escaped value>`.
    Canonical,
    /// Convention prefixes such as `seg=` and `sha256digest=` where available.
    Alternate,
    /// Whatever the installed [`WireConfig`] says.
    Default,
}

impl UriFormat {
    /// Replace [`UriFormat::Default`] with the configured format.
    pub fn resolve(self) -> UriFormat {
        match self {
            UriFormat::Default => WireConfig::current().uri_format,
            other => other,
        }
    }
}

/// Configuration knobs for encoding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Encoding for numeric components.
    pub convention_encoding: Convention,
    /// Accepted encodings for numeric components.
    pub convention_decoding: ConventionDecoding,
    /// Default URI rendering; never [`UriFormat::Default`] once installed.
    pub uri_format: UriFormat,
    /// Verify the ParametersSha256DigestComponent when decoding an Interest.
    pub auto_check_parameters_digest: bool,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            convention_encoding: Convention::Typed,
            convention_decoding: ConventionDecoding::Either,
            uri_format: UriFormat::Alternate,
            auto_check_parameters_digest: true,
        }
    }
}

static CURRENT: RwLock<WireConfig> = RwLock::new(WireConfig {
    convention_encoding: Convention::Typed,
    convention_decoding: ConventionDecoding::Either,
    uri_format: UriFormat::Alternate,
    auto_check_parameters_digest: true,
});

impl WireConfig {
    /// A copy of the installed configuration.
    pub fn current() -> WireConfig {
        *CURRENT.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the installed configuration.
    ///
    /// A `uri_format` of [`UriFormat::Default`] is stored as `Alternate`.
    pub fn install(mut config: WireConfig) {
        if config.uri_format == UriFormat::Default {
            config.uri_format = UriFormat::Alternate;
        }
        tracing::debug!(?config, "installing wire configuration");
        *CURRENT.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }

    fn update(f: impl FnOnce(&mut WireConfig)) {
        let mut guard = CURRENT.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }
}

/// Set the encoding used for numeric name components.
pub fn set_convention_encoding(convention: Convention) {
    WireConfig::update(|c| c.convention_encoding = convention);
}

/// Set which numeric component encodings are recognized.
pub fn set_convention_decoding(decoding: ConventionDecoding) {
    WireConfig::update(|c| c.convention_decoding = decoding);
}

/// Set the default URI format. `UriFormat::Default` selects `Alternate`.
pub fn set_default_uri_format(format: UriFormat) {
    let format = match format {
        UriFormat::Default => UriFormat::Alternate,
        other => other,
    };
    WireConfig::update(|c| c.uri_format = format);
}

/// Enable or disable ParametersSha256DigestComponent checks on Interest decode.
pub fn set_auto_check_parameters_digest(enabled: bool) {
    WireConfig::update(|c| c.auto_check_parameters_digest = enabled);
}
