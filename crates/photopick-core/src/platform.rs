//! Platform capability tiers.
//!
//! Permission sets and picker surfaces differ between OS generations. Rather
//! than branching on OS versions throughout the pipeline, the host resolves a
//! single [`CapabilityTier`] once at startup and every lookup goes through the
//! tables below.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract OS capability level, resolved once per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityTier {
    /// Shared external storage; writing pictures requires a storage grant.
    Legacy,
    /// Scoped storage; the system chooser grants per-file read access.
    #[default]
    ScopedStorage,
    /// A system photo picker is available and needs no grant at all.
    SystemPhotoPicker,
}

/// Where the raw image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Gallery,
    Camera,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gallery => f.write_str("gallery"),
            Self::Camera => f.write_str("camera"),
        }
    }
}

/// A runtime permission the host may have to prompt for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    Camera,
    /// Write access to shared picture storage.
    Storage,
    /// Read access to the user's photo library.
    PhotoLibrary,
    /// Any other platform permission, by its platform name.
    Other(String),
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => f.write_str("camera"),
            Self::Storage => f.write_str("storage"),
            Self::PhotoLibrary => f.write_str("photo-library"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// The gallery surface presented for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GallerySurface {
    /// System photo picker opened on the photos tab, images only.
    SystemPhotoPicker,
    /// Generic content chooser filtered by MIME type.
    ContentChooser,
}

impl CapabilityTier {
    /// Permissions that must be granted before presenting `kind`.
    pub fn required_permissions(self, kind: SourceKind) -> Vec<Permission> {
        match (kind, self) {
            (SourceKind::Gallery, Self::Legacy) => vec![Permission::Storage],
            (SourceKind::Gallery, Self::ScopedStorage | Self::SystemPhotoPicker) => vec![],
            (SourceKind::Camera, Self::Legacy) => vec![Permission::Camera, Permission::Storage],
            (SourceKind::Camera, Self::ScopedStorage | Self::SystemPhotoPicker) => {
                vec![Permission::Camera]
            }
        }
    }

    /// Gallery surface used on this tier.
    pub fn gallery_surface(self) -> GallerySurface {
        match self {
            Self::SystemPhotoPicker => GallerySurface::SystemPhotoPicker,
            Self::Legacy | Self::ScopedStorage => GallerySurface::ContentChooser,
        }
    }
}
