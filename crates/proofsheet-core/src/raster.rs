// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster handles — shared, immutable encoded image bytes tagged with who is
// responsible for releasing them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a raster handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterId(pub Uuid);

impl RasterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RasterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RasterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who owns the resource behind a raster handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    /// Created by this session; must be released exactly once.
    OwnedTemporary,
    /// Owned elsewhere; releasing it is a no-op.
    ExternallyOwned,
}

/// Encoded image bytes (PNG, JPEG, ...) plus an ownership tag.
///
/// Cloning a handle shares the bytes; it does not create a new resource.
#[derive(Clone)]
pub struct RasterHandle {
    id: RasterId,
    ownership: Ownership,
    bytes: Arc<[u8]>,
}

impl RasterHandle {
    /// A handle the caller is responsible for releasing.
    pub fn temporary(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: RasterId::new(),
            ownership: Ownership::OwnedTemporary,
            bytes: bytes.into(),
        }
    }

    /// A handle whose resource lives elsewhere.
    pub fn external(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: RasterId::new(),
            ownership: Ownership::ExternallyOwned,
            bytes: bytes.into(),
        }
    }

    pub fn id(&self) -> RasterId {
        self.id
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_temporary(&self) -> bool {
        self.ownership == Ownership::OwnedTemporary
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for RasterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterHandle")
            .field("id", &self.id)
            .field("ownership", &self.ownership)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PartialEq for RasterHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
