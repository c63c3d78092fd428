// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registry of live temporary rasters.

use std::collections::HashSet;

use proofsheet_core::{RasterHandle, RasterId};
use tracing::{debug, warn};

/// Tracks every `OwnedTemporary` handle this session created so each one is
/// released exactly once.
#[derive(Debug, Default)]
pub struct RasterStore {
    live: HashSet<RasterId>,
}

impl RasterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `bytes` in a new temporary handle and start tracking it.
    pub fn register(&mut self, bytes: Vec<u8>) -> RasterHandle {
        let handle = RasterHandle::temporary(bytes);
        self.live.insert(handle.id());
        debug!(
            id = %handle.id(),
            bytes = handle.len(),
            live = self.live.len(),
            "Raster registered"
        );
        handle
    }

    /// Release `handle`. Returns `true` if this call released it.
    ///
    /// Externally-owned handles are ignored. Releasing a handle twice logs a
    /// warning and returns `false`.
    pub fn release(&mut self, handle: &RasterHandle) -> bool {
        if !handle.is_temporary() {
            return false;
        }
        if self.live.remove(&handle.id()) {
            debug!(id = %handle.id(), live = self.live.len(), "Raster released");
            true
        } else {
            warn!(id = %handle.id(), "Raster released twice or never registered");
            false
        }
    }

    pub fn is_live(&self, id: RasterId) -> bool {
        self.live.contains(&id)
    }

    /// Number of temporary rasters not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
