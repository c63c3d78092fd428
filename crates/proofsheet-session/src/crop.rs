// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop-in-progress state machine.

use proofsheet_core::error::{ProofsheetError, Result};
use proofsheet_core::{EntryId, RasterHandle};
use tracing::{debug, info};

use crate::store::RasterStore;

/// At most one entry is being cropped at a time. The pre-crop original lives
/// here, never on the entry, and is released on every transition to `Idle`.
#[derive(Debug, Default)]
pub enum CropState {
    #[default]
    Idle,
    Cropping {
        entry: EntryId,
        original: RasterHandle,
    },
}

impl CropState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The entry being cropped and its original.
    pub fn current(&self) -> Option<(EntryId, &RasterHandle)> {
        match self {
            Self::Idle => None,
            Self::Cropping { entry, original } => Some((*entry, original)),
        }
    }

    /// Start cropping `entry`. Any uncommitted original from a previous crop
    /// is abandoned and released.
    pub fn begin(&mut self, entry: EntryId, original: RasterHandle, store: &mut RasterStore) {
        if let Self::Cropping {
            entry: previous,
            original: stale,
        } = std::mem::take(self)
        {
            info!(%previous, "Abandoning uncommitted crop");
            store.release(&stale);
        }
        debug!(%entry, original = %original.id(), "Crop started");
        *self = Self::Cropping { entry, original };
    }

    /// Finish the crop after its result has been installed.
    pub fn apply(&mut self, store: &mut RasterStore) -> Result<EntryId> {
        let entry = self.finish(store)?;
        info!(%entry, "Crop applied");
        Ok(entry)
    }

    /// Close the crop without changing the entry.
    pub fn cancel(&mut self, store: &mut RasterStore) -> Result<EntryId> {
        let entry = self.finish(store)?;
        info!(%entry, "Crop cancelled");
        Ok(entry)
    }

    /// Drop the crop if it belongs to `entry`. Returns whether it did.
    pub fn abandon_entry(&mut self, entry: EntryId, store: &mut RasterStore) -> bool {
        match self.current() {
            Some((cropping, _)) if cropping == entry => {
                let _ = self.finish(store);
                true
            }
            _ => false,
        }
    }

    fn finish(&mut self, store: &mut RasterStore) -> Result<EntryId> {
        match std::mem::take(self) {
            Self::Idle => Err(ProofsheetError::NoCropInProgress),
            Self::Cropping { entry, original } => {
                store.release(&original);
                Ok(entry)
            }
        }
    }
}
