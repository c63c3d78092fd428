// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export-in-progress flag.

use std::sync::atomic::{AtomicBool, Ordering};

use proofsheet_core::error::{ProofsheetError, Result};

/// Set while an export is outstanding.
#[derive(Debug, Default)]
pub struct ExportFlag {
    busy: AtomicBool,
}

impl ExportFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag, or fail with `ExportInProgress` if it is already held.
    pub fn try_acquire(&self) -> Result<ExportGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ProofsheetError::ExportInProgress)?;
        Ok(ExportGuard { flag: self })
    }

    pub fn is_set(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears the flag when dropped, whether the export succeeded or not.
#[derive(Debug)]
pub struct ExportGuard<'a> {
    flag: &'a ExportFlag,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}
