// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The editing session — one controller that owns a proof job.
//
// Entries change only through named operations. Temporary rasters (upload
// originals and cropped images) are registered with the store and released
// when they are replaced, cancelled, or their entry is deleted. Failed
// uploads, crops, and exports leave an alert for the UI to show.

use std::sync::{Arc, Mutex};

use proofsheet_core::error::{ProofsheetError, Result};
use proofsheet_core::human_errors::{HumanError, humanize_error};
use proofsheet_core::{AppConfig, Background, Entry, EntryId, RasterHandle};
use proofsheet_document::image::{CropRegion, crop_to_raster, probe_dimensions};
use proofsheet_document::pdf::ExportedDocument;
use proofsheet_document::PageAssembler;
use tracing::{error, info, instrument, warn};

use crate::crop::CropState;
use crate::entries::{EntryList, EntryUpdate};
use crate::export::ExportFlag;
use crate::store::RasterStore;
use crate::upload::ConversionClient;

pub struct Session<C> {
    config: AppConfig,
    job_number: String,
    entries: EntryList,
    crop: CropState,
    store: RasterStore,
    client: C,
    assembler: PageAssembler,
    exporting: ExportFlag,
    alert: Mutex<Option<HumanError>>,
}

impl<C: ConversionClient> Session<C> {
    pub fn new(config: AppConfig, client: C) -> Self {
        let assembler = PageAssembler::new(config.page);
        Self {
            config,
            job_number: String::new(),
            entries: EntryList::new(),
            crop: CropState::Idle,
            store: RasterStore::new(),
            client,
            assembler,
            exporting: ExportFlag::new(),
            alert: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn job_number(&self) -> &str {
        &self.job_number
    }

    pub fn set_job_number(&mut self, job_number: impl Into<String>) {
        self.job_number = job_number.into();
    }

    pub fn entries(&self) -> Arc<Vec<Entry>> {
        self.entries.snapshot()
    }

    pub fn crop_state(&self) -> &CropState {
        &self.crop
    }

    /// Temporary rasters not yet released.
    pub fn live_rasters(&self) -> usize {
        self.store.live_count()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.is_set()
    }

    /// The alert left by the last failed upload, crop, or export, if any.
    /// Taking it clears it.
    pub fn take_alert(&self) -> Option<HumanError> {
        self.alert
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    fn report(&self, action: &str, err: &ProofsheetError) {
        error!(error = %err, "{action} failed");
        self.raise_alert(err);
    }

    fn raise_alert(&self, err: &ProofsheetError) {
        let human = humanize_error(err);
        *self
            .alert
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(human);
    }

    // -- Entries -------------------------------------------------------------

    pub fn add_entry(&mut self) -> EntryId {
        self.entries.add()
    }

    pub fn update_entry(&mut self, id: EntryId, update: EntryUpdate) -> Result<()> {
        self.entries.update(id, update)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.entries.reorder(from, to)
    }

    /// Remove an entry, closing its crop and releasing its rasters.
    pub fn delete_entry(&mut self, id: EntryId) -> Result<()> {
        if self.crop.abandon_entry(id, &mut self.store) {
            info!(%id, "Crop closed by entry deletion");
        }
        let removed = self.entries.remove(id)?;
        if let Some(image) = removed.image {
            self.store.release(&image);
        }
        Ok(())
    }

    // -- Upload and crop -----------------------------------------------------

    /// Upload a selected file for conversion and open the crop for `id`.
    ///
    /// On failure nothing is registered and the crop state is unchanged.
    #[instrument(skip(self, bytes), fields(%id, file_name, bytes_len = bytes.len()))]
    pub async fn select_file(
        &mut self,
        id: EntryId,
        file_name: &str,
        bytes: Vec<u8>,
        background: Background,
    ) -> Result<()> {
        if !self.entries.contains(id) {
            return Err(ProofsheetError::EntryNotFound(id));
        }

        let png = self
            .client
            .convert(file_name, bytes, background)
            .await
            .inspect_err(|e| self.report("Upload", e))?;

        let original = self.store.register(png);
        self.crop.begin(id, original, &mut self.store);
        Ok(())
    }

    /// Apply the crop using the whole original.
    pub async fn apply_crop(&mut self) -> Result<()> {
        let (_, original) = self.crop.current().ok_or(ProofsheetError::NoCropInProgress)?;
        let (width, height) = probe_dimensions(original.bytes())?;
        self.apply_crop_region(CropRegion::full(width, height)).await
    }

    /// Cut `region` out of the original, install it as the entry's image,
    /// and close the crop.
    ///
    /// If the crop itself fails the dialog stays open so it can be retried
    /// or cancelled.
    #[instrument(skip(self))]
    pub async fn apply_crop_region(&mut self, region: CropRegion) -> Result<()> {
        let (entry, original) = match self.crop.current() {
            Some((entry, original)) => (entry, original.clone()),
            None => return Err(ProofsheetError::NoCropInProgress),
        };

        let settings = self.config.crop;
        let cropped = tokio::task::spawn_blocking(move || {
            crop_to_raster(original.bytes(), region, settings.max_dimension, settings.quality)
        })
        .await
        .map_err(|e| ProofsheetError::Task(e.to_string()))
        .and_then(|cropped| cropped)
        .inspect_err(|e| self.report("Crop", e))?;

        let image = self.store.register(cropped);
        match self.entries.set_image(entry, image.clone()) {
            Ok(previous) => {
                if let Some(previous) = previous {
                    self.store.release(&previous);
                }
            }
            Err(e) => {
                self.store.release(&image);
                return Err(e);
            }
        }

        self.crop.apply(&mut self.store)?;
        Ok(())
    }

    pub fn cancel_crop(&mut self) -> Result<EntryId> {
        self.crop.cancel(&mut self.store)
    }

    // -- Export --------------------------------------------------------------

    /// Build the PDF for the current entries.
    ///
    /// Only one export may run at a time; the flag is cleared however this
    /// returns.
    pub async fn export(&self) -> Result<ExportedDocument> {
        let _guard = self.exporting.try_acquire().inspect_err(|e| {
            warn!("Export requested while another is in progress");
            self.raise_alert(e);
        })?;

        let entries = self.entries.snapshot();
        let document = self
            .assembler
            .export(&self.job_number, &entries)
            .await
            .inspect_err(|e| self.report("Export", e))?;

        info!(
            filename = %document.filename,
            pages = document.page_count,
            bytes = document.bytes.len(),
            "Export complete"
        );
        Ok(document)
    }

    /// Install an image that someone else owns, bypassing upload and crop.
    pub fn attach_external_image(&mut self, id: EntryId, image: RasterHandle) -> Result<()> {
        if let Some(previous) = self.entries.set_image(id, image)? {
            self.store.release(&previous);
        }
        Ok(())
    }
}
