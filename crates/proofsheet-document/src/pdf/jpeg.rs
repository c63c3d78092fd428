// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JPEG passthrough — printpdf stores every image as Flate-compressed raw
// pixels. Once the document is serialised, JPEG pages get their image
// XObject replaced by the original baseline JPEG under `/DCTDecode`.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use proofsheet_core::error::ProofsheetError;
use tracing::{debug, instrument};

/// A JPEG raster placed on a page, keyed by its XObject resource name.
#[derive(Debug, Clone)]
pub(crate) struct JpegXObject {
    pub name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Rewrite `pdf` so each image in `jpegs` is embedded as DCT data.
#[instrument(skip_all, fields(pdf_len = pdf.len(), jpegs = jpegs.len()))]
pub(crate) fn embed_dct_images(
    pdf: Vec<u8>,
    jpegs: Vec<JpegXObject>,
) -> Result<Vec<u8>, ProofsheetError> {
    if jpegs.is_empty() {
        return Ok(pdf);
    }

    let mut doc = Document::load_mem(&pdf).map_err(|err| {
        ProofsheetError::PdfError(format!("assembled PDF is unreadable: {err}"))
    })?;
    let targets = image_xobjects(&doc)?;

    for jpeg in jpegs {
        let Some(&object_id) = targets.get(jpeg.name.as_bytes()) else {
            return Err(ProofsheetError::PdfError(format!(
                "image {} is missing from the assembled PDF",
                jpeg.name
            )));
        };
        debug!(
            ?object_id,
            width = jpeg.width,
            height = jpeg.height,
            bytes = jpeg.bytes.len(),
            "Embedding JPEG as DCTDecode"
        );
        doc.objects.insert(object_id, Object::Stream(dct_stream(jpeg)));
    }

    let mut output = Vec::with_capacity(pdf.len());
    doc.save_to(&mut output)
        .map_err(|err| ProofsheetError::PdfError(format!("failed to write PDF: {err}")))?;
    Ok(output)
}

/// Resource name to object id for every XObject referenced by a page.
fn image_xobjects(doc: &Document) -> Result<HashMap<Vec<u8>, ObjectId>, ProofsheetError> {
    let unreadable =
        |err: lopdf::Error| ProofsheetError::PdfError(format!("page resources unreadable: {err}"));

    let mut targets = HashMap::new();
    for (_, page_id) in doc.get_pages() {
        let page = doc.get_dictionary(page_id).map_err(unreadable)?;
        let Ok(resources) = page.get(b"Resources") else {
            continue;
        };
        let (_, resources) = doc.dereference(resources).map_err(unreadable)?;
        let Ok(xobjects) = resources.as_dict().and_then(|r| r.get(b"XObject")) else {
            continue;
        };
        let (_, xobjects) = doc.dereference(xobjects).map_err(unreadable)?;
        let xobjects = xobjects.as_dict().map_err(unreadable)?;
        for (name, object) in xobjects.iter() {
            if let Ok(id) = object.as_reference() {
                targets.insert(name.clone(), id);
            }
        }
    }
    Ok(targets)
}

/// 8-bit RGB image stream carrying the JPEG bytes unchanged.
fn dct_stream(jpeg: JpegXObject) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(jpeg.width as i64));
    dict.set("Height", Object::Integer(jpeg.height as i64));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    dict.set("Length", Object::Integer(jpeg.bytes.len() as i64));
    Stream::new(dict, jpeg.bytes).with_compression(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_jpegs_leaves_bytes_untouched() {
        let pdf = b"%PDF-1.3 not parsed".to_vec();
        assert_eq!(embed_dct_images(pdf.clone(), Vec::new()).unwrap(), pdf);
    }

    #[test]
    fn unreadable_pdf_is_an_error() {
        let jpeg = JpegXObject {
            name: "X1".into(),
            bytes: vec![0xFF, 0xD8],
            width: 1,
            height: 1,
        };
        assert!(matches!(
            embed_dct_images(b"garbage".to_vec(), vec![jpeg]),
            Err(ProofsheetError::PdfError(_))
        ));
    }
}
