//! File Reading
//!
//! Reads a picked image into memory so it can be inlined as a data URI.

use js_sys::Uint8Array;
use task_sync::ImageFile;
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use super::js_error;

pub async fn read_image_file(file: File) -> Result<ImageFile, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| js_error(&e))?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    log::debug!("read {} ({} bytes)", file.name(), bytes.len());
    Ok(ImageFile::new(file.type_(), bytes))
}
