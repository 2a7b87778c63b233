use portal_core::{AssetSource, LoadError};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Fetches assets relative to the page with `window.fetch`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchSource;

impl AssetSource for FetchSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let window = web::window().ok_or_else(|| LoadError::fetch(path, "no window"))?;
        let response = JsFuture::from(window.fetch_with_str(path))
            .await
            .map_err(|e| LoadError::fetch(path, format!("{:?}", e)))?
            .dyn_into::<web::Response>()
            .map_err(|_| LoadError::fetch(path, "fetch did not return a Response"))?;
        if !response.ok() {
            return Err(LoadError::fetch(path, format!("HTTP {}", response.status())));
        }
        let promise = response
            .array_buffer()
            .map_err(|e| LoadError::fetch(path, format!("{:?}", e)))?;
        let buffer = JsFuture::from(promise)
            .await
            .map_err(|e| LoadError::fetch(path, format!("{:?}", e)))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}
