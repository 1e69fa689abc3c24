// Browser asset plumbing: awaitable image loads and text fetches.
use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlImageElement, Response};

use crate::error::{AssetError, CatalogError};

/// Loads a monster image before it is committed into a slot.
pub trait AssetLoader {
    fn load(&self, src: &str) -> LocalBoxFuture<'static, Result<(), AssetError>>;
}

/// Loads through an off-DOM `<img>`; resolves on `load`, fails on `error`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageLoader;

impl AssetLoader for ImageLoader {
    fn load(&self, src: &str) -> LocalBoxFuture<'static, Result<(), AssetError>> {
        let src = src.to_string();
        async move {
            let img = HtmlImageElement::new().map_err(|_| AssetError(src.clone()))?;
            let (tx, rx) = oneshot::channel::<bool>();
            let tx = Rc::new(RefCell::new(Some(tx)));
            let onload = {
                let tx = tx.clone();
                Closure::wrap(Box::new(move || {
                    if let Some(tx) = tx.borrow_mut().take() {
                        let _ = tx.send(true);
                    }
                }) as Box<dyn FnMut()>)
            };
            let onerror = {
                let tx = tx.clone();
                Closure::wrap(Box::new(move || {
                    if let Some(tx) = tx.borrow_mut().take() {
                        let _ = tx.send(false);
                    }
                }) as Box<dyn FnMut()>)
            };
            img.set_onload(Some(onload.as_ref().unchecked_ref()));
            img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            img.set_src(&src);
            let loaded = rx.await.unwrap_or(false);
            img.set_onload(None);
            img.set_onerror(None);
            drop(onload);
            drop(onerror);
            if loaded { Ok(()) } else { Err(AssetError(src)) }
        }
        .boxed_local()
    }
}

fn js_message(v: &JsValue) -> String {
    v.as_string().unwrap_or_else(|| format!("{:?}", v))
}

/// GET `url` and return the body as text.
pub async fn fetch_text(url: &str) -> Result<String, CatalogError> {
    let window = web_sys::window().ok_or_else(|| CatalogError::Fetch("no window".into()))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| CatalogError::Fetch(js_message(&e)))?;
    let resp: Response = resp
        .dyn_into()
        .map_err(|e| CatalogError::Fetch(js_message(&e)))?;
    if !resp.ok() {
        return Err(CatalogError::Status(resp.status()));
    }
    let text_promise = resp
        .text()
        .map_err(|e| CatalogError::Fetch(js_message(&e)))?;
    let body = JsFuture::from(text_promise)
        .await
        .map_err(|e| CatalogError::Fetch(js_message(&e)))?;
    body.as_string()
        .ok_or_else(|| CatalogError::Fetch("response body is not text".into()))
}
