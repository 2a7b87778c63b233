use crate::constants::ERROR_OVERLAY_ID;
use web_sys as web;

const ERROR_STYLE: &str = "position:fixed;left:12px;bottom:12px;max-width:60vw;\
padding:8px 12px;border-radius:6px;font:13px system-ui;color:#ffd7d7;\
background:rgba(40,10,16,0.85);border:1px solid rgba(200,80,90,0.5);z-index:10";

fn error_element(document: &web::Document) -> Option<web::Element> {
    if let Some(el) = document.get_element_by_id(ERROR_OVERLAY_ID) {
        return Some(el);
    }
    let el = document.create_element("div").ok()?;
    el.set_id(ERROR_OVERLAY_ID);
    document.body()?.append_child(&el).ok()?;
    Some(el)
}

/// Append a message to the on-page error banner, creating it on first use.
pub fn show_error(document: &web::Document, message: &str) {
    let Some(el) = error_element(document) else {
        return;
    };
    let line = match document.create_element("div") {
        Ok(line) => line,
        Err(_) => return,
    };
    line.set_text_content(Some(message));
    _ = el.append_child(&line);
    _ = el.set_attribute("style", ERROR_STYLE);
    _ = el.class_list().remove_1("hidden");
}

#[inline]
pub fn hide_error(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(ERROR_OVERLAY_ID) {
        _ = el.class_list().add_1("hidden");
        // fallback
        _ = el.set_attribute("style", "display:none");
    }
}
