//! Browser implementation of [`Platform`] and the wasm entry point.
//!
//! The page shell must provide `#content` (the document container, class
//! `markdown-body`) and `#backBtn`. Everything else is created here. A page
//! without `#content` is left alone.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, Event, EventTarget, ScrollBehavior, ScrollIntoViewOptions, Window};

use crate::config::PageConfig;
use crate::controller::PageController;
use crate::error::LoadError;
use crate::platform::Platform;

const CONTENT_ID: &str = "content";
const BACK_BUTTON_ID: &str = "backBtn";
const ACTIVE_CLASS: &str = "active";
const HIGHLIGHTED_CLASS: &str = "hl";

const COPY_ICON: &str = r#"<svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="icon-sm" aria-hidden="true"><rect x="9" y="9" width="13" height="13" rx="2"/><path d="M5 15H4a2 2 0 0 1-2-2V4a2 2 0 0 1 2-2h9a2 2 0 0 1 2 2v1"/></svg>"#;

/// Best-effort human-readable text for a thrown JS value.
fn js_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// [`Platform`] backed by the live `window` and `document`.
pub struct WebPlatform {
    window: Window,
    document: Document,
}

impl WebPlatform {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window object available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        Ok(Self { window, document })
    }

    fn content(&self) -> Option<Element> {
        self.document.get_element_by_id(CONTENT_ID)
    }

    fn nth(root: &Element, selector: &str, index: usize) -> Option<Element> {
        let list = root.query_selector_all(selector).ok()?;
        list.get(u32::try_from(index).ok()?)?.dyn_into::<Element>().ok()
    }

    fn heading(&self, index: usize) -> Option<Element> {
        Self::nth(&self.content()?, "h2", index)
    }

    fn toc_item(&self, index: usize) -> Option<Element> {
        let list = self.content()?.query_selector("ol").ok()??;
        Self::nth(&list, "li", index)
    }

    fn code_block(&self, index: usize) -> Option<Element> {
        Self::nth(&self.content()?, "pre > code", index)
    }

    fn copy_control(&self, index: usize) -> Option<Element> {
        self.code_block(index)?
            .parent_element()?
            .query_selector(".copy-container")
            .ok()?
    }
}

impl Platform for WebPlatform {
    fn location_search(&self) -> String {
        self.window.location().search().unwrap_or_default()
    }

    fn location_hash(&self) -> String {
        self.window.location().hash().unwrap_or_default()
    }

    async fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
        let opts = web_sys::RequestInit::new();
        opts.set_method("GET");

        let request = web_sys::Request::new_with_str_and_init(path, &opts)
            .map_err(|e| LoadError::network(js_message(&e)))?;

        let response_value = JsFuture::from(self.window.fetch_with_request(&request))
            .await
            .map_err(|e| LoadError::network(js_message(&e)))?;

        let response: web_sys::Response = response_value
            .dyn_into()
            .map_err(|_| LoadError::network("fetch did not return a Response"))?;

        if !response.ok() {
            return Err(LoadError::Status {
                status: response.status(),
            });
        }

        let text = JsFuture::from(response.text().map_err(|e| LoadError::body(js_message(&e)))?)
            .await
            .map_err(|e| LoadError::body(js_message(&e)))?;

        text.as_string()
            .ok_or_else(|| LoadError::body("response body is not text"))
    }

    fn set_content_html(&self, html: &str) {
        match self.content() {
            Some(content) => content.set_inner_html(html),
            None => log::error!("[dom] missing #{CONTENT_ID}"),
        }
    }

    fn set_code_html(&self, index: usize, html: &str) {
        if let Some(code) = self.code_block(index) {
            code.set_inner_html(html);
            let _ = code.class_list().add_1(HIGHLIGHTED_CLASS);
        }
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn set_favicon(&self, href: &str) {
        self.remove_favicon();
        let Some(head) = self.document.head() else {
            return;
        };
        let link = match self.document.create_element("link") {
            Ok(link) => link,
            Err(e) => {
                log::warn!("[dom] favicon create failed: {}", js_message(&e));
                return;
            }
        };
        let attrs = [("rel", "icon"), ("type", "image/svg+xml"), ("href", href)];
        for (name, value) in attrs {
            let _ = link.set_attribute(name, value);
        }
        if let Err(e) = head.append_child(&link) {
            log::warn!("[dom] favicon append failed: {}", js_message(&e));
        }
    }

    fn remove_favicon(&self) {
        let Ok(links) = self.document.query_selector_all("link[rel~=\"icon\"]") else {
            return;
        };
        // The list is static, so removing while iterating is fine.
        for index in 0..links.length() {
            if let Some(link) = links.get(index).and_then(|node| node.dyn_into::<Element>().ok()) {
                link.remove();
            }
        }
    }

    fn set_first_image_src(&self, src: &str) {
        if let Ok(Some(img)) = self.document.query_selector(".markdown-body img") {
            let _ = img.set_attribute("src", src);
        }
    }

    fn set_back_label(&self, label: &str) {
        if let Some(button) = self.document.get_element_by_id(BACK_BUTTON_ID) {
            button.set_text_content(Some(label));
        }
    }

    fn navigate(&self, href: &str) {
        if let Err(e) = self.window.location().set_href(href) {
            log::error!("[nav] href={href} error={}", js_message(&e));
        }
    }

    fn set_heading_id(&self, index: usize, id: &str) {
        if let Some(heading) = self.heading(index) {
            heading.set_id(id);
        }
    }

    fn heading_tops(&self) -> Vec<f64> {
        let Some(headings) = self.content().and_then(|c| c.query_selector_all("h2").ok()) else {
            return Vec::new();
        };
        (0..headings.length())
            .filter_map(|index| headings.get(index)?.dyn_into::<Element>().ok())
            .map(|heading| heading.get_bounding_client_rect().top())
            .collect()
    }

    fn scroll_to_element(&self, id: &str) -> bool {
        let Some(element) = self.document.get_element_by_id(id) else {
            return false;
        };
        let opts = ScrollIntoViewOptions::new();
        opts.set_behavior(ScrollBehavior::Smooth);
        element.scroll_into_view_with_scroll_into_view_options(&opts);
        true
    }

    fn push_fragment(&self, fragment: &str) {
        let pushed = self.window.history().and_then(|history| {
            history.push_state_with_url(&JsValue::NULL, "", Some(&format!("#{fragment}")))
        });
        if let Err(e) = pushed {
            log::warn!("[nav] push fragment={fragment} error={}", js_message(&e));
        }
    }

    fn set_toc_item_active(&self, index: usize, active: bool) {
        if let Some(item) = self.toc_item(index) {
            let _ = item.class_list().toggle_with_force(ACTIVE_CLASS, active);
        }
    }

    fn append_copy_control(&self, index: usize, label: &str) {
        let Some(parent) = self.code_block(index).and_then(|code| code.parent_node()) else {
            return;
        };
        let container = match self.document.create_element("div") {
            Ok(el) => el,
            Err(e) => {
                log::warn!("[copy] create failed: {}", js_message(&e));
                return;
            }
        };
        container.set_class_name("copy-container");
        container.set_inner_html(&format!(
            "<span class=\"copy-text\">{}</span>{COPY_ICON}",
            crate::markdown::html_escape(label)
        ));
        if let Err(e) = parent.append_child(&container) {
            log::warn!("[copy] append failed: {}", js_message(&e));
        }
    }

    fn set_copy_label(&self, index: usize, label: &str) {
        let span = self
            .copy_control(index)
            .and_then(|control| control.query_selector(".copy-text").ok().flatten());
        if let Some(span) = span {
            span.set_text_content(Some(label));
        }
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), String> {
        let clipboard = self.window.navigator().clipboard();
        JsFuture::from(clipboard.write_text(text))
            .await
            .map(|_| ())
            .map_err(|e| js_message(&e))
    }
}

// ---------------------------------------------------------------------------
// Event binding
// ---------------------------------------------------------------------------

pub type WebController = Rc<PageController<WebPlatform>>;

/// Register `handler` for `event` on `target` for the lifetime of the page.
fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::warn!("[bind] event={event} error={}", js_message(&e));
    }
    closure.forget();
}

/// Wire `#backBtn`. Safe to call before the document has loaded: the
/// handler reads the current target on every click.
pub fn bind_back_button(controller: &WebController) {
    let document = &controller.platform().document;
    let Some(button) = document.get_element_by_id(BACK_BUTTON_ID) else {
        return;
    };
    let c = Rc::clone(controller);
    listen(&button, "click", move |_| c.on_back_click());
}

fn bind_toc_links(controller: &WebController) {
    for index in controller.wired_toc_items() {
        let link = controller
            .platform()
            .toc_item(index)
            .and_then(|item| item.query_selector("a").ok().flatten());
        let Some(link) = link else {
            continue;
        };
        let c = Rc::clone(controller);
        listen(&link, "click", move |event| {
            if c.on_toc_click(index) {
                event.prevent_default();
            }
        });
    }
}

fn bind_copy_controls(controller: &WebController) {
    for index in 0..controller.code_block_count() {
        let Some(control) = controller.platform().copy_control(index) else {
            continue;
        };

        let c = Rc::clone(controller);
        listen(&control, "click", move |_| {
            let c = Rc::clone(&c);
            spawn_local(async move { c.on_copy_click(index).await });
        });

        let c = Rc::clone(controller);
        listen(&control, "mouseleave", move |_| c.on_copy_leave(index));
    }
}

fn bind_scroll(controller: &WebController) {
    if !controller.tracks_scroll() {
        return;
    }
    let c = Rc::clone(controller);
    listen(&controller.platform().window, "scroll", move |_| {
        c.on_scroll();
    });
}

/// Wire the listeners that depend on the rendered document: TOC links,
/// copy controls and the scroll tracker.
pub fn bind_document(controller: &WebController) {
    bind_toc_links(controller);
    bind_copy_controls(controller);
    bind_scroll(controller);
}

async fn run() -> Result<(), JsValue> {
    let platform = WebPlatform::new()?;
    if platform.content().is_none() {
        log::warn!("[start] no #{CONTENT_ID} in page, nothing to do");
        return Ok(());
    }

    let controller = Rc::new(PageController::new(platform, PageConfig::default()));
    bind_back_button(&controller);
    if controller.load().await.is_ok() {
        bind_document(&controller);
    }
    Ok(())
}

/// Boot the page once the wasm module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    spawn_local(async {
        if let Err(e) = run().await {
            log::error!("[start] {}", js_message(&e));
        }
    });
}
