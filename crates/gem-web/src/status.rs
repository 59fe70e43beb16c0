use gem_core::StatusDisplay;
use web_sys as web;

const HIDDEN_CLASS: &str = "hidden";

/// Loader and error list backed by DOM elements.
pub struct DomStatus {
    document: web::Document,
    loader_id: &'static str,
    errors_id: &'static str,
}

impl DomStatus {
    pub fn new(document: web::Document, loader_id: &'static str, errors_id: &'static str) -> Self {
        Self {
            document,
            loader_id,
            errors_id,
        }
    }

    fn message_element_id(id: &str) -> String {
        format!("error-{}", id)
    }
}

impl StatusDisplay for DomStatus {
    fn show_loader(&self, visible: bool) {
        if let Some(el) = self.document.get_element_by_id(self.loader_id) {
            let classes = el.class_list();
            let _ = if visible {
                classes.remove_1(HIDDEN_CLASS)
            } else {
                classes.add_1(HIDDEN_CLASS)
            };
        }
    }

    fn set_error_message(&self, id: &str, message: &str) {
        let el_id = Self::message_element_id(id);
        let el = match self.document.get_element_by_id(&el_id) {
            Some(el) => el,
            None => {
                let Some(list) = self.document.get_element_by_id(self.errors_id) else {
                    log::warn!("[status] missing #{}; error not shown: {}", self.errors_id, message);
                    return;
                };
                let Ok(el) = self.document.create_element("div") else {
                    return;
                };
                el.set_id(&el_id);
                if list.append_child(&el).is_err() {
                    return;
                }
                el
            }
        };
        el.set_text_content(Some(message));
    }

    fn clear_error_message(&self, id: &str) {
        if let Some(el) = self
            .document
            .get_element_by_id(&Self::message_element_id(id))
        {
            el.remove();
        }
    }
}
