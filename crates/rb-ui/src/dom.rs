//! # Element Tree
//!
//! A small retained element tree standing in for the page. Components get
//! their elements injected at construction and never look anything up
//! globally, so the whole UI runs headless.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rb_core::models::ImageFile;
use rb_core::validation::{FormData, FormValue};

#[derive(Debug, Default)]
struct Node {
    tag: &'static str,
    class_name: String,
    name: Option<String>,
    text: String,
    value: String,
    checked: bool,
    file: Option<ImageFile>,
    src: String,
    /// Id of the record an action button acts on.
    data_target: Option<i64>,
    hidden: bool,
    children: Vec<Element>,
}

/// Shared handle to one node. Clones refer to the same node.
#[derive(Clone, Default)]
pub struct Element(Arc<Mutex<Node>>);

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self(Arc::new(Mutex::new(Node { tag, ..Node::default() })))
    }

    /// `<tag class="...">`
    pub fn with_class(tag: &'static str, class_name: &str) -> Self {
        let element = Self::new(tag);
        element.node().class_name = class_name.to_string();
        element
    }

    /// Named form control.
    pub fn input(class_name: &str, name: &str) -> Self {
        let element = Self::with_class("input", class_name);
        element.node().name = Some(name.to_string());
        element
    }

    /// Named file input.
    pub fn file_input(class_name: &str, name: &str) -> Self {
        let element = Self::input(class_name, name);
        element.node().tag = "input-file";
        element
    }

    fn node(&self) -> MutexGuard<'_, Node> {
        // A panic while mutating a node leaves it structurally valid.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn tag(&self) -> &'static str {
        self.node().tag
    }

    pub fn class_name(&self) -> String {
        self.node().class_name.clone()
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.node().class_name.split_whitespace().any(|c| c == class_name)
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.node().text = text.into();
    }

    pub fn text(&self) -> String {
        self.node().text.clone()
    }

    /// Own text followed by the text of every descendant, depth first,
    /// one line per non-empty node.
    pub fn text_content(&self) -> String {
        let mut lines = Vec::new();
        self.collect_text(&mut lines);
        lines.join("\n")
    }

    fn collect_text(&self, lines: &mut Vec<String>) {
        let (text, children) = {
            let node = self.node();
            (node.text.clone(), node.children.clone())
        };
        if !text.is_empty() {
            lines.push(text);
        }
        for child in &children {
            child.collect_text(lines);
        }
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.node().value = value.into();
    }

    pub fn value(&self) -> String {
        self.node().value.clone()
    }

    pub fn set_checked(&self, checked: bool) {
        self.node().checked = checked;
    }

    pub fn checked(&self) -> bool {
        self.node().checked
    }

    pub fn set_file(&self, file: Option<ImageFile>) {
        self.node().file = file;
    }

    pub fn file(&self) -> Option<ImageFile> {
        self.node().file.clone()
    }

    pub fn set_src(&self, src: impl Into<String>) {
        self.node().src = src.into();
    }

    pub fn src(&self) -> String {
        self.node().src.clone()
    }

    pub fn set_data_target(&self, target: Option<i64>) {
        self.node().data_target = target;
    }

    pub fn data_target(&self) -> Option<i64> {
        self.node().data_target
    }

    pub fn show(&self) {
        self.node().hidden = false;
    }

    pub fn hide(&self) {
        self.node().hidden = true;
    }

    pub fn is_hidden(&self) -> bool {
        self.node().hidden
    }

    pub fn append_child(&self, child: &Element) {
        self.node().children.push(child.clone());
    }

    pub fn remove_children(&self) {
        // Drop outside the lock; children may be shared with other nodes.
        let children = std::mem::take(&mut self.node().children);
        drop(children);
    }

    pub fn children(&self) -> Vec<Element> {
        self.node().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.node().children.len()
    }

    /// First descendant (not self) carrying `class_name`.
    pub fn find_by_class(&self, class_name: &str) -> Option<Element> {
        for child in self.children() {
            if child.has_class(class_name) {
                return Some(child);
            }
            if let Some(found) = child.find_by_class(class_name) {
                return Some(found);
            }
        }
        None
    }

    fn for_each_descendant(&self, f: &mut impl FnMut(&Element)) {
        for child in self.children() {
            f(&child);
            child.for_each_descendant(f);
        }
    }

    /// Field name of a form control.
    pub fn name(&self) -> Option<String> {
        self.node().name.clone()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        f.debug_struct("Element")
            .field("tag", &node.tag)
            .field("class_name", &node.class_name)
            .field("text", &node.text)
            .field("children", &node.children.len())
            .finish()
    }
}

/// Collects every named control under `form`, in document order.
pub fn form_data(form: &Element) -> FormData {
    let mut data = FormData::new();
    form.for_each_descendant(&mut |element| {
        let Some(name) = element.name() else {
            return;
        };
        if element.tag() == "input-file" {
            data.append(name, FormValue::File(element.file()));
        } else {
            data.append(name, FormValue::Text(element.value()));
        }
    });
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn clones_share_the_node() {
        let a = Element::new("div");
        let b = a.clone();
        b.set_text("hello");
        assert_eq!(a.text(), "hello");
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Element::new("div")));
    }

    #[test]
    fn text_content_is_depth_first() {
        let root = Element::with_class("div", "thread");
        let subject = Element::with_class("div", "thread-subject");
        subject.set_text("Subject");
        let body = Element::with_class("div", "thread-text");
        body.set_text("Body");
        root.append_child(&subject);
        root.append_child(&body);

        assert_eq!(root.text_content(), "Subject\nBody");
        assert_eq!(root.find_by_class("thread-text").unwrap().text(), "Body");

        root.remove_children();
        assert_eq!(root.child_count(), 0);
        assert_eq!(root.text_content(), "");
    }

    #[test]
    fn form_data_collects_named_controls() {
        let form = Element::new("form");
        let subject = Element::input("box-form-subject", "subject");
        subject.set_value("Rust");
        let image = Element::file_input("box-form-image", "image");
        image.set_file(Some(ImageFile {
            file_name: "a.png".into(),
            mime: mime::IMAGE_PNG,
            bytes: Bytes::from_static(b"png"),
        }));
        let fieldset = Element::new("fieldset");
        fieldset.append_child(&image);
        form.append_child(&subject);
        form.append_child(&fieldset);
        form.append_child(&Element::with_class("button", "box-form-submit"));

        let data = form_data(&form);
        assert_eq!(data.text("subject"), "Rust");
        assert_eq!(data.file("image").unwrap().file_name, "a.png");
    }

    #[test]
    fn has_class_matches_whole_words() {
        let button = Element::with_class("button", "button button-cancel");
        assert!(button.has_class("button-cancel"));
        assert!(!button.has_class("cancel"));
    }
}
