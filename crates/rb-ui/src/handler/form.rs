use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rb_core::error::AppError;
use rb_core::traits::BlobStore;
use rb_core::validation::{FormData, ValidationErrors};
use tracing::{debug, warn};

use super::{ErrorArea, Event, EventKind, Handler};
use crate::dom::{form_data, Element};
use crate::object_url::{ImageSlot, ObjectUrl};

/// A form control inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Text(&'static str),
    Password(&'static str),
    /// File input with a preview and a "clear image" button.
    Image(&'static str),
}

struct Preview {
    input: Element,
    clear_button: Element,
    slot: Mutex<ImageSlot>,
    blobs: Arc<dyn BlobStore>,
}

impl Preview {
    fn slot(&self) -> MutexGuard<'_, ImageSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A hideable box around one form, e.g. `"add-thread"`.
///
/// Element classes follow `box-{part}-{name}`.
pub struct FormBox {
    name: &'static str,
    main: Element,
    form: Element,
    submit_button: Element,
    fields: Vec<Element>,
    error: ErrorArea,
    cancel: Element,
    preview: Option<Preview>,
    target: Mutex<Option<i64>>,
}

impl FormBox {
    pub fn new(
        name: &'static str,
        heading: &str,
        fields: &[Field],
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let main = Element::with_class("div", &format!("box-main-{name}"));
        let heading_element = Element::with_class("h3", &format!("box-heading-{name}"));
        heading_element.set_text(heading);
        let form = Element::with_class("form", &format!("box-form-{name}"));
        main.append_child(&heading_element);

        let mut preview = None;
        let mut inputs = Vec::with_capacity(fields.len());
        for field in fields {
            let input = match *field {
                Field::Text(field_name) | Field::Password(field_name) => Element::input(
                    &format!("box-form-{field_name}-{name}"),
                    field_name,
                ),
                Field::Image(field_name) => {
                    let input = Element::file_input(&format!("box-form-{field_name}-{name}"), field_name);
                    let container = Element::with_class("div", "thumbnail-container");
                    let slot = ImageSlot::new(Element::with_class("img", "thumbnail"));
                    container.append_child(slot.element());
                    main.append_child(&container);
                    let clear_button =
                        Element::with_class("button", &format!("box-button-clear-image-{name}"));
                    clear_button.set_text("Clear image");
                    preview = Some(Preview {
                        input: input.clone(),
                        clear_button,
                        slot: Mutex::new(slot),
                        blobs: Arc::clone(&blobs),
                    });
                    input
                }
            };
            let part = Element::new("p");
            part.append_child(&input);
            form.append_child(&part);
            inputs.push(input);
        }
        if let Some(preview) = &preview {
            form.append_child(&preview.clear_button);
        }

        let submit_button = Element::with_class("input", &format!("box-form-submit-{name}"));
        submit_button.set_value(heading);
        form.append_child(&submit_button);
        main.append_child(&form);

        let error = ErrorArea::new(name);
        main.append_child(&error.container);
        let cancel = Element::with_class("button", &format!("box-button-cancel-{name}"));
        cancel.set_text("Cancel");
        main.append_child(&cancel);
        main.hide();

        Self {
            name,
            main,
            form,
            submit_button,
            fields: inputs,
            error,
            cancel,
            preview,
            target: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A page-level button that opens this box.
    pub fn create_button(&self, label: &str) -> Element {
        let button = Element::with_class("button", &format!("box-button-start-{}", self.name));
        button.set_text(label);
        button
    }

    pub fn main(&self) -> &Element {
        &self.main
    }

    pub fn form(&self) -> &Element {
        &self.form
    }

    pub fn submit_button(&self) -> &Element {
        &self.submit_button
    }

    pub fn cancel_button(&self) -> &Element {
        &self.cancel
    }

    /// The input named `name`.
    pub fn field(&self, name: &str) -> Option<&Element> {
        self.fields
            .iter()
            .find(|input| input.name().as_deref() == Some(name))
    }

    pub fn clear_image_button(&self) -> Option<&Element> {
        self.preview.as_ref().map(|p| &p.clear_button)
    }

    pub fn preview_src(&self) -> Option<String> {
        self.preview.as_ref().map(|p| p.slot().element().src())
    }

    pub fn error_text(&self) -> String {
        self.error.message.text()
    }

    pub fn target(&self) -> Option<i64> {
        *self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn form_data(&self) -> FormData {
        form_data(&self.form)
    }

    /// Opens the box for `target` (the record an action button carried).
    pub fn start(&self, target: Option<i64>) {
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = target;
        self.error.clear();
        self.main.show();
    }

    pub fn hide(&self) {
        self.main.hide();
    }

    pub fn set_error(&self, text: impl Into<String>) {
        self.error.set(text);
    }

    pub fn clear_error(&self) {
        self.error.clear();
    }

    /// Shows the chosen file, releasing the previous preview first.
    pub fn update_image_preview(&self) {
        let Some(preview) = &self.preview else {
            return;
        };
        let Some(file) = preview.input.file().filter(|f| !f.bytes.is_empty()) else {
            return;
        };
        let mut slot = preview.slot();
        slot.clear();
        slot.assign(ObjectUrl::create(&preview.blobs, file.into()));
    }

    /// Drops the chosen file and its preview.
    pub fn clear_image(&self) {
        if let Some(preview) = &self.preview {
            preview.input.set_file(None);
            preview.slot().clear();
        }
    }

    fn is_image_input(&self, element: &Element) -> bool {
        self.preview
            .as_ref()
            .is_some_and(|p| p.input.ptr_eq(element))
    }

    fn is_clear_image_button(&self, element: &Element) -> bool {
        self.preview
            .as_ref()
            .is_some_and(|p| p.clear_button.ptr_eq(element))
    }
}

/// What a form box does on submit.
#[async_trait]
pub trait FormAction: Send + Sync {
    /// Client-side checks; a failure means no request is made.
    fn validate(&self, _form: &FormData) -> Result<(), ValidationErrors> {
        Ok(())
    }

    async fn submit(&self, form: &FormData, target: Option<i64>) -> Result<i64, AppError>;
}

/// Binds a [`FormBox`] to a [`FormAction`].
pub struct FormHandler<A> {
    form_box: FormBox,
    start_class: String,
    action: A,
}

impl<A: FormAction> FormHandler<A> {
    /// `start_class` marks the buttons that open the box, e.g.
    /// `"button-delete-post"` on every post.
    pub fn new(form_box: FormBox, start_class: impl Into<String>, action: A) -> Self {
        Self {
            form_box,
            start_class: start_class.into(),
            action,
        }
    }

    pub fn form_box(&self) -> &FormBox {
        &self.form_box
    }

    /// Validates and submits the form. On success the box closes; on
    /// failure the error is shown in the box.
    pub async fn submit(&self) -> Result<i64, AppError> {
        let form_box = &self.form_box;
        form_box.clear_error();
        let data = form_box.form_data();

        let result = match self.action.validate(&data) {
            Ok(()) => self.action.submit(&data, form_box.target()).await,
            Err(errors) => Err(AppError::Validation(errors)),
        };

        match &result {
            Ok(id) => {
                debug!(form = form_box.name(), id, "form submitted");
                form_box.hide();
                form_box.clear_image();
            }
            Err(AppError::Validation(errors)) => form_box.set_error(errors.to_string()),
            Err(err) => {
                warn!(form = form_box.name(), error = %err, "form submission failed");
                form_box.set_error(err.status().to_string());
            }
        }
        result
    }
}

#[async_trait]
impl<A: FormAction> Handler for FormHandler<A> {
    async fn handle_event(&self, event: &Event) {
        let form_box = &self.form_box;
        let target = &event.target;
        match event.kind {
            EventKind::Click if target.has_class(&self.start_class) => {
                form_box.start(target.data_target());
            }
            EventKind::Click if target.ptr_eq(form_box.cancel_button()) => form_box.hide(),
            EventKind::Click if form_box.is_clear_image_button(target) => form_box.clear_image(),
            EventKind::Change if form_box.is_image_input(target) => {
                form_box.update_image_preview();
            }
            EventKind::Submit if target.ptr_eq(form_box.form()) => {
                // The outcome is already shown in the box.
                let _ = self.submit().await;
            }
            _ => {}
        }
    }
}
