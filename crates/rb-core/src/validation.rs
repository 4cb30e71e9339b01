//! # Form Validation
//!
//! A first line of defence before anything is sent. The backend does the
//! final validation and may still reject a request.

use std::fmt;

use crate::models::ImageFile;

/// A single form entry, as a browser form submission would produce it.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    /// A file input; `None` when no file was chosen.
    File(Option<ImageFile>),
}

/// Ordered field-name-to-value pairs. Later entries win on lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, FormValue::Text(value.into()));
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, file: Option<ImageFile>) -> Self {
        self.append(name, FormValue::File(file));
        self
    }

    pub fn append(&mut self, name: impl Into<String>, value: FormValue) {
        self.entries.push((name.into(), value));
    }

    fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Text value of `name`, or `""` if the field is absent or is a file.
    pub fn text(&self, name: &str) -> &str {
        match self.get(name) {
            Some(FormValue::Text(value)) => value,
            _ => "",
        }
    }

    /// The chosen file of `name`, if any.
    pub fn file(&self, name: &str) -> Option<&ImageFile> {
        match self.get(name) {
            Some(FormValue::File(file)) => file.as_ref(),
            _ => None,
        }
    }
}

/// Non-empty, ordered list of human-readable messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    fn check(errors: Vec<String>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Register form: `username`, `password`.
pub fn user_validation(form: &FormData) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if form.text("username").is_empty() {
        errors.push("Your username can not be empty.".to_string());
    }
    if form.text("password").chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Your password must be at least {MIN_PASSWORD_LEN} characters long."
        ));
    }

    ValidationErrors::check(errors)
}

/// Accepts every file for now; the backend checks type and size.
pub fn image_validation(_image: Option<&ImageFile>) -> Result<(), ValidationErrors> {
    ValidationErrors::check(Vec::new())
}

/// Thread form: `subject`, `text`, `image`.
pub fn thread_validation(form: &FormData) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if let Err(image_errors) = image_validation(form.file("image")) {
        errors.extend(image_errors.0);
    }
    if form.text("subject").is_empty() {
        errors.push("The thread subject can not be empty.".to_string());
    }

    ValidationErrors::check(errors)
}

/// Post form: `text`, `image`.
pub fn post_validation(form: &FormData) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if let Err(image_errors) = image_validation(form.file("image")) {
        errors.extend(image_errors.0);
    }

    ValidationErrors::check(errors)
}
