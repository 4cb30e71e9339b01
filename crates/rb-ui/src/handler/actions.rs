//! Concrete form actions, one per box.

use async_trait::async_trait;
use rb_core::error::AppError;
use rb_core::models::SessionCredential;
use rb_core::validation::{
    post_validation, thread_validation, user_validation, FormData, ValidationErrors,
};

use super::form::{FormAction, FormHandler};
use crate::manager::{ActivePosts, ThreadsManager};
use crate::session::SessionManager;

pub struct AddThread(pub ThreadsManager);
pub struct ModifyThread(pub ThreadsManager);
pub struct DeleteThread(pub ThreadsManager);
pub struct AddPost(pub ActivePosts);
pub struct ModifyPost(pub ActivePosts);
pub struct DeletePost(pub ActivePosts);
pub struct Register(pub SessionManager);
pub struct Login(pub SessionManager);
pub struct Logout(pub SessionManager);

pub type AddThreadHandler = FormHandler<AddThread>;
pub type ModifyThreadHandler = FormHandler<ModifyThread>;
pub type DeleteThreadHandler = FormHandler<DeleteThread>;
pub type AddPostHandler = FormHandler<AddPost>;
pub type ModifyPostHandler = FormHandler<ModifyPost>;
pub type DeletePostHandler = FormHandler<DeletePost>;
pub type RegisterHandler = FormHandler<Register>;
pub type LoginHandler = FormHandler<Login>;
pub type LogoutHandler = FormHandler<Logout>;

#[async_trait]
impl FormAction for AddThread {
    fn validate(&self, form: &FormData) -> Result<(), ValidationErrors> {
        thread_validation(form)
    }

    async fn submit(&self, form: &FormData, _target: Option<i64>) -> Result<i64, AppError> {
        self.0.add_thread(form).await
    }
}

#[async_trait]
impl FormAction for ModifyThread {
    fn validate(&self, form: &FormData) -> Result<(), ValidationErrors> {
        thread_validation(form)
    }

    async fn submit(&self, form: &FormData, target: Option<i64>) -> Result<i64, AppError> {
        self.0.modify_thread(form, target).await
    }
}

#[async_trait]
impl FormAction for DeleteThread {
    async fn submit(&self, _form: &FormData, target: Option<i64>) -> Result<i64, AppError> {
        self.0.delete_thread(target).await
    }
}

#[async_trait]
impl FormAction for AddPost {
    fn validate(&self, form: &FormData) -> Result<(), ValidationErrors> {
        post_validation(form)
    }

    async fn submit(&self, form: &FormData, _target: Option<i64>) -> Result<i64, AppError> {
        self.0.require()?.add_post(form).await
    }
}

#[async_trait]
impl FormAction for ModifyPost {
    fn validate(&self, form: &FormData) -> Result<(), ValidationErrors> {
        post_validation(form)
    }

    async fn submit(&self, form: &FormData, target: Option<i64>) -> Result<i64, AppError> {
        self.0.require()?.modify_post(form, target).await
    }
}

#[async_trait]
impl FormAction for DeletePost {
    async fn submit(&self, _form: &FormData, target: Option<i64>) -> Result<i64, AppError> {
        self.0.require()?.delete_post(target).await
    }
}

fn credential(form: &FormData) -> SessionCredential {
    SessionCredential::new(form.text("username"), form.text("password"))
}

#[async_trait]
impl FormAction for Register {
    fn validate(&self, form: &FormData) -> Result<(), ValidationErrors> {
        user_validation(form)
    }

    async fn submit(&self, form: &FormData, _target: Option<i64>) -> Result<i64, AppError> {
        self.0.register(&credential(form)).await
    }
}

/// Existing accounts are not held to the registration rules.
#[async_trait]
impl FormAction for Login {
    async fn submit(&self, form: &FormData, _target: Option<i64>) -> Result<i64, AppError> {
        self.0.login(&credential(form)).await
    }
}

#[async_trait]
impl FormAction for Logout {
    async fn submit(&self, _form: &FormData, _target: Option<i64>) -> Result<i64, AppError> {
        self.0.logout().await
    }
}
