//! # Imageboard
//!
//! The root component. It builds every box, manager and handler around an
//! injected [`Page`] and routes events to the handlers.

use std::sync::Arc;

use rb_core::error::AppError;
use rb_core::traits::{BlobStore, ImageboardApi};

use crate::dom::Element;
use crate::entity::EntityContext;
use crate::filter::{FilterState, SharedFilter};
use crate::handler::{
    AddPost, AddPostHandler, AddThread, AddThreadHandler, DeletePost, DeletePostHandler,
    DeleteThread, DeleteThreadHandler, Event, Field, FilterElements, FilterHandler, FormBox,
    FormHandler, Handler, ListBox, Login, LoginHandler, Logout, LogoutHandler, ModifyPost,
    ModifyPostHandler, ModifyThread, ModifyThreadHandler, Register, RegisterHandler,
    ShowPostsHandler, ShowThreadsHandler,
};
use crate::manager::{ActivePosts, ListView, Reload, ThreadsManager, ThreadsScope};
use crate::session::SessionManager;

/// The elements the board is mounted into.
#[derive(Debug, Clone)]
pub struct Page {
    pub body: Element,
    /// Holds the buttons that open the top-level boxes.
    pub navigation: Element,
    pub filter: FilterElements,
}

impl Page {
    /// A detached page with fresh elements.
    pub fn headless() -> Self {
        let body = Element::new("body");
        let navigation = Element::with_class("div", "navigation");
        let filter = FilterElements::headless();
        let filter_box = Element::with_class("div", "filter");
        filter_box.append_child(&filter.search);
        filter_box.append_child(&filter.sort_order);
        filter_box.append_child(&filter.criteria);
        body.append_child(&navigation);
        body.append_child(&filter_box);
        Self {
            body,
            navigation,
            filter,
        }
    }
}

/// Every form handler of the board.
pub struct Forms {
    pub add_thread: Arc<AddThreadHandler>,
    pub modify_thread: Arc<ModifyThreadHandler>,
    pub delete_thread: Arc<DeleteThreadHandler>,
    pub add_post: Arc<AddPostHandler>,
    pub modify_post: Arc<ModifyPostHandler>,
    pub delete_post: Arc<DeletePostHandler>,
    pub register: Arc<RegisterHandler>,
    pub login: Arc<LoginHandler>,
    pub logout: Arc<LogoutHandler>,
}

pub struct Imageboard {
    page: Page,
    filter: SharedFilter,
    threads: ThreadsManager,
    posts: ActivePosts,
    session: SessionManager,
    show_threads: Arc<ShowThreadsHandler>,
    show_posts: Arc<ShowPostsHandler>,
    filter_handler: Arc<FilterHandler>,
    forms: Forms,
    handlers: Vec<Arc<dyn Handler>>,
}

const THREAD_FIELDS: &[Field] = &[Field::Text("subject"), Field::Text("text"), Field::Image("image")];
const POST_FIELDS: &[Field] = &[Field::Text("text"), Field::Image("image")];
const USER_FIELDS: &[Field] = &[Field::Text("username"), Field::Password("password")];

impl Imageboard {
    pub fn new(
        api: Arc<dyn ImageboardApi>,
        blobs: Arc<dyn BlobStore>,
        page: Page,
        initial: FilterState,
    ) -> Self {
        let ctx = EntityContext::new(Arc::clone(&api), Arc::clone(&blobs));
        let filter = SharedFilter::new(initial);

        let threads_box = ListBox::new("show-threads");
        let posts_box = ListBox::new("show-posts");
        let threads = ThreadsManager::new(
            ThreadsScope,
            ctx.clone(),
            filter.clone(),
            threads_box.list().clone(),
        );
        let posts = ActivePosts::default();
        let session = SessionManager::new(Arc::clone(&api), threads.clone());

        let form = |name: &'static str, heading: &str, fields: &[Field]| {
            FormBox::new(name, heading, fields, Arc::clone(&blobs))
        };
        let forms = Forms {
            add_thread: Arc::new(FormHandler::new(
                form("add-thread", "Add thread", THREAD_FIELDS),
                "box-button-start-add-thread",
                AddThread(threads.clone()),
            )),
            modify_thread: Arc::new(FormHandler::new(
                form("modify-thread", "Modify thread", THREAD_FIELDS),
                "button-modify-thread",
                ModifyThread(threads.clone()),
            )),
            delete_thread: Arc::new(FormHandler::new(
                form("delete-thread", "Delete thread", &[]),
                "button-delete-thread",
                DeleteThread(threads.clone()),
            )),
            add_post: Arc::new(FormHandler::new(
                form("add-post", "Add post", POST_FIELDS),
                "box-button-start-add-post",
                AddPost(posts.clone()),
            )),
            modify_post: Arc::new(FormHandler::new(
                form("modify-post", "Modify post", POST_FIELDS),
                "button-modify-post",
                ModifyPost(posts.clone()),
            )),
            delete_post: Arc::new(FormHandler::new(
                form("delete-post", "Delete post", &[]),
                "button-delete-post",
                DeletePost(posts.clone()),
            )),
            register: Arc::new(FormHandler::new(
                form("register", "Register", USER_FIELDS),
                "box-button-start-register",
                Register(session.clone()),
            )),
            login: Arc::new(FormHandler::new(
                form("login", "Login", USER_FIELDS),
                "box-button-start-login",
                Login(session.clone()),
            )),
            logout: Arc::new(FormHandler::new(
                form("logout", "Logout", &[]),
                "box-button-start-logout",
                Logout(session.clone()),
            )),
        };

        let navigation = &page.navigation;
        navigation.append_child(&threads_box.create_button("Show threads"));
        navigation.append_child(&forms.add_thread.form_box().create_button("Add thread"));
        navigation.append_child(&forms.register.form_box().create_button("Register"));
        navigation.append_child(&forms.login.form_box().create_button("Login"));
        navigation.append_child(&forms.logout.form_box().create_button("Logout"));
        posts_box
            .main()
            .append_child(&forms.add_post.form_box().create_button("Add post"));

        for element in [threads_box.main(), posts_box.main()] {
            page.body.append_child(element);
        }
        for form_box in [
            forms.add_thread.form_box(),
            forms.modify_thread.form_box(),
            forms.delete_thread.form_box(),
            forms.add_post.form_box(),
            forms.modify_post.form_box(),
            forms.delete_post.form_box(),
            forms.register.form_box(),
            forms.login.form_box(),
            forms.logout.form_box(),
        ] {
            page.body.append_child(form_box.main());
        }

        let threads_view: Arc<dyn ListView> = Arc::new(threads.clone());
        let show_threads = Arc::new(ShowThreadsHandler::new(threads_box, Arc::clone(&threads_view)));
        let show_posts = Arc::new(ShowPostsHandler::new(posts_box, ctx, filter.clone(), posts.clone()));
        let filter_handler = Arc::new(FilterHandler::new(
            page.filter.clone(),
            filter.clone(),
            api,
            vec![threads_view, Arc::new(posts.clone()) as Arc<dyn ListView>],
        ));

        let handlers: Vec<Arc<dyn Handler>> = vec![
            show_threads.clone(),
            show_posts.clone(),
            filter_handler.clone(),
            forms.add_thread.clone(),
            forms.modify_thread.clone(),
            forms.delete_thread.clone(),
            forms.add_post.clone(),
            forms.modify_post.clone(),
            forms.delete_post.clone(),
            forms.register.clone(),
            forms.login.clone(),
            forms.logout.clone(),
        ];

        Self {
            page,
            filter,
            threads,
            posts,
            session,
            show_threads,
            show_posts,
            filter_handler,
            forms,
            handlers,
        }
    }

    /// Reloads the thread list.
    pub async fn reload(&self) -> Result<Reload, AppError> {
        self.threads.reload_list().await
    }

    /// Applies stored filter settings.
    pub async fn restore_settings(&self) {
        self.filter_handler.restore().await;
    }

    /// Delivers `event` to every handler, in registration order.
    pub async fn dispatch(&self, event: &Event) {
        for handler in &self.handlers {
            handler.handle_event(event).await;
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn filter(&self) -> &SharedFilter {
        &self.filter
    }

    pub fn threads(&self) -> &ThreadsManager {
        &self.threads
    }

    /// The posts list currently open.
    pub fn posts(&self) -> &ActivePosts {
        &self.posts
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn show_threads(&self) -> &ShowThreadsHandler {
        &self.show_threads
    }

    pub fn show_posts(&self) -> &ShowPostsHandler {
        &self.show_posts
    }

    pub fn forms(&self) -> &Forms {
        &self.forms
    }

    /// Text of the visible threads, in display order.
    pub fn threads_text(&self) -> String {
        self.threads.container().text_content()
    }

    /// First element under the page or any box carrying `class_name`.
    pub fn find(&self, class_name: &str) -> Option<Element> {
        self.page.body.find_by_class(class_name)
    }
}
