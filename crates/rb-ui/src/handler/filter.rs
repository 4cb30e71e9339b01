use std::sync::Arc;

use async_trait::async_trait;
use rb_core::traits::ImageboardApi;
use tracing::{debug, warn};

use super::{Event, EventKind, Handler};
use crate::dom::Element;
use crate::filter::{Criteria, FilterState, SharedFilter};
use crate::manager::ListView;

/// The search box, the sort order checkbox and the criteria select.
#[derive(Debug, Clone)]
pub struct FilterElements {
    pub search: Element,
    pub sort_order: Element,
    pub criteria: Element,
}

impl FilterElements {
    pub fn headless() -> Self {
        Self {
            search: Element::input("filter-search", "search"),
            sort_order: Element::input("filter-sort-order", "sort-order"),
            criteria: Element::input("filter-criteria", "criteria"),
        }
    }

    fn display(&self, state: &FilterState) {
        self.search.set_value(state.search.as_str());
        self.sort_order.set_checked(state.sort_order);
        self.criteria.set_value(state.criteria.as_str());
    }
}

/// Keeps the shared filter in sync with its controls and tells every list
/// to re-sort or re-filter. Criteria and sort order are also stored
/// server-side.
pub struct FilterHandler {
    elements: FilterElements,
    filter: SharedFilter,
    api: Arc<dyn ImageboardApi>,
    targets: Vec<Arc<dyn ListView>>,
}

impl FilterHandler {
    pub fn new(
        elements: FilterElements,
        filter: SharedFilter,
        api: Arc<dyn ImageboardApi>,
        targets: Vec<Arc<dyn ListView>>,
    ) -> Self {
        elements.display(&filter.get());
        Self {
            elements,
            filter,
            api,
            targets,
        }
    }

    pub fn elements(&self) -> &FilterElements {
        &self.elements
    }

    pub fn state(&self) -> FilterState {
        self.filter.get()
    }

    /// Loads stored criteria and sort order, if the server has any, and
    /// re-sorts every list.
    pub async fn restore(&self) {
        match self.api.get_settings().await {
            Ok(Some(settings)) => {
                self.filter.update(|state| state.apply_settings(&settings));
                self.elements.display(&self.filter.get());
                debug!(filter = %self.filter.get(), "filter restored");
                self.sort_all();
            }
            Ok(None) => debug!("no stored filter settings"),
            Err(err) => warn!(error = %err, "failed to retrieve filter settings"),
        }
    }

    async fn persist(&self) {
        let settings = self.filter.get().to_settings();
        if let Err(err) = self.api.set_settings(&settings).await {
            warn!(error = %err, "failed to store filter settings");
        }
    }

    fn sort_all(&self) {
        for target in &self.targets {
            target.sort_list();
        }
    }

    fn filter_all(&self) {
        for target in &self.targets {
            target.filter_list();
        }
    }
}

#[async_trait]
impl Handler for FilterHandler {
    async fn handle_event(&self, event: &Event) {
        // Browsers follow `input` with `change` on checkboxes; one must be ignored.
        if event.kind != EventKind::Input {
            return;
        }
        let target = &event.target;
        if target.ptr_eq(&self.elements.search) {
            let search = target.value();
            self.filter.update(|state| state.search = search);
            self.filter_all();
        } else if target.ptr_eq(&self.elements.sort_order) {
            let sort_order = target.checked();
            self.filter.update(|state| state.sort_order = sort_order);
            self.sort_all();
            self.persist().await;
        } else if target.ptr_eq(&self.elements.criteria) {
            match target.value().parse::<Criteria>() {
                Ok(criteria) => {
                    self.filter.update(|state| state.criteria = criteria);
                    self.sort_all();
                    self.persist().await;
                }
                Err(err) => {
                    warn!(error = %err, "ignoring filter criteria");
                    self.elements.display(&self.filter.get());
                }
            }
        }
    }
}
