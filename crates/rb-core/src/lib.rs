//! rusty-board/crates/rb-core/src/lib.rs
//!
//! The domain records and interface definitions for the Rusty-Board client.

pub mod error;
pub mod models;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
pub use validation::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use super::traits::{ImageboardApi, MockImageboardApi};
    use super::ApiError;

    #[test]
    fn thread_record_with_null_post_and_subject() {
        let thread: Thread = serde_json::from_value(serde_json::json!({
            "thread_id": 3,
            "thread_subject": null,
            "thread_timestamp": 10,
            "thread_last_modified": 12,
            "user_id": 1,
            "post_id": null,
        }))
        .unwrap();
        assert_eq!(thread.thread_id, 3);
        assert_eq!(thread.thread_subject, "");
        assert_eq!(thread.post_id, None);
    }

    #[test]
    fn settings_use_dashed_keys() {
        let settings = Settings {
            filter_criteria: Some("subject".into()),
            filter_sort_order: Some(false),
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"filter-criteria": "subject", "filter-sort-order": false})
        );
    }

    #[test]
    fn credential_never_prints_password() {
        let credential = SessionCredential::new("anon", "hunter22");
        assert!(!format!("{credential:?}").contains("hunter22"));
        assert!(!credential.to_string().contains("hunter22"));
        assert_eq!(credential.to_body()["password"], "hunter22");
    }

    #[tokio::test]
    async fn mock_api_reports_status_errors() {
        let mut api = MockImageboardApi::new();
        api.expect_delete_post()
            .withf(|id| *id == 7)
            .times(1)
            .returning(|_| Err(ApiError::Empty));
        assert_eq!(api.delete_post(7).await, Err(ApiError::Empty));
    }
}
