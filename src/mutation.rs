//! Generic create/update engines shared by every mutable resource.
//!
//! A [`Creator`] is seeded with the mandatory fields at construction and
//! POSTs once. An [`Updater`] is obtained only from an existing facade and
//! carries the entity's identity path; its payload is the dirty-field set —
//! only fields explicitly assigned since the facade was obtained are
//! transmitted, so untouched fields cannot clobber concurrent server-side
//! changes.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::api::ApiHandle;
use crate::error::{Error, Result};
use crate::payload::Payload;

/// Lifecycle transition accepted by issue and merge-request updaters via
/// the `state_event` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    Close,
    Reopen,
}

impl StateEvent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StateEvent::Close => "close",
            StateEvent::Reopen => "reopen",
        }
    }
}

/// Accumulated intent to create a resource.
pub(crate) struct Creator<T> {
    api: ApiHandle,
    path: String,
    payload: Payload,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Creator<T> {
    pub(crate) fn new(api: ApiHandle, path: impl Into<String>, seed: Payload) -> Self {
        Self {
            api,
            path: path.into(),
            payload: seed,
            _marker: PhantomData,
        }
    }

    /// Assign an optional field, overriding the seed or an earlier call.
    pub(crate) fn set(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.payload.insert(key, value.into());
    }

    pub(crate) fn api(&self) -> &ApiHandle {
        &self.api
    }

    /// Issue the POST and deserialize the created resource.
    pub(crate) async fn run(self) -> Result<T> {
        self.api.post(&self.path, &self.payload).await
    }
}

/// Accumulated intent to update an existing resource.
pub(crate) struct Updater<T> {
    api: ApiHandle,
    path: String,
    dirty: Payload,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Updater<T> {
    pub(crate) fn new(api: ApiHandle, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
            dirty: Payload::new(),
            _marker: PhantomData,
        }
    }

    /// Mark a field dirty with its new value.
    pub(crate) fn set(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.dirty.insert(key, value.into());
    }

    pub(crate) fn api(&self) -> &ApiHandle {
        &self.api
    }

    /// Issue the PUT with only the dirty fields and deserialize the server's
    /// post-update representation. An update with no assigned fields is a
    /// caller error and never reaches the wire.
    pub(crate) async fn run(self) -> Result<T> {
        if self.dirty.is_empty() {
            return Err(Error::invalid_argument(
                "update has no fields set; assign at least one field before update()",
            ));
        }
        self.api.put(&self.path, &self.dirty).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Api;
    use crate::error::ErrorKind;
    use crate::http::{HttpMethod, MockTransport};
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: u64,
        name: String,
    }

    const BASE: &str = "https://gitlab.example.com";

    fn handle(transport: &MockTransport) -> ApiHandle {
        Arc::new(Api::new(
            Arc::new(transport.clone()),
            BASE.to_string(),
            None,
            20,
            None,
        ))
    }

    #[tokio::test]
    async fn creator_posts_seed_and_optional_fields() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            format!("{BASE}/api/v4/things"),
            201,
            r#"{"id":1,"name":"t1"}"#,
        );

        let mut creator: Creator<Thing> = Creator::new(
            handle(&transport),
            "/things",
            Payload::new().put_str("name", "t1"),
        );
        creator.set("color", "blue");

        let created = creator.run().await.unwrap();
        assert_eq!(created.id, 1);

        let sent: serde_json::Value =
            serde_json::from_slice(&transport.requests()[0].body).unwrap();
        assert_eq!(sent, serde_json::json!({"name": "t1", "color": "blue"}));
    }

    #[tokio::test]
    async fn updater_sends_only_dirty_fields() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Put,
            format!("{BASE}/api/v4/things/1"),
            200,
            r#"{"id":1,"name":"renamed"}"#,
        );

        let mut updater: Updater<Thing> = Updater::new(handle(&transport), "/things/1");
        updater.set("name", "renamed");

        let updated = updater.run().await.unwrap();
        assert_eq!(updated.name, "renamed");

        let sent: serde_json::Value =
            serde_json::from_slice(&transport.requests()[0].body).unwrap();
        // Only the assigned field travels; nothing else is resent.
        assert_eq!(sent, serde_json::json!({"name": "renamed"}));
    }

    #[tokio::test]
    async fn empty_update_is_rejected_before_any_request() {
        let transport = MockTransport::new();
        let updater: Updater<Thing> = Updater::new(handle(&transport), "/things/1");

        let err = updater.run().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn server_rejection_surfaces_as_invalid_request() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            format!("{BASE}/api/v4/things"),
            400,
            r#"{"message":{"name":["has already been taken"]}}"#,
        );

        let creator: Creator<Thing> = Creator::new(
            handle(&transport),
            "/things",
            Payload::new().put_str("name", "dup"),
        );
        let err = creator.run().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(err.to_string().contains("has already been taken"));
    }
}
