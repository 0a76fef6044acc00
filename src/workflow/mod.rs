//! The review workflow: project intake, token-gated access, and the
//! pending → approved / override_requested decisions on recordings.
//!
//! A `Workflow` borrows its collaborators for the length of one request;
//! it holds no state of its own.

pub mod access;
pub mod intake;
pub mod review;

use crate::config::Config;
use crate::lookup::MeetingLookup;
use crate::notification::webhook::WebhookNotifier;
use crate::store::RecordStore;

pub struct Workflow<'a> {
    store: &'a dyn RecordStore,
    lookup: &'a dyn MeetingLookup,
    webhook: &'a WebhookNotifier,
    config: &'a Config,
    draft_key: &'a [u8],
}

impl<'a> Workflow<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        lookup: &'a dyn MeetingLookup,
        webhook: &'a WebhookNotifier,
        config: &'a Config,
        draft_key: &'a [u8],
    ) -> Self {
        Self {
            store,
            lookup,
            webhook,
            config,
            draft_key,
        }
    }
}

/// Trimmed, non-empty form input.
pub(crate) fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
