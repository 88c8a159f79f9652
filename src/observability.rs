use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("toolchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("toolchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("toolchat.client.request_duration_seconds");

pub(crate) static SESSION_SUBMITS: Counter = Counter::new("toolchat.session.submits");
pub(crate) static SESSION_SUBMITS_IGNORED: Counter =
    Counter::new("toolchat.session.submits_ignored");
pub(crate) static SESSION_SUBMITS_FAILED: Counter =
    Counter::new("toolchat.session.submits_failed");
pub(crate) static SESSION_STALE_RESPONSES: Counter =
    Counter::new("toolchat.session.stale_responses");
pub(crate) static SESSION_RESETS: Counter = Counter::new("toolchat.session.resets");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_SUBMITS);
    collector.register_counter(&SESSION_SUBMITS_IGNORED);
    collector.register_counter(&SESSION_SUBMITS_FAILED);
    collector.register_counter(&SESSION_STALE_RESPONSES);
    collector.register_counter(&SESSION_RESETS);
}
