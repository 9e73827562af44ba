//! Transition to notification glue.

use notify::{DispatchReport, Dispatcher};
use tracing::debug;

use crate::detector::Transition;

/// Dispatch the notification for `transition`, if it is alertable.
///
/// Returns `None` without touching any sink for `None`, `FirstObservation`
/// and `InProgress`. Delivery failures are recorded in the report only.
pub async fn dispatch(
    transition: &Transition,
    repository: &str,
    dispatcher: &Dispatcher,
) -> Option<DispatchReport> {
    let Some(notification) = transition.notification(repository, chrono::Utc::now()) else {
        debug!(transition = transition.label(), "Transition is not alertable");
        return None;
    };

    Some(dispatcher.dispatch(&notification).await)
}
