//! Run transition detection.
//!
//! The detector is edge-triggered on run identity: a transition is only
//! classified when the latest run id differs from the last one seen. Polling
//! the same run again, even if its status changed in place, yields
//! [`Transition::None`], so a failing pipeline alerts once per failing run
//! rather than once per poll.

use chrono::{DateTime, Utc};
use notify::{Notification, NotificationKind};
use scm::{RunSnapshot, StatusCode};

/// State carried between polls. Lives for the process lifetime only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorState {
    pub last_seen_id: Option<String>,
}

/// Result of comparing a fresh snapshot with the detector state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No run, or the same run seen again
    None,
    /// First run ever observed; becomes the baseline
    FirstObservation(RunSnapshot),
    /// A new run that failed
    Failure(RunSnapshot),
    /// A new run that succeeded
    Recovery(RunSnapshot),
    /// A new run that has not concluded yet
    InProgress(RunSnapshot),
}

impl Transition {
    /// Whether this transition produces a notification.
    pub const fn is_alertable(&self) -> bool {
        matches!(self, Self::Failure(_) | Self::Recovery(_))
    }

    /// Short label for logging.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FirstObservation(_) => "first_observation",
            Self::Failure(_) => "failure",
            Self::Recovery(_) => "recovery",
            Self::InProgress(_) => "in_progress",
        }
    }

    /// Build the notification for an alertable transition.
    pub fn notification(&self, repository: &str, now: DateTime<Utc>) -> Option<Notification> {
        let (kind, run) = match self {
            Self::Failure(run) => (NotificationKind::Failure, run),
            Self::Recovery(run) => (NotificationKind::Recovery, run),
            Self::None | Self::FirstObservation(_) | Self::InProgress(_) => return None,
        };
        Some(Notification::new(kind, repository, run.clone(), now))
    }
}

/// Tracks the last seen run id and classifies new snapshots.
#[derive(Debug, Default)]
pub struct TransitionDetector {
    state: DetectorState,
}

impl TransitionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Feed the result of a successful fetch into the detector.
    ///
    /// Failed fetches must not be passed here: they carry no information
    /// and must leave the state untouched.
    pub fn observe(&mut self, snapshot: Option<RunSnapshot>) -> Transition {
        let Some(snapshot) = snapshot else {
            return Transition::None;
        };

        match self.state.last_seen_id.as_deref() {
            None => {
                self.state.last_seen_id = Some(snapshot.id.clone());
                Transition::FirstObservation(snapshot)
            }
            Some(last) if last == snapshot.id => Transition::None,
            Some(_) => {
                self.state.last_seen_id = Some(snapshot.id.clone());
                match snapshot.status {
                    StatusCode::Failure => Transition::Failure(snapshot),
                    StatusCode::Success => Transition::Recovery(snapshot),
                    StatusCode::Pending | StatusCode::Unknown => Transition::InProgress(snapshot),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, status: StatusCode) -> Option<RunSnapshot> {
        Some(RunSnapshot::new(id, status))
    }

    #[test]
    fn test_no_run_keeps_state() {
        let mut detector = TransitionDetector::new();
        assert_eq!(detector.observe(None), Transition::None);
        assert_eq!(detector.state().last_seen_id, None);

        detector.observe(run("A", StatusCode::Success));
        assert_eq!(detector.observe(None), Transition::None);
        assert_eq!(detector.state().last_seen_id.as_deref(), Some("A"));
    }

    #[test]
    fn test_first_observation_never_alerts() {
        for status in [
            StatusCode::Success,
            StatusCode::Failure,
            StatusCode::Pending,
            StatusCode::Unknown,
        ] {
            let mut detector = TransitionDetector::new();
            let transition = detector.observe(run("A", status));
            assert!(matches!(transition, Transition::FirstObservation(_)));
            assert!(!transition.is_alertable());
        }
    }

    #[test]
    fn test_repeated_id_is_silent() {
        let mut detector = TransitionDetector::new();
        detector.observe(run("A", StatusCode::Failure));
        for _ in 0..5 {
            assert_eq!(detector.observe(run("A", StatusCode::Failure)), Transition::None);
        }

        detector.observe(run("B", StatusCode::Failure));
        for _ in 0..5 {
            assert_eq!(detector.observe(run("B", StatusCode::Failure)), Transition::None);
        }
    }

    #[test]
    fn test_status_change_on_same_run_is_silent() {
        let mut detector = TransitionDetector::new();
        detector.observe(run("A", StatusCode::Pending));
        assert_eq!(detector.observe(run("A", StatusCode::Failure)), Transition::None);
    }

    #[test]
    fn test_failure_then_recovery() {
        let mut detector = TransitionDetector::new();
        detector.observe(run("A", StatusCode::Failure));

        let transition = detector.observe(run("B", StatusCode::Failure));
        assert_eq!(
            transition,
            Transition::Failure(RunSnapshot::new("B", StatusCode::Failure))
        );

        let transition = detector.observe(run("C", StatusCode::Success));
        assert_eq!(
            transition,
            Transition::Recovery(RunSnapshot::new("C", StatusCode::Success))
        );
        assert_eq!(detector.state().last_seen_id.as_deref(), Some("C"));
    }

    #[test]
    fn test_new_pending_run_is_in_progress() {
        let mut detector = TransitionDetector::new();
        detector.observe(run("A", StatusCode::Failure));

        let transition = detector.observe(run("B", StatusCode::Pending));
        assert!(matches!(transition, Transition::InProgress(_)));
        assert!(!transition.is_alertable());

        // B concluding later is the same id and stays silent
        assert_eq!(detector.observe(run("B", StatusCode::Success)), Transition::None);

        let transition = detector.observe(run("C", StatusCode::Unknown));
        assert!(matches!(transition, Transition::InProgress(_)));
    }

    #[test]
    fn test_at_most_one_alert_per_distinct_id() {
        let sequence = [
            ("1", StatusCode::Success),
            ("2", StatusCode::Failure),
            ("2", StatusCode::Failure),
            ("3", StatusCode::Failure),
            ("3", StatusCode::Success),
            ("4", StatusCode::Pending),
            ("4", StatusCode::Success),
            ("5", StatusCode::Success),
            ("5", StatusCode::Success),
        ];

        let mut detector = TransitionDetector::new();
        let alerts: Vec<String> = sequence
            .iter()
            .map(|(id, status)| detector.observe(run(id, *status)))
            .filter(Transition::is_alertable)
            .map(|t| t.label().to_string())
            .collect();

        assert_eq!(alerts, ["failure", "failure", "recovery"]);
    }

    #[test]
    fn test_notification_only_for_alertable() {
        let now = Utc::now();
        let snapshot = RunSnapshot::new("7", StatusCode::Failure);

        let notification = Transition::Failure(snapshot.clone())
            .notification("5dlabs/cto", now)
            .unwrap();
        assert_eq!(notification.kind, NotificationKind::Failure);
        assert_eq!(notification.repository, "5dlabs/cto");
        assert_eq!(notification.run, snapshot);
        assert_eq!(notification.timestamp, now);

        assert!(Transition::None.notification("r", now).is_none());
        assert!(Transition::FirstObservation(snapshot.clone())
            .notification("r", now)
            .is_none());
        assert!(Transition::InProgress(snapshot).notification("r", now).is_none());
    }
}
