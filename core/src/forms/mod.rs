//! Create and edit flows on top of `MotionClient`.
//!
//! # Design
//! The host application owns rendering, notifications, and navigation. The
//! controllers here depend on it only through `Notifier` and `Navigator`, and
//! receive form values as plain structs. Each controller allows a single
//! submit in flight; `BusyFlag` enforces that and is released by a guard on
//! every exit path.

mod create;
mod edit;

use std::sync::atomic::{AtomicBool, Ordering};

pub use create::{tomorrow_at_midnight, CreateTaskForm, CreateTaskValues};
pub use edit::{EditTaskForm, EditTaskValues};

use crate::types::{Priority, Project, Status, Task, LABEL_PRESETS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Success,
    Failure,
}

/// A transient success/failure notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub style: ToastStyle,
    pub title: String,
    pub message: Option<String>,
}

impl Toast {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            style: ToastStyle::Success,
            title: title.into(),
            message: None,
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            style: ToastStyle::Failure,
            title: title.into(),
            message: Some(message.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Host notification primitive.
pub trait Notifier {
    fn show_toast(&self, toast: Toast);
}

/// Host navigation primitive.
pub trait Navigator {
    /// Close the current view and return to the previous one.
    fn pop(&self);
}

/// Result of a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The service accepted the change.
    Saved(Task),
    /// The service call failed; the form stays open with its values.
    Failed(String),
    /// Another submit was still in flight; nothing was sent.
    Busy,
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }
}

/// One entry of a dropdown field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: String,
    pub title: String,
}

impl DropdownOption {
    pub fn new(value: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            title: title.into(),
        }
    }
}

/// Priority choices. `none_title` adds a leading empty entry.
pub fn priority_options(none_title: Option<&str>) -> Vec<DropdownOption> {
    none_option(none_title)
        .into_iter()
        .chain(Priority::ALL.iter().map(|p| DropdownOption::new(p.as_str(), p.title())))
        .collect()
}

/// Status choices. `none_title` adds a leading empty entry.
pub fn status_options(none_title: Option<&str>) -> Vec<DropdownOption> {
    none_option(none_title)
        .into_iter()
        .chain(Status::ALL.iter().map(|s| DropdownOption::new(s.as_str(), s.title())))
        .collect()
}

/// Label choices, led by an empty entry.
pub fn label_options<S: AsRef<str>>(labels: &[S], none_title: &str) -> Vec<DropdownOption> {
    std::iter::once(DropdownOption::new("", none_title))
        .chain(labels.iter().map(|l| DropdownOption::new(l.as_ref(), l.as_ref())))
        .collect()
}

pub fn preset_label_options() -> Vec<DropdownOption> {
    label_options(LABEL_PRESETS, "None")
}

/// Project choices, led by an empty entry.
pub fn project_options(projects: &[Project]) -> Vec<DropdownOption> {
    std::iter::once(DropdownOption::new("", "No Project"))
        .chain(projects.iter().map(|p| DropdownOption::new(p.id.as_str(), p.name.as_str())))
        .collect()
}

fn none_option(title: Option<&str>) -> Option<DropdownOption> {
    title.map(|title| DropdownOption::new("", title))
}

/// A blank field means "not set". Anything else is sent as typed.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

/// Single-submit guard.
#[derive(Debug, Default)]
pub(crate) struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// Mark the flag busy, or return `None` if it already was.
    pub(crate) fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingHost {
        pub(crate) toasts: RefCell<Vec<Toast>>,
        pub(crate) pops: Cell<usize>,
    }

    impl RecordingHost {
        pub(crate) fn last_toast(&self) -> Toast {
            self.toasts.borrow().last().cloned().expect("no toast shown")
        }
    }

    impl Notifier for RecordingHost {
        fn show_toast(&self, toast: Toast) {
            self.toasts.borrow_mut().push(toast);
        }
    }

    impl Navigator for RecordingHost {
        fn pop(&self) {
            self.pops.set(self.pops.get() + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_flag_is_exclusive_and_released_on_drop() {
        let flag = BusyFlag::default();
        let guard = flag.try_acquire().expect("first acquire");
        assert!(flag.is_busy());
        assert!(flag.try_acquire().is_none());
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn busy_flag_is_released_on_panic() {
        let flag = BusyFlag::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = flag.try_acquire().unwrap();
            panic!("submit blew up");
        }));
        assert!(result.is_err());
        assert!(!flag.is_busy());
    }

    #[test]
    fn option_lists_lead_with_empty_entry() {
        let priorities = priority_options(Some("No Priority"));
        assert_eq!(priorities[0], DropdownOption::new("", "No Priority"));
        assert_eq!(priorities[4], DropdownOption::new("ASAP", "ASAP"));
        assert_eq!(status_options(None)[0], DropdownOption::new("TODO", "To Do"));

        let projects = project_options(&[Project { id: "p1".into(), name: "Home".into() }]);
        assert_eq!(projects, vec![DropdownOption::new("", "No Project"), DropdownOption::new("p1", "Home")]);

        let labels = preset_label_options();
        assert_eq!(labels.len(), LABEL_PRESETS.len() + 1);
        assert_eq!(labels[1], DropdownOption::new("House", "House"));
    }

    #[test]
    fn blank_fields_are_not_set() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty("  notes\n"), Some("  notes\n".to_string()));
    }
}
