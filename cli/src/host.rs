//! Terminal implementation of the form host traits.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};

use motion_core::forms::{Navigator, Notifier, Toast, ToastStyle};

/// Prints success toasts to `out` and failure toasts to `err`.
pub struct TerminalHost<O: Write, E: Write> {
    out: RefCell<O>,
    err: RefCell<E>,
    closed: Cell<bool>,
}

impl TerminalHost<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TerminalHost<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out: RefCell::new(out),
            err: RefCell::new(err),
            closed: Cell::new(false),
        }
    }

    /// Whether the form asked to close its view.
    pub fn closed(&self) -> bool {
        self.closed.get()
    }

    pub fn into_parts(self) -> (O, E) {
        (self.out.into_inner(), self.err.into_inner())
    }
}

impl<O: Write, E: Write> Notifier for TerminalHost<O, E> {
    fn show_toast(&self, toast: Toast) {
        let line = match &toast.message {
            Some(message) => format!("{}: {message}", toast.title),
            None => toast.title.clone(),
        };
        let written = match toast.style {
            ToastStyle::Success => writeln!(self.out.borrow_mut(), "{line}"),
            ToastStyle::Failure => writeln!(self.err.borrow_mut(), "{line}"),
        };
        if let Err(err) = written {
            tracing::warn!(error = %err, "could not print toast");
        }
    }
}

impl<O: Write, E: Write> Navigator for TerminalHost<O, E> {
    fn pop(&self) {
        self.closed.set(true);
    }
}
