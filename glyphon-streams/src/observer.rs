use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A single-subscriber side-channel notified of every symbol `next`
/// yields, in call order, including the final end-marker. Spec §9
/// prefers a single slot over a broadcaster: tests attach one observer
/// for tracing without event-bus machinery.
pub trait SymbolObserver<S> {
    fn observe(&mut self, symbol: &S);
}

/// A observer that records a formatted line per observed symbol,
/// mirroring `original_source/tests/helpers/test_glyph_observer.h`'s
/// `output` accumulator.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub output: String,
}

impl RecordingObserver {
    pub fn new() -> Self {
        RecordingObserver::default()
    }
}

impl<S: fmt::Display> SymbolObserver<S> for RecordingObserver {
    fn observe(&mut self, symbol: &S) {
        self.output.push('\n');
        self.output.push_str(&symbol.to_string());
    }
}

/// A clonable handle onto a `RecordingObserver`, for tests that bind
/// an observer into a stream (which takes ownership of it) but still
/// need to inspect what it recorded afterward.
#[derive(Clone, Default)]
pub struct SharedRecordingObserver(Rc<RefCell<RecordingObserver>>);

impl SharedRecordingObserver {
    pub fn new() -> Self {
        SharedRecordingObserver::default()
    }

    pub fn output(&self) -> String {
        self.0.borrow().output.clone()
    }
}

impl<S: fmt::Display> SymbolObserver<S> for SharedRecordingObserver {
    fn observe(&mut self, symbol: &S) {
        SymbolObserver::observe(&mut *self.0.borrow_mut(), symbol);
    }
}
