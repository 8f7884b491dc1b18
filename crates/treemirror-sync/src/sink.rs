//! Event sink capability the reconciler reports mutations to.

use treemirror_core::MirrorEvent;

/// Receives each mutation event exactly once, in the order emitted.
pub trait EventSink {
    /// Record one event.
    fn record(&mut self, event: &MirrorEvent);
}

impl EventSink for Vec<MirrorEvent> {
    fn record(&mut self, event: &MirrorEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, event: &MirrorEvent) {
        (**self).record(event);
    }
}

/// A sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: &MirrorEvent) {}
}

/// Adapter turning a closure into an [`EventSink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(&MirrorEvent)> EventSink for FnSink<F> {
    fn record(&mut self, event: &MirrorEvent) {
        (self.0)(event)
    }
}

/// Wrap a closure as an event sink.
pub fn sink_fn<F: FnMut(&MirrorEvent)>(f: F) -> FnSink<F> {
    FnSink(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut events: Vec<MirrorEvent> = Vec::new();
        events.record(&MirrorEvent::created_folder("a"));
        events.record(&MirrorEvent::removed_file("b"));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], MirrorEvent::created_folder("a"));
    }

    #[test]
    fn test_fn_sink() {
        let mut seen = 0;
        {
            let mut sink = sink_fn(|_: &MirrorEvent| seen += 1);
            let dyn_sink: &mut dyn EventSink = &mut sink;
            dyn_sink.record(&MirrorEvent::removed_folder("x"));
            dyn_sink.record(&MirrorEvent::removed_folder("y"));
        }
        assert_eq!(seen, 2);
    }
}
