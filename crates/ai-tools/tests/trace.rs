use std::cell::RefCell;
use std::rc::Rc;

use ai_core::Status;
use ai_tools::{NullTraceSink, TraceEvent, TraceLog, TracePhase, TraceSink, VecTraceSink};

#[derive(Clone, Default)]
struct RcSink(Rc<RefCell<Vec<TraceEvent>>>);

impl TraceSink for RcSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

fn emit_all(sink: &mut dyn TraceSink) {
    sink.emit(TraceEvent::new(1, 0, TracePhase::Initialize));
    sink.emit(TraceEvent::new(1, 0, TracePhase::Update(Status::Running)));
    sink.emit(TraceEvent::new(2, 0, TracePhase::Update(Status::Success)));
    sink.emit(TraceEvent::new(2, 0, TracePhase::Terminate(Status::Success)));
}

#[test]
fn vec_sink_records_in_order() {
    let mut sink = VecTraceSink::default();
    emit_all(&mut sink);

    assert_eq!(sink.events.len(), 4);
    assert_eq!(sink.events[0].phase, TracePhase::Initialize);
    assert_eq!(sink.events[3].tick, 2);
}

#[test]
fn boxed_sink_can_be_shared_with_the_caller() {
    let handle = RcSink::default();
    let shared = handle.0.clone();
    let mut boxed: Box<dyn TraceSink> = Box::new(handle);

    emit_all(boxed.as_mut());

    let events = shared.borrow();
    assert_eq!(events.len(), 4);
    assert_eq!(events[1].phase, TracePhase::Update(Status::Running));
}

#[test]
fn null_sink_discards_everything() {
    let mut sink = NullTraceSink;
    emit_all(&mut sink);
}

#[test]
fn trace_log_queries_by_node_and_phase() {
    let mut log = TraceLog::default();
    emit_all(&mut log);
    log.push(TraceEvent::new(3, 1, TracePhase::Abort));

    assert_eq!(log.for_node(0).count(), 4);
    assert_eq!(log.count(0, TracePhase::Initialize), 1);
    assert_eq!(log.position(1, TracePhase::Abort), Some(4));
    assert_eq!(log.position(1, TracePhase::Initialize), None);
}
