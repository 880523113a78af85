use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use ai_bt::{BehaviorConfig, BehaviorTree, NodeId};
use ai_bt_compiler::compile;
use ai_core::{Blackboard, Status, TickContext};
use ai_tools::{TraceEvent, TraceLog, TracePhase, TraceSink};

#[derive(Clone, Default)]
struct SharedLog(Rc<RefCell<TraceLog>>);

impl TraceSink for SharedLog {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

const SCRIPT: &str = r#"<Root>
  <Sequence>
    <Wait ticks="2"/>
    <Log msg="done"/>
  </Sequence>
</Root>"#;

#[test]
fn wait_then_log_runs_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("scenario.xml");
    let asset_path = dir.path().join("scenario.json");
    fs::write(&script, SCRIPT).unwrap();

    let asset = compile(&script, &asset_path).unwrap();
    assert_eq!(asset.len(), 3);
    assert_eq!(asset.behaviors[0], BehaviorConfig::Sequence);
    assert_eq!(asset.behaviors[1], BehaviorConfig::Wait { ticks: 2 });

    let log = SharedLog::default();
    let mut tree = BehaviorTree::load(&asset_path)
        .unwrap()
        .with_trace_sink(log.clone());
    let mut bb = Blackboard::new();

    assert_eq!(tree.tick(&TickContext::new(1), &mut bb), Status::Running);
    assert_eq!(tree.state(NodeId(1)), Some(Status::Running));
    assert_eq!(tree.state(NodeId(2)), Some(Status::Undefined));

    assert_eq!(tree.tick(&TickContext::new(2), &mut bb), Status::Success);
    assert_eq!(tree.state(NodeId(1)), Some(Status::Success));
    assert_eq!(tree.state(NodeId(2)), Some(Status::Success));

    let log = log.0.borrow();
    assert_eq!(log.count(1, TracePhase::Initialize), 1);
    assert_eq!(log.count(2, TracePhase::Update(Status::Success)), 1);
    let wait_done = log.position(1, TracePhase::Terminate(Status::Success)).unwrap();
    let log_started = log.position(2, TracePhase::Initialize).unwrap();
    assert!(wait_done < log_started);
}
