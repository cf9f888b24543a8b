//! Cross-module execution tests for the graph executor.
//!
//! Uses a recording invoker so assertions can inspect exactly what each
//! node was asked to do.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use prospectus_common::{Capability, ProspectusError, Result};
use prospectus_graph::{GraphExecutor, NodeMode, TaskGraph, TaskNode};
use prospectus_llm::CapabilityInvoker;

/// Records every instruction it receives, replying `reply:{first line}`.
struct RecordingInvoker {
    instructions: Mutex<Vec<String>>,
    delays: HashMap<String, u64>,
    dispatches: AtomicUsize,
}

impl RecordingInvoker {
    fn new() -> Self {
        Self {
            instructions: Mutex::new(Vec::new()),
            delays: HashMap::new(),
            dispatches: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, keyword: &str, ms: u64) -> Self {
        self.delays.insert(keyword.to_string(), ms);
        self
    }

    fn recorded(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

#[async_trait]
impl CapabilityInvoker for RecordingInvoker {
    async fn invoke(&self, instruction: &str, _caps: &[Capability]) -> Result<String> {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        self.instructions.lock().unwrap().push(instruction.to_string());

        for (keyword, ms) in &self.delays {
            if instruction.contains(keyword.as_str()) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
        }

        Ok(format!(
            "reply:{}",
            instruction.lines().next().unwrap_or_default()
        ))
    }
}

fn fan_out_graph(n: usize) -> TaskGraph {
    let mut graph = TaskGraph::new("write");
    let mut chapter_ids = Vec::with_capacity(n);

    for i in 1..=n {
        let id = format!("chapter-{i}");
        graph = graph
            .add_node(TaskNode::independent(&id, format!("write chapter {i}")))
            .unwrap();
        chapter_ids.push(id);
    }

    graph
        .add_node(TaskNode::joining(
            "compile",
            "compile the full report",
            chapter_ids,
        ))
        .unwrap()
}

fn joining_instruction(invoker: &RecordingInvoker) -> String {
    invoker
        .recorded()
        .into_iter()
        .find(|i| i.starts_with("compile the full report"))
        .expect("joining node was dispatched")
}

#[tokio::test]
async fn joining_input_identical_regardless_of_completion_order() {
    // First run: chapter-1 finishes last.
    let slow_first = Arc::new(RecordingInvoker::new().with_delay("chapter 1", 40));
    let report_a = GraphExecutor::new(slow_first.clone())
        .run(&fan_out_graph(3))
        .await
        .unwrap();
    assert!(report_a.success());

    // Second run: chapter-3 finishes last.
    let slow_last = Arc::new(RecordingInvoker::new().with_delay("chapter 3", 40));
    let report_b = GraphExecutor::new(slow_last.clone())
        .run(&fan_out_graph(3))
        .await
        .unwrap();
    assert!(report_b.success());

    assert_eq!(joining_instruction(&slow_first), joining_instruction(&slow_last));
}

#[tokio::test]
async fn joining_input_tags_each_dependency() {
    let invoker = Arc::new(RecordingInvoker::new());
    GraphExecutor::new(invoker.clone())
        .run(&fan_out_graph(2))
        .await
        .unwrap();

    let compile_input = joining_instruction(&invoker);
    let c1 = compile_input.find("--- Output from chapter-1 ---").unwrap();
    let c2 = compile_input.find("--- Output from chapter-2 ---").unwrap();
    assert!(c1 < c2);
    assert!(compile_input.contains("reply:write chapter 1"));
    assert!(compile_input.contains("reply:write chapter 2"));
}

#[tokio::test]
async fn fan_out_supports_any_chapter_count() {
    for n in [1usize, 2, 7] {
        let invoker = Arc::new(RecordingInvoker::new());
        let report = GraphExecutor::new(invoker.clone())
            .run(&fan_out_graph(n))
            .await
            .unwrap();

        assert!(report.success());
        assert_eq!(report.completed.len(), n + 1);
        assert_eq!(invoker.dispatches.load(Ordering::SeqCst), n + 1);
    }
}

#[tokio::test]
async fn graph_modes_round_trip_through_builder() {
    let graph = fan_out_graph(3);
    assert_eq!(graph.node("chapter-2").unwrap().mode, NodeMode::Independent);
    assert_eq!(graph.node("compile").unwrap().mode, NodeMode::Joining);
    assert_eq!(graph.terminal().unwrap().id, "compile");
}

/// An invoker whose first dispatched instruction fails.
struct FirstFailsInvoker {
    failed: AtomicUsize,
}

#[async_trait]
impl CapabilityInvoker for FirstFailsInvoker {
    async fn invoke(&self, instruction: &str, _caps: &[Capability]) -> Result<String> {
        if self.failed.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(ProspectusError::Invocation(format!(
                "upstream provider rejected: {}",
                instruction.lines().next().unwrap_or_default()
            )));
        }
        Ok("ok".to_string())
    }
}

#[tokio::test]
async fn failure_report_names_node_and_preserves_partials() {
    let invoker = Arc::new(FirstFailsInvoker {
        failed: AtomicUsize::new(0),
    });
    let report = GraphExecutor::new(invoker)
        .run(&fan_out_graph(3))
        .await
        .unwrap();

    assert!(!report.success());
    let failure = report.failure.as_ref().unwrap();
    assert!(failure.node_id.starts_with("chapter-"));
    assert!(failure.skipped.contains(&"compile".to_string()));
    // The two surviving chapter nodes still completed.
    assert_eq!(report.completed.len(), 2);
    assert!(report.terminal_output.is_none());
}
