//! Task graph orchestration for Prospectus.
//!
//! Each pipeline stage is a small directed acyclic graph of
//! [`TaskNode`]s. Independent nodes at the same dependency level fan out
//! concurrently; joining nodes wait for every declared dependency and
//! aggregate the outputs in declaration order.
//!
//! ```text
//!          ┌──────────┐
//!          │  finance │──┐
//!          └──────────┘  │
//!          ┌──────────┐  │   ┌───────────┐
//!          │  policy  │──┼──▶│ synthesis │──▶ stage output
//!          └──────────┘  │   └───────────┘
//!          ┌──────────┐  │
//!          │ industry │──┘
//!          └──────────┘
//! ```

pub mod executor;
pub mod graph;
pub mod node;

pub use executor::{joining_input, GraphExecutor, GraphReport, NodeFailure, NodeOutput};
pub use graph::TaskGraph;
pub use node::{NodeMode, TaskNode};
