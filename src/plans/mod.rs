//! Write plans: store mutations computed up front and executed later.

mod executor;
mod flag;
mod identity;

pub use executor::{ExecutionReport, PlanExecutor};
pub use flag::plan_flag_change;
pub use identity::{plan_create, plan_delete, plan_update, validate_new_picker};

use crate::{
    db::{Document, SetMode},
    error::DocRef,
};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set {
        target: DocRef,
        fields: Document,
        mode: SetMode,
    },
    Update {
        target: DocRef,
        fields: Document,
    },
    Delete {
        target: DocRef,
    },
}

impl WriteOp {
    pub fn target(&self) -> &DocRef {
        match self {
            WriteOp::Set { target, .. }
            | WriteOp::Update { target, .. }
            | WriteOp::Delete { target } => target,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::Set {
                mode: SetMode::Replace,
                ..
            } => "set",
            WriteOp::Set {
                mode: SetMode::Merge,
                ..
            } => "upsert",
            WriteOp::Update { .. } => "update",
            WriteOp::Delete { .. } => "delete",
        }
    }
}

/// How the executor issues a plan's operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// One at a time, in order; the first failure stops the plan.
    Sequential,
    /// All at once; failures are collected per operation.
    Concurrent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WritePlan {
    pub dispatch: Dispatch,
    pub ops: Vec<WriteOp>,
}

impl WritePlan {
    pub fn sequential(ops: Vec<WriteOp>) -> Self {
        Self {
            dispatch: Dispatch::Sequential,
            ops,
        }
    }

    pub fn concurrent(ops: Vec<WriteOp>) -> Self {
        Self {
            dispatch: Dispatch::Concurrent,
            ops,
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
