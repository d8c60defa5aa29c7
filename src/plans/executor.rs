use std::time::Duration;

use tokio::task::JoinSet;

use crate::{
    db::DocumentStore,
    error::{ConsoleError, ConsoleResult, DocRef},
    utils::remote::bounded,
};

use super::{Dispatch, WriteOp, WritePlan};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Operations that completed.
    pub applied: usize,
    /// Retry rounds needed before everything landed.
    pub retry_rounds: u32,
}

/// Runs write plans against a store.
///
/// Nothing is transactional: when a plan fails part-way, the operations that
/// already completed stay applied.
#[derive(Clone)]
pub struct PlanExecutor<S> {
    store: S,
    timeout: Duration,
    retries: u32,
}

impl<S: DocumentStore> PlanExecutor<S> {
    pub fn new(store: S, timeout: Duration, retries: u32) -> Self {
        Self {
            store,
            timeout,
            retries,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn execute(&self, plan: WritePlan) -> ConsoleResult<ExecutionReport> {
        match plan.dispatch {
            Dispatch::Sequential => self.execute_sequential(plan.ops).await,
            Dispatch::Concurrent => self.execute_concurrent(plan.ops).await,
        }
    }

    async fn execute_sequential(&self, ops: Vec<WriteOp>) -> ConsoleResult<ExecutionReport> {
        let total = ops.len();
        for (index, op) in ops.iter().enumerate() {
            if let Err(err) = apply(&self.store, op, self.timeout).await {
                crate::log_error!(
                    "Plan stopped at step {}/{total} ({} {}): {err}",
                    index + 1,
                    op.kind(),
                    op.target()
                );
                return Err(err);
            }
            crate::log_debug!("Applied {} {}", op.kind(), op.target());
        }

        Ok(ExecutionReport {
            applied: total,
            retry_rounds: 0,
        })
    }

    /// Dispatch every operation at once, then retry only the ones that failed.
    async fn execute_concurrent(&self, ops: Vec<WriteOp>) -> ConsoleResult<ExecutionReport> {
        let total = ops.len();
        let mut pending = ops;
        let mut round = 0u32;

        loop {
            let failed = self.dispatch_round(pending).await;
            if failed.is_empty() {
                if round > 0 {
                    crate::log_info!("All {total} operations applied after {round} retry round(s)");
                }
                return Ok(ExecutionReport {
                    applied: total,
                    retry_rounds: round,
                });
            }

            if round >= self.retries {
                let mut refs: Vec<DocRef> = failed.iter().map(|op| op.target().clone()).collect();
                refs.sort();
                crate::log_error!(
                    "{} of {total} operations still failing after {round} retry round(s)",
                    refs.len()
                );
                return Err(ConsoleError::PartialPropagation { failed: refs });
            }

            round += 1;
            crate::log_warn!(
                "{} of {total} operations failed; retrying them (round {round}/{})",
                failed.len(),
                self.retries
            );
            pending = failed;
        }
    }

    /// Returns the operations that did not complete.
    async fn dispatch_round(&self, ops: Vec<WriteOp>) -> Vec<WriteOp> {
        let mut tasks = JoinSet::new();
        for (index, op) in ops.iter().enumerate() {
            let store = self.store.clone();
            let limit = self.timeout;
            let op = op.clone();
            tasks.spawn(async move { (index, apply(&store, &op, limit).await) });
        }

        let mut settled = vec![false; ops.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(()))) => settled[index] = true,
                Ok((index, Err(err))) => {
                    let op = &ops[index];
                    crate::log_warn!("{} {} failed: {err}", op.kind(), op.target());
                }
                Err(join_err) => {
                    crate::log_error!("Write task aborted: {join_err}");
                }
            }
        }

        ops.into_iter()
            .zip(settled)
            .filter_map(|(op, done)| (!done).then_some(op))
            .collect()
    }
}

async fn apply<S: DocumentStore>(store: &S, op: &WriteOp, limit: Duration) -> ConsoleResult<()> {
    let target = op.target();
    let label = format!("{} {}", op.kind(), target);

    let result = match op {
        WriteOp::Set { fields, mode, .. } => {
            bounded(
                label,
                limit,
                store.set(target.collection, &target.key, fields.clone(), *mode),
            )
            .await?
        }
        WriteOp::Update { fields, .. } => {
            bounded(
                label,
                limit,
                store.update(target.collection, &target.key, fields.clone()),
            )
            .await?
        }
        WriteOp::Delete { .. } => {
            bounded(label, limit, store.delete(target.collection, &target.key)).await?
        }
    };

    result.map_err(|err| ConsoleError::Write {
        target: target.clone(),
        detail: format!("{err:#}"),
    })
}
