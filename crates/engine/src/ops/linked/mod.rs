//! Linked-transaction workflows.
//!
//! One call is one unit of work: the parent is loaded, a group is opened, the
//! workflow handler mutates the ledgers and the group is settled. Any failure
//! (deadline expiry included) rolls the whole unit back, group row included.
//!
//! The deadline bounds the work up to the commit, never the commit itself: a
//! `DeadlineExceeded` always means nothing was written.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*};

use crate::{
    EngineError, LinkedGroup, LinkedOutcome, LinkedTransactionCmd, ResultEngine, Workflow,
    linked_groups,
};

use super::{Engine, with_tx};

mod refund;
mod tracker;

use tracker::GroupTracker;

impl Engine {
    /// Runs a linked workflow, bounded by the engine's default deadline when
    /// one is configured.
    pub async fn process_linked(&self, cmd: LinkedTransactionCmd) -> ResultEngine<LinkedOutcome> {
        self.run_linked(cmd, self.deadline).await
    }

    /// Runs a linked workflow whose unit of work must be ready to commit
    /// within `deadline`.
    ///
    /// On expiry the open database transaction is dropped, which rolls it back.
    pub async fn process_linked_within(
        &self,
        cmd: LinkedTransactionCmd,
        deadline: Duration,
    ) -> ResultEngine<LinkedOutcome> {
        self.run_linked(cmd, Some(deadline)).await
    }

    /// Return a linked group snapshot from DB.
    pub async fn linked_group(&self, group_id: Uuid) -> ResultEngine<LinkedGroup> {
        with_tx!(self, |db_tx| {
            let model = linked_groups::Entity::find_by_id(group_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("linked group not exists".to_string()))?;
            LinkedGroup::try_from(model)
        })
    }

    async fn run_linked(
        &self,
        cmd: LinkedTransactionCmd,
        deadline: Option<Duration>,
    ) -> ResultEngine<LinkedOutcome> {
        let now = Utc::now();
        let unit = async {
            let db_tx = self.database.begin().await?;
            let outcome = self.apply_linked(&db_tx, &cmd, now).await?;
            Ok::<_, EngineError>((db_tx, outcome))
        };
        let (db_tx, outcome) = match deadline {
            Some(deadline) => tokio::time::timeout(deadline, unit).await.map_err(|_| {
                tracing::warn!(
                    parent_id = %cmd.parent_id,
                    ?deadline,
                    "linked workflow deadline exceeded"
                );
                EngineError::DeadlineExceeded(deadline)
            })??,
            None => unit.await?,
        };
        // Not raced against the deadline.
        db_tx.commit().await?;

        tracing::info!(
            group_id = %outcome.group_id,
            parent_id = %cmd.parent_id,
            kind = cmd.workflow.kind().as_str(),
            created = outcome.created_transaction_ids.len(),
            "linked workflow committed"
        );
        Ok(outcome)
    }

    async fn apply_linked(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &LinkedTransactionCmd,
        now: DateTime<Utc>,
    ) -> ResultEngine<LinkedOutcome> {
        let kind = cmd.workflow.kind();
        let parent = self.require_transaction(db_tx, cmd.parent_id).await?;
        let mut tracker =
            GroupTracker::open(db_tx, kind, parent.id, cmd.group_notes(), now).await?;
        match &cmd.workflow {
            Workflow::Refund(params) => {
                self.refund(db_tx, &parent, params, &mut tracker, now)
                    .await?;
            }
            Workflow::Split
            | Workflow::Loan
            | Workflow::Batch
            | Workflow::Settle
            | Workflow::CancelOrder => {
                return Err(EngineError::NotImplemented(format!(
                    "{} workflow",
                    kind.as_str()
                )));
            }
        }
        tracker.settle(db_tx, now).await
    }
}
