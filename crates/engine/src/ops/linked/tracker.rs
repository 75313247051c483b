use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseTransaction};

use crate::{
    EngineError, GroupStatus, LinkedGroup, LinkedKind, LinkedOutcome, ResultEngine,
    linked_groups::{self, encode_related_ids},
};

/// Keeps the group row of one workflow invocation in step with the
/// transactions the workflow creates.
///
/// Related ids only grow. Once settled, the tracker is consumed and the group
/// can no longer change.
#[derive(Debug)]
pub(crate) struct GroupTracker {
    group: LinkedGroup,
}

impl GroupTracker {
    /// Persist a new `active` group for `master_transaction_id`.
    pub(crate) async fn open(
        db_tx: &DatabaseTransaction,
        kind: LinkedKind,
        master_transaction_id: Uuid,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let group = LinkedGroup::new(kind, master_transaction_id, notes, now);
        linked_groups::ActiveModel::try_from(&group)?
            .insert(db_tx)
            .await?;
        Ok(Self { group })
    }

    pub(crate) fn id(&self) -> Uuid {
        self.group.id
    }

    /// Append a created transaction to the group.
    pub(crate) async fn track(
        &mut self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if self.group.status.is_terminal() {
            return Err(EngineError::Consistency(format!(
                "linked group {} is {}",
                self.group.id,
                self.group.status.as_str()
            )));
        }
        self.group.related_transaction_ids.push(transaction_id);
        self.group.updated_at = now;
        linked_groups::ActiveModel {
            id: ActiveValue::Set(self.group.id.to_string()),
            related_transaction_ids: ActiveValue::Set(encode_related_ids(
                &self.group.related_transaction_ids,
            )?),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .update(db_tx)
        .await?;
        Ok(())
    }

    /// Move the group to `settled` and return what the workflow produced.
    pub(crate) async fn settle(
        mut self,
        db_tx: &DatabaseTransaction,
        now: DateTime<Utc>,
    ) -> ResultEngine<LinkedOutcome> {
        self.group.status = GroupStatus::Settled;
        self.group.updated_at = now;
        linked_groups::ActiveModel {
            id: ActiveValue::Set(self.group.id.to_string()),
            status: ActiveValue::Set(self.group.status.as_str().to_string()),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .update(db_tx)
        .await?;
        Ok(LinkedOutcome {
            group_id: self.group.id,
            created_transaction_ids: self.group.related_transaction_ids,
        })
    }
}
