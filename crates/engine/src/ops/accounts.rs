use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveModelTrait, TransactionTrait};

use crate::{Account, MoneyCents, ResultEngine, accounts, util::normalize_required_name};

use super::{Engine, with_tx};

impl Engine {
    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| self.require_account(&db_tx, account_id).await)
    }

    /// Add a new account with an opening balance.
    ///
    /// The opening balance is stored as-is; it is not backed by a transaction.
    pub async fn new_account(
        &self,
        name: &str,
        opening_balance: MoneyCents,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;
        let account = Account::new(name, opening_balance, Utc::now());
        with_tx!(self, |db_tx| {
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            tracing::info!(account_id = %account.id, balance = %account.balance, "account created");
            Ok(account)
        })
    }
}
