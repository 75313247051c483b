use uuid::Uuid;

use sea_orm::{ConnectionTrait, prelude::*};

use crate::{
    Account, EngineError, Person, ResultEngine, Transaction, accounts, people, transactions,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
    ) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    pub(super) async fn require_person<C: ConnectionTrait>(
        &self,
        db: &C,
        person_id: Uuid,
    ) -> ResultEngine<Person> {
        let model = people::Entity::find_by_id(person_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("person not exists".to_string()))?;
        Person::try_from(model)
    }

    pub(super) async fn require_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }
}
