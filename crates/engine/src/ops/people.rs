use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveModelTrait, TransactionTrait};

use crate::{Person, ResultEngine, people, util::normalize_required_name};

use super::{Engine, with_tx};

impl Engine {
    pub async fn person(&self, person_id: Uuid) -> ResultEngine<Person> {
        with_tx!(self, |db_tx| self.require_person(&db_tx, person_id).await)
    }

    pub async fn new_person(&self, name: &str) -> ResultEngine<Person> {
        let person = Person {
            id: Uuid::new_v4(),
            name: normalize_required_name(name, "person")?,
            created_at: Utc::now(),
        };
        with_tx!(self, |db_tx| {
            people::ActiveModel::from(&person).insert(&db_tx).await?;
            Ok(person)
        })
    }
}
