//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Fintrack:
//!
//! - `accounts`: money locations with a denormalized current balance
//! - `people`: counterparties for debts and shared expenses
//! - `transactions`: financial events, status-flagged and never deleted
//! - `linked_groups`: records tying a master transaction to the ones a workflow produced
//! - `cashback_movements` / `cashback_ledgers`: cashback accruals and monthly aggregates
//! - `debt_movements` / `debt_ledgers`: debt events and monthly aggregates per person
//!
//! Amounts are stored as `i64` minor units (cents).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    CurrentBalanceMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum People {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    AccountId,
    PersonId,
    Kind,
    CategoryId,
    SubscriptionMemberId,
    LinkedGroupId,
    Status,
    AmountMinor,
    FeeMinor,
    OccurredAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LinkedGroups {
    Table,
    Id,
    Kind,
    MasterTransactionId,
    RelatedTransactionIds,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CashbackMovements {
    Table,
    Id,
    TransactionId,
    AmountMinor,
    Status,
    Note,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CashbackLedgers {
    Table,
    Id,
    AccountId,
    CycleTag,
    TotalCashbackMinor,
    RemainingBudgetMinor,
    UpdatedAt,
}

#[derive(Iden)]
enum DebtMovements {
    Table,
    Id,
    TransactionId,
    PersonId,
    AmountMinor,
    CycleTag,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DebtLedgers {
    Table,
    Id,
    PersonId,
    CycleTag,
    NewDebtMinor,
    NetDebtMinor,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::CurrentBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. People
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(People::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(People::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(People::Name).string().not_null())
                    .col(ColumnDef::new(People::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::AccountId).string().not_null())
                    .col(ColumnDef::new(Transactions::PersonId).string())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::CategoryId).string())
                    .col(ColumnDef::new(Transactions::SubscriptionMemberId).string())
                    .col(ColumnDef::new(Transactions::LinkedGroupId).string())
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::FeeMinor).big_integer())
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-person_id")
                            .from(Transactions::Table, Transactions::PersonId)
                            .to(People::Table, People::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-linked_group_id")
                    .table(Transactions::Table)
                    .col(Transactions::LinkedGroupId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Linked groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LinkedGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkedGroups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkedGroups::Kind).string().not_null())
                    .col(
                        ColumnDef::new(LinkedGroups::MasterTransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LinkedGroups::RelatedTransactionIds)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(LinkedGroups::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(LinkedGroups::Notes).string())
                    .col(
                        ColumnDef::new(LinkedGroups::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LinkedGroups::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-linked_groups-master_transaction_id")
                            .from(LinkedGroups::Table, LinkedGroups::MasterTransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-linked_groups-master_transaction_id")
                    .table(LinkedGroups::Table)
                    .col(LinkedGroups::MasterTransactionId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Cashback movements + ledgers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashbackMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashbackMovements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashbackMovements::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashbackMovements::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashbackMovements::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(CashbackMovements::Note).string())
                    .col(
                        ColumnDef::new(CashbackMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashbackMovements::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cashback_movements-transaction_id")
                            .from(CashbackMovements::Table, CashbackMovements::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cashback_movements-transaction_id-unique")
                    .table(CashbackMovements::Table)
                    .col(CashbackMovements::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CashbackLedgers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashbackLedgers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashbackLedgers::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashbackLedgers::CycleTag).string().not_null())
                    .col(
                        ColumnDef::new(CashbackLedgers::TotalCashbackMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CashbackLedgers::RemainingBudgetMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CashbackLedgers::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cashback_ledgers-account_id")
                            .from(CashbackLedgers::Table, CashbackLedgers::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cashback_ledgers-account_id-cycle_tag-unique")
                    .table(CashbackLedgers::Table)
                    .col(CashbackLedgers::AccountId)
                    .col(CashbackLedgers::CycleTag)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Debt movements + ledgers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DebtMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DebtMovements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DebtMovements::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DebtMovements::PersonId).string().not_null())
                    .col(
                        ColumnDef::new(DebtMovements::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DebtMovements::CycleTag).string().not_null())
                    .col(
                        ColumnDef::new(DebtMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DebtMovements::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debt_movements-transaction_id")
                            .from(DebtMovements::Table, DebtMovements::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debt_movements-person_id")
                            .from(DebtMovements::Table, DebtMovements::PersonId)
                            .to(People::Table, People::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debt_movements-transaction_id-unique")
                    .table(DebtMovements::Table)
                    .col(DebtMovements::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DebtLedgers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DebtLedgers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DebtLedgers::PersonId).string().not_null())
                    .col(ColumnDef::new(DebtLedgers::CycleTag).string().not_null())
                    .col(
                        ColumnDef::new(DebtLedgers::NewDebtMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DebtLedgers::NetDebtMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DebtLedgers::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debt_ledgers-person_id")
                            .from(DebtLedgers::Table, DebtLedgers::PersonId)
                            .to(People::Table, People::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debt_ledgers-person_id-cycle_tag-unique")
                    .table(DebtLedgers::Table)
                    .col(DebtLedgers::PersonId)
                    .col(DebtLedgers::CycleTag)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(DebtLedgers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DebtMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashbackLedgers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashbackMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkedGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(People::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
