//! Unit of Work pattern implementation.
//!
//! Every service operation runs inside exactly one transaction obtained
//! here. The closure receives a [`TransactionContext`] whose repositories are
//! bound to that transaction; the transaction commits when the closure
//! returns `Ok` and rolls back otherwise. A dropped (cancelled) future drops
//! the open transaction, which also rolls it back.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, IsolationLevel, TransactionTrait};

use super::repositories::{
    ProjectRepository, ProjectStore, TaskRepository, TaskStore, UserRepository, UserStore,
};
use crate::errors::AppResult;

/// Boxed future returned by transaction closures.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic methods; tests implement it
/// over mocked repositories with [`TransactionContext::new`].
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Read-write transaction with READ COMMITTED isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;

    /// Read-only transaction with READ COMMITTED isolation.
    async fn read_only<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access within one transaction.
#[derive(Clone, Copy)]
pub struct TransactionContext<'a> {
    users: &'a dyn UserRepository,
    projects: &'a dyn ProjectRepository,
    tasks: &'a dyn TaskRepository,
}

impl<'a> TransactionContext<'a> {
    pub fn new(
        users: &'a dyn UserRepository,
        projects: &'a dyn ProjectRepository,
        tasks: &'a dyn TaskRepository,
    ) -> Self {
        Self {
            users,
            projects,
            tasks,
        }
    }

    pub fn users(&self) -> &'a dyn UserRepository {
        self.users
    }

    pub fn projects(&self) -> &'a dyn ProjectRepository {
        self.projects
    }

    pub fn tasks(&self) -> &'a dyn TaskRepository {
        self.tasks
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn execute_transaction<F, T>(
        &self,
        isolation: IsolationLevel,
        access: AccessMode,
        f: F,
    ) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(access))
            .await?;

        // Stores borrow the transaction only for the closure's lifetime
        let result = {
            let users = UserStore::new(&txn);
            let projects = ProjectStore::new(&txn);
            let tasks = TaskStore::new(&txn);
            f(TransactionContext::new(&users, &projects, &tasks)).await
        };

        match result {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, AccessMode::ReadWrite, f)
            .await
    }

    async fn read_only<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, AccessMode::ReadOnly, f)
            .await
    }
}

/// Run a block inside a read-write transaction.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(move |$ctx| Box::pin(async move { $body })).await
    };
}

/// Run a block inside a read-only transaction.
#[macro_export]
macro_rules! read_only {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.read_only(move |$ctx| Box::pin(async move { $body })).await
    };
}
