use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::errors::DirectoryError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::ports::AccountDirectory;

/// Process-local User Directory.
///
/// Backs the development server and the end-to-end tests. Accounts live only
/// as long as the process. Email uniqueness is enforced on create, under the
/// same write lock that inserts the account.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    /// Map of account_id -> Account
    accounts: HashMap<AccountId, Account>,
    /// Map of email -> account_id for lookups by email
    email_index: HashMap<String, AccountId>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.state.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        let state = self.state.read().await;

        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError> {
        Ok(self.state.read().await.accounts.get(id).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, DirectoryError> {
        let mut state = self.state.write().await;

        let email = account.email.as_str().to_string();
        if state.email_index.contains_key(&email) {
            return Err(DirectoryError::EmailTaken(email));
        }

        state.email_index.insert(email, account.id);
        state.accounts.insert(account.id, account.clone());

        tracing::debug!(account_id = %account.id, "Account stored");

        Ok(account)
    }
}
