use async_trait::async_trait;
use auth::TokenPair;

use crate::account::errors::CredentialError;
use crate::account::errors::DirectoryError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountProfile;
use crate::account::models::RegisterCommand;

/// Port for credential and token lifecycle operations.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Register a new account. No tokens are issued.
    ///
    /// # Arguments
    /// * `command` - Validated name and email plus password and its confirmation
    ///
    /// # Returns
    /// Public profile of the created account
    ///
    /// # Errors
    /// * `PasswordMismatch` - Password and confirmation differ
    /// * `EmailAlreadyUsed` - Email is already registered
    /// * `HashingFailure` - Password could not be hashed
    /// * `DirectoryError` - Directory lookup or create failed
    async fn register(&self, command: RegisterCommand) -> Result<AccountProfile, CredentialError>;

    /// Verify email and password and issue an access/refresh token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `TokenIssuanceFailed` - Token signing failed
    /// * `DirectoryError` - Directory lookup failed
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, CredentialError>;

    /// Resolve the account named by a token subject.
    ///
    /// # Errors
    /// * `InvalidSubject` - Subject is not an account id
    /// * `AccountNotFound` - No account with this id
    /// * `DirectoryError` - Directory lookup failed
    async fn me(&self, subject: &str) -> Result<AccountProfile, CredentialError>;

    /// Redeem a refresh token for a new access token.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Bad signature, expired, or malformed token
    /// * `TokenIssuanceFailed` - Token signing failed
    async fn refresh(&self, refresh_token: &str) -> Result<String, CredentialError>;

    /// Verify a bearer access token and return its subject.
    ///
    /// # Errors
    /// * `MissingSubject` - Token verifies but names no subject
    /// * `InvalidCredentials` - Any other verification failure
    async fn authorize(&self, access_token: &str) -> Result<String, CredentialError>;
}

/// User Directory: persistence of accounts, consumed by the credential service.
#[async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    /// Retrieve account by email address (exact match).
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Directory operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;

    /// Retrieve account by identifier.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Directory operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError>;

    /// Persist a new account.
    ///
    /// # Returns
    /// Created account entity
    ///
    /// # Errors
    /// * `EmailTaken` - Email is already registered
    /// * `Unavailable` - Directory operation failed
    async fn create(&self, account: Account) -> Result<Account, DirectoryError>;
}
