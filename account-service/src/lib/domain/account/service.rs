use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::TokenError;
use auth::TokenPair;
use chrono::Utc;
use tokio::sync::Semaphore;

use crate::account::errors::CredentialError;
use crate::account::errors::DirectoryError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountProfile;
use crate::account::models::RegisterCommand;
use crate::account::ports::AccountDirectory;
use crate::account::ports::CredentialServicePort;

/// Domain service implementation for credential operations.
///
/// Stateless apart from immutable configuration. Password hashing runs on the
/// blocking pool, at most `max_concurrent_hashes` at a time.
pub struct CredentialService<AD>
where
    AD: AccountDirectory,
{
    directory: Arc<AD>,
    authenticator: Arc<Authenticator>,
    hashing_permits: Arc<Semaphore>,
}

impl<AD> CredentialService<AD>
where
    AD: AccountDirectory,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `directory` - User Directory implementation
    /// * `authenticator` - Password hasher and token issuer
    /// * `max_concurrent_hashes` - Upper bound on simultaneous hash/verify work
    pub fn new(
        directory: Arc<AD>,
        authenticator: Arc<Authenticator>,
        max_concurrent_hashes: usize,
    ) -> Self {
        Self {
            directory,
            authenticator,
            hashing_permits: Arc::new(Semaphore::new(max_concurrent_hashes.max(1))),
        }
    }

    async fn run_hashing<T, F>(&self, work: F) -> Result<T, CredentialError>
    where
        F: FnOnce(&Authenticator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.hashing_permits)
            .acquire_owned()
            .await
            .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work(&authenticator)
        })
        .await
        .map_err(|e| CredentialError::HashingFailure(e.to_string()))
    }
}

#[async_trait]
impl<AD> CredentialServicePort for CredentialService<AD>
where
    AD: AccountDirectory,
{
    async fn register(&self, command: RegisterCommand) -> Result<AccountProfile, CredentialError> {
        if command.password != command.confirm_password {
            return Err(CredentialError::PasswordMismatch);
        }

        if self
            .directory
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(CredentialError::EmailAlreadyUsed);
        }

        let password = command.password;
        let password_hash = self
            .run_hashing(move |authenticator| authenticator.hash_password(&password))
            .await?
            .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        // A concurrent registration can win between lookup and create
        let created = self.directory.create(account).await.map_err(|e| match e {
            DirectoryError::EmailTaken(_) => CredentialError::EmailAlreadyUsed,
            other => CredentialError::DirectoryError(other),
        })?;

        tracing::info!(account_id = %created.id, "Account registered");

        Ok(created.profile())
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, CredentialError> {
        let Some(account) = self.directory.find_by_email(email).await? else {
            tracing::debug!("Login rejected: unknown email");
            return Err(CredentialError::InvalidCredentials);
        };

        let subject = account.id.to_string();
        let password = password.to_string();
        let stored_hash = account.password_hash;

        let token_pair = self
            .run_hashing(move |authenticator| {
                authenticator.authenticate(&subject, &password, &stored_hash)
            })
            .await?
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::debug!(account_id = %account.id, "Login rejected: wrong password");
                    CredentialError::InvalidCredentials
                }
                AuthenticationError::PasswordError(err) => {
                    CredentialError::HashingFailure(err.to_string())
                }
                other => CredentialError::TokenIssuanceFailed(other.to_string()),
            })?;

        tracing::info!(account_id = %account.id, "Token pair issued");

        Ok(token_pair)
    }

    async fn me(&self, subject: &str) -> Result<AccountProfile, CredentialError> {
        let id = AccountId::from_string(subject)?;

        self.directory
            .find_by_id(&id)
            .await?
            .map(|account| account.profile())
            .ok_or(CredentialError::AccountNotFound(id.to_string()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, CredentialError> {
        let subject = self
            .authenticator
            .verify_refresh_token(refresh_token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                CredentialError::InvalidRefreshToken(e)
            })?;

        self.authenticator
            .issue_access_token(&subject)
            .map_err(|e| CredentialError::TokenIssuanceFailed(e.to_string()))
    }

    async fn authorize(&self, access_token: &str) -> Result<String, CredentialError> {
        self.authenticator
            .verify_access_token(access_token)
            .map_err(|e| match e {
                TokenError::MissingSubject => CredentialError::MissingSubject,
                other => {
                    tracing::debug!(error = %other, "Access token rejected");
                    CredentialError::InvalidCredentials
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use auth::HashingCost;
    use auth::PasswordHasher;
    use auth::SigningSecret;
    use auth::TokenCodec;
    use auth::TokenSettings;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::account::models::DisplayName;
    use crate::account::models::EmailAddress;

    const ACCESS_SECRET: &str = "test-access-secret-at-least-32-bytes!";
    const REFRESH_SECRET: &str = "test-refresh-secret-at-least-32-bytes";

    // Define mocks in the test module using mockall
    mock! {
        pub TestAccountDirectory {}

        #[async_trait]
        impl AccountDirectory for TestAccountDirectory {
            async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;
            async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DirectoryError>;
            async fn create(&self, account: Account) -> Result<Account, DirectoryError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        let settings = TokenSettings::new(
            SigningSecret::from(ACCESS_SECRET),
            Duration::minutes(2),
            SigningSecret::from(REFRESH_SECRET),
            Duration::days(7),
        )
        .unwrap();
        let hasher = PasswordHasher::with_cost(HashingCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();

        Arc::new(Authenticator::new(settings, hasher))
    }

    fn service(
        directory: MockTestAccountDirectory,
        authenticator: Arc<Authenticator>,
    ) -> CredentialService<MockTestAccountDirectory> {
        CredentialService::new(Arc::new(directory), authenticator, 2)
    }

    fn stored_account(authenticator: &Authenticator, password: &str) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            name: DisplayName::new("Taufik".to_string()).unwrap(),
            email: EmailAddress::new("taufik@dev.com".to_string()).unwrap(),
            password_hash: authenticator.hash_password(password).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn register_command(password: &str, confirm_password: &str) -> RegisterCommand {
        RegisterCommand::new(
            DisplayName::new("Taufik".to_string()).unwrap(),
            EmailAddress::new("taufik@dev.com".to_string()).unwrap(),
            password.to_string(),
            confirm_password.to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .withf(|email| email == "taufik@dev.com")
            .times(1)
            .returning(|_| Ok(None));

        directory
            .expect_create()
            .withf(|account| {
                account.name.as_str() == "Taufik"
                    && account.email.as_str() == "taufik@dev.com"
                    && account.password_hash.starts_with("$argon2")
                    && account.created_at == account.updated_at
            })
            .times(1)
            .returning(|account| Ok(account));

        let authenticator = authenticator();
        let service = service(directory, Arc::clone(&authenticator));

        let profile = service
            .register(register_command("1234567890", "1234567890"))
            .await
            .expect("Registration failed");

        assert_eq!(profile.name.as_str(), "Taufik");
        assert_eq!(profile.email.as_str(), "taufik@dev.com");
    }

    #[tokio::test]
    async fn test_register_password_mismatch() {
        let mut directory = MockTestAccountDirectory::new();

        directory.expect_find_by_email().times(0);
        directory.expect_create().times(0);

        let service = service(directory, authenticator());

        let result = service
            .register(register_command("1234567890", "0987654321"))
            .await;

        assert!(matches!(result, Err(CredentialError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_register_email_already_used() {
        let authenticator = authenticator();
        let existing = stored_account(&authenticator, "1234567890");
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        directory.expect_create().times(0);

        let service = service(directory, authenticator);

        let result = service
            .register(register_command("1234567890", "1234567890"))
            .await;

        assert!(matches!(result, Err(CredentialError::EmailAlreadyUsed)));
    }

    #[tokio::test]
    async fn test_register_lost_race_on_create() {
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        directory.expect_create().times(1).returning(|account| {
            Err(DirectoryError::EmailTaken(account.email.as_str().to_string()))
        });

        let service = service(directory, authenticator());

        let result = service
            .register(register_command("1234567890", "1234567890"))
            .await;

        assert!(matches!(result, Err(CredentialError::EmailAlreadyUsed)));
    }

    #[tokio::test]
    async fn test_register_directory_failure() {
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(DirectoryError::Unavailable("connection refused".to_string())));
        directory.expect_create().times(0);

        let service = service(directory, authenticator());

        let result = service
            .register(register_command("1234567890", "1234567890"))
            .await;

        assert!(matches!(
            result,
            Err(CredentialError::DirectoryError(DirectoryError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_login_success_and_refresh() {
        let authenticator = authenticator();
        let account = stored_account(&authenticator, "1234567890");
        let account_id = account.id;
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .withf(|email| email == "taufik@dev.com")
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));

        let service = service(directory, Arc::clone(&authenticator));

        let pair = service
            .login("taufik@dev.com", "1234567890")
            .await
            .expect("Login failed");

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_eq!(
            authenticator.verify_access_token(&pair.access_token),
            Ok(account_id.to_string())
        );

        let access_token = service
            .refresh(&pair.refresh_token)
            .await
            .expect("Refresh failed");

        assert!(!access_token.is_empty());
        assert_eq!(
            service.authorize(&access_token).await.expect("Authorize failed"),
            account_id.to_string()
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let authenticator = authenticator();
        let account = stored_account(&authenticator, "rahasia123");
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));

        let service = service(directory, authenticator);

        let result = service.login("taufik@dev.com", "1234567890").await;

        assert!(matches!(result, Err(CredentialError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_indistinguishable() {
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(directory, authenticator());

        let result = service.login("nobody@dev.com", "1234567890").await;

        assert!(matches!(result, Err(CredentialError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_directory_failure() {
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(DirectoryError::Unavailable("timeout".to_string())));

        let service = service(directory, authenticator());

        let result = service.login("taufik@dev.com", "1234567890").await;

        assert!(matches!(result, Err(CredentialError::DirectoryError(_))));
    }

    #[tokio::test]
    async fn test_me_success() {
        let authenticator = authenticator();
        let account = stored_account(&authenticator, "1234567890");
        let account_id = account.id;
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_id()
            .withf(move |id| *id == account_id)
            .times(1)
            .returning(move |_| Ok(Some(account.clone())));

        let service = service(directory, authenticator);

        let profile = service
            .me(&account_id.to_string())
            .await
            .expect("Lookup failed");

        assert_eq!(profile.id, account_id);
        assert_eq!(profile.name.as_str(), "Taufik");
        assert_eq!(profile.email.as_str(), "taufik@dev.com");
    }

    #[tokio::test]
    async fn test_me_invalid_subject() {
        let mut directory = MockTestAccountDirectory::new();
        directory.expect_find_by_id().times(0);

        let service = service(directory, authenticator());

        let result = service.me("not-a-uuid").await;

        assert!(matches!(result, Err(CredentialError::InvalidSubject(_))));
    }

    #[tokio::test]
    async fn test_me_account_not_found() {
        let mut directory = MockTestAccountDirectory::new();
        directory
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(directory, authenticator());

        let result = service.me(&AccountId::new().to_string()).await;

        assert!(matches!(result, Err(CredentialError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_refresh_rejects_garbage() {
        let service = service(MockTestAccountDirectory::new(), authenticator());

        let result = service.refresh("not-a-real-token").await;

        assert!(matches!(
            result,
            Err(CredentialError::InvalidRefreshToken(TokenError::MalformedToken(_)))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let authenticator = authenticator();
        let access_token = authenticator
            .issue_access_token(&AccountId::new().to_string())
            .unwrap();

        let service = service(MockTestAccountDirectory::new(), authenticator);

        let result = service.refresh(&access_token).await;

        assert!(matches!(
            result,
            Err(CredentialError::InvalidRefreshToken(TokenError::InvalidSignature))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_token() {
        let expired = TokenCodec::new()
            .sign_at(
                &AccountId::new().to_string(),
                Utc::now() - Duration::days(8),
                Duration::days(7),
                &SigningSecret::from(REFRESH_SECRET),
            )
            .unwrap();

        let service = service(MockTestAccountDirectory::new(), authenticator());

        let result = service.refresh(&expired).await;

        assert!(matches!(
            result,
            Err(CredentialError::InvalidRefreshToken(TokenError::Expired))
        ));
    }

    #[tokio::test]
    async fn test_refresh_does_not_consume_token() {
        let authenticator = authenticator();
        let pair = authenticator
            .issue_token_pair(&AccountId::new().to_string())
            .unwrap();

        let service = service(MockTestAccountDirectory::new(), authenticator);

        assert!(service.refresh(&pair.refresh_token).await.is_ok());
        assert!(service.refresh(&pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_authorize_rejects_refresh_token() {
        let authenticator = authenticator();
        let pair = authenticator
            .issue_token_pair(&AccountId::new().to_string())
            .unwrap();

        let service = service(MockTestAccountDirectory::new(), authenticator);

        let result = service.authorize(&pair.refresh_token).await;

        assert!(matches!(result, Err(CredentialError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authorize_missing_subject() {
        let token = TokenCodec::new()
            .sign("", Duration::minutes(2), &SigningSecret::from(ACCESS_SECRET))
            .unwrap();

        let service = service(MockTestAccountDirectory::new(), authenticator());

        let result = service.authorize(&token).await;

        assert!(matches!(result, Err(CredentialError::MissingSubject)));
    }

    #[tokio::test]
    async fn test_concurrent_logins_share_bounded_hashing() {
        let authenticator = authenticator();
        let account = stored_account(&authenticator, "1234567890");
        let mut directory = MockTestAccountDirectory::new();

        directory
            .expect_find_by_email()
            .times(4)
            .returning(move |_| Ok(Some(account.clone())));

        let service = Arc::new(CredentialService::new(
            Arc::new(directory),
            authenticator,
            1,
        ));

        let logins = (0..4).map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.login("taufik@dev.com", "1234567890").await })
        });

        for login in logins.collect::<Vec<_>>() {
            assert!(login.await.unwrap().is_ok());
        }
    }
}
