//! 组合根与默认适配器的集成测试

use std::sync::Arc;

use portkit::domain::entities::{Credentials, EmailTemplate, SignUpUser};
use portkit::domain::ports::{
    EmailContract, IdentityContract, SessionContract, UserRepositoryContract,
};
use portkit::infrastructure::collaborators::{
    InMemoryAuthProvider, InMemoryDocumentStore, InMemoryEmailSender, InMemorySessionService,
};
use portkit::{
    bootstrap, default_root, AppConfig, Collaborators, CompositionError, Container,
    ContainerError, PortResult,
};
use serde_json::json;

struct Fixture {
    sessions: Arc<InMemorySessionService>,
    auth: Arc<InMemoryAuthProvider>,
    documents: Arc<InMemoryDocumentStore>,
    email: Arc<InMemoryEmailSender>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionService::new()),
            auth: Arc::new(InMemoryAuthProvider::new()),
            documents: Arc::new(InMemoryDocumentStore::new()),
            email: Arc::new(InMemoryEmailSender::new()),
        }
    }

    fn collaborators(&self) -> Collaborators {
        Collaborators {
            sessions: self.sessions.clone(),
            auth: self.auth.clone(),
            documents: self.documents.clone(),
            email: self.email.clone(),
        }
    }
}

fn config_with_recipient() -> AppConfig {
    let mut config = AppConfig::default();
    config.email.fixed_recipient = Some("inbox@example.com".to_string());
    config
}

#[tokio::test]
async fn test_session_login_end_to_end() {
    let fixture = Fixture::new();
    let container = bootstrap(&config_with_recipient(), &fixture.collaborators()).unwrap();

    let session = container.resolve::<SessionContract>().await.unwrap();
    let result = session.login().await;

    assert_eq!(result, PortResult::success(()));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"status": "success", "value": null})
    );
    assert!(fixture.sessions.is_active());

    assert!(session.logout().await.is_success());
    assert!(!fixture.sessions.is_active());
}

#[tokio::test]
async fn test_collaborator_failure_is_an_operation_result() {
    let fixture = Fixture::new();
    let container = bootstrap(&config_with_recipient(), &fixture.collaborators()).unwrap();
    fixture.auth.fail_with(Some("auth service unavailable")).await;

    let identity = container.resolve::<IdentityContract>().await.unwrap();
    let result = identity
        .sign_in(Credentials::new("ada@example.com", "pw"))
        .await;

    assert_eq!(result, PortResult::error("auth service unavailable"));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"status": "error", "message": "auth service unavailable"})
    );
    assert_eq!(container.stats().construction_failures, 0);
}

#[tokio::test]
async fn test_identity_shares_the_user_repository_singleton() {
    let fixture = Fixture::new();
    let container = bootstrap(&config_with_recipient(), &fixture.collaborators()).unwrap();

    let identity = container.resolve::<IdentityContract>().await.unwrap();
    let users = container.resolve::<UserRepositoryContract>().await.unwrap();

    let created = identity
        .sign_up(SignUpUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw".to_string(),
        })
        .await
        .into_result()
        .unwrap();

    assert_eq!(users.get_by_email("ada@example.com").await, PortResult::success(created));
    assert_eq!(fixture.documents.count("users").await, 1);

    let stats = container.stats();
    assert_eq!(stats.factory_invocations, 2);
    assert_eq!(stats.cache_hits, 1);
}

#[tokio::test]
async fn test_email_goes_to_the_configured_recipient() {
    let fixture = Fixture::new();
    let container = bootstrap(&config_with_recipient(), &fixture.collaborators()).unwrap();

    let mailer = container.resolve::<EmailContract>().await.unwrap();
    let receipt = mailer
        .send_fixed_email(Some(EmailTemplate::welcome("Ada")))
        .await;

    assert!(receipt.is_success());
    let sent = fixture.email.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["inbox@example.com".to_string()]);
}

#[tokio::test]
async fn test_missing_recipient_fails_only_the_email_port() {
    let fixture = Fixture::new();
    let container = bootstrap(&AppConfig::default(), &fixture.collaborators()).unwrap();

    let err = container
        .resolve::<EmailContract>()
        .await
        .err()
        .expect("email adapter needs a fixed recipient");
    assert!(matches!(err, ContainerError::ConstructionFailed { ref contract, .. } if contract == "email"));

    assert!(container.resolve::<SessionContract>().await.is_ok());
    assert!(container.resolve::<IdentityContract>().await.is_ok());
}

#[tokio::test]
async fn test_composing_twice_is_rejected() {
    let fixture = Fixture::new();
    let config = config_with_recipient();
    let container = Container::new();

    default_root(&config, &fixture.collaborators())
        .compose(&container)
        .unwrap();
    let err = default_root(&config, &fixture.collaborators())
        .compose(&container)
        .unwrap_err();

    assert!(matches!(
        err,
        CompositionError::Container(ContainerError::DuplicateRegistration { ref contract })
            if contract == "user_repository"
    ));
}

#[test]
fn test_describe_lists_every_contract() {
    let container = bootstrap(&AppConfig::default(), &Collaborators::in_memory()).unwrap();
    let descriptors = serde_json::to_value(container.descriptors()).unwrap();

    let names: Vec<&str> = descriptors
        .as_array()
        .unwrap()
        .iter()
        .map(|descriptor| descriptor["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["email", "identity", "session", "user_repository"]);
    assert_eq!(descriptors[2]["operations"][0]["name"], "login");
}
