use super::*;
use crate::gateway::types::LoginData;
use crate::gateway::{GatewayError, LoginRequest, RegisterRequest};
use crate::store::{LoginAction, RegisterAction};
use crate::validate::Field;
use std::sync::atomic::{AtomicUsize, Ordering};

// =========================================================================
// CountingGateway
// =========================================================================

/// Gateway that accepts every login with a fixed token and rejects registrations.
#[derive(Default)]
struct CountingGateway {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl AuthGateway for CountingGateway {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LoginResponse { timestamp: String::new(), data: LoginData { token: "abc123".into() } })
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GatewayError::ServerMessage("email taken".into()))
    }
}

fn setup() -> (SessionStore, Arc<CountingGateway>) {
    (SessionStore::in_memory(), Arc::new(CountingGateway::default()))
}

fn login_form(email: &str, password: &str) -> LoginForm {
    LoginForm { email: email.into(), password: password.into() }
}

fn register_form(fullname: &str, email: &str, password: &str) -> RegisterForm {
    RegisterForm { fullname: fullname.into(), email: email.into(), password: password.into() }
}

// =========================================================================
// Validation blocks submission
// =========================================================================

#[tokio::test]
async fn short_registration_password_never_reaches_gateway() {
    let (store, gateway) = setup();
    let page = RegisterPage::new(store.clone(), gateway.clone());

    let err = page.submit(&register_form("Jane", "a@b.com", "short")).unwrap_err();

    let SubmitError::Invalid(errors) = err else { panic!("expected validation failure") };
    assert_eq!(errors.get(Field::Password), Some("Password need to have at least 8 characters"));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    assert!(!store.register().is_loading);
}

#[tokio::test]
async fn invalid_login_leaves_store_untouched() {
    let (store, gateway) = setup();
    let page = LoginPage::new(store.clone(), gateway.clone());

    for form in [login_form("", "password1"), login_form("bad", "password1"), login_form("a@b.com", "short")] {
        assert!(matches!(page.submit(&form), Err(SubmitError::Invalid(_))));
    }

    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.snapshot(), crate::store::AuthSnapshot::default());
}

// =========================================================================
// In-flight guard
// =========================================================================

#[tokio::test]
async fn login_submit_is_refused_while_loading() {
    let (store, gateway) = setup();
    let page = LoginPage::new(store.clone(), gateway.clone());

    let handle = page.submit(&login_form("a@b.com", "password1")).unwrap();
    assert_eq!(page.submit_label(), "Signing In...");
    assert_eq!(page.submit(&login_form("a@b.com", "password1")).unwrap_err(), SubmitError::Busy);

    handle.join().await;
    assert_eq!(page.submit_label(), "Sign In");
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn register_submit_is_refused_while_loading() {
    let (store, gateway) = setup();
    store.dispatch(RegisterAction::Pending);
    let page = RegisterPage::new(store, gateway.clone());

    let err = page.submit(&register_form("Jane", "a@b.com", "password1")).unwrap_err();

    assert_eq!(err, SubmitError::Busy);
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

// =========================================================================
// Effects
// =========================================================================

#[tokio::test]
async fn successful_login_navigates_to_dashboard() {
    let (store, gateway) = setup();
    let page = LoginPage::new(store.clone(), gateway);

    page.submit(&login_form("a@b.com", "password1")).unwrap().join().await;

    assert_eq!(page.effects(), vec![PageEffect::Navigate(Route::Dashboard)]);
    assert_eq!(page.open(), Navigation::Redirect(Route::Dashboard));
}

#[tokio::test]
async fn registration_error_is_toasted_once() {
    let (store, gateway) = setup();
    let page = RegisterPage::new(store.clone(), gateway);

    page.submit(&register_form("Jane", "a@b.com", "password1")).unwrap().join().await;

    assert_eq!(page.effects(), vec![PageEffect::Toast("email taken".into())]);
    assert_eq!(store.register().error, None);
    assert!(page.effects().is_empty());
}

#[test]
fn completed_registration_navigates_to_login() {
    let (store, gateway) = setup();
    store.dispatch(RegisterAction::Fulfilled);
    let page = RegisterPage::new(store, gateway);
    assert_eq!(page.effects(), vec![PageEffect::Navigate(Route::Login)]);
}

#[test]
fn login_error_is_toasted_and_cleared() {
    let (store, gateway) = setup();
    store.dispatch(LoginAction::Rejected { message: "Network error occurred".into() });
    let page = LoginPage::new(store.clone(), gateway);

    assert_eq!(page.effects(), vec![PageEffect::Toast("Network error occurred".into())]);
    assert_eq!(store.login().error, None);
}

#[test]
fn pages_open_for_anonymous_visitors() {
    let (store, gateway) = setup();
    assert_eq!(LoginPage::new(store.clone(), gateway.clone()).open(), Navigation::Allow);
    assert_eq!(RegisterPage::new(store, gateway).open(), Navigation::Allow);
}
