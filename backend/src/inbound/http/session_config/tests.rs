//! Unit tests for session configuration parsing.

use std::collections::HashMap;

use actix_web::{HttpResponse, web, App};
use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

#[fixture]
fn key_file() -> NamedTempFile {
    let file = NamedTempFile::new().expect("temporary key file");
    std::fs::write(file.path(), vec![b'k'; SESSION_KEY_MIN_LEN]).expect("write key");
    file
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_vars(key_file: &NamedTempFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key_file.path().to_string_lossy().into_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

fn release_error(vars: HashMap<&'static str, String>) -> SessionConfigError {
    match session_settings_from_env(&mock_env(vars), BuildMode::Release) {
        Ok(_) => panic!("release settings unexpectedly accepted"),
        Err(error) => error,
    }
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(key_file: NamedTempFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&key_file);
    vars.remove(missing);

    let err = release_error(vars);

    assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sometimes")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
fn release_rejects_invalid_values(
    key_file: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&key_file);
    vars.insert(name, value.to_owned());

    let err = release_error(vars);

    assert!(matches!(err, SessionConfigError::InvalidEnv { name: found, .. } if found == name));
}

#[rstest]
fn release_rejects_ephemeral_keys(key_file: NamedTempFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    assert!(matches!(
        release_error(vars),
        SessionConfigError::EphemeralNotAllowed
    ));
}

#[rstest]
fn release_rejects_missing_key_file(key_file: NamedTempFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(KEY_FILE_ENV, "/nonexistent/karigari/session_key".to_owned());

    assert!(matches!(release_error(vars), SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn release_rejects_short_keys(key_file: NamedTempFile) {
    std::fs::write(key_file.path(), vec![b'k'; 32]).expect("rewrite key");

    let err = release_error(release_vars(&key_file));

    assert!(matches!(err, SessionConfigError::KeyTooShort { length: 32, .. }));
}

#[rstest]
fn release_rejects_insecure_same_site_none(key_file: NamedTempFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    assert!(matches!(
        release_error(vars),
        SessionConfigError::InsecureSameSiteNone
    ));
}

#[rstest]
fn release_accepts_complete_settings(key_file: NamedTempFile) {
    let settings = session_settings_from_env(&mock_env(release_vars(&key_file)), BuildMode::Release)
        .expect("valid settings");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
fn debug_falls_back_to_defaults() {
    let settings = session_settings_from_env(&mock_env(HashMap::new()), BuildMode::Debug)
        .expect("debug defaults");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_tolerates_invalid_same_site(key_file: NamedTempFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(SAMESITE_ENV, "unexpected".to_owned());

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug fallback");

    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
#[actix_web::test]
async fn middleware_issues_named_http_only_cookie(key_file: NamedTempFile) {
    let settings = session_settings_from_env(&mock_env(release_vars(&key_file)), BuildMode::Release)
        .expect("valid settings");
    let app = actix_web::test::init_service(App::new().wrap(settings.middleware()).route(
        "/",
        web::get().to(|session: actix_session::Session| async move {
            session.insert("visits", 1).expect("insert into session");
            HttpResponse::Ok().finish()
        }),
    ))
    .await;

    let response = actix_web::test::call_service(&app, actix_web::test::TestRequest::get().uri("/").to_request()).await;

    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .expect("session cookie set");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    assert!(cookie.max_age().is_some());
}
