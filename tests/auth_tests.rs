use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use nss_portal::{
    AppConfig,
    auth::{Claims, dashboard_route, decode_token, issue_token},
};

#[test]
fn token_round_trip_preserves_claims() {
    let config = AppConfig::default();

    let token = issue_token(&config, "head@nss.edu", "verticalhead", Some("events")).unwrap();
    let claims = decode_token(&config, &token).unwrap();

    assert_eq!(claims.sub, "head@nss.edu");
    assert_eq!(claims.role, "verticalhead");
    assert_eq!(claims.vertical.as_deref(), Some("events"));
    assert!(claims.exp > claims.iat);
}

#[test]
fn tokens_without_a_vertical_omit_the_claim() {
    let config = AppConfig::default();

    let token = issue_token(&config, "admin@nss.edu", "admin", None).unwrap();
    let claims = decode_token(&config, &token).unwrap();

    assert_eq!(claims.role, "admin");
    assert_eq!(claims.vertical, None);
}

#[test]
fn expired_tokens_are_rejected() {
    let config = AppConfig::default();

    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "admin@nss.edu".to_string(),
        role: "admin".to_string(),
        vertical: None,
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap();

    assert!(decode_token(&config, &token).is_err());
}

#[test]
fn tokens_signed_with_another_secret_are_rejected() {
    let config = AppConfig::default();
    let mut other = AppConfig::default();
    other.jwt_secret = "a-completely-different-secret-value".to_string();

    let token = issue_token(&other, "admin@nss.edu", "admin", None).unwrap();
    assert!(decode_token(&config, &token).is_err());
}

#[test]
fn dashboard_mapping() {
    assert_eq!(
        dashboard_route("admin", None).as_deref(),
        Some("/admin-dashboard")
    );
    assert_eq!(
        dashboard_route("verticalhead", Some("events")).as_deref(),
        Some("/vertical-dashboard/events")
    );
    // Casing of the stored vertical does not matter.
    assert_eq!(
        dashboard_route("verticalhead", Some("Photography")).as_deref(),
        Some("/vertical-dashboard/photography")
    );
    // Unmapped verticals have no dashboard.
    assert_eq!(dashboard_route("verticalhead", Some("media")), None);
    assert_eq!(dashboard_route("verticalhead", None), None);
    // Volunteers never get one.
    assert_eq!(dashboard_route("volunteer", None), None);
}
