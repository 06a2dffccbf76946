use nss_portal::validation::{
    ValidationError, sanitize, validate_activity, validate_contact, validate_email,
    validate_password, validate_required_fields, validate_role, validate_vertical,
};
use serde_json::json;

// --- Email ---

#[test]
fn accepts_common_email_shapes() {
    for email in [
        "volunteer@ssn.edu.in",
        "head.of.events@nss.org",
        "a_b%c+d-e@sub.domain.tld",
        "x@y.co",
    ] {
        assert_eq!(validate_email(email), Ok(()), "rejected {}", email);
    }
}

#[test]
fn rejects_malformed_emails() {
    for email in [
        "plainaddress",
        "missing@tld",
        "@nodomain.com",
        "two@@ats.com",
        "spaces in@mail.com",
        "trailing@dot.c",
    ] {
        assert_eq!(
            validate_email(email),
            Err(ValidationError::InvalidEmailFormat),
            "accepted {}",
            email
        );
    }
}

#[test]
fn rejects_empty_and_overlong_emails() {
    assert_eq!(
        validate_email(""),
        Err(ValidationError::Required("Email".to_string()))
    );

    let local = "a".repeat(250);
    let long = format!("{}@ex.com", local);
    assert_eq!(validate_email(&long), Err(ValidationError::EmailTooLong));
}

#[test]
fn valid_emails_survive_sanitization() {
    // Sanitizing a valid email must not break it: the allowed address
    // characters are all markup-neutral.
    for email in ["volunteer@ssn.edu.in", "head+events@nss.org"] {
        let sanitized = sanitize(email, 254);
        assert_eq!(sanitized, email);
        assert_eq!(validate_email(&sanitized), Ok(()));
    }
}

// --- Password ---

#[test]
fn password_rules() {
    assert_eq!(validate_password("abc12345"), Ok(()));
    assert_eq!(
        validate_password("a1b2c3"),
        Err(ValidationError::PasswordTooShort)
    );
    assert_eq!(
        validate_password(&"a1".repeat(65)),
        Err(ValidationError::PasswordTooLong)
    );
    assert_eq!(
        validate_password("12345678"),
        Err(ValidationError::PasswordMissingLetter)
    );
    assert_eq!(
        validate_password("abcdefgh"),
        Err(ValidationError::PasswordMissingDigit)
    );
    assert_eq!(
        validate_password(""),
        Err(ValidationError::Required("Password".to_string()))
    );
}

// --- Sanitize ---

#[test]
fn sanitize_escapes_markup() {
    let out = sanitize("<script>alert('x')</script>", 1000);
    assert!(!out.contains('<'));
    assert!(!out.contains('>'));
    assert!(!out.contains('\''));
    assert!(out.contains("&lt;script&gt;"));
}

#[test]
fn sanitize_never_leaves_reserved_characters() {
    for input in [
        "plain text",
        "<b>bold</b>",
        "\"quoted\" & 'single'",
        "a < b > c",
        "&&&&",
    ] {
        let out = sanitize(input, 1000);
        for forbidden in ['<', '>', '"', '\''] {
            assert!(
                !out.contains(forbidden),
                "{:?} left {:?} in {:?}",
                input,
                forbidden,
                out
            );
        }
    }
}

#[test]
fn sanitize_is_idempotent() {
    for input in [
        "hello world",
        "<script>alert('x')</script>",
        "a & b &amp; c",
        "  padded  ",
        "&#x27;already escaped&#x27;",
        "tricky &notanentitybecausetoolong; here",
        &"<>\"'&".repeat(100),
    ] {
        let once = sanitize(input, 200);
        let twice = sanitize(&once, 200);
        assert_eq!(once, twice, "not idempotent for {:?}", input);
    }
}

#[test]
fn sanitize_truncates_and_trims() {
    assert_eq!(sanitize("abcdef", 3), "abc");
    assert_eq!(sanitize("   spaced   ", 100), "spaced");
    assert_eq!(sanitize("", 10), "");
}

// --- Required Fields ---

#[test]
fn required_fields_reports_first_missing_in_order() {
    let doc = json!({"title": "x", "description": "", "date": "2025-01-01"});
    assert_eq!(
        validate_required_fields(&doc, &["title", "description", "date"]),
        Err(ValidationError::Required("description".to_string()))
    );

    let doc = json!({});
    assert_eq!(
        validate_required_fields(&doc, &["date", "title"]),
        Err(ValidationError::Required("date".to_string()))
    );
}

#[test]
fn required_fields_treats_falsy_values_as_missing() {
    let doc = json!({"a": null, "b": false, "c": []});
    for field in ["a", "b", "c"] {
        assert_eq!(
            validate_required_fields(&doc, &[field]),
            Err(ValidationError::Required(field.to_string()))
        );
    }
    let doc = json!({"a": "value", "b": true, "c": [1]});
    assert_eq!(validate_required_fields(&doc, &["a", "b", "c"]), Ok(()));
}

// --- Role & Vertical ---

#[test]
fn role_allow_list() {
    for role in ["admin", "verticalhead", "volunteer"] {
        assert_eq!(validate_role(role), Ok(()));
    }
    assert_eq!(validate_role("superuser"), Err(ValidationError::InvalidRole));
    assert_eq!(validate_role("Admin"), Err(ValidationError::InvalidRole));
}

#[test]
fn vertical_rules() {
    assert_eq!(validate_vertical("events"), Ok(()));
    assert_eq!(validate_vertical("Social Media 2"), Ok(()));
    assert_eq!(
        validate_vertical(""),
        Err(ValidationError::Required("Vertical name".to_string()))
    );
    assert_eq!(validate_vertical("x"), Err(ValidationError::VerticalTooShort));
    assert_eq!(
        validate_vertical("ph@tography"),
        Err(ValidationError::VerticalInvalidChars)
    );
}

// --- Activity & Contact ---

#[test]
fn activity_validation() {
    let ok = json!({"title": "Camp", "description": "A long enough description", "date": "2025-09-16"});
    assert_eq!(validate_activity(&ok), Ok(()));

    let missing = json!({"description": "long enough here", "date": "2025-09-16"});
    assert_eq!(
        validate_activity(&missing),
        Err(ValidationError::Required("title".to_string()))
    );

    let short_title = json!({"title": "ab", "description": "long enough here", "date": "2025-09-16"});
    assert_eq!(
        validate_activity(&short_title),
        Err(ValidationError::TitleTooShort)
    );

    let short_desc = json!({"title": "Camp", "description": "short", "date": "2025-09-16"});
    assert_eq!(
        validate_activity(&short_desc),
        Err(ValidationError::DescriptionTooShort)
    );

    let bad_date = json!({"title": "Camp", "description": "long enough here", "date": "16-09-2025"});
    assert_eq!(validate_activity(&bad_date), Err(ValidationError::InvalidDate));
}

#[test]
fn contact_validation() {
    let ok = json!({"name": "Asha", "email": "asha@ssn.edu.in", "message": "I would like to volunteer"});
    assert_eq!(validate_contact(&ok), Ok(()));

    let bad_email = json!({"name": "Asha", "email": "not-an-email", "message": "I would like to volunteer"});
    assert_eq!(
        validate_contact(&bad_email),
        Err(ValidationError::InvalidEmailFormat)
    );

    let short_name = json!({"name": "A", "email": "asha@ssn.edu.in", "message": "I would like to volunteer"});
    assert_eq!(validate_contact(&short_name), Err(ValidationError::NameTooShort));

    let short_message = json!({"name": "Asha", "email": "asha@ssn.edu.in", "message": "hi"});
    assert_eq!(
        validate_contact(&short_message),
        Err(ValidationError::MessageTooShort)
    );
}
