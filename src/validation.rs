use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// Pure input validation. Nothing in this module performs I/O or touches
// application state; handlers call these before any repository work.

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});
static LETTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]").unwrap());
static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static VERTICAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s]+$").unwrap());

/// RFC 5321 upper bound on a full address.
const MAX_EMAIL_LEN: usize = 254;

pub const ALLOWED_ROLES: [&str; 3] = ["admin", "verticalhead", "volunteer"];

/// ValidationError
///
/// Every way a field value can be rejected. The Display strings are the exact
/// messages returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(String),
    #[error("Invalid email format")]
    InvalidEmailFormat,
    #[error("Email too long")]
    EmailTooLong,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Password too long")]
    PasswordTooLong,
    #[error("Password must contain at least one letter")]
    PasswordMissingLetter,
    #[error("Password must contain at least one number")]
    PasswordMissingDigit,
    #[error("Invalid role. Must be one of: admin, verticalhead, volunteer")]
    InvalidRole,
    #[error("Vertical name too short")]
    VerticalTooShort,
    #[error("Vertical name too long")]
    VerticalTooLong,
    #[error("Vertical name can only contain letters, numbers, and spaces")]
    VerticalInvalidChars,
    #[error("Title must be at least 3 characters long")]
    TitleTooShort,
    #[error("Description must be at least 10 characters long")]
    DescriptionTooShort,
    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,
    #[error("Name must be at least 2 characters long")]
    NameTooShort,
    #[error("Message must be at least 10 characters long")]
    MessageTooShort,
}

/// validate_email
///
/// Accepts `localpart@domain.tld` shapes: ASCII letters/digits/`._%+-` before
/// the `@`, dotted domain labels, and a final label of two or more letters.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Required("Email".to_string()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmailFormat);
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::EmailTooLong);
    }
    Ok(())
}

/// validate_password
///
/// Length 8..=128 with at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required("Password".to_string()));
    }
    if password.chars().count() < 8 {
        return Err(ValidationError::PasswordTooShort);
    }
    if password.chars().count() > 128 {
        return Err(ValidationError::PasswordTooLong);
    }
    if !LETTER_RE.is_match(password) {
        return Err(ValidationError::PasswordMissingLetter);
    }
    if !DIGIT_RE.is_match(password) {
        return Err(ValidationError::PasswordMissingDigit);
    }
    Ok(())
}

/// sanitize
///
/// Neutralizes markup in user-supplied text: truncates to `max_len`,
/// HTML-escapes `& < > " '`, and trims surrounding whitespace. Escaping is
/// entity-aware (an `&` that already starts an entity is left alone) and
/// truncation counts an entity as a single unit, so the function is
/// idempotent: `sanitize(sanitize(x)) == sanitize(x)`. The output never
/// contains a literal `<`, `>`, `"`, or `'`.
pub fn sanitize(text: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut taken = 0usize;

    while taken < max_len && !rest.is_empty() {
        if let Some(entity_len) = leading_entity_len(rest) {
            out.push_str(&rest[..entity_len]);
            rest = &rest[entity_len..];
        } else {
            let ch = rest.chars().next().unwrap();
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                _ => out.push(ch),
            }
            rest = &rest[ch.len_utf8()..];
        }
        taken += 1;
    }

    out.trim().to_string()
}

/// Length in bytes of the HTML entity at the start of `s`, if any.
/// Recognizes named (`&amp;`), decimal (`&#39;`), and hex (`&#x27;`) forms.
fn leading_entity_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('&')?;
    let body_end = rest.find(';')?;
    let body = &rest[..body_end];
    let valid = if let Some(num) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        (1..=6).contains(&num.len()) && num.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(num) = body.strip_prefix('#') {
        (1..=7).contains(&num.len()) && num.chars().all(|c| c.is_ascii_digit())
    } else {
        (1..=6).contains(&body.len()) && body.chars().all(|c| c.is_ascii_alphabetic())
    };
    // '&' + body + ';'
    valid.then_some(1 + body_end + 1)
}

/// validate_required_fields
///
/// Checks that every named field is present and not falsy (null, empty string,
/// false, empty array), reporting the first offender in caller-supplied order.
pub fn validate_required_fields(data: &Value, fields: &[&str]) -> Result<(), ValidationError> {
    for field in fields {
        let present = match data.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(Value::Array(a)) => !a.is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(ValidationError::Required((*field).to_string()));
        }
    }
    Ok(())
}

/// validate_role
pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if ALLOWED_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(ValidationError::InvalidRole)
    }
}

/// validate_vertical
///
/// Vertical names are 2..=50 characters of letters, digits, and spaces.
pub fn validate_vertical(vertical: &str) -> Result<(), ValidationError> {
    if vertical.is_empty() {
        return Err(ValidationError::Required("Vertical name".to_string()));
    }
    let vertical = sanitize(vertical, 50);
    if vertical.chars().count() < 2 {
        return Err(ValidationError::VerticalTooShort);
    }
    if vertical.chars().count() > 50 {
        return Err(ValidationError::VerticalTooLong);
    }
    if !VERTICAL_RE.is_match(&vertical) {
        return Err(ValidationError::VerticalInvalidChars);
    }
    Ok(())
}

/// validate_activity
///
/// Required title/description/date, then domain checks on the sanitized
/// values: title at least 3 characters, description at least 10, date in
/// `YYYY-MM-DD` form.
pub fn validate_activity(data: &Value) -> Result<(), ValidationError> {
    validate_required_fields(data, &["title", "description", "date"])?;

    let title = sanitize(data["title"].as_str().unwrap_or_default(), 200);
    if title.chars().count() < 3 {
        return Err(ValidationError::TitleTooShort);
    }

    let description = sanitize(data["description"].as_str().unwrap_or_default(), 2000);
    if description.chars().count() < 10 {
        return Err(ValidationError::DescriptionTooShort);
    }

    let date = data["date"].as_str().unwrap_or_default();
    if !DATE_RE.is_match(date) {
        return Err(ValidationError::InvalidDate);
    }
    Ok(())
}

/// validate_contact
///
/// Required name/email/message with a valid email, sanitized name of at least
/// 2 characters, and sanitized message of at least 10.
pub fn validate_contact(data: &Value) -> Result<(), ValidationError> {
    validate_required_fields(data, &["name", "email", "message"])?;

    validate_email(data["email"].as_str().unwrap_or_default())?;

    let name = sanitize(data["name"].as_str().unwrap_or_default(), 100);
    if name.chars().count() < 2 {
        return Err(ValidationError::NameTooShort);
    }

    let message = sanitize(data["message"].as_str().unwrap_or_default(), 2000);
    if message.chars().count() < 10 {
        return Err(ValidationError::MessageTooShort);
    }
    Ok(())
}
