use crate::error::FieldErrors;
use argon2::Config;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

pub fn encode_password(password: String) -> Result<String, argon2::Error> {
    let config = Config::default();
    let salt: [u8; 32] = rand::random();
    let password_hash = argon2::hash_encoded(password.as_bytes(), &salt, &config)?;
    Ok(password_hash)
}

pub fn verify_password(password: String, password_hash: &str) -> Result<bool, argon2::Error> {
    argon2::verify_encoded(password_hash, password.as_bytes())
}

pub fn validate_password(password: &str, errors: &mut FieldErrors) {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("is too short (minimum is {} characters)", MIN_PASSWORD_LENGTH),
        );
    } else if length > MAX_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("is too long (maximum is {} characters)", MAX_PASSWORD_LENGTH),
        );
    }
}
