//! Authentication primitives: credentials, registrations and password rules.
//!
//! Handlers turn raw payload strings into these validated values before
//! calling the account service, so the service never sees unchecked input.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, PersonName, Profile, Role, UserValidationError};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was missing or blank.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Self-registration is limited to customers and artisans.
    RoleNotSelectable { role: Role },
    /// A name or email failed validation.
    User(UserValidationError),
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::RoleNotSelectable { role } => {
                write!(f, "role {role} cannot be chosen at registration")
            }
            Self::User(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<UserValidationError> for AuthValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// A plaintext password that satisfies the length rule.
///
/// The buffer is zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a new password.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if raw.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Expose the plaintext for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Stored password hash in PHC string format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a [`crate::domain::ports::PasswordHasher`].
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised (trimmed, lower-cased).
/// - `password` is non-empty but otherwise kept verbatim.
///
/// # Examples
/// ```
/// use karigari::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Admin@Karigari.com", "admin123").unwrap();
/// assert_eq!(creds.email().as_str(), "admin@karigari.com");
/// assert_eq!(creds.password(), "admin123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        if email.trim().is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password exactly as supplied.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// A validated self-registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: PersonName,
    pub email: EmailAddress,
    pub password: Password,
    pub role: Role,
    pub profile: Profile,
}

impl Registration {
    /// Validate registration inputs. `role` defaults to customer.
    pub fn try_new(
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
        profile: Profile,
    ) -> Result<Self, AuthValidationError> {
        let role = role.unwrap_or(Role::Customer);
        if role == Role::Admin {
            return Err(AuthValidationError::RoleNotSelectable { role });
        }
        Ok(Self {
            name: PersonName::new(name)?,
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
            role,
            profile,
        })
    }
}

/// Request to replace the caller's password.
#[derive(Clone)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    replacement: Password,
}

impl PasswordChange {
    /// Validate a password change.
    pub fn try_new(current: &str, replacement: &str) -> Result<Self, AuthValidationError> {
        if current.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            current: Zeroizing::new(current.to_owned()),
            replacement: Password::new(replacement)?,
        })
    }

    /// Password the caller claims to have now.
    pub fn current(&self) -> &str {
        self.current.as_str()
    }

    /// Password to store.
    pub fn replacement(&self) -> &Password {
        &self.replacement
    }
}
