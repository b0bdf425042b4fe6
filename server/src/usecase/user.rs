use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::sort::SortSpec;
use crate::domain::types::{NewUser, Role, User, UserChanges, UserFilter};
use crate::error::AppError;
use crate::password::hash_password;

// ── Input validation ─────────────────────────────────────────────────────────
// Runs at the boundary, before any store access.

fn validate_phone(phone: &str) -> Result<(), AppError> {
    let ok = phone.strip_prefix('+').is_some_and(|digits| {
        (5..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
    });
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation(
            "phone number must start with '+' followed by 5 to 15 digits".into(),
        ))
    }
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let ok = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    });
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation("email address is not well-formed".into()))
    }
}

fn validate_name(field: &str, value: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if (3..=50).contains(&len) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be 3 to 50 characters"
        )))
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if (5..=50).contains(&len) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "password must be 5 to 50 characters".into(),
        ))
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct RegisterUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> RegisterUserUseCase<R> {
    /// Validates the submission, pre-checks uniqueness for a friendly
    /// conflict error, hashes the password and persists the user. Two
    /// concurrent registrations can both pass the pre-check; the store's
    /// unique constraints settle that race and surface as the same
    /// conflict error.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, AppError> {
        validate_email(&input.email)?;
        validate_phone(&input.phone_number)?;
        validate_name("first_name", &input.first_name)?;
        validate_name("last_name", &input.last_name)?;
        validate_password(&input.password)?;
        if input.password != input.confirm_password {
            return Err(AppError::Validation("passwords do not match".into()));
        }

        self.users
            .check_unique(&input.phone_number, &input.email)
            .await?;

        let password_hash = hash_password(&input.password)?;
        self.users
            .create(NewUser {
                phone_number: input.phone_number,
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password_hash,
                role_id: None,
            })
            .await
    }
}

// ── Listing and lookup ───────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(
        &self,
        filter: UserFilter,
        sort: Option<SortSpec>,
    ) -> Result<Vec<User>, AppError> {
        self.users.find_all(&filter, sort.as_ref()).await
    }
}

pub struct GetUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<User, AppError> {
        self.users.get_by_id(id).await?.ok_or(AppError::NotFound)
    }
}

pub struct ListRolesUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> ListRolesUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Role>, AppError> {
        self.roles.list(None).await
    }
}

// ── Update ───────────────────────────────────────────────────────────────────

pub struct UpdateUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> UpdateUserUseCase<R> {
    /// Partial update: only provided fields change. Provided fields are
    /// validated the same way as at registration.
    pub async fn execute(&self, id: i32, changes: UserChanges) -> Result<User, AppError> {
        if let Some(email) = &changes.email {
            validate_email(email)?;
        }
        if let Some(phone) = &changes.phone_number {
            validate_phone(phone)?;
        }
        if let Some(first_name) = &changes.first_name {
            validate_name("first_name", first_name)?;
        }
        if let Some(last_name) = &changes.last_name {
            validate_name("last_name", last_name)?;
        }
        self.users
            .update(id, changes)
            .await?
            .ok_or(AppError::NotFound)
    }
}

// ── Delete ───────────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> DeleteUserUseCase<R> {
    /// Returns the removed-row count; a missing id is the caller's 404.
    pub async fn execute(&self, id: i32) -> Result<u64, AppError> {
        let removed = self.users.delete(id).await?;
        if removed == 0 {
            return Err(AppError::NotFound);
        }
        Ok(removed)
    }
}
