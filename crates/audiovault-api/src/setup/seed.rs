//! Demo accounts created at startup

use crate::auth::password::hash_password;
use audiovault_core::models::AccountType;
use audiovault_core::AppError;
use audiovault_db::{NewUser, UserRepository};

struct DemoUser {
    username: &'static str,
    email: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    account_type: AccountType,
}

const DEMO_USERS: [DemoUser; 2] = [
    DemoUser {
        username: "user1",
        email: "john.doe@example.com",
        first_name: "John",
        last_name: "Doe",
        account_type: AccountType::Regular,
    },
    DemoUser {
        username: "admin",
        email: "jane.smith@example.com",
        first_name: "Jane",
        last_name: "Smith",
        account_type: AccountType::Superuser,
    },
];

/// Create the demo accounts that do not exist yet. Returns how many were created.
pub async fn seed_demo_users(users: &UserRepository, password: &str) -> Result<usize, AppError> {
    let mut created = 0;

    for demo in &DEMO_USERS {
        if users.get_by_username(demo.username).await?.is_some() {
            tracing::debug!(username = demo.username, "Demo user already exists");
            continue;
        }

        let user = users
            .create(NewUser {
                username: demo.username.to_string(),
                email: demo.email.to_string(),
                password_hash: hash_password(password)?,
                first_name: demo.first_name.to_string(),
                last_name: demo.last_name.to_string(),
                account_type: demo.account_type,
            })
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            account_type = %user.account_type,
            "Seeded demo user"
        );
        created += 1;
    }

    Ok(created)
}
