//! Create the initial admin plus one test customer and one approved test
//! artisan, skipping any account whose email is already registered.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use clap::Parser;
use karigari::domain::{
    AccountService, AccountStatus, EmailAddress, INITIAL_ADMIN_EMAIL, INITIAL_ADMIN_PASSWORD,
    Password, PersonName, Role, SeedAccount, SeedOutcome,
};
use karigari::outbound::hashing::Argon2PasswordHasher;
use karigari::outbound::persistence::{
    DbPool, DieselProductRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use mockable::DefaultClock;
use tokio::runtime::Builder;

const DATABASE_URL_ENV: &str = "KARIGARI_DATABASE_URL";
const TEST_PASSWORD: &str = "password123";

/// `seed-accounts` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-accounts",
    about = "Create the Karigari admin and test accounts",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `KARIGARI_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Password for the admin account.
    #[arg(long = "admin-password", value_name = "password", default_value = INITIAL_ADMIN_PASSWORD)]
    admin_password: String,
    /// Password shared by the test customer and test artisan.
    #[arg(long = "test-password", value_name = "password", default_value = TEST_PASSWORD)]
    test_password: String,
}

/// Name, email, role and status of one seeded account.
type AccountSpec = (&'static str, &'static str, Role, AccountStatus);

const TEST_ACCOUNTS: [AccountSpec; 2] = [
    (
        "Test Customer",
        "customer@test.com",
        Role::Customer,
        AccountStatus::Approved,
    ),
    (
        "Test Artisan",
        "artisan@test.com",
        Role::Artisan,
        AccountStatus::Approved,
    ),
];

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url.clone())?;

    run_pending_migrations(&database_url)
        .await
        .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let accounts = AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselProductRepository::new(pool)),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(DefaultClock),
    );

    for account in seed_accounts(&args)? {
        let email = account.email.clone();
        let outcome = accounts
            .seed_account(account)
            .await
            .map_err(|error| io::Error::other(format!("seed {email}: {error}")))?;
        match outcome {
            SeedOutcome::Created => println!("created {email}"),
            SeedOutcome::AlreadyExists => println!("exists  {email}"),
        }
    }
    Ok(())
}

fn seed_account(
    (name, email, role, status): AccountSpec,
    password: &str,
) -> io::Result<SeedAccount> {
    let invalid = |error: &dyn std::fmt::Display| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{email}: {error}"))
    };
    Ok(SeedAccount {
        name: PersonName::new(name).map_err(|error| invalid(&error))?,
        email: EmailAddress::new(email).map_err(|error| invalid(&error))?,
        password: Password::new(password).map_err(|error| invalid(&error))?,
        role,
        status,
    })
}

fn seed_accounts(args: &CliArgs) -> io::Result<Vec<SeedAccount>> {
    let admin = (
        "Admin",
        INITIAL_ADMIN_EMAIL,
        Role::Admin,
        AccountStatus::Approved,
    );
    let mut accounts = vec![seed_account(admin, &args.admin_password)?];
    for spec in TEST_ACCOUNTS {
        accounts.push(seed_account(spec, &args.test_password)?);
    }
    Ok(accounts)
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    let value = match explicit {
        Some(value) => value,
        None => env::var(DATABASE_URL_ENV).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("database URL missing: set --database-url or {DATABASE_URL_ENV}"),
            )
        })?,
    };
    if value.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL must not be empty",
        ));
    }
    Ok(value)
}
