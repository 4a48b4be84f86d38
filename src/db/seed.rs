//! Default admin account, created at startup when missing

use bson::doc;
use tracing::{info, warn};

use crate::auth::{hash_password_blocking, Role};
use crate::config::Args;
use crate::db::schemas::UserDoc;
use crate::db::DocumentStore;
use crate::types::UkmError;

/// Outcome of [`seed_admin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
}

/// Insert the configured admin if no user with that email exists.
pub async fn seed_admin(users: &dyn DocumentStore<UserDoc>, args: &Args) -> Result<SeedOutcome, UkmError> {
    if users.find_one(doc! { "email": &args.admin_email }).await?.is_some() {
        info!("Admin account {} already present", args.admin_email);
        return Ok(SeedOutcome::AlreadyPresent);
    }

    if args.uses_default_admin_password() {
        warn!("Seeding admin with the default password; set ADMIN_PASSWORD for production");
    }

    let password_hash = hash_password_blocking(args.admin_password.clone()).await?;
    let admin = UserDoc::new(
        args.admin_nama.clone(),
        args.admin_email.clone(),
        password_hash,
        Role::Admin,
        args.admin_ukm.clone(),
    );

    let id = users.insert_one(admin).await?;
    info!("Created admin account {} ({})", args.admin_email, id);

    Ok(SeedOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::db::memory::MemoryStore;
    use clap::Parser;

    fn args() -> Args {
        Args::try_parse_from([
            "ukm-backend",
            "--jwt-secret",
            "seed-test-secret-that-is-at-least-32-chars",
            "--admin-password",
            "s3cret-admin",
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_creates_admin_once() {
        let users: MemoryStore<UserDoc> = MemoryStore::with_unique(&["email"]);
        let args = args();

        assert_eq!(seed_admin(&users, &args).await.unwrap(), SeedOutcome::Created);
        assert_eq!(seed_admin(&users, &args).await.unwrap(), SeedOutcome::AlreadyPresent);

        let admins = users.find_many(doc! {}).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].role, Role::Admin);
        assert_eq!(admins[0].email, "admin@ukm.com");
        assert!(verify_password("s3cret-admin", &admins[0].password).unwrap());
    }
}
