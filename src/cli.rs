//! Maintenance commands run from the binary, outside the HTTP surface.

use sqlx::PgPool;

use crate::utils::password::hash_password;

/// Create a global admin account. Admins cannot be created through the API;
/// this is the bootstrap path.
pub async fn create_admin(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        anyhow::bail!("A user with email {} already exists", email);
    }

    let hashed = hash_password(password).map_err(|e| e.error)?;

    sqlx::query(
        "INSERT INTO users (first_name, last_name, email, password, role)
         VALUES ($1, $2, $3, $4, 'admin')",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(&hashed)
    .execute(pool)
    .await?;

    Ok(())
}
