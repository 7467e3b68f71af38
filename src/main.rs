use std::time::Duration;

use dotenvy::dotenv;

use scorebook::cli;
use scorebook::logging::init_tracing;
use scorebook::router::init_router;
use scorebook::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "create-admin" {
        handle_create_admin(args).await;
        return;
    }

    init_tracing();

    let state = init_app_state().await;

    sqlx::migrate!("./migrations")
        .run(&state.db)
        .await
        .expect("Failed to run database migrations");

    let sweep_interval = Duration::from_secs(state.rate_limit_config.sweep_interval_secs);
    state.limiter.spawn_sweeper(sweep_interval);
    state.active_clients.spawn_sweeper(sweep_interval);
    state.sessions.spawn_sweeper(sweep_interval);

    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.unwrap();
}

async fn handle_create_admin(args: Vec<String>) {
    if args.len() != 6 {
        eprintln!(
            "Usage: {} create-admin <first_name> <last_name> <email> <password>",
            args[0]
        );
        std::process::exit(1);
    }

    let first_name = &args[2];
    let last_name = &args[3];
    let email = &args[4];
    let password = &args[5];

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    match cli::create_admin(&pool, first_name, last_name, email, password).await {
        Ok(()) => {
            println!("✅ Admin created successfully!");
            println!("   Email: {}", email);
        }
        Err(e) => {
            eprintln!("❌ Failed to create admin: {}", e);
            std::process::exit(1);
        }
    }
}
