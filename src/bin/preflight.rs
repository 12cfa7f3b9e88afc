use marketplace_ledger::infra::config;
use marketplace_ledger::storage::schema;
use sqlx::postgres::PgPoolOptions;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--no-schema]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           DATABASE_MAX_CONNECTIONS, LISTEN_ADDR, DELETE_AUDIT_POLICY, APP_ENV\n"
    );
    std::process::exit(2);
}

const COUNTED: &[&str] = &[
    "accounts",
    "roles",
    "enterprise_accounts",
    "external_links",
    "products",
    "categories",
    "car_models",
    "brands",
    "images",
    "account_log",
    "enterprise_log",
    "product_log",
    "account_save_log",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let apply_schema = !args.iter().any(|a| a == "--no-schema");

    // Force-read config (nice error messages if missing or malformed)
    let database_url = config::database_url()?;
    let policy = config::delete_audit_policy()?;

    println!("> Preflight:");
    println!("  DATABASE_MAX_CONNECTIONS={}", config::max_connections());
    println!("  LISTEN_ADDR={}", config::listen_addr());
    println!("  DELETE_AUDIT_POLICY={:?}", policy);
    println!("  expose internal errors: {}", config::expose_internal_errors());

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot connect to DATABASE_URL: {}", e))?;

    let version: String = sqlx::query_scalar("SELECT version()").fetch_one(&pool).await?;
    println!("  Postgres: {}", version);

    if apply_schema {
        schema::apply(&pool).await?;
        println!("  Schema applied.");
    }

    for table in COUNTED {
        let sql = format!("SELECT count(*) FROM {}", table);
        match sqlx::query_scalar::<_, i64>(&sql).fetch_one(&pool).await {
            Ok(n) => println!("  {:<22} {}", table, n),
            Err(_) => println!("  {:<22} (missing)", table),
        }
    }

    println!("> Preflight OK");
    Ok(())
}
