use storefront_admin::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    seed_users(&pool).await?;
    let apparel = ensure_category(&pool, "Apparel", "Shirts, hoodies and caps").await?;
    let kitchen = ensure_category(&pool, "Kitchen", "Mugs and bottles").await?;
    seed_products(&pool, apparel, kitchen).await?;
    seed_orders(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_users(pool: &DbPool) -> anyhow::Result<()> {
    let users = [
        ("user_alice", "+1 555 0100", "12 Harbour Road"),
        ("user_bob", "+1 555 0101", "4 Station Street"),
        ("user_carol", "+1 555 0102", "77 Mill Lane"),
    ];

    for (id, number, address) in users {
        sqlx::query(
            r#"
            INSERT INTO users (id, number, address)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(number)
        .bind(address)
        .execute(pool)
        .await?;
    }

    println!("Seeded users");
    Ok(())
}

async fn ensure_category(pool: &DbPool, name: &str, description: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, description)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;

    println!("Ensured category {name}");
    Ok(id)
}

async fn seed_products(pool: &DbPool, apparel: Uuid, kitchen: Uuid) -> anyhow::Result<()> {
    let size_field = r#"[{"type":"select","label":"Size","required":true,"options":["S","M","L","XL"]}]"#;
    let gift_field = r#"[{"type":"checkbox","label":"Gift wrap"}]"#;

    let products = [
        ("Harbour Hoodie", "Heavy cotton hoodie", "55.00", 50, "limited", apparel, size_field),
        ("Logo Cap", "Adjustable cap", "18.50", 120, "limited", apparel, "[]"),
        ("Enamel Mug", "Camp-style enamel mug", "12.00", 0, "unlimited", kitchen, gift_field),
        ("Steel Bottle", "Insulated 750ml bottle", "24.90", 40, "limited", kitchen, "[]"),
    ];

    for (name, description, price, quantity, quantity_type, category_id, details) in products {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, quantity, quantity_type, category_id, details)
            SELECT $1, $2, $3, $4::numeric, $5, $6, $7, $8::jsonb
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(quantity)
        .bind(quantity_type)
        .bind(category_id)
        .bind(details)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_orders(pool: &DbPool) -> anyhow::Result<()> {
    let (existing,): (i64,) = sqlx::query_as("SELECT count(*) FROM orders")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("Orders already present, skipping");
        return Ok(());
    }

    let orders = [
        ("user_alice", "Harbour Hoodie", 1, "checking order", r#"{"Size":"M"}"#),
        ("user_alice", "Enamel Mug", 2, "shipped", r#"{"Gift wrap":true}"#),
        ("user_bob", "Logo Cap", 1, "completed", "{}"),
    ];

    for (user_id, product_name, quantity, status, selected) in orders {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, product_id, quantity, price, status, selected_details)
            SELECT $1, $2, p.id, $4, p.price * $4, $5, $6::jsonb
            FROM products p
            WHERE p.name = $3
            LIMIT 1
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(product_name)
        .bind(quantity)
        .bind(status)
        .bind(selected)
        .execute(pool)
        .await?;
    }

    println!("Seeded orders");
    Ok(())
}
