use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_console::api::models::{ChangeType, InventoryAdjustment, InvoiceRequest, Product};
use inventory_console::catalog;
use inventory_console::config::Config;
use inventory_console::routes::{Navigator, Route, RouteDecision};
use inventory_console::store::TokenStore;
use inventory_console::AppContext;

/// Navigator for a one-shot console: a redirect to login becomes a hint,
/// since there is no persistent screen to move.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn redirect(&self, to: Route, from: Option<String>) {
        tracing::debug!(to = to.path(), from = from.as_deref(), "Navigation redirect");
        if to == Route::Login {
            println!("Session ended. Log in with: inventory-console login <pin>");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Load configuration and open the credential store
    let config = Config::load()?;
    let tokens = Arc::new(TokenStore::open(&config.data_dir)?);
    info!(base_url = %config.api_base_url, "inventory-console starting");

    let navigator = Arc::new(ConsoleNavigator);
    let http = reqwest::Client::builder().build()?;
    let ctx = AppContext::new(
        config,
        http,
        Arc::clone(&tokens),
        Arc::clone(&navigator) as Arc<dyn Navigator>,
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");

    match command {
        "login" => {
            let pin = args.get(1).context("usage: login <pin>")?;
            match ctx.guard(Route::Login).await {
                RouteDecision::Redirect { .. } => println!("Already logged in."),
                RouteDecision::Proceed => {
                    let role = ctx.session.login(&ctx.api, &ctx.tokens, pin).await?;
                    println!("Logged in as {role}");
                }
            }
        }
        "logout" => {
            ctx.session
                .logout(&ctx.tokens, navigator.as_ref())
                .await?;
        }
        "status" => {
            ctx.session.initialize(&ctx.api, &ctx.tokens).await;
            let session = ctx.session.snapshot().await;
            if session.authenticated {
                println!("Logged in ({})", session.role);
            } else {
                println!("Not logged in.");
            }
        }
        "products" => {
            ensure_authenticated(&ctx).await?;
            ctx.inventory.fetch_products(&ctx.api).await;
            if let Some(error) = ctx.inventory.error().await {
                anyhow::bail!(error);
            }
            print_products(&ctx.inventory.products().await);
            println!(
                "{} products, {} at or below reorder point",
                ctx.inventory.product_count().await,
                ctx.inventory.low_stock_count().await
            );
        }
        "low-stock" => {
            ensure_authenticated(&ctx).await?;
            let low = ctx.api.get_low_stock().await?;
            print_products(&low);
        }
        "log" => {
            ensure_authenticated(&ctx).await?;
            let limit: u32 = match args.get(1) {
                Some(raw) => raw.parse().context("limit must be a number")?,
                None => 100,
            };
            ctx.inventory.fetch_log(&ctx.api, limit).await;
            if let Some(error) = ctx.inventory.error().await {
                anyhow::bail!(error);
            }
            for entry in ctx.inventory.log_entries().await {
                println!(
                    "{}  {:<24} {:>10} {:>5}  {} -> {}  by {}",
                    entry.timestamp,
                    entry.product_name,
                    entry.change_type,
                    entry.qty_changed,
                    entry.previous_qty,
                    entry.new_qty,
                    entry.changed_by
                );
            }
        }
        "adjust" => {
            ensure_authenticated(&ctx).await?;
            let material_no = args.get(1).context("usage: adjust <material_no> <sale|restock|adjustment> <qty> [notes]")?;
            let change_type = args
                .get(2)
                .and_then(|raw| ChangeType::parse(raw))
                .context("change type must be sale, restock or adjustment")?;
            let quantity: i64 = args
                .get(3)
                .context("missing quantity")?
                .parse()
                .context("quantity must be a number")?;
            let notes = args.get(4).map(String::as_str).unwrap_or("");

            let updated = ctx
                .inventory
                .adjust_inventory(&ctx.api, material_no, change_type, quantity, notes)
                .await?;
            println!(
                "{}: {} on hand (reorder at {})",
                updated.material_no, updated.qty_on_hand, updated.reorder_point
            );
        }
        "bulk-adjust" => {
            ensure_authenticated(&ctx).await?;
            let path = args.get(1).context("usage: bulk-adjust <adjustments.json>")?;
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {path}"))?;
            let adjustments: Vec<InventoryAdjustment> =
                serde_json::from_str(&raw).context("invalid adjustments JSON")?;

            let updated = ctx.inventory.bulk_adjust(&ctx.api, adjustments).await?;
            println!("Adjusted {} products", updated.len());
        }
        "markup" => {
            ensure_authenticated(&ctx).await?;
            let material_no = args.get(1).context("usage: markup <material_no> <pct>")?;
            let markup_pct: f64 = args
                .get(2)
                .context("missing markup percentage")?
                .parse()
                .context("markup must be a number")?;

            let updated = ctx
                .inventory
                .update_markup(&ctx.api, material_no, markup_pct)
                .await?;
            println!(
                "{}: markup {}% -> retail {:.2} ({:.2} w/ tax)",
                updated.material_no,
                updated.markup_pct,
                updated.retail_pre_tax,
                updated.retail_with_tax
            );
        }
        "reorder" => {
            ensure_authenticated(&ctx).await?;
            let material_no = args.get(1).context("usage: reorder <material_no> <point>")?;
            let reorder_point: i64 = args
                .get(2)
                .context("missing reorder point")?
                .parse()
                .context("reorder point must be a number")?;

            let updated = ctx
                .inventory
                .update_reorder(&ctx.api, material_no, reorder_point)
                .await?;
            println!(
                "{}: reorder point {}",
                updated.material_no, updated.reorder_point
            );
        }
        "archive" => {
            ensure_authenticated(&ctx).await?;
            let archive = ctx.api.get_price_list_archive().await?;
            println!("{}", archive.headers.join(" | "));
            for row in &archive.rows {
                println!("{}", row.join(" | "));
            }
        }
        "import" => {
            ensure_authenticated(&ctx).await?;
            let path = args.get(1).context("usage: import <pricelist.csv>")?;
            let contents = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {path}"))?;
            let file_name = std::path::Path::new(path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("pricelist.csv");

            let report = ctx.api.import_price_list(file_name, contents).await?;
            println!("{}", report.message);
            for name in &report.new_products {
                println!("  new: {name}");
            }
        }
        "invoice" => {
            ensure_authenticated(&ctx).await?;
            let data_path = args
                .get(1)
                .context("usage: invoice <invoice.json> <invoice.pdf>")?;
            let pdf_path = args.get(2).context("missing PDF path")?;

            let raw = tokio::fs::read_to_string(data_path)
                .await
                .with_context(|| format!("failed to read {data_path}"))?;
            let invoice: InvoiceRequest =
                serde_json::from_str(&raw).context("invalid invoice JSON")?;
            let pdf = tokio::fs::read(pdf_path)
                .await
                .with_context(|| format!("failed to read {pdf_path}"))?;

            let receipt = ctx.api.file_invoice(&invoice, pdf).await?;
            println!("{}", receipt.message);
            if !receipt.drive_url.is_empty() {
                println!("  filed at {}", receipt.drive_url);
            }
        }
        "catalog" => {
            for group in catalog::PRODUCT_GROUPS {
                for product in group.products {
                    println!(
                        "{:<44} {:<18} {:>8.2}",
                        product.display_name, product.material_no, product.default_price
                    );
                }
                println!();
            }
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!(
                "Commands: login logout status products low-stock log adjust bulk-adjust \
                 markup reorder archive import invoice catalog"
            );
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Run the route guard for a data command; a redirect means log in first.
async fn ensure_authenticated(ctx: &AppContext) -> anyhow::Result<()> {
    match ctx.guard(Route::Dashboard).await {
        RouteDecision::Proceed => Ok(()),
        RouteDecision::Redirect { .. } => {
            anyhow::bail!("Not logged in. Run: inventory-console login <pin>")
        }
    }
}

fn print_products(products: &[Product]) {
    println!(
        "{:<18} {:<32} {:>6} {:>7} {:>9} {:>9}",
        "Material No", "Product", "Qty", "Reorder", "Retail", "w/ Tax"
    );
    for product in products {
        println!(
            "{:<18} {:<32} {:>6} {:>7} {:>9.2} {:>9.2}",
            product.material_no,
            product.product_name,
            product.qty_on_hand,
            product.reorder_point,
            product.retail_pre_tax,
            product.retail_with_tax
        );
    }
}
