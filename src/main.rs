use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rust_decimal_macros::dec;
use serde::Serialize;
use school_assets::{
    auth::{AuthMethod, Role},
    classify,
    commands::{
        access_requests::SubmitAccessRequestCommand, inventory_items::AddStockItemCommand,
        purchase_requests::SubmitPurchaseRequestCommand,
    },
    config, metrics,
    services::WorkflowServices,
    WorkflowContext,
};
use tracing::info;

/// Starting stock of a fresh installation: name, category, current, minimum, unit.
const DEFAULT_STOCK: [(&str, &str, u32, u32, &str); 5] = [
    ("Whiteboard Markers", "Stationery", 45, 50, "pcs"),
    ("A4 Paper Reams", "Stationery", 120, 50, "reams"),
    ("Chemistry Beakers", "Lab", 30, 25, "pcs"),
    ("Printer Ink Cartridges", "Electronics", 8, 15, "pcs"),
    ("Cleaning Supplies", "Maintenance", 25, 20, "units"),
];

#[derive(Parser)]
#[command(
    name = "school-assets",
    about = "School stock and request approval workflow",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Print Prometheus metrics after the command finishes"
    )]
    metrics: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stock tier for a quantity pair
    Classify {
        #[arg(long, allow_negative_numbers = true)]
        current: i64,
        #[arg(long, allow_negative_numbers = true)]
        minimum: i64,
    },
    /// Run the request workflows against in-memory collaborators
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config().context("failed to load workflow config")?;
    config::init_tracing(&config.log_level, config.log_json);

    match cli.command {
        Commands::Classify { current, minimum } => {
            println!("{}", classify(current, minimum));
        }
        Commands::Demo => run_demo(config).await?,
    }

    if cli.metrics {
        print!("{}", metrics::gather_metrics()?);
    }

    Ok(())
}

#[derive(Serialize)]
struct DemoReport<T: Serialize> {
    step: &'static str,
    result: T,
}

fn print_json<T: Serialize>(step: &'static str, result: T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&DemoReport { step, result })?
    );
    Ok(())
}

async fn run_demo(config: config::WorkflowConfig) -> Result<()> {
    let ctx = Arc::new(
        WorkflowContext::in_memory(config).context("failed to set up in-memory collaborators")?,
    );
    let _feed = ctx.notifications.attach();
    let services = WorkflowServices::new(ctx.clone());

    for (name, category, current, minimum, unit) in DEFAULT_STOCK {
        services
            .inventory
            .add_item(AddStockItemCommand {
                name: name.to_string(),
                category: category.to_string(),
                current,
                minimum,
                unit: unit.to_string(),
            })
            .await?;
    }
    info!("Default stock seeded");

    let alerts = services.inventory.low_stock_alerts().await?;
    print_json("low_stock_alerts", &alerts)?;

    if let Some(alert) = alerts.first() {
        let reorder = services.inventory.reorder(&alert.item.id).await?;
        print_json("reorder", &reorder)?;
        let approved = services.procurement.approve(&reorder.id).await?;
        print_json("approve_reorder", &approved)?;
    }

    let chairs = services
        .procurement
        .submit(SubmitPurchaseRequestCommand {
            item_name: "Chairs".to_string(),
            quantity: 25,
            estimated_cost: dec!(1250),
            justification: "Seating for the new classroom".to_string(),
        })
        .await?;
    print_json("approve_new_item", services.procurement.approve(&chairs.id).await?)?;

    let projector = services
        .procurement
        .submit(SubmitPurchaseRequestCommand {
            item_name: "Projector".to_string(),
            quantity: 1,
            estimated_cost: dec!(600),
            justification: "Replacement for room 12".to_string(),
        })
        .await?;
    print_json("reject", services.procurement.reject(&projector.id).await?)?;

    let access = services
        .access
        .submit(SubmitAccessRequestCommand {
            name: "Jordan Lee".to_string(),
            email: "jordan.lee@school.com".to_string(),
            auth_method: AuthMethod::Google,
        })
        .await?;
    print_json("approve_access", services.access.approve(&access.id, None).await?)?;

    let librarian = services
        .access
        .submit(SubmitAccessRequestCommand {
            name: "Sam Rivera".to_string(),
            email: "sam.rivera@school.com".to_string(),
            auth_method: AuthMethod::Password,
        })
        .await?;
    print_json(
        "approve_access_with_role",
        services
            .access
            .approve(&librarian.id, Some(Role::Manager))
            .await?,
    )?;

    print_json("inventory", services.inventory.list_items(None).await?)?;
    print_json("notifications", ctx.notifications.events())?;
    print_json("dashboard", services.dashboard.stats().await?)?;
    Ok(())
}
