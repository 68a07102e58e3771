//! Console driver for the mall/brand directory.
//!
//! Three read-only views over the directory backend: the region cascade
//! (`regions`), the brand-distribution tree (`tree`), and the filtered
//! brand-store listing (`stores`).

mod cascade;
mod filter;

use clap::{Parser, Subcommand};
use mallmap_api::{BrandStore, DirectoryClient, TreeQuery};
use mallmap_core::regions::Selection;
use mallmap_core::tree::TreeNode;
use mallmap_core::{build_tree, load_app_config};

use crate::cascade::RegionCascade;
use crate::filter::FilterController;

#[derive(Debug, Parser)]
#[command(name = "mallmap")]
#[command(about = "Mall/brand directory console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk the region cascade: provinces, one province's cities, one city's districts
    Regions {
        /// Province id to list cities for
        #[arg(long)]
        province: Option<String>,
        /// City id to list districts for (requires --province)
        #[arg(long)]
        city: Option<String>,
    },
    /// Print the brand-distribution tree (province-city-district-mall-brand)
    Tree {
        /// How many levels the backend should expand
        #[arg(long, default_value = "2")]
        level: u8,
        /// Restrict the tree to one brand
        #[arg(long)]
        brand: Option<String>,
        /// Restrict the tree to one province
        #[arg(long)]
        province: Option<String>,
    },
    /// List brand stores with region and search filters
    Stores {
        #[arg(long)]
        province: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        district: Option<String>,
        /// Search over mall name, store name, and store address
        #[arg(long)]
        search: Option<String>,
        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .init();

    let cli = Cli::parse();
    let client = DirectoryClient::from_config(&config)?;

    match cli.command {
        Some(Commands::Regions { province, city }) => run_regions(&client, province, city).await,
        Some(Commands::Tree {
            level,
            brand,
            province,
        }) => run_tree(&client, level, brand, province).await,
        Some(Commands::Stores {
            province,
            city,
            district,
            search,
            page,
        }) => {
            run_stores(
                &client,
                config.page_size,
                selection_from_args(province, city, district),
                search,
                page,
            )
            .await
        }
        None => run_regions(&client, None, None).await,
    }
}

/// Walks the cascade one level at a time and prints the options of the
/// deepest requested level.
async fn run_regions(
    client: &DirectoryClient,
    province: Option<String>,
    city: Option<String>,
) -> anyhow::Result<()> {
    let mut cascade = RegionCascade::new(client);
    cascade.load_provinces().await;

    let Some(province_id) = province else {
        if city.is_some() {
            tracing::warn!("--city ignored without --province");
        }
        print_regions("provinces", cascade.provinces());
        return Ok(());
    };

    if let Some(fetch) = cascade.set_province(Some(province_id.clone())) {
        cascade.resolve(fetch).await;
    }

    let Some(city_id) = city else {
        print_regions(&format!("cities of {province_id}"), cascade.cities());
        return Ok(());
    };

    if let Some(fetch) = cascade.set_city(Some(city_id.clone())) {
        cascade.resolve(fetch).await;
    }
    print_regions(&format!("districts of {city_id}"), cascade.districts());
    Ok(())
}

fn print_regions(label: &str, regions: &[mallmap_core::Region]) {
    println!("{label} ({}):", regions.len());
    for region in regions {
        println!("  {}  {}", region.id, region.name);
    }
}

async fn run_tree(
    client: &DirectoryClient,
    level: u8,
    brand: Option<String>,
    province: Option<String>,
) -> anyhow::Result<()> {
    let payload = client
        .brand_tree(&TreeQuery {
            level,
            brand_id: brand,
            province_id: province,
        })
        .await?;

    let tree = build_tree(&payload);
    if tree.is_empty() {
        println!("(empty tree)");
    } else {
        print_nodes(&tree, 0);
    }
    Ok(())
}

fn print_nodes(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        println!("{}{} [{}]", "  ".repeat(depth), node.title, node.key);
        print_nodes(&node.children, depth + 1);
    }
}

async fn run_stores(
    client: &DirectoryClient,
    limit: u64,
    selection: Selection,
    search: Option<String>,
    page: u64,
) -> anyhow::Result<()> {
    let mut controller: FilterController<BrandStore> = FilterController::new(limit);
    controller.apply_region(&selection);
    if let Some(search) = search {
        controller.apply_search(search);
    }
    controller.set_page(page);

    let result = client.list_brand_stores(&controller.query()).await;
    if !controller.absorb(result) {
        println!("brand-store listing unavailable, showing last loaded page");
    }

    println!("{} stores total, page {}:", controller.total(), controller.page());
    for store in controller.items() {
        println!(
            "  {}  {}  {}",
            store.mall.name,
            store.store_name.as_deref().unwrap_or("-"),
            store.store_address.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Builds a selection from CLI arguments, enforcing the cascade invariant:
/// a child level without its parent is ignored with a warning.
fn selection_from_args(
    province: Option<String>,
    city: Option<String>,
    district: Option<String>,
) -> Selection {
    let mut selection = Selection::default().with_province(province);
    if city.is_some() {
        if selection.province_id.is_some() {
            selection = selection.with_city(city);
        } else {
            tracing::warn!("--city ignored without --province");
        }
    }
    if district.is_some() {
        if selection.city_id.is_some() {
            selection = selection.with_district(district);
        } else {
            tracing::warn!("--district ignored without --city");
        }
    }
    selection
}
