//! Seed the product catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Belgian Chocolate Truffle
//!     price: 850
//!     description: Three layers of dark chocolate sponge
//!     image: https://cdn.dreamylayers.com/truffle.jpg
//!     category: cakes
//! ```
//!
//! Products whose name already exists in the catalog are skipped, so the
//! command can be re-run after editing the file.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use dreamy_layers_storefront::db::Repositories;
use dreamy_layers_storefront::models::NewProduct;

/// Top-level shape of the seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub products: Vec<NewProduct>,
}

/// Validate every product, returning one message per problem.
#[must_use]
pub fn validate_seed(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (index, product) in seed.products.iter().enumerate() {
        if let Err(message) = product.validate() {
            errors.push(format!("product #{} ({:?}): {message}", index + 1, product.name));
        }
        if !names.insert(product.name.trim().to_lowercase()) {
            errors.push(format!(
                "product #{} ({:?}): duplicate name in file",
                index + 1,
                product.name
            ));
        }
    }

    errors
}

/// Load products from `file_path` into the catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails
/// validation, or a database write fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;
    info!(products = seed.products.len(), "Parsed seed file");

    let errors = validate_seed(&seed);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = super::connect().await?;
    let repos = Repositories::postgres(&pool);

    let existing: HashSet<String> = repos
        .products
        .list()
        .await?
        .into_iter()
        .map(|p| p.name.trim().to_lowercase())
        .collect();

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for product in seed.products {
        if existing.contains(&product.name.trim().to_lowercase()) {
            skipped += 1;
            continue;
        }
        let created = repos.products.create(product).await?;
        info!(product_id = %created.id, name = %created.name, "Product created");
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");
    Ok(())
}
