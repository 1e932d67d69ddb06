//! Cart commands.
//!
//! Each command builds a [`CartManager`] from configuration, applies one
//! operation and prints any notifications to stderr.

use std::fmt::Write as _;
use std::process::ExitCode;

use rocketshoes_core::{Cart, ProductId};
use rocketshoes_storefront::catalog::HttpCatalog;
use rocketshoes_storefront::config::StorefrontConfig;
use rocketshoes_storefront::notify::RecordingNotifier;
use rocketshoes_storefront::storage::{AnyStore, KeyValueStore};
use rocketshoes_storefront::{CART_STORAGE_KEY, CartError, CartManager, UpdateProductAmount};

use super::CommandError;

type Manager = CartManager<HttpCatalog, AnyStore, RecordingNotifier>;

async fn manager(config: &StorefrontConfig) -> Result<Manager, CommandError> {
    let catalog = HttpCatalog::new(&config.catalog)?;
    let store = AnyStore::open(&config.storage).await?;

    Ok(CartManager::load(catalog, store, RecordingNotifier::new()).await)
}

/// Print notifications and map the operation outcome to an exit code.
fn conclude(manager: &Manager, result: Result<(), CartError>) -> ExitCode {
    #[allow(clippy::print_stderr)]
    {
        for notification in manager.notifier().drain() {
            eprintln!("{}: {}", notification.level, notification.message);
        }
    }

    match result {
        Ok(()) => {
            print_cart(manager.cart());
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns `CommandError` if the catalog client or store cannot be set up.
pub async fn add(config: &StorefrontConfig, product_id: ProductId) -> Result<ExitCode, CommandError> {
    let mut manager = manager(config).await?;
    let result = manager.add_product(product_id).await;
    Ok(conclude(&manager, result))
}

/// Remove a product.
///
/// # Errors
///
/// Returns `CommandError` if the catalog client or store cannot be set up.
pub async fn remove(
    config: &StorefrontConfig,
    product_id: ProductId,
) -> Result<ExitCode, CommandError> {
    let mut manager = manager(config).await?;
    let result = manager.remove_product(product_id).await;
    Ok(conclude(&manager, result))
}

/// Set a product's quantity.
///
/// # Errors
///
/// Returns `CommandError` if the catalog client or store cannot be set up.
pub async fn update(
    config: &StorefrontConfig,
    product_id: ProductId,
    amount: i64,
) -> Result<ExitCode, CommandError> {
    let mut manager = manager(config).await?;
    let result = manager
        .update_product_amount(UpdateProductAmount::new(product_id, amount))
        .await;
    Ok(conclude(&manager, result))
}

/// Print the stored cart.
///
/// # Errors
///
/// Returns `CommandError` if the catalog client or store cannot be set up.
pub async fn show(config: &StorefrontConfig) -> Result<ExitCode, CommandError> {
    let manager = manager(config).await?;
    print_cart(manager.cart());
    Ok(ExitCode::SUCCESS)
}

/// Delete the stored cart.
///
/// # Errors
///
/// Returns `CommandError::Storage` if the store cannot be opened or written.
pub async fn clear(config: &StorefrontConfig) -> Result<ExitCode, CommandError> {
    let store = AnyStore::open(&config.storage).await?;
    store.remove(CART_STORAGE_KEY).await?;

    tracing::info!("Stored cart cleared");
    Ok(ExitCode::SUCCESS)
}

fn print_cart(cart: &Cart) {
    #[allow(clippy::print_stdout)]
    {
        print!("{}", render_cart(cart));
    }
}

/// Render the cart as a plain-text table.
fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<40}  {:>5}  {:>10}  {:>10}",
        "ID", "Product", "Qty", "Price", "Total"
    );

    for entry in cart.entries() {
        let _ = writeln!(
            out,
            "{:>4}  {:<40}  {:>5}  {:>10.2}  {:>10.2}",
            entry.product_id(),
            truncate(&entry.product.title, 40),
            entry.amount,
            entry.product.unit_price(),
            entry.line_total(),
        );
    }

    let _ = writeln!(
        out,
        "\nItems: {}  Subtotal: {:.2}",
        cart.item_count(),
        cart.subtotal()
    );

    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut short: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::{CartEntry, Product};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render_cart(&Cart::new()), "Cart is empty\n");
    }

    #[test]
    fn test_render_cart_totals() {
        let cart: Cart = [CartEntry {
            product: Product::new(
                ProductId::new(1),
                "Tênis de Caminhada",
                Decimal::new(1799, 1),
                "shoe.jpg",
            ),
            amount: 2,
        }]
        .into_iter()
        .collect();

        let rendered = render_cart(&cart);
        assert!(rendered.contains("Tênis de Caminhada"));
        assert!(rendered.contains("179.90"));
        assert!(rendered.contains("359.80"));
        assert!(rendered.ends_with("Items: 2  Subtotal: 359.80\n"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
