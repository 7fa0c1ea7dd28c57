//! Cart commands, persisted through the snapshot file.

use anyhow::{Context as _, Result};
use chrono::Utc;
use dialoguer::Confirm;
use serde::Serialize;
use voyage_commerce::cart::{CartItem, CartSnapshot, CartStore, CartTotals, NewCartItem};
use voyage_commerce::ids::{ItemId, VariantId};
use voyage_commerce::money::Money;

use super::{CartArgs, CartCommand};
use crate::context::Context;
use crate::output::{money, truncate};

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let cart = load_cart(ctx)?;

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => return show(&cart, ctx),
        CartCommand::Add {
            id,
            name,
            price,
            variant,
            qty,
        } => {
            let currency = ctx.config.currency()?;
            let mut item = NewCartItem::new(id, name, Money::from_decimal(price, currency)).with_qty(qty);
            if let Some(variant) = variant {
                item = item.with_variant(variant.clone(), variant);
            }
            let key = cart.add_to_cart(item);
            ctx.output.success(&format!("Added {}", key));
        }
        CartCommand::Update { id, qty, variant } => {
            let variant = variant.map(VariantId::new);
            let changed = cart.update_qty_from_input(&ItemId::new(id), &qty, variant.as_ref());
            report(ctx, changed, "Quantity updated", "Quantity unchanged");
        }
        CartCommand::Inc { id, variant } => {
            let variant = variant.map(VariantId::new);
            let changed = cart.increment(&ItemId::new(id), variant.as_ref());
            report(ctx, changed, "Quantity increased", "Quantity unchanged");
        }
        CartCommand::Dec { id, variant } => {
            let variant = variant.map(VariantId::new);
            let changed = cart.decrement(&ItemId::new(id), variant.as_ref());
            report(ctx, changed, "Quantity decreased", "Quantity is already 1");
        }
        CartCommand::Remove { id, variant } => {
            let variant = variant.map(VariantId::new);
            let changed = cart.remove_from_cart(&ItemId::new(id), variant.as_ref());
            report(ctx, changed, "Removed", "No such line in cart");
        }
        CartCommand::Promo { code } => {
            let applied = cart.apply_promo(&code, &ctx.config.promo_table()?)?;
            ctx.output
                .success(&format!("Applied {}: {}", applied.code, applied.description));
        }
        CartCommand::Unpromo => {
            let changed = cart.remove_promo();
            report(ctx, changed, "Promo code removed", "No promo code applied");
        }
        CartCommand::Clear { yes } => {
            if !yes && !ctx.output.is_json() && !cart.is_empty() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove all {} items?", cart.item_count()))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    ctx.output.warn("Cart left as is");
                    return Ok(());
                }
            }
            cart.clear_cart();
            ctx.output.success("Cart cleared");
        }
        CartCommand::Checkout { yes } => return checkout(&cart, yes, ctx),
    }

    save_cart(ctx, &cart)?;
    if ctx.output.is_json() {
        show(&cart, ctx)?;
    }
    Ok(())
}

/// Restore the session cart from the snapshot file, or start empty.
pub fn load_cart(ctx: &Context) -> Result<CartStore> {
    let path = ctx.cart_path();
    let cart = CartStore::new();
    if let Some(snapshot) = CartSnapshot::load_if_exists(&path)
        .with_context(|| format!("Failed to load cart from {}", path.display()))?
    {
        cart.restore(snapshot)?;
    }
    Ok(cart)
}

pub fn save_cart(ctx: &Context, cart: &CartStore) -> Result<()> {
    let path = ctx.cart_path();
    cart.to_snapshot()
        .save(&path)
        .with_context(|| format!("Failed to save cart to {}", path.display()))
}

fn report(ctx: &Context, changed: bool, done: &str, unchanged: &str) {
    if changed {
        ctx.output.success(done);
    } else {
        ctx.output.warn(unchanged);
    }
}

#[derive(Serialize)]
struct CartView<'a> {
    items: &'a [CartItem],
    totals: &'a CartTotals,
}

fn show(cart: &CartStore, ctx: &Context) -> Result<()> {
    let totals = cart.totals(&ctx.config.pricing_policy()?)?;

    if ctx.output.is_json() {
        let items = cart.items();
        ctx.output.json(&CartView {
            items: &items,
            totals: &totals,
        });
        return Ok(());
    }

    ctx.output.header("Cart");
    if cart.is_empty() {
        ctx.output.info("Your cart is empty.");
        return Ok(());
    }

    let widths = [16, 32, 5, 12];
    ctx.output.table_row(&["ID", "ITEM", "QTY", "TOTAL"], &widths);
    for item in cart.items() {
        let name = match &item.variant_label {
            Some(label) => format!("{} ({})", item.name, label),
            None => item.name.clone(),
        };
        let key = item.key().to_string();
        let qty = item.qty.to_string();
        let line_total = item.line_total().map(|m| m.to_string()).unwrap_or_default();
        ctx.output.table_row(
            &[key.as_str(), truncate(&name, 32).as_str(), qty.as_str(), line_total.as_str()],
            &widths,
        );
    }

    print_totals(&totals, ctx);
    Ok(())
}

fn print_totals(totals: &CartTotals, ctx: &Context) {
    println!();
    ctx.output.kv("Subtotal", &totals.subtotal.to_string());
    if totals.ships_free() {
        ctx.output.kv("Shipping", "Free");
    } else {
        ctx.output.kv("Shipping", &totals.shipping.to_string());
    }
    ctx.output.kv("Tax", &totals.tax.to_string());
    if let Some(code) = &totals.promo_code {
        ctx.output
            .kv(&format!("Promo ({})", code), &format!("-{}", totals.discount));
    }
    ctx.output.kv("Total", &money(&totals.total));
}

fn checkout(cart: &CartStore, yes: bool, ctx: &Context) -> Result<()> {
    let policy = ctx.config.pricing_policy()?;
    let preview = cart.totals(&policy)?;

    if !yes && !ctx.output.is_json() && !cart.is_empty() {
        print_totals(&preview, ctx);
        let confirmed = Confirm::new()
            .with_prompt(format!("Place order for {}?", preview.total))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Checkout cancelled");
            return Ok(());
        }
    }

    let totals = cart.checkout(&policy)?;
    save_cart(ctx, cart)?;

    let placed_at = Utc::now();
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "placed_at": placed_at.to_rfc3339(),
            "totals": totals,
        }));
        return Ok(());
    }

    ctx.output.success(&format!(
        "Order placed {} for {} ({} items)",
        placed_at.format("%Y-%m-%d %H:%M UTC"),
        money(&totals.total),
        totals.item_count
    ));
    Ok(())
}
