//! Search command: filter, sort and page through a catalog.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context as _, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use voyage_commerce::catalog::{parse_listings, Car, CatalogKind, License, Listing, Product, Tour, Visa, VpsPlan};
use voyage_commerce::money::{format_currency, Money};
use voyage_commerce::search::{Debouncer, Filter, SearchResults, SearchSession, SearchState, SortOption};

use super::catalogs::parse_kind;
use super::SearchArgs;
use crate::commands::cart::{load_cart, save_cart};
use crate::context::Context;
use crate::output::{page_summary, truncate};
use crate::source::{read_file, CatalogClient};

/// Facet key of the free-text box.
const QUERY_KEY: &str = "q";

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    match parse_kind(&args.catalog)? {
        CatalogKind::Cars => search_catalog::<Car>(args, ctx).await,
        CatalogKind::Vps => search_catalog::<VpsPlan>(args, ctx).await,
        CatalogKind::Tours => search_catalog::<Tour>(args, ctx).await,
        CatalogKind::Visas => search_catalog::<Visa>(args, ctx).await,
        CatalogKind::Licenses => search_catalog::<License>(args, ctx).await,
        CatalogKind::Products => search_catalog::<Product>(args, ctx).await,
    }
}

async fn search_catalog<T: Listing>(args: SearchArgs, ctx: &Context) -> Result<()> {
    let body = load_body(T::KIND, &args, ctx).await?;
    let items: Vec<T> = parse_listings(&body).with_context(|| format!("Invalid {} data", T::KIND))?;
    let mut session = SearchSession::new(Arc::new(T::config()), items);

    apply_args(&mut session, &args, ctx)?;

    if let Some(id) = &args.add {
        return add_to_cart(&session, id, args.qty, ctx);
    }

    if args.interactive {
        return interactive(&mut session, args.facets, ctx).await;
    }

    render(&session, args.facets, ctx);
    Ok(())
}

/// Catalog JSON from, in order: `--file`, `--remote`, the data directory, the API.
async fn load_body(kind: CatalogKind, args: &SearchArgs, ctx: &Context) -> Result<String> {
    if let Some(path) = &args.file {
        return Ok(read_file(&ctx.resolve_path(path)).await?);
    }

    let local = if args.remote { None } else { ctx.catalog_file(kind.as_str()) };
    if let Some(path) = local {
        if path.exists() {
            ctx.output.debug(&format!("Reading {}", path.display()));
            return Ok(read_file(&path).await?);
        }
        tracing::debug!(path = %path.display(), "no local catalog file");
    }

    let Some(base_url) = ctx.config.api.base_url.as_deref() else {
        bail!(
            "No data for {}. Pass --file, set search.data_dir, or set api.base_url.",
            kind
        );
    };

    let client = CatalogClient::new(&ctx.config.api, base_url)?;
    let spinner = ctx.output.spinner(&format!("Fetching {}...", kind.display_name()));
    let body = client.fetch(kind.as_str()).await;
    spinner.finish_and_clear();
    Ok(body?)
}

fn apply_args<T: Listing>(session: &mut SearchSession<T>, args: &SearchArgs, ctx: &Context) -> Result<()> {
    if session.config().is_paginated() {
        let page_size = args.page_size.unwrap_or(ctx.config.search.page_size);
        session.set_page_size(page_size);
    } else if args.page_size.is_some() {
        ctx.output
            .warn(&format!("{} shows every match on one page; --page-size ignored", T::KIND));
    }

    for raw in &args.filters {
        let (key, value) = split_filter(raw)?;
        session.set_filter_input(key, value)?;
    }

    if let Some(query) = &args.query {
        require_text_search(session)?;
        session.set_filter(QUERY_KEY, Filter::contains(query.as_str()));
    }

    if let Some(sort) = &args.sort {
        session.set_sort(parse_sort(session, sort)?);
    }

    // Filter and sort changes reset to page 1, so the page goes last.
    session.set_page(args.page);
    Ok(())
}

/// Split `key=value`.
fn split_filter(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => bail!("Filter '{}' must look like KEY=VALUE", raw),
    }
}

fn parse_sort<T>(session: &SearchSession<T>, raw: &str) -> Result<SortOption> {
    let options = session.config().sort_options();
    match SortOption::from_str(raw) {
        Some(option) if options.contains(&option) => Ok(option),
        _ => {
            let valid: Vec<&str> = options.iter().map(SortOption::as_str).collect();
            Err(anyhow!("Unknown sort '{}'. Available: {}", raw, valid.join(", ")))
        }
    }
}

fn require_text_search<T>(session: &SearchSession<T>) -> Result<()> {
    if session.config().find_facet(QUERY_KEY).is_none() {
        bail!("{} has no text search; use --filter instead", session.config().name());
    }
    Ok(())
}

#[derive(Serialize)]
struct SearchReport<'a, T> {
    catalog: CatalogKind,
    state: &'a SearchState,
    #[serde(flatten)]
    results: SearchResults<&'a T>,
}

fn render<T: Listing>(session: &SearchSession<T>, show_facets: bool, ctx: &Context) {
    let results = session.results();

    if ctx.output.is_json() {
        ctx.output.json(&SearchReport {
            catalog: T::KIND,
            state: session.state(),
            results,
        });
        return;
    }

    ctx.output.header(&format!(
        "{} ({})",
        T::KIND.display_name(),
        session.state().sort.display_name()
    ));

    if results.is_empty() {
        ctx.output.info("No results match your filters.");
        if session.state().has_active_filters() {
            ctx.output.info("Drop a --filter to see more.");
        }
        return;
    }

    let widths = [14, 30, 28, 12];
    ctx.output.table_row(&["ID", "NAME", "DETAILS", "PRICE"], &widths);
    let currency = ctx.config.currency().unwrap_or_default();
    for item in &results.items {
        let price = format_currency(&Money::from_decimal(item.price(), currency));
        ctx.output.table_row(
            &[
                item.id().as_str(),
                truncate(item.name(), 30).as_str(),
                truncate(&item.summary(), 28).as_str(),
                price.as_str(),
            ],
            &widths,
        );
    }

    println!();
    ctx.output.info(&page_summary(&results.pagination));

    if show_facets {
        for facet in &results.facets {
            let values: Vec<String> = facet
                .values
                .iter()
                .map(|v| {
                    let mark = if v.selected { "*" } else { "" };
                    format!("{}{} ({})", mark, v.value, v.count)
                })
                .collect();
            ctx.output.kv(&facet.label, &values.join(", "));
        }
    }
}

fn add_to_cart<T: Listing>(session: &SearchSession<T>, id: &str, qty: u32, ctx: &Context) -> Result<()> {
    let listing = session
        .items()
        .iter()
        .find(|item| item.id().as_str() == id)
        .ok_or_else(|| anyhow!("No {} listing with id '{}'", T::KIND, id))?;

    let cart = load_cart(ctx)?;
    let key = cart.add_to_cart(listing.to_cart_item(ctx.config.currency()?).with_qty(qty));
    save_cart(ctx, &cart)?;

    ctx.output.success(&format!(
        "Added {} x {} to cart ({} items)",
        qty,
        listing.name(),
        cart.item_count()
    ));
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "added": key.to_string(),
            "qty": cart.get(&key).map(|line| line.qty),
            "item_count": cart.item_count(),
        }));
    }
    Ok(())
}

/// Read queries from stdin; each burst of typing is applied once it pauses.
async fn interactive<T: Listing>(session: &mut SearchSession<T>, show_facets: bool, ctx: &Context) -> Result<()> {
    require_text_search(session)?;

    let delay = Duration::from_millis(ctx.config.search.debounce_ms);
    if !T::KIND.debounces_search() {
        ctx.output
            .debug(&format!("{} applies search live; debouncing stdin anyway", T::KIND));
    }

    let (debouncer, mut queries) = Debouncer::spawn(delay);
    let mut debouncer = Some(debouncer);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render(session, show_facets, ctx);
    ctx.output.info("Type to search, Ctrl-D to quit.");

    loop {
        tokio::select! {
            line = lines.next_line(), if debouncer.is_some() => match line? {
                Some(text) => {
                    if let Some(d) = &debouncer {
                        d.push(text.trim().to_string());
                    }
                }
                // Dropping the debouncer flushes the last query and closes `queries`.
                None => debouncer = None,
            },
            query = queries.recv() => match query {
                Some(query) => {
                    let changed = if query.is_empty() {
                        session.clear_filter(QUERY_KEY)
                    } else {
                        session.set_filter(QUERY_KEY, Filter::contains(query))
                    };
                    if changed {
                        render(session, show_facets, ctx);
                    }
                }
                None => break,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOURS: &str = r#"[
        {"id": "t1", "name": "Alps Trek", "destination": "Switzerland", "category": "adventure",
         "price": 1200, "rating": 4.8, "durationDays": 7},
        {"id": "t2", "name": "Paris Food Walk", "destination": "France", "category": "food",
         "price": 150, "rating": 4.5, "durationDays": 1},
        {"id": "t3", "name": "Nile Cruise", "destination": "Egypt", "category": "cruise",
         "price": 900, "rating": 4.2, "durationDays": 5}
    ]"#;

    fn session() -> SearchSession<Tour> {
        let items: Vec<Tour> = parse_listings(TOURS).unwrap();
        SearchSession::new(Arc::new(Tour::config()), items)
    }

    #[test]
    fn test_split_filter() {
        assert_eq!(split_filter("price=100..500").unwrap(), ("price", "100..500"));
        assert_eq!(split_filter(" category = food,cruise ").unwrap(), ("category", "food,cruise"));
        assert!(split_filter("price").is_err());
        assert!(split_filter("=5").is_err());
    }

    #[test]
    fn test_parse_sort_only_accepts_catalog_options() {
        let session = session();
        assert_eq!(parse_sort(&session, "price-desc").unwrap(), SortOption::PriceDesc);
        let err = parse_sort(&session, "popularity").unwrap_err().to_string();
        assert!(err.contains("price_asc"), "{err}");
    }

    #[test]
    fn test_vps_has_no_text_search() {
        let session: SearchSession<VpsPlan> = SearchSession::new(Arc::new(VpsPlan::config()), Vec::new());
        assert!(require_text_search(&session).is_err());
    }
}
