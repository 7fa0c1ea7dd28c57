//! Describe the catalogs and what each one can be filtered and sorted by.

use anyhow::{anyhow, Result};
use serde::Serialize;
use voyage_commerce::catalog::{Car, CatalogKind, License, Listing, Product, Tour, Visa, VpsPlan};
use voyage_commerce::search::{FacetKind, SortOption};

use super::CatalogsArgs;
use crate::context::Context;

#[derive(Debug, Serialize)]
pub struct CatalogInfo {
    pub name: &'static str,
    pub title: &'static str,
    pub paginated: bool,
    pub page_size: Option<usize>,
    pub debounced_search: bool,
    pub filters: Vec<FilterInfo>,
    pub sorts: Vec<SortOption>,
}

#[derive(Debug, Serialize)]
pub struct FilterInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FacetKind,
}

/// Run the catalogs command.
pub async fn run(args: CatalogsArgs, ctx: &Context) -> Result<()> {
    let kinds = match &args.catalog {
        Some(name) => vec![parse_kind(name)?],
        None => CatalogKind::ALL.to_vec(),
    };
    let infos: Vec<CatalogInfo> = kinds.into_iter().map(describe).collect();

    if ctx.output.is_json() {
        ctx.output.json(&infos);
        return Ok(());
    }

    for info in &infos {
        ctx.output.header(&format!("{} ({})", info.title, info.name));
        if let Some(size) = info.page_size {
            ctx.output.kv("pages of", &size.to_string());
        }
        if info.debounced_search {
            ctx.output.kv("search", "debounced");
        }
        for filter in &info.filters {
            ctx.output
                .list_item(&format!("{:<12} {} ({})", filter.key, filter.label, kind_hint(filter.kind)));
        }
        let sorts: Vec<&str> = info.sorts.iter().map(SortOption::as_str).collect();
        ctx.output.kv("sort", &sorts.join(", "));
    }
    Ok(())
}

pub fn parse_kind(name: &str) -> Result<CatalogKind> {
    CatalogKind::from_str(name).ok_or_else(|| {
        let known: Vec<&str> = CatalogKind::ALL.iter().map(CatalogKind::as_str).collect();
        anyhow!("Unknown catalog '{}'. Available: {}", name, known.join(", "))
    })
}

pub fn describe(kind: CatalogKind) -> CatalogInfo {
    match kind {
        CatalogKind::Cars => describe_listing::<Car>(),
        CatalogKind::Vps => describe_listing::<VpsPlan>(),
        CatalogKind::Tours => describe_listing::<Tour>(),
        CatalogKind::Visas => describe_listing::<Visa>(),
        CatalogKind::Licenses => describe_listing::<License>(),
        CatalogKind::Products => describe_listing::<Product>(),
    }
}

fn describe_listing<T: Listing>() -> CatalogInfo {
    let config = T::config();
    CatalogInfo {
        name: T::KIND.as_str(),
        title: T::KIND.display_name(),
        paginated: config.is_paginated(),
        page_size: config.is_paginated().then(|| config.default_page_size()),
        debounced_search: T::KIND.debounces_search(),
        filters: config
            .facets()
            .iter()
            .map(|f| FilterInfo {
                key: f.key(),
                label: f.label(),
                kind: f.kind(),
            })
            .collect(),
        sorts: config.sort_options(),
    }
}

/// How to write a value for this filter on the command line.
fn kind_hint(kind: FacetKind) -> &'static str {
    match kind {
        FacetKind::Exact => "exact value",
        FacetKind::MultiSelect => "a,b,c",
        FacetKind::AtMost => "max",
        FacetKind::AtLeast => "min",
        FacetKind::Range => "min..max",
        FacetKind::Search => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_products_paginate() {
        for kind in CatalogKind::ALL {
            let info = describe(kind);
            assert_eq!(info.paginated, kind == CatalogKind::Products, "{kind}");
            assert!(info.sorts.contains(&SortOption::PriceAsc));
            assert!(info.sorts.contains(&SortOption::PriceDesc));
        }
        assert_eq!(describe(CatalogKind::Products).page_size, Some(12));
    }

    #[test]
    fn test_parse_kind_lists_options() {
        let err = parse_kind("boats").unwrap_err().to_string();
        assert!(err.contains("cars, vps, tours"));
    }
}
