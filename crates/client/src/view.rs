//! Plain-text rendering of the catalog view for the terminal.
//!
//! Every renderer builds a list of lines and ends each one with a newline.

use review_common::{CatalogProduct, FilterOptions, RemarkTag};

use crate::api::CatalogApi;
use crate::pagination::PageLink;
use crate::session::{ReviewSession, ViewState};
use crate::tracker::PendingEdit;

pub const EMPTY_MESSAGE: &str = "No products found. Try adjusting your filters.";
pub const NO_IMAGE_PLACEHOLDER: &str = "No Image Available";
pub const FLAGGED_BADGE: &str = "Flagged";

fn lines_to_text(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

pub fn render_card(product: &CatalogProduct, pending: &PendingEdit) -> String {
    let badge = if pending.is_flagged() {
        format!(" [{FLAGGED_BADGE}]")
    } else {
        String::new()
    };
    let image = product.thumbnail_url.as_deref().unwrap_or(NO_IMAGE_PLACEHOLDER);
    let boxes: Vec<String> = RemarkTag::ALL
        .iter()
        .map(|tag| {
            let mark = if pending.has(*tag) { 'x' } else { ' ' };
            format!("[{mark}] {}", tag.label())
        })
        .collect();

    lines_to_text(vec![
        format!("#{} {}{}", product.product_id, product.name, badge),
        format!(
            "    {} / {} / {}",
            product.category_name, product.gender, product.brand_name
        ),
        format!("    image: {image}"),
        format!("    {}", boxes.join("  ")),
    ])
}

pub fn render_page_links(links: &[PageLink], current: u64) -> String {
    links
        .iter()
        .map(|link| match link {
            PageLink::Page(page) if *page == current => format!("[{page}]"),
            PageLink::Page(page) => page.to_string(),
            PageLink::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_filter_options(options: &FilterOptions) -> String {
    let mut lines = vec!["Genders:".to_string()];
    lines.extend(options.genders.iter().map(|gender| format!("  {gender}")));
    lines.push("Categories:".to_string());
    lines.extend(options.categories.iter().map(|category| {
        format!("  {:>5}  {} ({})", category.id, category.name, category.gender)
    }));
    lines.push("Brands:".to_string());
    lines.extend(
        options
            .brands
            .iter()
            .map(|brand| format!("  {:>5}  {}", brand.id, brand.name)),
    );
    lines_to_text(lines)
}

/// Renders the whole view for the session's current state.
pub fn render_session<A: CatalogApi>(session: &ReviewSession<A>) -> String {
    match session.state() {
        ViewState::Loading => "Loading products...\n".to_string(),
        ViewState::Failed(message) => format!("{message}\n"),
        ViewState::Ready if session.products().is_empty() => format!("{EMPTY_MESSAGE}\n"),
        ViewState::Ready => {
            let mut out = String::new();
            if let Some(pagination) = session.pagination() {
                out.push_str(&format!(
                    "Page {} of {} ({} products)\n",
                    pagination.page, pagination.total_pages, pagination.total
                ));
            }
            for product in session.products() {
                out.push_str(&render_card(product, &session.pending(product.product_id)));
            }
            if session.total_pages() > 1 {
                out.push_str(&render_page_links(&session.page_links(), session.page()));
                out.push('\n');
            }
            out
        }
    }
}
