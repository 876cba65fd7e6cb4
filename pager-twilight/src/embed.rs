//! Embed composition for paginated list pages.

use pager_core::{clamp_page, page_window, total_pages};
use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

/// Default embed accent color for paginated views.
pub const DEFAULT_EMBED_COLOR: u32 = 0x56_62_F0;

/// Discord's hard limit on embed descriptions.
const DESCRIPTION_LIMIT: usize = 4096;

/// Build an embed for one page.
///
/// The `Page x/y` footer appears only for multi-page views with the
/// indicator enabled.
pub fn build_page_embed(
    title: &str,
    description: impl Into<String>,
    page: usize,
    total_pages: usize,
    show_page_indicator: bool,
    color: u32,
) -> Embed {
    let builder = EmbedBuilder::new()
        .title(title)
        .color(color)
        .description(truncate_description(description.into()));

    if show_page_indicator && total_pages > 1 {
        let footer = EmbedFooterBuilder::new(format!("Page {page}/{total_pages}")).build();
        builder.footer(footer).build()
    } else {
        builder.build()
    }
}

/// Build a bullet-list description for one page window.
pub fn bulleted_page_description(items: &[String], per_page: usize, page: usize) -> String {
    let total = total_pages(items.len(), per_page);
    let page = clamp_page(page, total);
    let (start, end) = page_window(items.len(), per_page, page);
    format!("- {}", items[start..end].join("\n- "))
}

/// Cap a description at the platform limit, on a char boundary.
fn truncate_description(description: String) -> String {
    if description.len() <= DESCRIPTION_LIMIT {
        return description;
    }

    let mut cut = DESCRIPTION_LIMIT;
    while !description.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut truncated = description;
    truncated.truncate(cut);
    truncated
}
