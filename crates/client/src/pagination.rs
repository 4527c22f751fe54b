/// One element of the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(u64),
    Ellipsis,
}

const MAX_VISIBLE: u64 = 5;

/// Up to five page numbers centred on `current`, with shortcuts to the first
/// and last page when the window does not already include them.
/// Returns nothing when there is at most one page.
pub fn page_window(current: u64, total_pages: u64) -> Vec<PageLink> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);

    let mut start = current.saturating_sub(MAX_VISIBLE / 2).max(1);
    let end = (start + MAX_VISIBLE - 1).min(total_pages);
    if end - start < MAX_VISIBLE - 1 {
        start = end.saturating_sub(MAX_VISIBLE - 1).max(1);
    }

    let mut links = Vec::new();
    if start > 1 {
        links.push(PageLink::Page(1));
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }
    links.extend((start..=end).map(PageLink::Page));
    if end < total_pages {
        if end + 1 < total_pages {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page(total_pages));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Ellipsis, Page};

    #[test]
    fn test_single_page_has_no_window() {
        assert!(page_window(1, 1).is_empty());
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_short_range_shows_every_page() {
        assert_eq!(page_window(2, 3), vec![Page(1), Page(2), Page(3)]);
    }

    #[test]
    fn test_window_at_start() {
        assert_eq!(
            page_window(1, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_window_in_the_middle() {
        assert_eq!(
            page_window(6, 12),
            vec![
                Page(1),
                Ellipsis,
                Page(4),
                Page(5),
                Page(6),
                Page(7),
                Page(8),
                Ellipsis,
                Page(12)
            ]
        );
    }

    #[test]
    fn test_window_at_end() {
        assert_eq!(
            page_window(10, 10),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn test_adjacent_shortcut_has_no_ellipsis() {
        assert_eq!(
            page_window(4, 6),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6)]
        );
        assert_eq!(
            page_window(4, 7),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Page(7)]
        );
    }
}
