//! `X-Total-Count` and RFC 5988 `Link` headers for paged list responses.

use crate::query::Page;

use super::header::Header;

fn generate_uri(base_url: &str, page: i64, size: i64) -> String {
    format!("{}?page={}&size={}", base_url, page, size)
}

pub fn link_header<T>(page: &Page<T>, base_url: &str) -> String {
    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(format!("<{}>; rel=\"next\"", generate_uri(base_url, page.number.saturating_add(1), page.size)));
    }
    if page.has_previous() {
        links.push(format!("<{}>; rel=\"prev\"", generate_uri(base_url, page.number - 1, page.size)));
    }
    let last_page = (page.total_pages() - 1).max(0);
    links.push(format!("<{}>; rel=\"last\"", generate_uri(base_url, last_page, page.size)));
    links.push(format!("<{}>; rel=\"first\"", generate_uri(base_url, 0, page.size)));
    links.join(",")
}

pub fn generate_pagination_headers<T>(page: &Page<T>, base_url: &str) -> [Header; 2] {
    [
        ("X-Total-Count".to_string(), page.total_elements.to_string()),
        ("Link".to_string(), link_header(page, base_url)),
    ]
}
