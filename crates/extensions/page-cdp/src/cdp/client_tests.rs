use super::*;

fn page(id: &str, page_type: &str, url: &str) -> PageInfo {
    PageInfo {
        id: id.to_string(),
        page_type: page_type.to_string(),
        title: String::new(),
        url: url.to_string(),
        web_socket_debugger_url: None,
    }
}

#[test]
fn test_select_page_by_url() {
    let pages = vec![
        page("1", "page", "https://news.example.com/"),
        page("2", "page", "https://play.example.com/arena"),
    ];
    let selected = select_page(&pages, Some("play.example.com")).unwrap();
    assert_eq!(selected.id, "2");
}

#[test]
fn test_select_page_skips_non_pages() {
    let pages = vec![
        page("w", "service_worker", "https://play.example.com/sw.js"),
        page("p", "page", "https://play.example.com/"),
    ];
    assert_eq!(select_page(&pages, Some("play")).unwrap().id, "p");
}

#[test]
fn test_select_page_without_filter_takes_first_page() {
    let pages = vec![
        page("bg", "background_page", "chrome-extension://x/"),
        page("a", "page", "about:blank"),
    ];
    assert_eq!(select_page(&pages, None).unwrap().id, "a");
}

#[test]
fn test_select_page_no_match() {
    let pages = vec![page("1", "page", "https://news.example.com/")];
    assert!(select_page(&pages, Some("play")).is_none());
}

#[test]
fn test_request_id_increment() {
    let id = AtomicU64::new(1);
    assert_eq!(id.fetch_add(1, Ordering::SeqCst), 1);
    assert_eq!(id.fetch_add(1, Ordering::SeqCst), 2);
    assert_eq!(id.load(Ordering::SeqCst), 3);
}
