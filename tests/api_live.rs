//! Live API tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use bojstat_rs::{Client, Lang};

#[test]
fn fetch_small_range() {
    let client = Client::new(Lang::En);
    let rows = client
        .get_data(
            "FM01",
            &["STRDCLUCON".into()],
            Some("202501"),
            Some("202503"),
            None,
        )
        .unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r.series_code == "STRDCLUCON"));
}

#[test]
fn metadata_and_search() {
    let client = Client::new(Lang::En);
    let meta = client.get_metadata("FM08").unwrap();
    assert!(!meta.is_empty());

    let hits = client.search_series("FM08", Some("dollar")).unwrap();
    assert!(hits.len() <= meta.len());
    assert!(
        hits.iter().all(|m| m
            .name
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains("dollar"))
    );
}

#[test]
fn layer_lookup_monthly() {
    let client = Client::new(Lang::En);
    let rows = client
        .get_layer("BP01", "M", "1,1,1", Some("202504"), Some("202509"), None)
        .unwrap();
    assert!(!rows.is_empty());
}
