// Runs with the default relative directories, so it changes the working
// directory. Keep it the only test in this binary.

use std::fs;
use std::sync::Arc;

use page_mirror::{resolver, HttpTransport, Mirror, MirrorConfig};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_default_config_writes_relative_asset_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<html><body><img src="/logo.png"></body></html>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("png-bytes"))
        .mount(&server)
        .await;

    let temp_dir = tempdir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    let config = MirrorConfig::default();
    let transport = HttpTransport::new(&config.user_agent, config.timeout).unwrap();
    let mirror = Mirror::new(config, Arc::new(transport));
    let url = format!("{}/page", server.uri());

    let outcome = mirror.mirror(&url).await.unwrap();

    assert_eq!(outcome.assets.rewritten, 1);
    assert_eq!(fs::read_to_string(temp_dir.path().join("assets/logo.png")).unwrap(), "png-bytes");
    let html = fs::read_to_string(temp_dir.path().join(format!("{}.html", resolver::strip_scheme(&url)))).unwrap();
    assert!(html.contains(r#"src="assets/logo.png""#));
}
