//! Property tests for URI rendering.

use percent_encoding::percent_decode_str;
use proptest::prelude::*;
use resty::RestUri;

fn segments() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("/{0,3}", "[a-z0-9]{1,8}"), 0..5)
}

fn join(parts: &[(String, String)]) -> String {
    parts
        .iter()
        .map(|(slashes, segment)| format!("{slashes}{segment}"))
        .collect()
}

proptest! {
    #[test]
    fn rendered_path_never_has_doubled_slashes(
        base in segments(),
        resource in segments(),
        trailing in "/{0,3}",
    ) {
        let base = format!("http://localhost{}{trailing}", join(&base));
        let uri = RestUri::with_resource(&base, &join(&resource)).unwrap();

        let path = uri.render_path();
        prop_assert!(path.starts_with('/'));
        prop_assert!(!path.contains("//"), "path {path} has doubled slashes");
    }

    #[test]
    fn rendered_url_starts_with_authority(
        host in "[a-z]{1,10}",
        port in 1024u16..65535,
        resource in segments(),
    ) {
        let base = format!("http://{host}.test:{port}");
        let uri = RestUri::with_resource(&base, &join(&resource)).unwrap();

        prop_assert_eq!(uri.authority(), format!("http://{host}.test:{port}"));
        prop_assert!(uri.render().starts_with(uri.authority()));
    }

    #[test]
    fn last_parameter_write_wins(
        first in "[a-zA-Z0-9]{1,10}",
        second in "[a-zA-Z0-9]{1,10}",
    ) {
        let uri = RestUri::with_resource("http://localhost/api", "items/{id}")
            .unwrap()
            .set_parameter("id", &first)
            .set_parameter("id", &second)
            .set_query("q", &first)
            .set_query("q", &second);

        prop_assert_eq!(uri.parameter("id"), Some(second.as_str()));
        prop_assert_eq!(uri.render_path(), format!("/api/items/{second}"));
        prop_assert_eq!(uri.render_query(), format!("q={second}"));
    }

    #[test]
    fn render_is_idempotent(
        resource in segments(),
        queries in prop::collection::vec(("[a-z]{1,6}", "\\PC{0,12}"), 0..6),
    ) {
        let mut uri = RestUri::with_resource("https://example.com/v1", &join(&resource)).unwrap();
        for (name, value) in &queries {
            uri = uri.set_query(name, value);
        }

        let first = uri.render();
        prop_assert_eq!(&first, &uri.render());
        prop_assert_eq!(first, uri.to_string());
    }

    #[test]
    fn query_values_survive_url_parsing(
        name in "[a-z]{1,8}",
        value in "\\PC{0,16}",
    ) {
        let uri = RestUri::with_resource("http://localhost/search", "")
            .unwrap()
            .set_query(&name, &value);

        let url = uri.to_url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        prop_assert_eq!(pairs, vec![(name, value)]);
    }

    #[test]
    fn template_values_stay_in_one_segment(value in "[a-zA-Z0-9 _@/?#%&-]{1,12}") {
        let uri = RestUri::with_resource("http://localhost/api", "files/{name}/meta")
            .unwrap()
            .set_parameter("name", &value);

        let url = uri.to_url().unwrap();
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        prop_assert_eq!(segments.len(), 4);
        prop_assert_eq!(percent_decode_str(segments[2]).decode_utf8_lossy(), value.as_str());
    }
}

#[test]
fn default_ports_are_elided() {
    let http = RestUri::with_resource("http://localhost:80/api", "x").unwrap();
    let https = RestUri::with_resource("https://localhost:443/api", "x").unwrap();
    let custom = RestUri::with_resource("https://localhost:8443/api", "x").unwrap();

    assert_eq!(http.render(), "http://localhost/api/x");
    assert_eq!(https.render(), "https://localhost/api/x");
    assert_eq!(custom.render(), "https://localhost:8443/api/x");
}
