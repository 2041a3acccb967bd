//! Deep-link interpreter vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use sociohub_core::deeplink::{interpret, DEFAULT_CANONICAL_HOST};

use vector_loader::LinkVector;

#[test]
fn deeplink_vectors() {
    let files = [
        "link_custom_scheme_success.json",
        "link_https_cancelled.json",
        "link_expo_dev_url.json",
        "link_empty.json",
        "link_missing_separator.json",
        "link_route_only_in_query.json",
        "link_percent_encoded.json",
    ];

    for f in files {
        let v: LinkVector = vector_loader::load(f);
        let link = interpret(&v.input, DEFAULT_CANONICAL_HOST);

        assert_eq!(link.route.as_str(), v.expect.route, "vector={}", v.description);
        assert_eq!(link.params, v.expect.params, "vector={}", v.description);
    }
}
