//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use sepa_initiation::types;

/// Install a test subscriber once, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Today plus `days`
pub fn in_days(days: u64) -> NaiveDate {
    types::today() + Days::new(days)
}

/// Rendered document, queried by slash separated element paths
///
/// Paths start below `Document`, segments may carry a 1-based index:
/// `CstmrDrctDbtInitn/PmtInf[2]/CtrlSum`.
pub struct Xml<'i> {
    doc: roxmltree::Document<'i>,
}

impl<'i> Xml<'i> {
    pub fn parse(xml: &'i str) -> Self {
        let doc = roxmltree::Document::parse(xml).expect("rendered document is well-formed XML");
        assert_eq!(doc.root_element().tag_name().name(), "Document");
        Self { doc }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.doc.root_element().tag_name().namespace()
    }

    fn find(&self, path: &str) -> Option<roxmltree::Node<'_, 'i>> {
        let mut node = self.doc.root_element();
        for segment in path.split('/') {
            let (name, index) = match segment.split_once('[') {
                Some((name, rest)) => (name, rest.trim_end_matches(']').parse::<usize>().ok()?),
                None => (segment, 1),
            };
            node = node
                .children()
                .filter(|n| n.tag_name().name() == name)
                .nth(index - 1)?;
        }
        Some(node)
    }

    /// `true` when the element exists
    pub fn has(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Text of the element, panics when missing
    pub fn text(&self, path: &str) -> String {
        self.find(path)
            .unwrap_or_else(|| panic!("missing element {}", path))
            .text()
            .unwrap_or_default()
            .to_string()
    }

    /// Attribute of the element
    pub fn attribute(&self, path: &str, name: &str) -> Option<String> {
        self.find(path)
            .and_then(|n| n.attribute(name))
            .map(str::to_string)
    }

    /// Number of elements matching the last segment under the parent path
    pub fn count(&self, parent: &str, name: &str) -> usize {
        self.find(parent)
            .map(|p| p.children().filter(|n| n.tag_name().name() == name).count())
            .unwrap_or(0)
    }
}
