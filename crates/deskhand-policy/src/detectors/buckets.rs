// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

use deskhand_core::entities::AttentionBucket;

/// `bucket -> author -> [link]`, kept in a stable order for rendering.
#[derive(Debug, Default)]
pub struct Buckets {
    inner: BTreeMap<AttentionBucket, BTreeMap<String, Vec<String>>>,
}

impl Buckets {
    pub fn push(&mut self, bucket: AttentionBucket, author: String, link: String) {
        self.inner
            .entry(bucket)
            .or_default()
            .entry(author)
            .or_default()
            .push(link);
    }

    pub fn get(&self, bucket: AttentionBucket) -> Option<&BTreeMap<String, Vec<String>>> {
        self.inner.get(&bucket)
    }

    /// Non-empty buckets in `first, second, third` order.
    pub fn iter(&self) -> impl Iterator<Item = (AttentionBucket, &BTreeMap<String, Vec<String>>)> {
        self.inner.iter().map(|(b, m)| (*b, m))
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Renders one bucket as `header` followed by one block per author.
    pub fn render(header: &str, authors: &BTreeMap<String, Vec<String>>) -> String {
        let mut text = String::from(header);
        for (author, links) in authors {
            text.push_str(&format!("\n{author}:"));
            for link in links {
                text.push_str(&format!("\n  • {link}"));
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_authors_in_order() {
        let mut buckets = Buckets::default();
        assert!(buckets.is_empty());
        buckets.push(AttentionBucket::Second, "<@B>".into(), "<u2|two>".into());
        buckets.push(AttentionBucket::Second, "<@A>".into(), "<u1|one>".into());
        buckets.push(AttentionBucket::Second, "<@A>".into(), "<u3|three>".into());

        assert!(buckets.get(AttentionBucket::First).is_none());
        let second = buckets.get(AttentionBucket::Second).unwrap();
        assert_eq!(
            Buckets::render("Header:", second),
            "Header:\n<@A>:\n  • <u1|one>\n  • <u3|three>\n<@B>:\n  • <u2|two>"
        );
    }

    #[test]
    fn iterates_in_severity_order() {
        let mut buckets = Buckets::default();
        buckets.push(AttentionBucket::Third, "a".into(), "x".into());
        buckets.push(AttentionBucket::First, "a".into(), "y".into());
        let order: Vec<AttentionBucket> = buckets.iter().map(|(b, _)| b).collect();
        assert_eq!(order, vec![AttentionBucket::First, AttentionBucket::Third]);
    }
}
