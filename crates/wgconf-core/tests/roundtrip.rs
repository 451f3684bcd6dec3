#![allow(missing_docs, clippy::unwrap_used)]
//! Property tests: serialization is byte exact and edits keep records in sync with text.

use proptest::prelude::*;
use wgconf_core::{Document, Scalar};

/// A line that may appear inside a section body.
fn body_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "# [a-z ]{0,12}",
        "#![a-z ]{0,12}",
        ("[A-Z][a-zA-Z]{0,8}", "[a-z0-9:/.]{1,10}", 0usize..3).prop_map(|(k, v, extra)| {
            let mut line = format!("{k} = {v}");
            for i in 0..extra {
                line.push_str(&format!(",{v}{i}"));
            }
            line
        }),
        ("[A-Z][a-zA-Z]{0,8}", 0u32..70_000).prop_map(|(k, n)| format!("{k}={n}")),
    ]
}

/// Body lines that never define `PublicKey` (peer keys are added separately) or `Extra`
/// (reserved for edits).
fn body() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(body_line(), 0..6).prop_map(|lines| {
        lines
            .into_iter()
            .filter(|l| !l.starts_with("PublicKey") && !l.starts_with("Extra"))
            .collect()
    })
}

/// How one generated peer is written.
#[derive(Debug, Clone)]
struct PeerShape {
    body: Vec<String>,
    disabled: bool,
    leading_comment: bool,
    spaced_marker: bool,
    trailing_comment: bool,
}

fn peer_shape() -> impl Strategy<Value = PeerShape> {
    (body(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(body, disabled, leading_comment, spaced_marker, trailing_comment)| PeerShape {
            body,
            disabled,
            leading_comment,
            spaced_marker,
            trailing_comment,
        },
    )
}

/// A whole document: interface body plus peers with unique keys.
///
/// Disabled peers use either `#!` or `#! ` and may be followed by an unmarked comment
/// with no blank line in between.
fn document_text() -> impl Strategy<Value = String> {
    (
        body(),
        prop::collection::vec(peer_shape(), 0..4),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(interface, peers, crlf, trailing)| {
            let mut lines = vec!["[Interface]".to_string()];
            lines.extend(interface);
            for (i, peer) in peers.into_iter().enumerate() {
                lines.push(String::new());
                if peer.leading_comment {
                    lines.push(format!("# peer {i}"));
                }
                let mut section = vec!["[Peer]".to_string(), format!("PublicKey = key{i}=")];
                section.extend(peer.body);
                if peer.disabled {
                    let marker = if peer.spaced_marker { "#! " } else { "#!" };
                    section = section
                        .into_iter()
                        .map(|l| if l.trim().is_empty() { l } else { format!("{marker}{l}") })
                        .collect();
                }
                lines.extend(section);
                if peer.trailing_comment {
                    lines.push(format!("# after {i}"));
                }
            }
            let ending = if crlf { "\r\n" } else { "\n" };
            let mut text = lines.join(ending);
            if trailing {
                text.push_str(ending);
            }
            text
        })
}

proptest! {
    #[test]
    fn serialization_reproduces_input(text in document_text()) {
        let doc = Document::parse(&text).unwrap();
        prop_assert_eq!(doc.to_text(), text);
    }

    #[test]
    fn generated_peers_keep_their_state(text in document_text()) {
        let doc = Document::parse(&text).unwrap();
        for peer in doc.peers() {
            let header = &doc.lines()[peer.header_line()];
            prop_assert_eq!(peer.is_disabled(), header.starts_with("#!"));
        }
    }

    #[test]
    fn toggling_every_peer_round_trips(text in document_text()) {
        let mut doc = Document::parse(&text).unwrap();
        let keys: Vec<String> = doc.peer_keys().into_iter().map(str::to_string).collect();
        let states: Vec<bool> = doc.peers().iter().map(|p| p.is_disabled()).collect();

        for key in &keys {
            doc.disable_peer(key).unwrap();
            prop_assert!(!doc.is_peer_enabled(key).unwrap());
        }
        prop_assert_eq!(&Document::parse(&doc.to_text()).unwrap(), &doc);

        for (key, disabled) in keys.iter().zip(states) {
            if !disabled {
                doc.enable_peer(key).unwrap();
            }
        }
        prop_assert_eq!(doc.to_text(), text);
    }

    #[test]
    fn added_values_fold_in_order(
        text in document_text(),
        values in prop::collection::vec("[a-z0-9:/.]{1,10}", 1..5),
        as_lines in any::<bool>(),
    ) {
        let mut doc = Document::parse(&text).unwrap();
        let target = doc.peer_keys().first().map(|k| (*k).to_string());

        for value in &values {
            doc.add_attribute(target.as_deref(), "Extra", value.as_str(), None, as_lines)
                .unwrap();
        }

        let section = match target.as_deref() {
            Some(key) => doc.peer(key).unwrap(),
            None => doc.interface().unwrap(),
        };
        let stored = section.get("Extra").unwrap();
        let expected: Vec<Scalar> = values.iter().map(|v| Scalar::parse(v)).collect();
        prop_assert_eq!(stored.values(), expected.as_slice());
        prop_assert_eq!(&Document::parse(&doc.to_text()).unwrap(), &doc);

        for value in &expected {
            doc.delete_attribute(target.as_deref(), "Extra", Some(value), false).unwrap();
        }
        prop_assert_eq!(doc.to_text(), text);
    }

    #[test]
    fn peers_added_and_removed_leave_no_trace(text in document_text(), count in 1usize..4) {
        let mut doc = Document::parse(&text).unwrap();
        let keys: Vec<String> = (0..count).map(|i| format!("new{i}=")).collect();

        for key in &keys {
            doc.add_peer(key, Some("added")).unwrap();
        }
        prop_assert_eq!(&Document::parse(&doc.to_text()).unwrap(), &doc);

        for key in keys.iter().rev() {
            doc.delete_peer(key).unwrap();
        }
        prop_assert_eq!(doc.to_text(), text);
    }
}
