//! Derivation of section records from raw lines.
//!
//! Parsing happens in two passes. [`locate_sections`] finds the line bounds of every
//! section, deciding which comment lines belong to which header. [`index_section`] then
//! reads a single section's attributes and disabled state. Mutations reuse the second
//! pass to refresh just the section they touched.

use tracing::trace;

use crate::error::{Error, Result};
use crate::line::{self, KEY_ATTRIBUTE, LineKind, SectionKind};
use crate::section::{Attributes, Bounds, Section};
use crate::value::{AttributeValue, Scalar};

/// Sections of a parsed document.
#[derive(Debug, Default)]
pub(crate) struct Parsed {
    pub interface: Option<Section>,
    pub peers: Vec<Section>,
}

#[derive(Debug, Clone, Copy)]
struct Located {
    kind: SectionKind,
    bounds: Bounds,
    /// The header carries the disabled marker.
    marked: bool,
}

/// A run of consecutive comment lines not yet assigned to a section.
#[derive(Debug, Clone, Copy)]
struct CommentRun {
    start: usize,
    end: usize,
    /// Preceded by a blank line or the start of the file.
    detached: bool,
}

/// Parse every line into interface and peer records.
pub(crate) fn parse_lines(lines: &[String]) -> Result<Parsed> {
    let mut parsed = Parsed::default();

    for located in locate_sections(lines)? {
        let section = index_section(lines, 0, located.kind, located.bounds)?;
        let header = located.bounds.header;

        match located.kind {
            SectionKind::Interface => {
                if parsed.interface.is_some() {
                    return Err(Error::parse(header, "duplicate [Interface] section"));
                }
                if !parsed.peers.is_empty() {
                    return Err(Error::parse(
                        header,
                        "[Interface] must come before every [Peer]",
                    ));
                }
                parsed.interface = Some(section);
            },
            SectionKind::Peer => {
                if parsed.interface.is_none() {
                    return Err(Error::parse(header, "[Peer] before [Interface]"));
                }
                let key = section.public_key().unwrap_or_default();
                if parsed.peers.iter().any(|peer| peer.public_key() == Some(key)) {
                    return Err(Error::parse(header, format!("duplicate peer {key}")));
                }
                parsed.peers.push(section);
            },
        }
    }

    trace!(
        lines = lines.len(),
        peers = parsed.peers.len(),
        "parsed document"
    );
    Ok(parsed)
}

/// Find section bounds.
///
/// A run of comments directly above a header belongs to that header when a blank line or
/// the start of the file comes before the run. Otherwise the run trails the previous
/// section. Blank lines never extend a section. Inside a section with a marked header, a
/// marked assignment is a body line even though it looks like a comment.
fn locate_sections(lines: &[String]) -> Result<Vec<Located>> {
    let mut sections: Vec<Located> = Vec::new();
    let mut run: Option<CommentRun> = None;
    let mut after_blank = true;

    for (index, raw) in lines.iter().enumerate() {
        if line::is_blank(raw) {
            if let Some(pending) = run.take() {
                extend_last(&mut sections, pending.end);
            }
            after_blank = true;
            continue;
        }

        let header = line::header_kind(raw).map_err(|e| Error::parse(index, e.0))?;
        if let Some(kind) = header {
            let first = match run.take() {
                Some(pending) if pending.detached => pending.start,
                Some(pending) => {
                    extend_last(&mut sections, pending.end);
                    index
                },
                None => index,
            };
            sections.push(Located {
                kind,
                bounds: Bounds {
                    first,
                    header: index,
                    last: index,
                },
                marked: line::is_disabled(raw),
            });
            after_blank = false;
            continue;
        }

        let in_marked_section = sections.last().is_some_and(|current| current.marked);
        if raw.trim_start().starts_with('#') && !(in_marked_section && is_marked_assignment(raw))
        {
            match run.as_mut() {
                Some(pending) => pending.end = index,
                None => {
                    run = Some(CommentRun {
                        start: index,
                        end: index,
                        detached: after_blank,
                    });
                },
            }
            after_blank = false;
            continue;
        }

        let Some(current) = sections.last_mut() else {
            return Err(Error::parse(index, "attribute outside of any section"));
        };
        run = None;
        current.bounds.last = index;
        after_blank = false;
    }

    if let Some(pending) = run {
        extend_last(&mut sections, pending.end);
    }
    Ok(sections)
}

fn is_marked_assignment(raw: &str) -> bool {
    line::marker_end(raw).is_some_and(|offset| {
        matches!(line::classify(raw, offset), Ok(LineKind::Assignment(_)))
    })
}

fn extend_last(sections: &mut [Located], end: usize) {
    if let Some(current) = sections.last_mut() {
        current.bounds.last = end;
    }
}

/// Build the record for one section.
///
/// `window` is a slice of lines whose first element sits at absolute line `base`; `bounds`
/// are relative to `window`. Errors report absolute line numbers. The returned section
/// carries `bounds` unchanged.
///
/// A section is disabled when its header is marked and every other non-blank line is
/// either marked or a plain comment; comments left unmarked around a disabled body do not
/// switch it back on.
pub(crate) fn index_section(
    window: &[String],
    base: usize,
    kind: SectionKind,
    bounds: Bounds,
) -> Result<Section> {
    let disabled = line::is_disabled(&window[bounds.header])
        && window[bounds.header + 1..=bounds.last]
            .iter()
            .all(|raw| line::is_blank(raw) || raw.trim_start().starts_with('#'));

    let mut folded: Vec<(String, Vec<Scalar>)> = Vec::new();
    for (index, raw) in window
        .iter()
        .enumerate()
        .take(bounds.last + 1)
        .skip(bounds.header + 1)
    {
        let offset = body_offset(raw, disabled);
        let kind = line::classify(raw, offset).map_err(|e| Error::parse(base + index, e.0))?;
        match kind {
            LineKind::Blank | LineKind::Comment => {},
            LineKind::Header(_) => {
                return Err(Error::parse(base + index, "unexpected section header"));
            },
            LineKind::Assignment(assignment) => {
                let values = assignment.values();
                match folded.iter_mut().find(|(key, _)| key == assignment.key()) {
                    Some((_, existing)) => existing.extend(values),
                    None => folded.push((assignment.key().to_string(), values)),
                }
            },
        }
    }

    let attributes = Attributes::from_folded(folded);
    let public_key = match kind {
        SectionKind::Interface => None,
        SectionKind::Peer => match attributes.get(KEY_ATTRIBUTE) {
            Some(AttributeValue::Scalar(key)) => Some(key.to_string()),
            Some(AttributeValue::List(_)) => {
                return Err(Error::parse(
                    base + bounds.header,
                    "peer has more than one PublicKey",
                ));
            },
            None => {
                return Err(Error::parse(
                    base + bounds.header,
                    "peer without PublicKey",
                ));
            },
        },
    };

    Ok(Section::new(kind, public_key, attributes, disabled, bounds))
}

/// Byte offset where the effective text of a section line starts.
pub(crate) fn body_offset(raw: &str, disabled: bool) -> usize {
    if disabled {
        line::marker_end(raw).unwrap_or(0)
    } else {
        0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn bounds(section: &Section) -> (usize, usize, usize) {
        (
            section.first_line(),
            section.header_line(),
            section.last_line(),
        )
    }

    #[test]
    fn comment_after_blank_attaches_to_next_header() {
        let doc = lines("[Interface]\nPrivateKey = x\n\n# Peer 1\n[Peer]\nPublicKey = a\n");
        let parsed = parse_lines(&doc).unwrap();

        assert_eq!(bounds(parsed.interface.as_ref().unwrap()), (0, 0, 1));
        assert_eq!(bounds(&parsed.peers[0]), (3, 4, 5));
    }

    #[test]
    fn comment_without_blank_trails_previous_section() {
        let doc = lines("[Interface]\nPrivateKey = x\n# trailing\n[Peer]\nPublicKey = a\n");
        let parsed = parse_lines(&doc).unwrap();

        assert_eq!(bounds(parsed.interface.as_ref().unwrap()), (0, 0, 2));
        assert_eq!(bounds(&parsed.peers[0]), (3, 3, 4));
    }

    #[test]
    fn comment_followed_by_blank_trails_previous_section() {
        let doc = lines("[Interface]\nPrivateKey = x\n\n# note\n\n[Peer]\nPublicKey = a\n");
        let parsed = parse_lines(&doc).unwrap();

        assert_eq!(bounds(parsed.interface.as_ref().unwrap()), (0, 0, 3));
        assert_eq!(bounds(&parsed.peers[0]), (5, 5, 6));
    }

    #[test]
    fn preamble_attaches_to_interface() {
        let doc = lines("# generated\n[Interface]\nListenPort = 1\n");
        let parsed = parse_lines(&doc).unwrap();

        assert_eq!(bounds(parsed.interface.as_ref().unwrap()), (0, 1, 2));
    }

    #[test]
    fn repeated_keys_fold_in_order() {
        let doc = lines("[Interface]\nAddress = a/32, b/32\nDNS = 1.1.1.1\nAddress = c/32\n");
        let parsed = parse_lines(&doc).unwrap();
        let interface = parsed.interface.unwrap();

        assert_eq!(
            interface.get("Address").unwrap().values(),
            &[
                Scalar::from("a/32"),
                Scalar::from("b/32"),
                Scalar::from("c/32")
            ]
        );
        assert_eq!(
            interface.attributes().keys().collect::<Vec<_>>(),
            vec!["Address", "DNS"]
        );
    }

    #[test]
    fn disabled_peer_is_read_through_markers() {
        let doc = lines("[Interface]\n\n#![Peer]\n#!PublicKey = k\n#!AllowedIPs = a/32\n");
        let parsed = parse_lines(&doc).unwrap();
        let peer = &parsed.peers[0];

        assert!(peer.is_disabled());
        assert_eq!(peer.public_key(), Some("k"));
        assert_eq!(peer.get("AllowedIPs").unwrap().to_string(), "a/32");
    }

    #[test]
    fn spaced_markers_are_read_like_compact_ones() {
        let doc = lines("[Interface]\n\n#! # old phone\n#! [Peer]\n#! PublicKey = k\n#! AllowedIPs = a/32\n");
        let parsed = parse_lines(&doc).unwrap();
        let peer = &parsed.peers[0];

        assert!(peer.is_disabled());
        assert_eq!(peer.public_key(), Some("k"));
        assert_eq!(bounds(peer), (2, 3, 5));
    }

    #[test]
    fn plain_comment_after_disabled_peer_keeps_it_disabled() {
        let doc = lines("[Interface]\nListenPort = 1\n\n#![Peer]\n#!PublicKey = k\n# end of file\n");
        let parsed = parse_lines(&doc).unwrap();
        let peer = &parsed.peers[0];

        assert!(peer.is_disabled());
        assert_eq!(peer.public_key(), Some("k"));
        assert_eq!(bounds(peer), (3, 3, 5));
    }

    #[test]
    fn plain_comment_between_disabled_and_enabled_peer() {
        let doc = lines("[Interface]\n\n#![Peer]\n#!PublicKey = k\n# next one\n[Peer]\nPublicKey = j\n");
        let parsed = parse_lines(&doc).unwrap();

        assert!(parsed.peers[0].is_disabled());
        assert_eq!(bounds(&parsed.peers[0]), (2, 2, 4));
        assert!(!parsed.peers[1].is_disabled());
        assert_eq!(parsed.peers[1].public_key(), Some("j"));
    }

    #[test]
    fn marked_lines_after_blank_stay_in_disabled_peer() {
        let doc = lines(
            "[Interface]\n\n#! [Peer]\n#! PublicKey = a\n\n#! AllowedIPs = x/32\n\n#! # for b\n#! [Peer]\n#! PublicKey = b\n",
        );
        let parsed = parse_lines(&doc).unwrap();

        assert_eq!(bounds(&parsed.peers[0]), (2, 2, 5));
        assert_eq!(parsed.peers[0].get("AllowedIPs").unwrap().to_string(), "x/32");
        assert_eq!(bounds(&parsed.peers[1]), (7, 8, 9));
        assert!(parsed.peers.iter().all(Section::is_disabled));
    }

    #[test]
    fn commented_line_in_enabled_peer_is_ignored() {
        let doc = lines("[Interface]\n[Peer]\nPublicKey = k\n#!AllowedIPs = a/32\n");
        let parsed = parse_lines(&doc).unwrap();
        let peer = &parsed.peers[0];

        assert!(!peer.is_disabled());
        assert!(peer.get("AllowedIPs").is_none());
        assert_eq!(peer.last_line(), 3);
    }

    #[test]
    fn structural_errors_report_lines() {
        let cases = [
            ("[Peer]\nPublicKey = k\n", 1),
            ("[Interface]\n[Interface]\n", 2),
            ("[Interface]\n[Peer]\nPublicKey = k\n[Peer]\nPublicKey = k\n", 4),
            ("[Interface]\n[Peer]\nAllowedIPs = a\n", 2),
            ("Key = 1\n[Interface]\n", 1),
            ("[Interface]\nnot an assignment\n", 2),
            ("[Interface]\n[Peer]\nPublicKey = a, b\n", 2),
        ];

        for (text, expected) in cases {
            match parse_lines(&lines(text)) {
                Err(Error::Parse { line, .. }) => assert_eq!(line, expected, "{text:?}"),
                other => unreachable!("expected parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_document_has_no_sections() {
        let parsed = parse_lines(&lines("\n# only comments\n")).unwrap();
        assert!(parsed.interface.is_none());
        assert!(parsed.peers.is_empty());
    }
}
