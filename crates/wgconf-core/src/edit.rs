//! Mutations on [`Document`].
//!
//! Every edit is expressed as one splice of the line store. The touched section is
//! re-indexed from its new lines and every later section is shifted, so the records never
//! drift from the text. Inputs are validated before anything changes; an edit that fails
//! leaves the document as it was.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::document::{Document, Target};
use crate::error::{Error, Result};
use crate::line::{self, Assignment, KEY_ATTRIBUTE, LineKind, SectionKind};
use crate::parser::{self, body_offset};
use crate::section::{Bounds, Section};
use crate::value::Scalar;

impl Document {
    /// Discard all content and start over with a bare `[Interface]` header, optionally
    /// preceded by a comment line.
    #[instrument(level = "debug", skip(self))]
    pub fn initialize(&mut self, leading_comment: Option<&str>) -> Result<()> {
        if let Some(comment) = leading_comment {
            validate_comment(comment)?;
        }

        let mut lines = Vec::with_capacity(2);
        if let Some(comment) = leading_comment {
            lines.push(line::comment_line(comment));
        }
        let header = lines.len();
        lines.push(SectionKind::Interface.header().to_string());

        let bounds = Bounds {
            first: 0,
            header,
            last: header,
        };
        let interface = parser::index_section(&lines, 0, SectionKind::Interface, bounds)?;
        self.reset(lines, interface);
        Ok(())
    }

    /// Add a value to an attribute of the interface (`peer == None`) or of a peer.
    ///
    /// When the attribute already exists and `append_as_line` is false, the value is
    /// appended to the last line defining it (`Key = a, b`). Otherwise a new
    /// `Key = value` line is added at the end of the section. An optional comment line is
    /// placed directly above the edited or added line. Lines added to a disabled section
    /// carry the disabled marker.
    #[instrument(level = "debug", skip(self, value), fields(value = tracing::field::Empty))]
    pub fn add_attribute(
        &mut self,
        peer: Option<&str>,
        name: &str,
        value: impl Into<Scalar>,
        leading_comment: Option<&str>,
        append_as_line: bool,
    ) -> Result<()> {
        let value = value.into();
        tracing::Span::current().record("value", tracing::field::display(&value));
        validate_name(name)?;
        validate_value(&value)?;
        if let Some(comment) = leading_comment {
            validate_comment(comment)?;
        }

        let target = self.resolve(peer)?;
        reject_key_edit(target, name)?;

        let section = self.section(target)?;
        let bounds = section.bounds();
        let disabled = section.is_disabled();
        let extend = !append_as_line && section.attributes().contains_key(name);

        let existing = if extend {
            self.assignments(bounds, disabled, name)
                .last()
                .map(|(index, assignment)| (*index, assignment.with_appended(&value)))
        } else {
            None
        };

        let mut replacement = Vec::with_capacity(2);
        if let Some(comment) = leading_comment {
            replacement.push(mark(line::comment_line(comment), disabled));
        }

        let range = if let Some((index, updated)) = existing {
            replacement.push(updated);
            index..index + 1
        } else {
            replacement.push(mark(line::assignment_line(name, &value), disabled));
            bounds.last + 1..bounds.last + 1
        };

        debug!(line = range.start, extend, "adding attribute");
        self.rewrite_section(target, range, replacement)
    }

    /// Remove an attribute, or a single value of it, from the interface or a peer.
    ///
    /// Without `value` every line defining the attribute is removed. With `value` only the
    /// first matching token is removed; the line goes away when it held nothing else.
    /// `remove_leading_comments` also removes the comment lines directly above each removed
    /// line. Removing an attribute or value that does not exist changes nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_attribute(
        &mut self,
        peer: Option<&str>,
        name: &str,
        value: Option<&Scalar>,
        remove_leading_comments: bool,
    ) -> Result<()> {
        let target = self.resolve(peer)?;
        reject_key_edit(target, name)?;

        let section = self.section(target)?;
        if !section.attributes().contains_key(name) {
            debug!("attribute not present, nothing to delete");
            return Ok(());
        }
        let bounds = section.bounds();
        let disabled = section.is_disabled();

        let mut dropped = BTreeSet::new();
        let mut rewritten: Option<(usize, String)> = None;
        {
            let defining = self.assignments(bounds, disabled, name);
            match value {
                None => dropped.extend(defining.iter().map(|(index, _)| *index)),
                Some(value) => {
                    let Some((index, assignment, token)) = defining
                        .iter()
                        .find_map(|(index, a)| a.position(value).map(|token| (*index, a, token)))
                    else {
                        debug!("value not present, nothing to delete");
                        return Ok(());
                    };
                    match assignment.without_token(token) {
                        Some(updated) => rewritten = Some((index, updated)),
                        None => {
                            dropped.insert(index);
                        },
                    }
                },
            }
        }

        if remove_leading_comments {
            let removed: Vec<usize> = dropped.iter().copied().collect();
            for index in removed {
                self.collect_comments_above(index, bounds.header, disabled, &mut dropped);
            }
        }

        let replacement: Vec<String> = (bounds.first..=bounds.last)
            .filter(|index| !dropped.contains(index))
            .map(|index| match &rewritten {
                Some((at, updated)) if *at == index => updated.clone(),
                _ => self.lines[index].clone(),
            })
            .collect();

        debug!(
            removed_lines = dropped.len(),
            rewritten = rewritten.is_some(),
            "deleting attribute"
        );
        self.rewrite_section(target, bounds.first..bounds.last + 1, replacement)
    }

    /// Append a new `[Peer]` section after the last section.
    ///
    /// The block is separated by one blank line and may start with a comment line.
    #[instrument(level = "debug", skip(self))]
    pub fn add_peer(&mut self, public_key: &str, leading_comment: Option<&str>) -> Result<()> {
        validate_key(public_key)?;
        if let Some(comment) = leading_comment {
            validate_comment(comment)?;
        }
        if self.contains_peer(public_key) {
            return Err(Error::DuplicatePeer(public_key.to_string()));
        }
        let Some(anchor) = self.last_section().map(Section::last_line) else {
            return Err(Error::NotFound("[Interface] section".to_string()));
        };

        let mut block = vec![String::new()];
        if let Some(comment) = leading_comment {
            block.push(line::comment_line(comment));
        }
        let header = block.len();
        block.push(SectionKind::Peer.header().to_string());
        block.push(line::assignment_line(KEY_ATTRIBUTE, &Scalar::from(public_key)));

        let insert_at = anchor + 1;
        let bounds = Bounds {
            first: 1,
            header,
            last: block.len() - 1,
        };
        let mut peer = parser::index_section(&block, insert_at, SectionKind::Peer, bounds)?;
        peer.relocate(0, insert_at);

        debug!(line = insert_at, "adding peer");
        self.splice(insert_at..insert_at, block);
        self.peers.push(peer);
        Ok(())
    }

    /// Remove a peer section, its attached comments and the blank lines separating it from
    /// the previous section.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_peer(&mut self, public_key: &str) -> Result<()> {
        let index = self
            .find_peer(public_key)
            .ok_or_else(|| Error::NotFound(format!("peer {public_key}")))?;

        let previous = if index == 0 {
            self.interface.as_ref()
        } else {
            self.peers.get(index - 1)
        };
        let start = previous.map_or(self.peers[index].first_line(), |section| {
            section.last_line() + 1
        });

        let removed = self.peers.remove(index);
        debug!(
            first = start,
            last = removed.last_line(),
            "deleting peer"
        );
        self.splice(start..removed.last_line() + 1, Vec::new());
        Ok(())
    }

    /// Enable a disabled peer by removing one disabled marker from each of its lines.
    ///
    /// Enabling an enabled peer changes nothing.
    pub fn enable_peer(&mut self, public_key: &str) -> Result<()> {
        self.set_peer_disabled(public_key, false)
    }

    /// Disable a peer by prefixing each non-blank line of it with the disabled marker.
    ///
    /// Disabling a disabled peer changes nothing.
    pub fn disable_peer(&mut self, public_key: &str) -> Result<()> {
        self.set_peer_disabled(public_key, true)
    }

    #[instrument(level = "debug", skip(self))]
    fn set_peer_disabled(&mut self, public_key: &str, disabled: bool) -> Result<()> {
        let target = self.resolve(Some(public_key))?;
        let section = self.section(target)?;
        if section.is_disabled() == disabled {
            debug!("peer already in requested state");
            return Ok(());
        }

        let bounds = section.bounds();
        let replacement: Vec<String> = self.lines[bounds.first..=bounds.last]
            .iter()
            .map(|raw| {
                if disabled {
                    line::disable(raw)
                } else {
                    line::enable(raw)
                }
            })
            .collect();

        self.rewrite_section(target, bounds.first..bounds.last + 1, replacement)
    }

    /// Assignments of `name` inside a section body, in document order.
    fn assignments(
        &self,
        bounds: Bounds,
        disabled: bool,
        name: &str,
    ) -> Vec<(usize, Assignment<'_>)> {
        (bounds.header + 1..=bounds.last)
            .filter_map(|index| {
                let raw = &self.lines[index];
                match line::classify(raw, body_offset(raw, disabled)) {
                    Ok(LineKind::Assignment(assignment)) if assignment.key() == name => {
                        Some((index, assignment))
                    },
                    _ => None,
                }
            })
            .collect()
    }

    /// Add the unbroken run of comment lines directly above `index` to `dropped`.
    fn collect_comments_above(
        &self,
        index: usize,
        header: usize,
        disabled: bool,
        dropped: &mut BTreeSet<usize>,
    ) {
        let mut above = index;
        while above > header + 1 {
            above -= 1;
            let raw = &self.lines[above];
            if dropped.contains(&above) {
                continue;
            }
            match line::classify(raw, body_offset(raw, disabled)) {
                Ok(LineKind::Comment) => {
                    dropped.insert(above);
                },
                _ => break,
            }
        }
    }
}

fn reject_key_edit(target: Target, name: &str) -> Result<()> {
    if matches!(target, Target::Peer(_)) && name == KEY_ATTRIBUTE {
        return Err(Error::InvalidOperation(format!(
            "{KEY_ATTRIBUTE} identifies the peer; add or delete the peer instead"
        )));
    }
    Ok(())
}

fn mark(raw: String, disabled: bool) -> String {
    if disabled { line::disable(&raw) } else { raw }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.trim() == name
        && !name.starts_with('[')
        && !name.contains(['=', '#', ',', '\n', '\r']);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid attribute name {name:?}")))
    }
}

fn validate_value(value: &Scalar) -> Result<()> {
    match value {
        Scalar::Text(text) if text.contains(['#', '\n', '\r']) => Err(Error::InvalidInput(
            format!("value {text:?} cannot be written on one line"),
        )),
        _ => Ok(()),
    }
}

fn validate_comment(comment: &str) -> Result<()> {
    if comment.contains(['\n', '\r']) {
        return Err(Error::InvalidInput(format!(
            "comment {comment:?} spans several lines"
        )));
    }
    Ok(())
}

fn validate_key(public_key: &str) -> Result<()> {
    let valid = !public_key.is_empty()
        && !public_key.contains(|c: char| c.is_whitespace() || c == '#' || c == ',');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid public key {public_key:?}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::value::AttributeValue;

    const BASE: &str = "\
[Interface]
PrivateKey = priv
# port
ListenPort = 51820
Address = fe80::1/64

# laptop
[Peer]
PublicKey = a
AllowedIPs = 10.0.0.2/32
";

    fn doc() -> Document {
        Document::parse(BASE).unwrap()
    }

    fn assert_consistent(doc: &Document) {
        let reparsed = Document::parse(&doc.to_text()).unwrap();
        assert_eq!(&reparsed, doc);
    }

    #[test]
    fn appends_to_existing_line() {
        let mut doc = doc();
        doc.add_attribute(None, "Address", "fe80::2/64", None, false)
            .unwrap();

        assert_eq!(doc.lines()[4], "Address = fe80::1/64, fe80::2/64");
        assert_eq!(
            doc.interface().unwrap().get("Address").unwrap().values().len(),
            2
        );
        assert_consistent(&doc);
    }

    #[test]
    fn adds_new_line_at_section_end() {
        let mut doc = doc();
        doc.add_attribute(None, "DNS", "1.1.1.1", Some("resolver"), false)
            .unwrap();

        assert_eq!(doc.lines()[5], "# resolver");
        assert_eq!(doc.lines()[6], "DNS = 1.1.1.1");
        assert_eq!(doc.peer("a").unwrap().first_line(), 8);
        assert_consistent(&doc);
    }

    #[test]
    fn append_as_line_repeats_the_key() {
        let mut doc = doc();
        doc.add_attribute(Some("a"), "AllowedIPs", "10.0.0.3/32", None, true)
            .unwrap();

        assert_eq!(doc.lines().last().unwrap(), "AllowedIPs = 10.0.0.3/32");
        assert!(doc.peer("a").unwrap().get("AllowedIPs").unwrap().is_list());
        assert_consistent(&doc);
    }

    #[test]
    fn numeric_values_are_written_plainly() {
        let mut doc = doc();
        doc.add_attribute(Some("a"), "PersistentKeepalive", 25_u16, None, false)
            .unwrap();

        assert_eq!(doc.lines().last().unwrap(), "PersistentKeepalive = 25");
        assert_eq!(
            doc.peer("a").unwrap().get("PersistentKeepalive"),
            Some(&AttributeValue::Scalar(Scalar::Number(25)))
        );
    }

    #[test]
    fn deletes_attribute_with_its_comment() {
        let mut doc = doc();
        doc.delete_attribute(None, "ListenPort", None, true).unwrap();

        assert_eq!(
            doc.lines()[..3],
            ["[Interface]", "PrivateKey = priv", "Address = fe80::1/64"]
        );
        assert_consistent(&doc);
    }

    #[test]
    fn deletes_attribute_but_keeps_comment() {
        let mut doc = doc();
        doc.delete_attribute(None, "ListenPort", None, false).unwrap();

        assert_eq!(doc.lines()[2], "# port");
        assert!(doc.interface().unwrap().get("ListenPort").is_none());
        assert_consistent(&doc);
    }

    #[test]
    fn deletes_single_value() {
        let mut doc = doc();
        doc.add_attribute(None, "Address", "fe80::2/64", None, false)
            .unwrap();
        doc.delete_attribute(None, "Address", Some(&Scalar::from("fe80::1/64")), false)
            .unwrap();

        assert_eq!(doc.lines()[4], "Address = fe80::2/64");
        assert_eq!(
            doc.interface().unwrap().get("Address"),
            Some(&AttributeValue::Scalar(Scalar::from("fe80::2/64")))
        );
    }

    #[test]
    fn deleting_missing_things_is_a_no_op() {
        let mut doc = doc();
        let before = doc.clone();

        doc.delete_attribute(None, "MTU", None, true).unwrap();
        doc.delete_attribute(None, "Address", Some(&Scalar::from("nope")), true)
            .unwrap();

        assert_eq!(doc, before);
    }

    #[test]
    fn public_key_is_not_an_attribute_edit() {
        let mut doc = doc();
        assert!(matches!(
            doc.add_attribute(Some("a"), KEY_ATTRIBUTE, "b", None, false),
            Err(Error::InvalidOperation(_))
        ));
        assert!(matches!(
            doc.delete_attribute(Some("a"), KEY_ATTRIBUTE, None, false),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn rejects_unwritable_input() {
        let mut doc = doc();
        let before = doc.clone();

        assert!(doc.add_attribute(None, "Bad=Name", "x", None, false).is_err());
        assert!(doc.add_attribute(None, "DNS", "x # y", None, false).is_err());
        assert!(doc.add_attribute(None, "DNS", "x", Some("a\nb"), false).is_err());
        assert!(doc.add_peer("", None).is_err());
        assert!(doc.add_peer("has space", None).is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn unknown_peer_is_not_found() {
        let mut doc = doc();
        assert!(matches!(
            doc.add_attribute(Some("zzz"), "DNS", "x", None, false),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(doc.delete_peer("zzz"), Err(Error::NotFound(_))));
        assert!(matches!(doc.enable_peer("zzz"), Err(Error::NotFound(_))));
    }

    #[test]
    fn add_then_delete_peer_restores_text() {
        let mut doc = doc();
        doc.add_peer("b", Some("phone")).unwrap();

        assert_eq!(
            doc.lines()[10..],
            ["", "# phone", "[Peer]", "PublicKey = b"]
        );
        assert_eq!(doc.peer("b").unwrap().first_line(), 11);
        assert_consistent(&doc);

        doc.delete_peer("b").unwrap();
        assert_eq!(doc.to_text(), BASE);
    }

    #[test]
    fn duplicate_peer_is_rejected() {
        let mut doc = doc();
        assert!(matches!(doc.add_peer("a", None), Err(Error::DuplicatePeer(_))));
    }

    #[test]
    fn deleting_middle_peer_shifts_later_ones() {
        let mut doc = doc();
        doc.add_peer("b", None).unwrap();
        doc.add_peer("c", None).unwrap();
        doc.delete_peer("b").unwrap();

        assert_eq!(doc.peer_keys(), vec!["a", "c"]);
        assert_eq!(doc.peer("c").unwrap().header_line(), 11);
        assert_consistent(&doc);
    }

    #[test]
    fn disable_then_enable_round_trips() {
        let mut doc = doc();
        doc.disable_peer("a").unwrap();

        assert_eq!(
            doc.lines()[6..],
            [
                "#! # laptop",
                "#! [Peer]",
                "#! PublicKey = a",
                "#! AllowedIPs = 10.0.0.2/32"
            ]
        );
        assert!(!doc.is_peer_enabled("a").unwrap());
        assert_consistent(&doc);

        let disabled = doc.clone();
        doc.disable_peer("a").unwrap();
        assert_eq!(doc, disabled);

        doc.enable_peer("a").unwrap();
        assert_eq!(doc.to_text(), BASE);
    }

    #[test]
    fn enable_strips_either_marker_form() {
        for marked in [
            "[Interface]\nListenPort = 1\n\n#! [Peer]\n#! PublicKey = k\n#! AllowedIPs = a/32\n",
            "[Interface]\nListenPort = 1\n\n#![Peer]\n#!PublicKey = k\n#!AllowedIPs = a/32\n",
        ] {
            let mut doc = Document::parse(marked).unwrap();
            doc.enable_peer("k").unwrap();

            assert_eq!(
                doc.to_text(),
                "[Interface]\nListenPort = 1\n\n[Peer]\nPublicKey = k\nAllowedIPs = a/32\n"
            );
            assert_consistent(&doc);
        }
    }

    #[test]
    fn toggling_peer_with_trailing_plain_comment() {
        let text = "[Interface]\n\n[Peer]\nPublicKey = k\n# end of file\n";
        let mut doc = Document::parse(text).unwrap();
        doc.disable_peer("k").unwrap();

        assert_eq!(
            doc.to_text(),
            "[Interface]\n\n#! [Peer]\n#! PublicKey = k\n#! # end of file\n"
        );
        assert!(doc.peer("k").unwrap().is_disabled());

        doc.enable_peer("k").unwrap();
        assert_eq!(doc.to_text(), text);
    }

    #[test]
    fn edits_in_disabled_peer_stay_disabled() {
        let mut doc = doc();
        doc.disable_peer("a").unwrap();
        doc.add_attribute(Some("a"), "PersistentKeepalive", 25_u32, None, false)
            .unwrap();

        assert_eq!(doc.lines().last().unwrap(), "#! PersistentKeepalive = 25");
        assert!(doc.peer("a").unwrap().is_disabled());

        doc.add_attribute(Some("a"), "AllowedIPs", "10.0.0.9/32", None, false)
            .unwrap();
        assert_eq!(doc.lines()[9], "#! AllowedIPs = 10.0.0.2/32, 10.0.0.9/32");
        assert_consistent(&doc);
    }

    #[test]
    fn initialize_resets_everything() {
        let mut doc = doc();
        doc.initialize(Some("managed")).unwrap();

        assert_eq!(doc.to_text(), "# managed\n[Interface]\n");
        let interface = doc.interface().unwrap();
        assert_eq!((interface.first_line(), interface.header_line()), (0, 1));
        assert!(doc.peers().is_empty());
    }
}
