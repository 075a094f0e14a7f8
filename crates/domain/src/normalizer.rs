//! Canonical ordering of response data.
//!
//! RDATA are ordered by a per-type key:
//! - `A`: numeric IPv4 value (`9.0.0.1` sorts before `10.0.0.1`)
//! - `AAAA`: numeric 128-bit value, independent of how the address was
//!   compressed in presentation form
//! - everything else, and any A/AAAA value that does not parse: byte-wise
//!   comparison of the presentation string
//!
//! Keys of different shapes order as IPv4 < IPv6 < text. Equal keys fall back
//! to the presentation string so the ordering stays total. The JSON and text
//! renderers both read the output of this module, so they always agree.

use super::{OutcomeResult, QueryOutcome, RecordType, Rrset, Section, Sections};
use std::cmp::Ordering;
use std::net::{Ipv4Addr, Ipv6Addr};

const SHORT_ANSWER_DELIMITER: &str = ",";

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum CanonicalKey<'a> {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
    Text(&'a [u8]),
}

fn canonical_key<'a>(rrtype: &str, rdata: &'a str) -> CanonicalKey<'a> {
    if rrtype.eq_ignore_ascii_case("A") {
        if let Ok(addr) = rdata.parse::<Ipv4Addr>() {
            return CanonicalKey::V4(addr);
        }
    } else if rrtype.eq_ignore_ascii_case("AAAA") {
        if let Ok(addr) = rdata.parse::<Ipv6Addr>() {
            return CanonicalKey::V6(addr);
        }
    }
    CanonicalKey::Text(rdata.as_bytes())
}

/// Total order over RDATA presentation strings of type `rrtype`.
pub fn compare_rdata(rrtype: &str, a: &str, b: &str) -> Ordering {
    canonical_key(rrtype, a)
        .cmp(&canonical_key(rrtype, b))
        .then_with(|| a.cmp(b))
}

pub fn sort_rdata(rrtype: &str, rdata: &mut [String]) {
    rdata.sort_by(|a, b| compare_rdata(rrtype, a, b));
}

pub struct ResponseNormalizer;

impl ResponseNormalizer {
    /// Sorts every RRset, computes `short_answers` and applies the section
    /// filter. Failures pass through untouched. Applying it twice yields the
    /// same value.
    pub fn normalize(mut outcome: QueryOutcome, qtype: RecordType, section: Section) -> QueryOutcome {
        if let OutcomeResult::Success(data) = &mut outcome.result {
            Self::sort_sections(&mut data.sections);
            // Once the answer section has been filtered away the summary
            // from the first pass is kept.
            if let Some(answer) = &data.sections.answer {
                data.short_answers = Self::short_answers(answer, qtype);
            }
            Self::select_sections(&mut data.sections, section);
        }
        outcome
    }

    pub fn sort_sections(sections: &mut Sections) {
        for rrsets in [
            &mut sections.answer,
            &mut sections.authority,
            &mut sections.additional,
        ]
        .into_iter()
        .flatten()
        {
            for rrset in rrsets.iter_mut() {
                Self::normalize_rrset(rrset);
            }
        }
    }

    pub fn normalize_rrset(rrset: &mut Rrset) {
        sort_rdata(&rrset.rrtype, &mut rrset.rdata);
    }

    /// Sorted RDATA of the answer RRsets matching `qtype`, joined with `,`.
    ///
    /// When no RRset has the query type (a CNAME-only answer, say) every
    /// answer record is used instead.
    pub fn short_answers(answer: &[Rrset], qtype: RecordType) -> String {
        let mut matching: Vec<(&str, &str)> = answer
            .iter()
            .filter(|rrset| qtype.matches_mnemonic(&rrset.rrtype))
            .flat_map(|rrset| rrset.rdata.iter().map(move |rd| (rrset.rrtype.as_str(), rd.as_str())))
            .collect();

        if matching.is_empty() {
            matching = answer
                .iter()
                .flat_map(|rrset| rrset.rdata.iter().map(move |rd| (rrset.rrtype.as_str(), rd.as_str())))
                .collect();
        }

        matching.sort_by(|(ta, a), (tb, b)| {
            canonical_key(ta, a)
                .cmp(&canonical_key(tb, b))
                .then_with(|| a.cmp(b))
        });

        matching
            .into_iter()
            .map(|(_, rdata)| rdata)
            .collect::<Vec<_>>()
            .join(SHORT_ANSWER_DELIMITER)
    }

    pub fn select_sections(sections: &mut Sections, section: Section) {
        if !section.includes(Section::Answer) {
            sections.answer = None;
        }
        if !section.includes(Section::Authority) {
            sections.authority = None;
        }
        if !section.includes(Section::Additional) {
            sections.additional = None;
        }
    }
}
