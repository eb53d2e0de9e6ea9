use std::sync::OnceLock;

use regex::Regex;

use crate::config::FaidxOptions;
use crate::error::{ConfigError, Result};
use crate::record::{wrap_into, SequenceRecord};

/// A literal region query over a record ID.
///
/// Coordinates are 1-based and inclusive; negative values count from the
/// sequence end (`-1` is the last base). The sentinel `(1, -1)` selects
/// the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: String,
    pub begin: i64,
    pub end: i64,
}

fn region_patterns() -> &'static [Regex; 4] {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^(.+?):(\-?\d+)\-(\-?\d+)$").unwrap(),
            Regex::new(r"^(.+?):(\-?\d+)\-$").unwrap(),
            Regex::new(r"^(.+?):\-(\-?\d+)$").unwrap(),
            Regex::new(r"^(.+?):(\d+)$").unwrap(),
        ]
    })
}

/// Parses the `id[:start[-end]]` region syntax; a bare ID selects the
/// whole record
#[must_use]
pub fn parse_region(query: &str) -> Region {
    let [full, only_begin, only_end, one_base] = region_patterns();
    if let Some(caps) = full.captures(query) {
        return Region {
            id: caps[1].to_string(),
            begin: caps[2].parse().unwrap_or(1),
            end: caps[3].parse().unwrap_or(-1),
        };
    }
    if let Some(caps) = only_begin.captures(query) {
        return Region {
            id: caps[1].to_string(),
            begin: caps[2].parse().unwrap_or(1),
            end: -1,
        };
    }
    if let Some(caps) = only_end.captures(query) {
        return Region {
            id: caps[1].to_string(),
            begin: 1,
            end: -caps[2].parse().unwrap_or(1),
        };
    }
    if let Some(caps) = one_base.captures(query) {
        let base: i64 = caps[2].parse().unwrap_or(1);
        return Region {
            id: caps[1].to_string(),
            begin: base,
            end: base,
        };
    }
    Region {
        id: query.to_string(),
        begin: 1,
        end: -1,
    }
}

fn resolve_point(len: i64, coord: i64) -> i64 {
    if coord < 0 {
        len + coord + 1
    } else if coord == 0 {
        1
    } else {
        coord
    }
}

/// Resolves a 1-based inclusive coordinate pair against a sequence length.
///
/// Returns `None` (a query miss, never an error) when either resolved
/// coordinate falls outside `1..=len` or the pair is inverted.
#[must_use]
pub fn resolve_coords(len: usize, begin: i64, end: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let l = len as i64;
    let pa = resolve_point(l, begin);
    let pb = resolve_point(l, end);
    if pa < 1 || pa > l || pb < 1 || pb > l || pa > pb {
        return None;
    }
    Some((pa as usize, pb as usize))
}

enum QuerySet {
    Literal(Vec<Region>),
    Patterns(Vec<Regex>),
}

/// Emits matching subsequences from a partition's record stream,
/// independent of the full index.
///
/// Matching and coordinate resolution happen per query: a query whose ID
/// matches nothing, or whose resolved coordinates fall out of bounds, is
/// skipped silently rather than failing the partition.
pub struct RegionExtractor {
    queries: QuerySet,
    ignore_case: bool,
    full_head: bool,
    line_width: usize,
}

impl RegionExtractor {
    pub fn new(opts: &FaidxOptions) -> Result<Self> {
        let queries = if opts.use_regexp {
            let mut patterns = Vec::with_capacity(opts.regions.len());
            for query in &opts.regions {
                patterns.push(Regex::new(query).map_err(ConfigError::from)?);
            }
            QuerySet::Patterns(patterns)
        } else {
            let mut regions = Vec::with_capacity(opts.regions.len());
            for query in &opts.regions {
                let mut region = parse_region(query);
                if opts.ignore_case {
                    region.id.make_ascii_lowercase();
                }
                regions.push(region);
            }
            QuerySet::Literal(regions)
        };
        Ok(Self {
            queries,
            ignore_case: opts.ignore_case,
            full_head: opts.full_head,
            line_width: opts.config.line_width,
        })
    }

    fn match_record(&self, record: &SequenceRecord) -> Option<(i64, i64)> {
        let id = record.id_str();
        match &self.queries {
            QuerySet::Patterns(patterns) => patterns
                .iter()
                .any(|re| re.is_match(&id))
                .then_some((1, -1)),
            QuerySet::Literal(regions) => {
                let id = if self.ignore_case {
                    id.to_ascii_lowercase()
                } else {
                    id
                };
                regions
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| (r.begin, r.end))
            }
        }
    }

    /// Extracts the requested subsequence of a matching record, rendered
    /// as FASTA text; `None` on any query miss.
    ///
    /// A resolved `start > end` pair reached through a negative starting
    /// coordinate selects the reverse complement of the forward slice; the
    /// emitted header encodes the minus strand by keeping the coordinates
    /// in descending extraction order.
    #[must_use]
    pub fn extract(&self, record: &SequenceRecord) -> Option<String> {
        let (begin, end) = self.match_record(record)?;
        let len = record.seq.len();
        if len == 0 {
            return None;
        }
        let l = len as i64;
        let pa = resolve_point(l, begin);
        let pb = resolve_point(l, end);
        if pa < 1 || pa > l || pb < 1 || pb > l {
            return None;
        }
        let (subseq, suffix) = if pa <= pb {
            let (s, e) = (pa as usize, pb as usize);
            let slice = record.seq[s - 1..e].to_vec();
            if begin == 1 && end == -1 {
                (slice, None)
            } else {
                (slice, Some(format!(":{s}-{e}")))
            }
        } else if begin < 0 {
            let (s, e) = (pb as usize, pa as usize);
            let slice = record.alphabet.reverse_complement(&record.seq[s - 1..e]);
            (slice, Some(format!(":{e}-{s}")))
        } else {
            return None;
        };

        let head = if self.full_head {
            String::from_utf8_lossy(&record.name).into_owned()
        } else {
            record.id_str()
        };
        let mut out = Vec::with_capacity(head.len() + subseq.len() + subseq.len() / 60 + 16);
        out.push(b'>');
        out.extend_from_slice(head.as_bytes());
        if let Some(suffix) = &suffix {
            out.extend_from_slice(suffix.as_bytes());
        }
        out.push(b'\n');
        wrap_into(&subseq, self.line_width, &mut out);
        out.push(b'\n');
        Some(String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    fn record(id: &str, seq: &str) -> SequenceRecord {
        SequenceRecord::new(
            id.as_bytes().to_vec(),
            id.as_bytes().to_vec(),
            Vec::new(),
            seq.as_bytes().to_vec(),
            None,
            Alphabet::Dna,
        )
        .unwrap()
    }

    fn extractor(regions: &[&str]) -> RegionExtractor {
        let opts = FaidxOptions {
            regions: regions.iter().map(ToString::to_string).collect(),
            ..FaidxOptions::default()
        };
        RegionExtractor::new(&opts).unwrap()
    }

    #[test]
    fn region_syntax() {
        assert_eq!(
            parse_region("chr1:3-10"),
            Region {
                id: "chr1".to_string(),
                begin: 3,
                end: 10
            }
        );
        assert_eq!(
            parse_region("chr1:5"),
            Region {
                id: "chr1".to_string(),
                begin: 5,
                end: 5
            }
        );
        assert_eq!(
            parse_region("chr1:12-"),
            Region {
                id: "chr1".to_string(),
                begin: 12,
                end: -1
            }
        );
        assert_eq!(
            parse_region("chr1:-12"),
            Region {
                id: "chr1".to_string(),
                begin: 1,
                end: -12
            }
        );
        assert_eq!(
            parse_region("chr1"),
            Region {
                id: "chr1".to_string(),
                begin: 1,
                end: -1
            }
        );
    }

    #[test]
    fn coordinate_resolution() {
        assert_eq!(resolve_coords(10, 1, -1), Some((1, 10)));
        assert_eq!(resolve_coords(10, 3, 5), Some((3, 5)));
        assert_eq!(resolve_coords(10, -3, -1), Some((8, 10)));
        assert_eq!(resolve_coords(10, 5, -2), Some((5, 9)));
        assert_eq!(resolve_coords(10, 11, 12), None);
        assert_eq!(resolve_coords(10, 5, 3), None);
        assert_eq!(resolve_coords(0, 1, -1), None);
    }

    #[test]
    fn forward_slice() {
        let ex = extractor(&["r1:2-5"]);
        let out = ex.extract(&record("r1", "AACCGGTT")).unwrap();
        assert_eq!(out, ">r1:2-5\nACCG\n");
    }

    #[test]
    fn full_record_keeps_bare_header() {
        let ex = extractor(&["r1"]);
        let out = ex.extract(&record("r1", "AACCGGTT")).unwrap();
        assert_eq!(out, ">r1\nAACCGGTT\n");
    }

    #[test]
    fn reverse_complement_slice() {
        // begin -1 resolves to 8, end 5 stays: descending pair on the
        // minus strand
        let ex = extractor(&["r1:-1-5"]);
        let out = ex.extract(&record("r1", "AACCGGTT")).unwrap();
        assert_eq!(out, ">r1:8-5\nAACC\n");
    }

    #[test]
    fn out_of_bounds_is_a_miss() {
        let ex = extractor(&["r1:20-30"]);
        assert!(ex.extract(&record("r1", "AACC")).is_none());
    }

    #[test]
    fn unmatched_id_is_a_miss() {
        let ex = extractor(&["r2:1-2"]);
        assert!(ex.extract(&record("r1", "AACC")).is_none());
    }

    #[test]
    fn regex_queries_select_whole_records() {
        let opts = FaidxOptions {
            use_regexp: true,
            regions: vec!["^chr\\d+$".to_string()],
            ..FaidxOptions::default()
        };
        let ex = RegionExtractor::new(&opts).unwrap();
        assert!(ex.extract(&record("chr7", "ACGT")).is_some());
        assert!(ex.extract(&record("scaffold", "ACGT")).is_none());
    }
}
