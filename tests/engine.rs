//! File-backed end-to-end tests: whole files through the local substrate,
//! the indexer, and the ordered writer.

use std::io::Write;

use anyhow::Result;
use seq_io::fasta::Record as _;

use shardseq::ops;
use shardseq::substrate::local::LocalSubstrate;
use shardseq::substrate::Substrate;
use shardseq::{CommonOptions, FaidxOptions};

const FASTA: &str = ">chr1 first contig\nACGTACGTAC\nGTACGTACGT\nACGT\n>chr2\nTTTTGGGGCC\nAA\n>chr3 last\nACGT\n";

fn write_temp(content: &str) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn faidx_over_a_real_file() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let file = write_temp(FASTA)?;

    let sub = LocalSubstrate::with_threads(3);
    let raw = LocalSubstrate::read_fastx(file.path(), b'>', 3)?;
    let fixed = ops::fix_blocks(&sub, raw, b'>')?;
    let out = ops::faidx(&sub, fixed, &FaidxOptions::default())?;

    assert_eq!(out.table.total_bytes(), FASTA.len() as u64);
    let mut lines = sub.collect(out.index)?;
    lines.sort();
    assert_eq!(
        lines,
        vec!["chr1\t24\t19\t10\t11", "chr2\t12\t52\t10\t11", "chr3\t4\t77\t4\t5"]
    );

    // every start offset must address the first sequence byte in the file
    for line in &lines {
        let cols: Vec<&str> = line.split('\t').collect();
        let start: usize = cols[2].parse()?;
        assert_eq!(
            FASTA.as_bytes()[start - 1],
            b'\n',
            "offset of {} must follow the header newline",
            cols[0]
        );
    }
    Ok(())
}

#[test]
fn store_ordered_matches_sequential_output() -> Result<()> {
    let file = write_temp(FASTA)?;
    let out_file = tempfile::NamedTempFile::new()?;

    let sub = LocalSubstrate::with_threads(4);
    let raw = LocalSubstrate::read_fastx(file.path(), b'>', 4)?;
    let fixed = ops::fix_blocks(&sub, raw, b'>')?;

    let expected: Vec<String> = sub.collect(fixed.clone())?;
    ops::store_ordered(&sub, fixed, out_file.path())?;

    let written = std::fs::read_to_string(out_file.path())?;
    let sequential: String = expected.iter().map(|block| format!("{block}\n")).collect();
    assert_eq!(written, sequential);
    Ok(())
}

#[test]
fn common_output_reparses_with_seq_io() -> Result<()> {
    let a = write_temp(">id1 one\nACGTACGT\n>id2\nCCCC\n")?;
    let b = write_temp(">id1 uno\nACGTACGT\n>id3\nTTTT\n")?;

    let sub = LocalSubstrate::with_threads(2);
    let coll_a = ops::fix_blocks(&sub, LocalSubstrate::read_fastx(a.path(), b'>', 2)?, b'>')?;
    let coll_b = ops::fix_blocks(&sub, LocalSubstrate::read_fastx(b.path(), b'>', 2)?, b'>')?;

    let out = ops::common(&sub, vec![coll_a, coll_b], &CommonOptions::default())?;
    let text: String = sub.collect(out)?.concat();

    let mut reader = seq_io::fasta::Reader::new(text.as_bytes());
    let record = reader.next().expect("one record expected")?;
    assert_eq!(record.id()?, "id1");
    assert_eq!(record.seq_lines().fold(Vec::new(), |mut acc, l| {
        acc.extend_from_slice(l);
        acc
    }), b"ACGTACGT");
    assert!(reader.next().is_none());
    Ok(())
}
