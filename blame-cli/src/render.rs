//! Porcelain-style rendering of a finished [`blame::Blame`], one line per source line.

use blame::Blame;
use bstr::ByteSlice;

pub fn porcelain(blame: &Blame) {
    let lines = blame.final_blob().lines();
    for (zero_based_line, content) in lines.enumerate() {
        let line = zero_based_line as u32 + 1;
        let Some(hunk) = blame.hunk_by_line(line) else {
            continue;
        };
        let commit = if hunk.is_buffer_blame() {
            "0".repeat(8)
        } else {
            hunk.orig_commit_id.to_hex_with_len(8).to_string()
        };
        let author = hunk.orig_signature.name.as_bstr();
        println!("{commit} ({author} {line:>5}) {}", content.as_bstr());
    }
}
