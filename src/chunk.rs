//! Recursive separator-cascade text chunker.
//!
//! Splits document body text into [`Chunk`]s bounded by a configured maximum
//! character count, with consecutive chunks overlapping by up to a configured
//! number of characters to preserve context across split boundaries.
//!
//! Splitting prefers coarse structural boundaries and falls back to finer
//! ones only when a span does not fit: paragraph breaks (`\n\n`), then line
//! breaks (`\n`), then word boundaries (spaces). A single word longer than
//! the maximum is emitted verbatim as an oversized chunk rather than cut
//! mid-word.
//!
//! Pieces keep their trailing separator (`split_inclusive`), so every chunk
//! is a contiguous substring of the source and concatenating all chunks with
//! overlap removed reproduces the input exactly.
//!
//! All lengths are Unicode scalar counts, not byte counts.
//!
//! Each chunk receives a v4 UUID and a SHA-256 hash of its text for
//! staleness detection on the store side.

use anyhow::{bail, Result};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{Chunk, ChunkMetadata, Document};

/// Separator cascade, coarsest to finest.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Validated chunking parameters.
///
/// Constructed via [`ChunkParams::new`], which enforces the contract
/// `0 <= overlap < max` once, so the splitter itself never has to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    max_chars: usize,
    overlap_chars: usize,
}

impl ChunkParams {
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self> {
        if max_chars == 0 {
            bail!("chunk size must be greater than zero");
        }
        if overlap_chars >= max_chars {
            bail!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap_chars,
                max_chars
            );
        }
        Ok(Self {
            max_chars,
            overlap_chars,
        })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_CHUNK_SIZE,
            overlap_chars: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` into bounded, overlapping segments.
///
/// Empty input yields an empty vector; input at or under the maximum is
/// returned as a single segment. Pure function of `(text, params)`.
pub fn split_text(text: &str, params: &ChunkParams) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= params.max_chars {
        return vec![text.to_string()];
    }
    split_level(text, 0, params)
}

/// Split a span known to exceed the maximum, using the separator at `depth`.
fn split_level(text: &str, depth: usize, params: &ChunkParams) -> Vec<String> {
    let Some(sep) = SEPARATORS.get(depth) else {
        // Finest granularity reached: an indivisible unit is emitted whole,
        // even over the limit, rather than cut mid-word.
        return vec![text.to_string()];
    };

    let pieces: Vec<&str> = text.split_inclusive(*sep).collect();
    if pieces.len() <= 1 {
        // The separator does not occur in this span; try a finer one.
        return split_level(text, depth + 1, params);
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut buf: Vec<&str> = Vec::new();
    let mut buf_len = 0usize;

    for piece in pieces {
        let piece_len = char_len(piece);

        // A piece that cannot fit in any buffer is split at the next
        // finer granularity. No overlap is carried across this boundary.
        if piece_len > params.max_chars {
            if !buf.is_empty() {
                chunks.push(buf.concat());
                buf.clear();
                buf_len = 0;
            }
            chunks.extend(split_level(piece, depth + 1, params));
            continue;
        }

        if buf_len + piece_len > params.max_chars && !buf.is_empty() {
            chunks.push(buf.concat());
            let (mut carry, mut carry_len) = overlap_tail(&buf, params.overlap_chars);
            // Shrink the carried overlap if it would push the next chunk
            // over the maximum.
            while !carry.is_empty() && carry_len + piece_len > params.max_chars {
                carry_len -= char_len(carry[0]);
                carry.remove(0);
            }
            buf = carry;
            buf_len = carry_len;
        }

        buf.push(piece);
        buf_len += piece_len;
    }

    // The buffer always holds at least one piece that is not pure overlap:
    // every flush above is immediately followed by pushing a fresh piece.
    if !buf.is_empty() {
        chunks.push(buf.concat());
    }

    chunks
}

/// Trailing whole pieces of `buf` totaling at most `budget` characters.
fn overlap_tail<'a>(buf: &[&'a str], budget: usize) -> (Vec<&'a str>, usize) {
    let mut carry: Vec<&'a str> = Vec::new();
    let mut total = 0usize;
    for &piece in buf.iter().rev() {
        let len = char_len(piece);
        if total + len > budget {
            break;
        }
        carry.push(piece);
        total += len;
    }
    carry.reverse();
    (carry, total)
}

/// Split a document's body and wrap the segments into [`Chunk`]s with
/// contiguous indices starting at 0.
pub fn chunk_document(doc: &Document, meta: &ChunkMetadata, params: &ChunkParams) -> Vec<Chunk> {
    split_text(&doc.body, params)
        .into_iter()
        .enumerate()
        .map(|(index, text)| make_chunk(doc.id, index as i64, text, meta))
        .collect()
}

fn make_chunk(document_id: i64, index: i64, text: String, meta: &ChunkMetadata) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        document_id,
        chunk_index: index,
        text,
        hash,
        metadata: meta.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max: usize, overlap: usize) -> ChunkParams {
        ChunkParams::new(max, overlap).unwrap()
    }

    /// Reassembles the source text from chunks by stripping each chunk's
    /// leading overlap (the longest prefix that is also a suffix of the
    /// text assembled so far).
    fn reassemble(chunks: &[String]) -> String {
        let mut out = String::new();
        for chunk in chunks {
            let chars: Vec<char> = chunk.chars().collect();
            let mut skip = 0;
            for k in (0..=chars.len()).rev() {
                let prefix: String = chars[..k].iter().collect();
                if out.ends_with(&prefix) {
                    skip = k;
                    break;
                }
            }
            let rest: String = chars[skip..].iter().collect();
            out.push_str(&rest);
        }
        out
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = split_text("Texto pequeno", &ChunkParams::default());
        assert_eq!(chunks, vec!["Texto pequeno".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let chunks = split_text("", &ChunkParams::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_input_exactly_at_limit_not_split() {
        let text = "x".repeat(50);
        let chunks = split_text(&text, &params(50, 10));
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_paragraphs_split_within_bounds() {
        let text = (0..40)
            .map(|i| format!("Paragraph number {} with a little padding.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let p = params(120, 30);
        let chunks = split_text(&text, &p);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 120, "chunk too large: {:?}", chunk);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = (0..30)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let p = params(40, 15);
        let chunks = split_text(&text, &p);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev_chars: Vec<char> = pair[0].chars().collect();
            let next = &pair[1];
            // The next chunk must begin with a non-empty suffix of the
            // previous chunk no longer than the overlap budget. Every word
            // here fits the budget, so carry-back is always possible.
            let matched = (1..=prev_chars.len().min(15))
                .rev()
                .find(|&k| {
                    let suffix: String = prev_chars[prev_chars.len() - k..].iter().collect();
                    next.starts_with(&suffix)
                })
                .unwrap_or(0);
            assert!(matched > 0, "no overlap between {:?} and {:?}", pair[0], next);
            assert!(matched <= 15);
        }
    }

    #[test]
    fn test_lossless_reassembly() {
        let text = (0..60)
            .map(|i| format!("Linha {} com conteúdo distinto.", i))
            .collect::<Vec<_>>()
            .join("\n");
        let p = params(90, 20);
        let chunks = split_text(&text, &p);
        assert!(chunks.len() > 1);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha\n\nBeta\n\nGamma\n\nDelta e mais texto para forçar divisão";
        let p = params(20, 5);
        assert_eq!(split_text(text, &p), split_text(text, &p));
    }

    #[test]
    fn test_oversized_word_emitted_verbatim() {
        let word = "x".repeat(80);
        let text = format!("small {} tail", word);
        let p = params(20, 5);
        let chunks = split_text(&text, &p);
        // The unpartitionable run comes back whole, over the limit.
        assert!(chunks.iter().any(|c| c.contains(&word)));
        for chunk in &chunks {
            let len = chunk.chars().count();
            assert!(
                len <= 20 || chunk.contains(&word),
                "only the oversized unit may exceed the limit: {:?}",
                chunk
            );
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_repeated_paragraph_scenario() {
        // ~4400 chars of repeated prose, default-ish parameters.
        let text = "Este é um parágrafo. ".repeat(200);
        let p = params(1000, 200);
        let chunks = split_text(&text, &p);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 1000);
        }
        for pair in chunks.windows(2) {
            let prev_chars: Vec<char> = pair[0].chars().collect();
            let overlap_matched = (1..=200.min(prev_chars.len())).rev().any(|k| {
                let suffix: String = prev_chars[prev_chars.len() - k..].iter().collect();
                pair[1].starts_with(&suffix)
            });
            assert!(overlap_matched, "expected carry-back between chunks");
        }
    }

    #[test]
    fn test_cascade_prefers_paragraph_breaks() {
        let text = "primeiro parágrafo curto\n\nsegundo parágrafo curto";
        let p = params(30, 5);
        let chunks = split_text(text, &p);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "primeiro parágrafo curto\n\n");
        assert_eq!(chunks[1], "segundo parágrafo curto");
    }

    #[test]
    fn test_params_reject_overlap_not_smaller_than_size() {
        assert!(ChunkParams::new(100, 100).is_err());
        assert!(ChunkParams::new(100, 150).is_err());
        assert!(ChunkParams::new(0, 0).is_err());
        assert!(ChunkParams::new(100, 0).is_ok());
    }

    #[test]
    fn test_chunk_document_indices_and_hashes() {
        let doc = Document {
            id: 7,
            name: "Runbook".to_string(),
            body: (0..50)
                .map(|i| format!("Parágrafo {}.", i))
                .collect::<Vec<_>>()
                .join("\n\n"),
        };
        let meta = ChunkMetadata::for_page("https://wiki.example.com/", doc.id, &doc.name);
        let chunks = chunk_document(&doc, &meta, &params(60, 10));
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as i64);
            assert_eq!(chunk.document_id, 7);
            assert_eq!(chunk.metadata.title, "Runbook");
            assert_eq!(chunk.hash.len(), 64);
        }
        // Same text always hashes the same; distinct ids per chunk.
        assert_ne!(chunks[0].id, chunks[1].id);
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let doc = Document {
            id: 1,
            name: "Empty".to_string(),
            body: String::new(),
        };
        let meta = ChunkMetadata::for_page("https://wiki.example.com/", doc.id, &doc.name);
        assert!(chunk_document(&doc, &meta, &ChunkParams::default()).is_empty());
    }
}
