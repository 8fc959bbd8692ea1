use crate::DomainError;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

/// One bounded fragment of an encoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub ordinal: usize,
    pub payload: String,
}

impl Chunk {
    pub fn new(ordinal: usize, payload: impl Into<String>) -> Self {
        Self {
            ordinal,
            payload: payload.into(),
        }
    }
}

/// Splits `payload` into consecutive chunks of at most `max_chunk_size`
/// characters. An empty payload produces no chunks.
pub fn split(payload: &str, max_chunk_size: NonZeroUsize) -> Vec<Chunk> {
    let max = max_chunk_size.get();
    let mut chunks = Vec::with_capacity(payload.len().div_ceil(max));
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in payload.char_indices() {
        if count == max {
            chunks.push(Chunk::new(chunks.len(), &payload[start..idx]));
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if count > 0 {
        chunks.push(Chunk::new(chunks.len(), &payload[start..]));
    }

    chunks
}

/// Client-side buffer collecting chunks by ordinal until the stream is complete.
#[derive(Debug, Default)]
pub struct Reassembler {
    parts: BTreeMap<usize, String>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chunk. Re-delivery of an identical chunk is accepted; a
    /// different payload under an already seen ordinal is rejected.
    pub fn insert(&mut self, chunk: Chunk) -> Result<(), DomainError> {
        match self.parts.get(&chunk.ordinal) {
            Some(existing) if *existing != chunk.payload => Err(DomainError::IncompleteStream(
                format!("conflicting payloads for chunk {}", chunk.ordinal),
            )),
            Some(_) => Ok(()),
            None => {
                self.parts.insert(chunk.ordinal, chunk.payload);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Ordinals `0..n` are all present, with no gaps.
    pub fn is_complete(&self) -> bool {
        self.parts
            .keys()
            .enumerate()
            .all(|(expected, ordinal)| expected == *ordinal)
    }

    /// Concatenates the collected payloads in ordinal order.
    pub fn finish(self) -> Result<String, DomainError> {
        if let Some(missing) = self
            .parts
            .keys()
            .enumerate()
            .find(|(expected, ordinal)| expected != *ordinal)
            .map(|(expected, _)| expected)
        {
            return Err(DomainError::IncompleteStream(format!(
                "missing chunk {}",
                missing
            )));
        }

        Ok(self.parts.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_split_exact_multiple() {
        let chunks = split("aabbcc", size(2));
        let payloads: Vec<&str> = chunks.iter().map(|c| c.payload.as_str()).collect();
        assert_eq!(payloads, vec!["aa", "bb", "cc"]);
    }

    #[test]
    fn test_split_ordinals_follow_split_order() {
        let chunks = split("0123456789", size(3));
        let ordinals: Vec<usize> = chunks.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        assert_eq!(chunks[3].payload, "9");
    }
}
