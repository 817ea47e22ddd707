//! Greedy stream encoder

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::END_OF_STREAM;
use crate::command::{Command, LONG_MAX_LEN, header_len, push_header};

/// Back-reference candidates examined per position, newest first
const MAX_CANDIDATES: usize = 256;

/// Largest offset a copy command can encode
const MAX_OFFSET: usize = 0xFFFF;

#[derive(Debug, Clone, Copy)]
struct Run {
    command: Command,
    /// Bytes of output covered
    covered: usize,
    /// Count field written in the header
    count: usize,
    /// Byte, byte pair or big-endian offset
    arg: [u8; 2],
}

impl Run {
    fn gain(&self) -> isize {
        let cost = header_len(self.count) + self.command.payload_len(self.count);
        self.covered as isize - cost as isize
    }
}

/// Positions of earlier input, keyed by the two bytes a copy would start with
#[derive(Default)]
struct PositionIndex {
    map: BTreeMap<[u8; 2], Vec<usize>>,
}

impl PositionIndex {
    fn insert(&mut self, key: [u8; 2], pos: usize) {
        self.map.entry(key).or_default().push(pos);
    }

    fn candidates(&self, key: [u8; 2]) -> impl Iterator<Item = usize> + '_ {
        self.map
            .get(&key)
            .into_iter()
            .flat_map(|positions| positions.iter().rev().take(MAX_CANDIDATES).copied())
    }
}

struct Packer<'a> {
    input: &'a [u8],
    out: Vec<u8>,
    forward: PositionIndex,
    reversed: PositionIndex,
    backward: PositionIndex,
    indexed: usize,
}

impl<'a> Packer<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            out: Vec::with_capacity(input.len() / 2 + 16),
            forward: PositionIndex::default(),
            reversed: PositionIndex::default(),
            backward: PositionIndex::default(),
            indexed: 0,
        }
    }

    /// Make every position before `pos` available as a copy source
    fn index_until(&mut self, pos: usize) {
        let input = self.input;
        while self.indexed < pos {
            let p = self.indexed;
            if p + 1 < input.len() {
                self.forward.insert([input[p], input[p + 1]], p);
                self.reversed
                    .insert([input[p].reverse_bits(), input[p + 1].reverse_bits()], p);
            }
            if p >= 1 {
                self.backward.insert([input[p], input[p - 1]], p);
            }
            self.indexed += 1;
        }
    }

    fn repeat8(&self, pos: usize) -> Run {
        let rest = &self.input[pos..];
        let b = rest[0];
        let len = rest.iter().take(LONG_MAX_LEN).take_while(|&&x| x == b).count();
        Run { command: Command::Repeat8, covered: len, count: len, arg: [b, 0] }
    }

    fn repeat16(&self, pos: usize) -> Option<Run> {
        let rest = &self.input[pos..];
        if rest.len() < 2 {
            return None;
        }
        let pair = [rest[0], rest[1]];
        let pairs = rest
            .chunks_exact(2)
            .take(LONG_MAX_LEN)
            .take_while(|c| *c == pair)
            .count();
        Some(Run { command: Command::Repeat16, covered: pairs * 2, count: pairs, arg: pair })
    }

    fn sequence(&self, pos: usize) -> Run {
        let rest = &self.input[pos..];
        let first = rest[0];
        let len = rest
            .iter()
            .take(LONG_MAX_LEN)
            .enumerate()
            .take_while(|&(k, &x)| x == first.wrapping_add(k as u8))
            .count();
        Run { command: Command::Sequence, covered: len, count: len, arg: [first, 0] }
    }

    fn best_copy(&self, pos: usize) -> Option<Run> {
        let input = self.input;
        let rest = &input[pos..];
        if rest.len() < 2 {
            return None;
        }
        let key = [rest[0], rest[1]];
        let limit = rest.len().min(LONG_MAX_LEN);
        let mut best: Option<(Command, usize, usize)> = None;

        let mut consider = |command: Command, source: usize, len: usize| {
            if source <= MAX_OFFSET && best.is_none_or(|(_, _, l)| len > l) {
                best = Some((command, source, len));
            }
        };

        for p in self.forward.candidates(key) {
            let len = (0..limit).take_while(|&j| input[p + j] == rest[j]).count();
            consider(Command::CopyForward, p, len);
        }
        for p in self.reversed.candidates(key) {
            let len = (0..limit)
                .take_while(|&j| input[p + j].reverse_bits() == rest[j])
                .count();
            consider(Command::CopyReversed, p, len);
        }
        for p in self.backward.candidates(key) {
            let len = (0..limit.min(p + 1))
                .take_while(|&j| input[p - j] == rest[j])
                .count();
            consider(Command::CopyBackward, p, len);
        }

        best.map(|(command, source, len)| Run {
            command,
            covered: len,
            count: len,
            arg: (source as u16).to_be_bytes(),
        })
    }

    fn best_run(&self, pos: usize) -> Option<Run> {
        let mut best: Option<Run> = None;
        let runs = [
            Some(self.repeat8(pos)),
            self.repeat16(pos),
            Some(self.sequence(pos)),
            self.best_copy(pos),
        ];
        for run in runs.into_iter().flatten() {
            if run.gain() > 0 && best.is_none_or(|b| run.gain() > b.gain()) {
                best = Some(run);
            }
        }
        best
    }

    fn flush_literal(&mut self, start: usize, end: usize) {
        for chunk in self.input[start..end].chunks(LONG_MAX_LEN) {
            push_header(&mut self.out, Command::Literal, chunk.len());
            self.out.extend_from_slice(chunk);
        }
    }

    fn emit(&mut self, run: Run) {
        push_header(&mut self.out, run.command, run.count);
        let payload = run.command.payload_len(run.count);
        self.out.extend_from_slice(&run.arg[..payload]);
    }

    fn run(mut self) -> Vec<u8> {
        let mut pos = 0;
        let mut literal_start = 0;

        while pos < self.input.len() {
            self.index_until(pos);
            match self.best_run(pos) {
                Some(run) => {
                    self.flush_literal(literal_start, pos);
                    self.emit(run);
                    pos += run.covered;
                    literal_start = pos;
                }
                None => pos += 1,
            }
        }

        self.flush_literal(literal_start, pos);
        self.out.push(END_OF_STREAM);
        self.out
    }
}

/// Compress `input` into a self-terminating packed stream.
///
/// The encoder is greedy: at every position it takes whichever command saves
/// the most bytes, falling back to literals. Inputs longer than
/// [`MAX_UNPACKED_SIZE`](crate::MAX_UNPACKED_SIZE) encode but will not decode.
pub fn pack(input: &[u8]) -> Vec<u8> {
    Packer::new(input).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unpack;
    use alloc::vec;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let packed = pack(data);
        let unpacked = unpack(&packed).unwrap();
        assert_eq!(unpacked.packed_len, packed.len());
        unpacked.data
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(pack(&[]), vec![END_OF_STREAM]);
    }

    #[test]
    fn test_single_byte_is_literal() {
        assert_eq!(pack(&[0x42]), vec![0x00, 0x42, 0xFF]);
    }

    #[test]
    fn test_run_uses_repeat() {
        assert_eq!(pack(&[9; 10]), vec![0x29, 9, 0xFF]);
    }

    #[test]
    fn test_incrementing_uses_sequence() {
        let data: Vec<u8> = (0x10..0x20).collect();
        assert_eq!(pack(&data), vec![0x6F, 0x10, 0xFF]);
    }

    #[test]
    fn test_long_runs_split() {
        let data = vec![0u8; 3000];
        let packed = pack(&data);
        assert!(packed.len() <= 10);
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_level_like_data() {
        // a 32x32 grid of flat tiles with a raised block and some obstacles
        let mut data = vec![1u8; 32 * 32];
        for row in 10..20 {
            for col in 5..15 {
                data[row * 32 + col] = 4 + (col % 4) as u8;
            }
        }
        data[500] = 0x61;
        data[731] = 0xC1;
        let packed = pack(&data);
        assert!(packed.len() < data.len() / 4);
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_word_stream() {
        // little-endian tile words, like a playfield layer
        let mut data = Vec::new();
        for i in 0..2000u16 {
            let word = 0x1C00 | (i % 37) | if i % 5 == 0 { 0x2000 } else { 0 };
            data.extend_from_slice(&word.to_le_bytes());
        }
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_mirrored_data_uses_copies() {
        let forward: Vec<u8> = (0..64).map(|i| (i * 7 + 3) as u8).collect();
        let mut data = forward.clone();
        data.extend(forward.iter().rev());
        data.extend(forward.iter().map(|b| b.reverse_bits()));
        let packed = pack(&data);
        assert!(packed.len() < forward.len() + 20);
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_pseudo_random_data() {
        let mut state = 0x1234_5678u32;
        let data: Vec<u8> = (0..4096)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        assert_eq!(roundtrip(&data), data);
    }
}
