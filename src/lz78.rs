//! LZ78 Codec
//!
//! A dictionary coder.  The coder grows a phrase for as long as the
//! dictionary already contains it, then emits the phrase's slot number
//! and the literal that extends it, and inserts the extended phrase.
//! Slot numbers and literals travel as wrapping deltas behind a 4-bit
//! header, nibble packed.  The decoder keeps a matching slot table whose
//! entries point at spans of its own output, so both tables evolve in
//! lockstep record by record.
//!
//! Slots are direct mapped by DJB2 hash into 8192 entries and a colliding
//! phrase silently overwrites the previous occupant.  The coder never
//! emits a slot it has not just verified byte-for-byte, so a collision
//! normally costs compression ratio rather than correctness, but the
//! full-hash check is itself 16 bits wide: distinct phrases that agree on
//! all 16 hash bits defeat it and will not round-trip.  Callers who need
//! a hard guarantee should verify a round trip after compressing.

use crate::Error;
use crate::tools::delta::Delta;
use crate::tools::nibble::{NibbleReader,NibbleWriter};

const DICT_CAPACITY: usize = 8192;

// header nibble flags
const DT: u8 = 0b0001;
const DT_4BIT: u8 = 0b0010;
const POS: u8 = 0b0100;
const POS_4BIT: u8 = 0b1000;

/// djb2 at the wire width; the empty phrase hashes to 0
fn hash(data: &[u8]) -> u16 {
    if data.is_empty() {
        return 0;
    }
    let mut h: u16 = 5381;
    for &c in data {
        h = h.wrapping_mul(33).wrapping_add(c as u16);
    }
    h
}

fn slot(h: u16) -> usize {
    (h as usize) & (DICT_CAPACITY - 1)
}

/// Coder-side phrase table.  Slots keep the full hash so a lookup can
/// reject an occupant that merely shares the low bits.
struct Dict<'a> {
    slots: Vec<Option<(u16,&'a [u8])>>
}

impl <'a> Dict<'a> {
    fn new() -> Self {
        Self {
            slots: vec![None;DICT_CAPACITY]
        }
    }
    fn insert(&mut self,phrase: &'a [u8]) {
        let h = hash(phrase);
        self.slots[slot(h)] = Some((h,phrase));
    }
    fn contains(&self,phrase: &[u8]) -> bool {
        let h = hash(phrase);
        match self.slots[slot(h)] {
            Some((occupant_hash,occupant)) => occupant_hash == h && occupant == phrase,
            None => false
        }
    }
}

fn encode(ibuf: &[u8]) -> Vec<u8> {
    let mut wr = NibbleWriter::new();
    let mut dict = Dict::new();
    let mut last_next: Delta<u8> = Delta::new();
    let mut last_pos: Delta<u16> = Delta::new();
    let mut phrase_start = 0;
    let mut phrase_len = 0;
    let mut i = 0;
    while i < ibuf.len() {
        // grow while the extended phrase is known and a literal remains
        while i < ibuf.len() - 1 && dict.contains(&ibuf[phrase_start..phrase_start + phrase_len + 1]) {
            phrase_len += 1;
            i += 1;
        }
        let next = ibuf[phrase_start + phrase_len];
        let d_next = last_next.encode(next);
        let mut header = DT;
        if d_next < 16 {
            header |= DT_4BIT;
        }
        let mut d_pos = 0;
        if phrase_len > 0 {
            let pos = slot(hash(&ibuf[phrase_start..phrase_start + phrase_len])) as u16;
            d_pos = last_pos.encode(pos);
            header |= POS;
            if d_pos < 16 {
                header |= POS_4BIT;
            }
        }
        log::trace!("lz78 record: phrase {} bytes, next {}",phrase_len,next);
        wr.put4(header);
        if header & POS != 0 {
            match header & POS_4BIT != 0 {
                true => wr.put4(d_pos as u8),
                false => wr.put16(d_pos)
            }
        }
        match header & DT_4BIT != 0 {
            true => wr.put4(d_next),
            false => wr.put8(d_next)
        }
        phrase_len += 1;
        dict.insert(&ibuf[phrase_start..phrase_start + phrase_len]);
        phrase_start += phrase_len;
        phrase_len = 0;
        i += 1;
    }
    wr.into_bytes()
}

/// Main compression function
pub fn compress(ibuf: &[u8],obuf: &mut [u8]) -> Result<usize,Error> {
    let ans = encode(ibuf);
    if ans.len() > obuf.len() {
        return Err(Error::OutputOverflow);
    }
    obuf[..ans.len()].copy_from_slice(&ans);
    Ok(ans.len())
}

/// decoder-side slot entry, a span of the output produced so far
#[derive(Clone,Copy)]
struct Span {
    start: usize,
    size: usize
}

/// Main decompression function
pub fn expand(ibuf: &[u8],obuf: &mut [u8]) -> Result<usize,Error> {
    let mut rd = NibbleReader::new(ibuf);
    let mut map = vec![Span { start: 0, size: 0 };DICT_CAPACITY];
    let mut last_next: Delta<u8> = Delta::new();
    let mut last_pos: Delta<u16> = Delta::new();
    let mut written = 0;
    while !rd.exhausted() {
        let header = rd.get4().ok_or(Error::TruncatedStream)?;
        let span_start = written;
        if header & POS != 0 {
            let d_pos = match header & POS_4BIT != 0 {
                true => rd.get4().ok_or(Error::TruncatedStream)? as u16,
                false => rd.get16().ok_or(Error::TruncatedStream)?
            };
            let pos = last_pos.decode(d_pos) as usize;
            if pos >= DICT_CAPACITY {
                return Err(Error::MalformedStream);
            }
            let Span { start, size } = map[pos];
            if written + size > obuf.len() {
                return Err(Error::OutputOverflow);
            }
            for j in 0..size {
                obuf[written] = obuf[start + j];
                written += 1;
            }
        }
        if header & DT != 0 {
            let d_next = match header & DT_4BIT != 0 {
                true => rd.get4().ok_or(Error::TruncatedStream)?,
                false => rd.get8().ok_or(Error::TruncatedStream)?
            };
            let next = last_next.decode(d_next);
            if written >= obuf.len() {
                return Err(Error::OutputOverflow);
            }
            obuf[written] = next;
            written += 1;
        } else {
            last_next.set(0);
        }
        let h = hash(&obuf[span_start..written]);
        map[slot(h)] = Span { start: span_start, size: written - span_start };
    }
    Ok(written)
}

/// Convenience function, calls `compress` returning a Vec
pub fn compress_slice(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    Ok(encode(ibuf))
}

/// Convenience function, calls `expand` returning a Vec
pub fn expand_slice(ibuf: &[u8],max_expanded: usize) -> Result<Vec<u8>,Error> {
    let mut obuf = vec![0;max_expanded];
    let written = expand(ibuf,&mut obuf)?;
    obuf.truncate(written);
    Ok(obuf)
}

// *************** TESTS *****************

#[test]
fn hash_matches_reference() {
    assert_eq!(hash(b""),0);
    assert_eq!(hash(b"a"),46598);
    assert_eq!(hash(b"aa"),30503);
}

#[test]
fn compression_works() {
    // literal 'a'; phrase "a" (slot 5638 = 0x1606) plus literal 'a';
    // literal 'a' again with a zero delta
    let test_data = "aaaa".as_bytes();
    let lz_str = "16 17 16 06 03 00";
    let compressed = compress_slice(test_data).expect("compression failed");
    assert_eq!(compressed,hex::decode(lz_str.replace(" ","")).unwrap());
}

#[test]
fn empty_stream() {
    let compressed = compress_slice(b"").expect("compression failed");
    assert_eq!(compressed.len(),0);
    let expanded = expand_slice(&compressed,0).expect("expansion failed");
    assert_eq!(expanded.len(),0);
}

#[test]
fn invertibility() {
    for test_data in [
        "aaaabbcddd".as_bytes(),
        "abacabacabadaca".as_bytes(),
        "hellolololololo".as_bytes(),
        "aacaacabcabaaac".as_bytes(),
        "aacaacabcabaaacaacaacabcabaaacaacaacabcabaaac".as_bytes(),
        "aaaaaaaaaaaaaa".as_bytes(),
        "y".as_bytes(),
        &[0u8,0,0,1,0,0,1][..]
    ] {
        let compressed = compress_slice(test_data).expect("compression failed");
        let expanded = expand_slice(&compressed,test_data.len()).expect("expansion failed");
        assert_eq!(test_data.to_vec(),expanded);
    }
}

#[test]
fn phrases_grow_by_one_byte() {
    // "aaaa" emits: "a", then "a"+'a', then "a" again; the second record
    // must reference the slot the first inserted
    let test_data = "aaaa".as_bytes();
    let compressed = compress_slice(test_data).expect("compression failed");
    let mut rd = NibbleReader::new(&compressed);
    let first = rd.get4().unwrap();
    assert_eq!(first & POS,0);
    rd.get8().unwrap();
    let second = rd.get4().unwrap();
    assert_eq!(second & POS,POS);
    assert_eq!(rd.get16().unwrap() as usize,slot(hash(b"a")));
}

#[test]
fn malformed_streams_are_rejected() {
    // slot number past the table
    assert!(matches!(expand_slice(&[0x4f,0xff,0xf0],10),Err(Error::MalformedStream)));
    // stream ends inside a 16-bit slot field
    assert!(matches!(expand_slice(&[0x4f],10),Err(Error::TruncatedStream)));
}
