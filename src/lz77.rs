//! LZ77 Codec
//!
//! A sliding-window coder.  Each record holds an optional back reference
//! `(offset,length)` into the trailing 255 bytes of output plus an
//! optional literal; every field travels as a wrapping delta from the
//! previous record behind a 4-bit header, nibble packed high-then-low.
//!
//! The bare stream has no end marker: it terminates when the compressed
//! bytes run out.  Only the final record may omit its literal, which is
//! how the stream pins the exact original length without outer framing.

use crate::Error;
use crate::tools::delta::Delta;
use crate::tools::nibble::{NibbleReader,NibbleWriter};

const WINDOW_SIZE: usize = 255;

// header nibble flags
const PAIR: u8 = 0b0001;
const DT: u8 = 0b0010;
const PAIR_4BIT: u8 = 0b0100;
const DT_4BIT: u8 = 0b1000;

/// one coder step: a window match and the literal that follows it
struct Match {
    offset: u8,
    length: u8,
    next: u8
}

/// Longest match for the data at `pos` within the trailing window.  The
/// match may run past `pos` into the lookahead, which is what lets a short
/// offset replicate a run.  Later window positions win ties so the
/// smallest offset is kept; length is capped at the width of the wire
/// field.
fn find_match(data: &[u8],pos: usize) -> Match {
    let window_start = pos.saturating_sub(WINDOW_SIZE);
    let mut ans = Match { offset: 0, length: 0, next: 0 };
    for start in window_start..pos {
        let mut len = 0usize;
        while pos + len < data.len()
            && len < u8::MAX as usize
            && data[start + len] == data[pos + len] {
            len += 1;
        }
        if len > 0 && len >= ans.length as usize {
            ans.offset = (pos - start) as u8;
            ans.length = len as u8;
        }
    }
    ans.next = match pos + (ans.length as usize) < data.len() {
        true => data[pos + ans.length as usize],
        false => 0
    };
    ans
}

fn encode(ibuf: &[u8]) -> Vec<u8> {
    let mut wr = NibbleWriter::new();
    let mut last_offset: Delta<u8> = Delta::new();
    let mut last_length: Delta<u8> = Delta::new();
    let mut last_next: Delta<u8> = Delta::new();
    let mut i = 0;
    while i < ibuf.len() {
        let m = find_match(ibuf,i);
        i += m.length as usize;
        // no literal when the match runs to the end of the input
        let mut header = match i < ibuf.len() {
            true => DT,
            false => 0
        };
        let mut d_offset = 0;
        let mut d_length = 0;
        if m.offset != 0 || m.length != 0 {
            d_offset = last_offset.encode(m.offset);
            d_length = last_length.encode(m.length);
            header |= PAIR;
            if d_offset < 16 && d_length < 16 {
                header |= PAIR_4BIT;
            }
        }
        let d_next = last_next.encode(m.next);
        if header & DT != 0 && d_next < 16 {
            header |= DT_4BIT;
        }
        log::trace!("lz77 record: offset {} length {} next {}",m.offset,m.length,m.next);
        wr.put4(header);
        if header & PAIR != 0 {
            match header & PAIR_4BIT != 0 {
                true => {
                    wr.put4(d_offset);
                    wr.put4(d_length);
                },
                false => {
                    wr.put8(d_offset);
                    wr.put8(d_length);
                }
            }
        }
        if header & DT != 0 {
            match header & DT_4BIT != 0 {
                true => wr.put4(d_next),
                false => wr.put8(d_next)
            }
        }
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

/// Main decompression function
pub fn expand(ibuf: &[u8],obuf: &mut [u8]) -> Result<usize,Error> {
    let mut rd = NibbleReader::new(ibuf);
    let mut last_offset: Delta<u8> = Delta::new();
    let mut last_length: Delta<u8> = Delta::new();
    let mut last_next: Delta<u8> = Delta::new();
    let mut written = 0;
    while !rd.exhausted() {
        let header = rd.get4().ok_or(Error::TruncatedStream)?;
        let mut offset = 0;
        let mut length = 0;
        if header & PAIR != 0 {
            let (d_offset,d_length) = match header & PAIR_4BIT != 0 {
                true => (
                    rd.get4().ok_or(Error::TruncatedStream)?,
                    rd.get4().ok_or(Error::TruncatedStream)?
                ),
                false => (
                    rd.get8().ok_or(Error::TruncatedStream)?,
                    rd.get8().ok_or(Error::TruncatedStream)?
                )
            };
            offset = last_offset.decode(d_offset);
            length = last_length.decode(d_length);
        }
        let next = match header & DT != 0 {
            true => {
                let d_next = match header & DT_4BIT != 0 {
                    true => rd.get4().ok_or(Error::TruncatedStream)?,
                    false => rd.get8().ok_or(Error::TruncatedStream)?
                };
                last_next.decode(d_next)
            },
            false => {
                last_next.set(0);
                0
            }
        };
        if length > 0 {
            let offset = offset as usize;
            if offset == 0 || offset > written {
                return Err(Error::MalformedStream);
            }
            if written + length as usize > obuf.len() {
                return Err(Error::OutputOverflow);
            }
            // byte at a time, the match may overlap its own output
            let mut src = written - offset;
            for _ in 0..length {
                obuf[written] = obuf[src];
                written += 1;
                src += 1;
            }
        }
        if header & DT != 0 {
            if written >= obuf.len() {
                return Err(Error::OutputOverflow);
            }
            obuf[written] = next;
            written += 1;
        }
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
fn compression_works() {
    // literal 'a', then the run folds into one self-overlapping match:
    // header DT + literal 0x61, header PAIR|PAIR_4BIT + offset 1 length 3
    let test_data = "aaaa".as_bytes();
    let lz_str = "26 15 13";
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
fn self_overlap() {
    let test_data = "aaaaaaaaaaaaaa".as_bytes();
    let compressed = compress_slice(test_data).expect("compression failed");
    let expanded = expand_slice(&compressed,test_data.len()).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn invertibility() {
    for test_data in [
        "aaaabbcddd".as_bytes(),
        "abacabacabadaca".as_bytes(),
        "hellolololololo".as_bytes(),
        "aacaacabcabaaacaacaacabcabaaacaacaacabcabaaac".as_bytes(),
        "x".as_bytes(),
        &[0x61,0x00,0x62][..]
    ] {
        let compressed = compress_slice(test_data).expect("compression failed");
        let expanded = expand_slice(&compressed,test_data.len()).expect("expansion failed");
        assert_eq!(test_data.to_vec(),expanded);
    }
}

#[test]
fn long_runs_respect_the_length_field() {
    // matches longer than 255 must be split, not wrapped
    let test_data = vec![b'a';600];
    let compressed = compress_slice(&test_data).expect("compression failed");
    let expanded = expand_slice(&compressed,test_data.len()).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn window_stays_behind_the_cursor() {
    let mut test_data = Vec::new();
    for i in 0..1000usize {
        test_data.push((i % 7) as u8 * 3 + (i % 13) as u8);
    }
    let compressed = compress_slice(&test_data).expect("compression failed");
    let expanded = expand_slice(&compressed,test_data.len()).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn malformed_streams_are_rejected() {
    // header announces an 8-bit pair, stream ends inside it
    assert!(matches!(expand_slice(&[0x15],10),Err(Error::TruncatedStream)));
    // back reference before the start of output
    assert!(matches!(expand_slice(&[0x51,0x10],10),Err(Error::MalformedStream)));
}
