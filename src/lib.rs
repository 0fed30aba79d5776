//! # Hufflz Library
//!
//! Lossless byte-stream compression with three classic codecs behind one
//! uniform interface:
//! * `huffman` builds a static code tree per buffer and ships it ahead of the bit stream
//! * `lz77` emits sliding-window match records with delta-encoded fields
//! * `lz78` emits hash-slot dictionary references with delta-encoded fields
//!
//! Every codec consumes a complete buffer and produces a self-contained
//! compressed buffer; feeding that back through `expand` reproduces the
//! original byte for byte.  There is no streaming mode, no framing, and no
//! tuning: the wire formats are fixed.
//!
//! ## Buffer Example
//!
//! ```rs
//! use hufflz::Codec;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let compressed = Codec::Lz77.compress_slice(test_data).expect("compression failed");
//! let expanded = Codec::Lz77.expand_slice(&compressed,test_data.len()).expect("expansion failed");
//! assert_eq!(test_data,expanded);
//! ```
//!
//! ## Caller-Owned Buffer Example
//!
//! ```rs
//! use hufflz::Codec;
//! let test_data = "aaaabbcddd".as_bytes();
//! let mut obuf = [0u8;64];
//! let written = Codec::Huffman.compress(test_data,&mut obuf).expect("compression failed");
//! eprintln!("compressed {} into {}",test_data.len(),written);
//! ```

mod tools;
pub mod huffman;
pub mod lz77;
pub mod lz78;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("output buffer too small")]
    OutputOverflow,
    #[error("compressed stream truncated")]
    TruncatedStream,
    #[error("compressed stream is malformed")]
    MalformedStream
}

/// The available codecs as a closed set.  Each variant dispatches to one
/// codec module; there is no extension point because the wire formats are
/// part of the contract.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum Codec {
    Huffman,
    Lz77,
    Lz78
}

impl Codec {
    pub const ALL: [Codec;3] = [Codec::Huffman,Codec::Lz77,Codec::Lz78];

    /// human readable codec name, also the `-m` argument of the CLI
    pub fn type_name(&self) -> &'static str {
        match self {
            Codec::Huffman => "huffman",
            Codec::Lz77 => "lz77",
            Codec::Lz78 => "lz78"
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "huffman" => Some(Codec::Huffman),
            "lz77" => Some(Codec::Lz77),
            "lz78" => Some(Codec::Lz78),
            _ => None
        }
    }

    /// Compress `ibuf` into the caller's buffer, returning the count of
    /// bytes written.  Fails with `OutputOverflow` if the result would not
    /// fit, in which case `obuf` is untouched.
    pub fn compress(&self,ibuf: &[u8],obuf: &mut [u8]) -> Result<usize,Error> {
        match self {
            Codec::Huffman => huffman::compress(ibuf,obuf),
            Codec::Lz77 => lz77::compress(ibuf,obuf),
            Codec::Lz78 => lz78::compress(ibuf,obuf)
        }
    }

    /// Expand `ibuf` into the caller's buffer, returning the count of
    /// bytes written.  The buffer is normally sized to the known original
    /// length; a malformed stream produces an error, never a panic.
    pub fn expand(&self,ibuf: &[u8],obuf: &mut [u8]) -> Result<usize,Error> {
        match self {
            Codec::Huffman => huffman::expand(ibuf,obuf),
            Codec::Lz77 => lz77::expand(ibuf,obuf),
            Codec::Lz78 => lz78::expand(ibuf,obuf)
        }
    }

    /// Convenience form of `compress` returning a new vector
    pub fn compress_slice(&self,ibuf: &[u8]) -> Result<Vec<u8>,Error> {
        match self {
            Codec::Huffman => huffman::compress_slice(ibuf),
            Codec::Lz77 => lz77::compress_slice(ibuf),
            Codec::Lz78 => lz78::compress_slice(ibuf)
        }
    }

    /// Convenience form of `expand` returning a new vector, where
    /// `max_expanded` bounds the size of the result
    pub fn expand_slice(&self,ibuf: &[u8],max_expanded: usize) -> Result<Vec<u8>,Error> {
        match self {
            Codec::Huffman => huffman::expand_slice(ibuf,max_expanded),
            Codec::Lz77 => lz77::expand_slice(ibuf,max_expanded),
            Codec::Lz78 => lz78::expand_slice(ibuf,max_expanded)
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
const SCENARIOS: [&[u8];7] = [
    b"aaaabbcddd",
    b"abacabacabadaca",
    b"hellolololololo",
    b"aacaacabcabaaac",
    b"aacaacabcabaaacaacaacabcabaaacaacaacabcabaaac",
    b"aaaaaaaaaaaaaa",
    b"abcdefghqwertyfdjkbnbvsmk.bnsjk;jkfndgsjlkdbnjkdnv;aslkndfkjfl;akjsdkjfa;skdjf;klasdjf;lasjdfa;lsjdf"
];

#[test]
fn all_codecs_round_trip() {
    for codec in Codec::ALL {
        for dat in SCENARIOS {
            let compressed = codec.compress_slice(dat).expect("compression failed");
            let expanded = codec.expand_slice(&compressed,dat.len()).expect("expansion failed");
            assert_eq!(dat.to_vec(),expanded,"{} corrupted {:?}",codec.type_name(),dat);
        }
    }
}

#[test]
fn compression_is_deterministic() {
    for codec in Codec::ALL {
        for dat in SCENARIOS {
            let first = codec.compress_slice(dat).expect("compression failed");
            let second = codec.compress_slice(dat).expect("compression failed");
            assert_eq!(first,second);
        }
    }
}

#[test]
fn written_count_matches_buffer_form() {
    for codec in Codec::ALL {
        for dat in SCENARIOS {
            let compressed = codec.compress_slice(dat).expect("compression failed");
            let mut obuf = vec![0;compressed.len()];
            let written = codec.compress(dat,&mut obuf).expect("compression failed");
            assert_eq!(written,compressed.len());
            assert_eq!(obuf,compressed);
        }
    }
}

#[test]
fn empty_input_law() {
    for codec in Codec::ALL {
        let compressed = codec.compress_slice(b"").expect("compression failed");
        let expanded = codec.expand_slice(&compressed,0).expect("expansion failed");
        assert_eq!(expanded.len(),0);
    }
}

#[test]
fn undersized_output_is_rejected() {
    for codec in Codec::ALL {
        let dat = b"abacabacabadaca";
        let compressed = codec.compress_slice(dat).expect("compression failed");
        let mut obuf = vec![0;compressed.len()-1];
        assert!(matches!(codec.compress(dat,&mut obuf),Err(Error::OutputOverflow)));
        let mut obuf = vec![0;dat.len()-1];
        assert!(matches!(codec.expand(&compressed,&mut obuf),Err(Error::OutputOverflow)));
    }
}
