//! Static Huffman Codec
//!
//! One code tree is built per buffer from byte frequencies and serialized
//! ahead of the packed bit stream, so every blob is self-contained.  The
//! tree lives in a flat node pool with `i16` child and parent indices
//! (`-1` marks absence); the last node pushed is always the root.
//!
//! Wire layout, all integers little endian:
//! * `tail`: u8, the number of valid bits in the final body byte, 0
//!   meaning the byte is entirely valid
//! * `num_nodes`: u16
//! * `num_nodes` records of `code`: u8, `left`: i16, `right`: i16
//!   (`code` is meaningful only for leaves)
//! * body: code bits packed LSB first within each byte
//!
//! A decoder that steps onto a `-1` child resets to the root and carries
//! on.  That rule is what makes the degenerate one-leaf tree work: the
//! root is the leaf, every body bit falls off it and emits the one code.

use bit_vec::BitVec;
use crate::Error;
use crate::tools::bits::{bits_to_bytes_lsb0,bytes_to_bits_lsb0};

const NIL: i16 = -1;
const HEADER_BYTES: usize = 3;
const NODE_BYTES: usize = 5;

/// Tree node.  `dir` is the bit that selects this node from its parent;
/// it is never serialized, the decoder recovers it from the child links.
#[derive(Clone,Copy)]
struct Node {
    code: u8,
    dir: u8,
    left: i16,
    right: i16,
    parent: i16
}

/// scratch entry while merging the frequency list
struct Weight {
    node: i16,
    count: usize
}

/// Build the code tree: one leaf per distinct byte, then repeatedly join
/// the two lightest entries under a fresh node until one entry remains.
/// The entry popped first becomes the right child and is tagged `dir = 1`.
/// Returns the node pool and the leaf index for each byte value.
fn build_tree(ibuf: &[u8]) -> (Vec<Node>,[i16;256]) {
    let mut counters = [0usize;256];
    for &c in ibuf {
        counters[c as usize] += 1;
    }
    let mut nodes: Vec<Node> = Vec::new();
    let mut weights: Vec<Weight> = Vec::new();
    let mut leaf_of = [NIL;256];
    for (c,&count) in counters.iter().enumerate() {
        if count == 0 {
            continue;
        }
        leaf_of[c] = nodes.len() as i16;
        weights.push(Weight { node: nodes.len() as i16, count });
        nodes.push(Node { code: c as u8, dir: 0, left: NIL, right: NIL, parent: NIL });
    }
    weights.sort_by(|w0,w1| w1.count.cmp(&w0.count));
    while weights.len() > 1 {
        let w0 = weights.pop().unwrap();
        let w1 = weights.pop().unwrap();
        let joined = nodes.len() as i16;
        nodes[w0.node as usize].dir = 1;
        nodes[w0.node as usize].parent = joined;
        nodes[w1.node as usize].dir = 0;
        nodes[w1.node as usize].parent = joined;
        weights.push(Weight { node: joined, count: w0.count + w1.count });
        nodes.push(Node { code: 0, dir: 0, left: w1.node, right: w0.node, parent: NIL });
        weights.sort_by(|w0,w1| w1.count.cmp(&w0.count));
    }
    (nodes,leaf_of)
}

fn encode(ibuf: &[u8]) -> Vec<u8> {
    let (nodes,leaf_of) = build_tree(ibuf);
    let mut ans = Vec::with_capacity(HEADER_BYTES + nodes.len()*NODE_BYTES);
    ans.push(0); // tail, patched once the body is known
    ans.extend_from_slice(&(nodes.len() as u16).to_le_bytes());
    for node in &nodes {
        ans.push(node.code);
        ans.extend_from_slice(&node.left.to_le_bytes());
        ans.extend_from_slice(&node.right.to_le_bytes());
    }
    let mut bits = BitVec::new();
    let mut path: Vec<u8> = Vec::new();
    for &c in ibuf {
        path.clear();
        let mut idx = leaf_of[c as usize];
        while idx != NIL {
            let node = &nodes[idx as usize];
            path.push(node.dir);
            idx = node.parent;
        }
        // The last entry is the root's own bit, which selects nothing and
        // is not emitted, except when the tree is a single leaf: that
        // still costs one bit per symbol.
        let top = match path.len() > 1 {
            true => path.len() - 1,
            false => 1
        };
        for j in (0..top).rev() {
            bits.push(path[j] != 0);
        }
    }
    let tail = (bits.len() % 8) as u8;
    log::debug!("huffman: {} nodes, {} body bits, tail {}",nodes.len(),bits.len(),tail);
    ans.append(&mut bits_to_bytes_lsb0(&bits));
    ans[0] = tail;
    ans
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
    if ibuf.len() < HEADER_BYTES {
        return Err(Error::TruncatedStream);
    }
    let tail = ibuf[0];
    if tail > 7 {
        return Err(Error::MalformedStream);
    }
    let num_nodes = u16::from_le_bytes([ibuf[1],ibuf[2]]) as usize;
    let body_start = HEADER_BYTES + num_nodes*NODE_BYTES;
    if ibuf.len() < body_start {
        return Err(Error::TruncatedStream);
    }
    if num_nodes == 0 {
        // the legal empty stream carries no body
        return match ibuf.len() == HEADER_BYTES {
            true => Ok(0),
            false => Err(Error::MalformedStream)
        };
    }
    let mut nodes: Vec<Node> = Vec::with_capacity(num_nodes);
    for i in 0..num_nodes {
        let rec = &ibuf[HEADER_BYTES + i*NODE_BYTES..HEADER_BYTES + (i+1)*NODE_BYTES];
        nodes.push(Node {
            code: rec[0],
            dir: 0,
            left: i16::from_le_bytes([rec[1],rec[2]]),
            right: i16::from_le_bytes([rec[3],rec[4]]),
            parent: NIL
        });
    }
    let body = &ibuf[body_start..];
    let bits = bytes_to_bits_lsb0(body);
    let valid_bits = match (body.len(),tail) {
        (0,_) => 0,
        (n,0) => n*8,
        (n,t) => (n - 1)*8 + t as usize
    };
    let root = num_nodes - 1;
    let mut cur = root;
    let mut written = 0;
    for i in 0..valid_bits {
        let next = match bits.get(i).unwrap() {
            false => nodes[cur].left,
            true => nodes[cur].right
        };
        cur = if next == NIL {
            root
        } else if next >= 0 && (next as usize) < num_nodes {
            next as usize
        } else {
            return Err(Error::MalformedStream);
        };
        if nodes[cur].left == NIL && nodes[cur].right == NIL {
            if written >= obuf.len() {
                return Err(Error::OutputOverflow);
            }
            obuf[written] = nodes[cur].code;
            written += 1;
            cur = root;
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

#[test]
fn compression_works() {
    // 'a' codes as 0, 'b' as 1, body is 0,0,1 LSB-first with tail 3
    let test_data = "aab".as_bytes();
    let huff_str = "03 03 00 61 FF FF FF FF 62 FF FF FF FF 00 00 00 01 00 04";
    let compressed = compress_slice(test_data).expect("compression failed");
    assert_eq!(compressed,hex::decode(huff_str.replace(" ","")).unwrap());
}

#[test]
fn single_symbol_stream() {
    let test_data = "aaaa".as_bytes();
    let huff_str = "04 01 00 61 FF FF FF FF 00";
    let compressed = compress_slice(test_data).expect("compression failed");
    assert_eq!(compressed,hex::decode(huff_str.replace(" ","")).unwrap());
    let expanded = expand_slice(&compressed,test_data.len()).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn empty_stream() {
    let compressed = compress_slice(b"").expect("compression failed");
    assert_eq!(compressed,vec![0,0,0]);
    let expanded = expand_slice(&compressed,0).expect("expansion failed");
    assert_eq!(expanded.len(),0);
}

#[test]
fn invertibility() {
    for test_data in [
        "aaaabbcddd".as_bytes(),
        "abacabacabadaca".as_bytes(),
        "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes(),
        &[0u8,255,0,255,128,7,7,7][..]
    ] {
        let compressed = compress_slice(test_data).expect("compression failed");
        let expanded = expand_slice(&compressed,test_data.len()).expect("expansion failed");
        assert_eq!(test_data.to_vec(),expanded);
    }
}

#[test]
fn tree_is_well_formed() {
    // every node reachable from the root exactly once, leaves are exactly
    // the distinct input bytes
    let test_data = "abacabacabadaca".as_bytes();
    let compressed = compress_slice(test_data).expect("compression failed");
    let num_nodes = u16::from_le_bytes([compressed[1],compressed[2]]) as usize;
    let rec = |i: usize| -> (u8,i16,i16) {
        let r = &compressed[HEADER_BYTES + i*NODE_BYTES..HEADER_BYTES + (i+1)*NODE_BYTES];
        (r[0],i16::from_le_bytes([r[1],r[2]]),i16::from_le_bytes([r[3],r[4]]))
    };
    let mut visited = vec![false;num_nodes];
    let mut leaves: Vec<u8> = Vec::new();
    let mut stack = vec![num_nodes - 1];
    while let Some(i) = stack.pop() {
        assert!(!visited[i],"node {} reached twice",i);
        visited[i] = true;
        let (code,left,right) = rec(i);
        if left == NIL && right == NIL {
            leaves.push(code);
        } else {
            assert!(left != NIL && right != NIL,"internal node {} missing a child",i);
            stack.push(left as usize);
            stack.push(right as usize);
        }
    }
    assert!(visited.iter().all(|&v| v));
    leaves.sort();
    let mut expected: Vec<u8> = test_data.to_vec();
    expected.sort();
    expected.dedup();
    assert_eq!(leaves,expected);
}

#[test]
fn malformed_streams_are_rejected() {
    // truncated header
    assert!(matches!(expand_slice(&[0,1],10),Err(Error::TruncatedStream)));
    // node records cut short
    assert!(matches!(expand_slice(&[0,2,0,61],10),Err(Error::TruncatedStream)));
    // empty tree with trailing body
    assert!(matches!(expand_slice(&[0,0,0,0xff],10),Err(Error::MalformedStream)));
    // child index out of range
    let bad = hex::decode("000100617F7F7F7F55").unwrap();
    assert!(matches!(expand_slice(&bad,10),Err(Error::MalformedStream)));
}
