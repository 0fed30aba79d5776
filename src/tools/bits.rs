//! LSB-first bit packing helpers for the Huffman body.
//! The bit_vec crate only handles MSB-first packing, these assume starting
//! alignment and fill each byte from the least significant bit up.

use bit_vec::BitVec;

pub fn bits_to_bytes_lsb0(bits: &BitVec) -> Vec<u8> {
    let mut ans = Vec::new();
    let byte_count = bits.len() / 8;
    let rem = bits.len() % 8;
    for i in 0..byte_count {
        let mut val = 0;
        for b in 0..8 {
            val |= (bits.get(i*8 + b).unwrap() as u8) << b;
        }
        ans.push(val);
    }
    if rem > 0 {
        let mut val = 0;
        for b in 0..rem {
            val |= (bits.get(byte_count*8 + b).unwrap() as u8) << b;
        }
        ans.push(val);
    }
    ans
}

pub fn bytes_to_bits_lsb0(bytes: &[u8]) -> BitVec {
    let mut ans = BitVec::new();
    for i in 0..bytes.len() {
        let val = bytes[i];
        for b in 0..8 {
            ans.push((val & (1 << b)) != 0);
        }
    }
    ans
}

#[test]
fn lsb0_packing() {
    let mut bits = BitVec::new();
    for b in [true,false,false,true,false,true,true,false,true,true] {
        bits.push(b);
    }
    // first byte 0b01101001, two spare bits 0b11
    assert_eq!(bits_to_bytes_lsb0(&bits),vec![0x69,0x03]);
}

#[test]
fn lsb0_round_trip() {
    let bytes = [0x00,0xff,0x5a,0x01];
    let bits = bytes_to_bits_lsb0(&bytes);
    assert_eq!(bits.len(),32);
    assert_eq!(bits_to_bytes_lsb0(&bits),bytes.to_vec());
}
