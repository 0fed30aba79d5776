//! Delta predecessor registers for the LZ record streams.
//!
//! Every field in a nibble-packed record travels as a wrapping difference
//! from the last value of the same kind, so small movements stay under 16
//! and earn the 4-bit header fast path.  Coder and decoder each keep one
//! register per field; as long as both update them on every record the
//! registers never disagree.

use num_traits::{PrimInt,WrappingAdd,WrappingSub};

pub struct Delta<T> {
    last: T
}

impl <T: PrimInt + WrappingAdd + WrappingSub> Delta<T> {
    pub fn new() -> Self {
        Self {
            last: T::zero()
        }
    }
    /// coder side: difference from the predecessor, which becomes `value`
    pub fn encode(&mut self,value: T) -> T {
        let dt = value.wrapping_sub(&self.last);
        self.last = value;
        dt
    }
    /// decoder side: rebuild a value from its difference, which becomes
    /// the predecessor
    pub fn decode(&mut self,dt: T) -> T {
        let value = self.last.wrapping_add(&dt);
        self.last = value;
        value
    }
    /// overwrite the predecessor for records that carry the field
    /// implicitly rather than as a difference
    pub fn set(&mut self,value: T) {
        self.last = value;
    }
}

#[test]
fn coder_and_decoder_registers_agree() {
    let values: [u8;6] = [97,97,0,255,16,15];
    let mut enc: Delta<u8> = Delta::new();
    let mut dec: Delta<u8> = Delta::new();
    for v in values {
        let dt = enc.encode(v);
        assert_eq!(dec.decode(dt),v);
    }
}

#[test]
fn wrapping_differences() {
    let mut enc: Delta<u8> = Delta::new();
    assert_eq!(enc.encode(0x61),0x61);
    assert_eq!(enc.encode(0x00),0x9f);
    let mut enc: Delta<u16> = Delta::new();
    assert_eq!(enc.encode(5638),5638);
    assert_eq!(enc.encode(2),2u16.wrapping_sub(5638));
}
