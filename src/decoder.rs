// ABOUTME: High-performance BONJSON binary decoder.
// ABOUTME: Single-pass, push-based: walks a byte buffer once and dispatches typed events to a Visitor.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::error::Error;
use crate::types::{type_code, uleb128_decode, BigNumber, MAX_DEPTH};

/// Configuration for [`decode_with_config`].
#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    /// Maximum container nesting depth. May only tighten, never loosen,
    /// the compiled-in [`MAX_DEPTH`] array bound.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// Receives one event per decoded element.
///
/// The string method receives a borrowed slice into the original input
/// buffer; the visitor must copy the bytes if it needs them to outlive
/// the `decode` call. Any `Err` returned from a visitor method aborts
/// parsing immediately and is surfaced as [`Error::Application`].
pub trait Visitor {
    type Error;

    fn visit_null(&mut self) -> Result<(), Self::Error>;
    fn visit_bool(&mut self, value: bool) -> Result<(), Self::Error>;
    fn visit_i64(&mut self, value: i64) -> Result<(), Self::Error>;
    fn visit_u64(&mut self, value: u64) -> Result<(), Self::Error>;
    fn visit_f64(&mut self, value: f64) -> Result<(), Self::Error>;
    fn visit_big_number(&mut self, value: BigNumber) -> Result<(), Self::Error>;
    fn visit_str(&mut self, value: &[u8]) -> Result<(), Self::Error>;
    fn visit_begin_array(&mut self) -> Result<(), Self::Error>;
    fn visit_begin_object(&mut self) -> Result<(), Self::Error>;
    fn visit_end_container(&mut self) -> Result<(), Self::Error>;
    fn visit_end_data(&mut self) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Default)]
struct Frame {
    is_object: bool,
    is_expecting_name: bool,
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    stack: [Frame; MAX_DEPTH],
    depth: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    fn top(&self) -> Option<&Frame> {
        if self.depth == 0 {
            None
        } else {
            Some(&self.stack[self.depth - 1])
        }
    }

    #[inline]
    fn expecting_name(&self) -> bool {
        self.top().is_some_and(|f| f.is_object && f.is_expecting_name)
    }

    #[inline]
    fn after_value(&mut self) {
        if self.depth > 0 {
            let f = &mut self.stack[self.depth - 1];
            if f.is_object {
                f.is_expecting_name = !f.is_expecting_name;
            }
        }
    }

    fn push_frame<E>(&mut self, is_object: bool, max_depth: usize) -> Result<(), Error<E>> {
        if self.depth >= max_depth.min(MAX_DEPTH) {
            return Err(Error::ContainerDepthExceeded);
        }
        self.stack[self.depth] = Frame {
            is_object,
            is_expecting_name: is_object,
        };
        self.depth += 1;
        Ok(())
    }

    fn pop_frame<E>(&mut self) -> Result<(), Error<E>> {
        if self.depth == 0 {
            return Err(Error::UnbalancedContainers);
        }
        let frame = self.stack[self.depth - 1];
        if frame.is_object && !frame.is_expecting_name {
            return Err(Error::ExpectedObjectValue);
        }
        self.depth -= 1;
        Ok(())
    }

    #[inline]
    fn read_byte<E>(&mut self) -> Result<u8, Error<E>> {
        let byte = *self.data.get(self.pos).ok_or(Error::Incomplete)?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes<E>(&mut self, n: usize) -> Result<&'a [u8], Error<E>> {
        let end = self.pos.checked_add(n).ok_or(Error::Incomplete)?;
        if end > self.data.len() {
            return Err(Error::Incomplete);
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_unsigned<E>(&mut self, size: usize) -> Result<u64, Error<E>> {
        let bytes = self.read_bytes(size)?;
        let mut buf = [0u8; 8];
        buf[..size].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_signed<E>(&mut self, size: usize) -> Result<i64, Error<E>> {
        let bytes = self.read_bytes(size)?;
        let sign_bit = (bytes[size - 1] >> 7) & 1;
        let fill = if sign_bit == 1 { 0xffu8 } else { 0u8 };
        let mut buf = [fill; 8];
        buf[..size].copy_from_slice(bytes);
        Ok(i64::from_le_bytes(buf))
    }

    fn read_float16<E>(&mut self) -> Result<f64, Error<E>> {
        let bytes = self.read_bytes(2)?;
        let bits = u16::from_le_bytes([bytes[0], bytes[1]]);
        let f32_bits = u32::from(bits) << 16;
        check_float(f64::from(f32::from_bits(f32_bits)))
    }

    fn read_float32<E>(&mut self) -> Result<f64, Error<E>> {
        let bytes = self.read_bytes(4)?;
        check_float(f64::from(f32::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
        ])))
    }

    fn read_float64<E>(&mut self) -> Result<f64, Error<E>> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        check_float(f64::from_le_bytes(buf))
    }

    /// Scan forward for the long-string terminator. Does not advance the
    /// cursor on failure: the payload has not been consumed.
    fn read_long_string<E>(&mut self) -> Result<&'a [u8], Error<E>> {
        let start = self.pos;
        match memchr::memchr(type_code::STRING_TERMINATOR, &self.data[start..]) {
            Some(offset) => {
                self.pos = start + offset + 1;
                Ok(&self.data[start..start + offset])
            }
            None => Err(Error::Incomplete),
        }
    }

    fn read_uleb128<E>(&mut self) -> Result<u64, Error<E>> {
        let (value, consumed) = uleb128_decode(&self.data[self.pos..]).ok_or(Error::Incomplete)?;
        self.pos += consumed;
        Ok(value)
    }

    fn read_big_number<E>(&mut self) -> Result<BigNumber, Error<E>> {
        let header = self.read_uleb128()?;
        let sign: i8 = if header & 1 == 1 { -1 } else { 1 };
        let l_e = ((header >> 1) & 3) as usize;
        let l_s = (header >> 3) as usize;

        if l_s > 8 {
            return Err(Error::TooBig);
        }
        if l_s == 0 && l_e != 0 {
            return Err(Error::invalid_data("zero significand with nonzero exponent"));
        }

        let significand = if l_s > 0 {
            let bytes = self.read_bytes(l_s)?;
            let mut buf = [0u8; 8];
            buf[..l_s].copy_from_slice(bytes);
            u64::from_le_bytes(buf)
        } else {
            0
        };

        let exponent = if l_e > 0 {
            let bytes = self.read_bytes(l_e)?;
            let sign_bit = (bytes[l_e - 1] >> 7) & 1;
            let fill = if sign_bit == 1 { 0xffu8 } else { 0u8 };
            let mut buf = [fill; 4];
            buf[..l_e].copy_from_slice(bytes);
            i32::from_le_bytes(buf)
        } else {
            0
        };

        BigNumber::new(sign, significand, exponent)
    }
}

fn check_float<E>(value: f64) -> Result<f64, Error<E>> {
    if value.is_nan() || value.is_infinite() {
        return Err(Error::invalid_data("non-finite float"));
    }
    Ok(value)
}

/// Parse `data` in one pass, dispatching each element to `visitor`.
///
/// Returns `(bytes_consumed, result)`. `bytes_consumed` is always
/// accurate, whether or not parsing succeeded, so the caller can
/// distinguish truncation from corruption and retry with more data.
pub fn decode<V: Visitor>(data: &[u8], visitor: &mut V) -> (usize, Result<(), Error<V::Error>>) {
    decode_with_config(data, visitor, DecoderConfig::default())
}

/// Like [`decode`], but with an explicit [`DecoderConfig`].
pub fn decode_with_config<V: Visitor>(
    data: &[u8],
    visitor: &mut V,
    config: DecoderConfig,
) -> (usize, Result<(), Error<V::Error>>) {
    let mut cursor = Cursor {
        data,
        pos: 0,
        stack: [Frame::default(); MAX_DEPTH],
        depth: 0,
    };
    let result = run(&mut cursor, visitor, config.max_depth);
    (cursor.pos, result)
}

fn run<V: Visitor>(
    cursor: &mut Cursor,
    visitor: &mut V,
    max_depth: usize,
) -> Result<(), Error<V::Error>> {
    while cursor.pos < cursor.data.len() {
        step(cursor, visitor, max_depth)?;
    }
    if cursor.depth > 0 {
        return Err(Error::UnclosedContainers);
    }
    visitor.visit_end_data().map_err(Error::Application)
}

fn step<V: Visitor>(
    cursor: &mut Cursor,
    visitor: &mut V,
    max_depth: usize,
) -> Result<(), Error<V::Error>> {
    let tc = cursor.read_byte()?;

    if cursor.expecting_name() {
        let is_legal_name = type_code::is_short_string(tc)
            || tc == type_code::STRING_LONG
            || tc == type_code::CONTAINER_END;
        if !is_legal_name {
            return Err(Error::ExpectedObjectName);
        }
    }

    if type_code::is_small_int(tc) {
        visitor
            .visit_i64(type_code::small_int_value(tc))
            .map_err(Error::Application)?;
        cursor.after_value();
        return Ok(());
    }

    if type_code::is_unsigned_int(tc) {
        let v = cursor.read_unsigned(type_code::unsigned_int_size(tc))?;
        visitor.visit_u64(v).map_err(Error::Application)?;
        cursor.after_value();
        return Ok(());
    }

    if type_code::is_signed_int(tc) {
        let v = cursor.read_signed(type_code::signed_int_size(tc))?;
        visitor.visit_i64(v).map_err(Error::Application)?;
        cursor.after_value();
        return Ok(());
    }

    if type_code::is_short_string(tc) {
        let bytes = cursor.read_bytes(type_code::short_string_len(tc))?;
        visitor.visit_str(bytes).map_err(Error::Application)?;
        cursor.after_value();
        return Ok(());
    }

    match tc {
        type_code::FLOAT16 => {
            let v = cursor.read_float16()?;
            visitor.visit_f64(v).map_err(Error::Application)?;
            cursor.after_value();
        }
        type_code::FLOAT32 => {
            let v = cursor.read_float32()?;
            visitor.visit_f64(v).map_err(Error::Application)?;
            cursor.after_value();
        }
        type_code::FLOAT64 => {
            let v = cursor.read_float64()?;
            visitor.visit_f64(v).map_err(Error::Application)?;
            cursor.after_value();
        }
        type_code::FALSE => {
            visitor.visit_bool(false).map_err(Error::Application)?;
            cursor.after_value();
        }
        type_code::TRUE => {
            visitor.visit_bool(true).map_err(Error::Application)?;
            cursor.after_value();
        }
        type_code::STRING_LONG => {
            let bytes = cursor.read_long_string()?;
            visitor.visit_str(bytes).map_err(Error::Application)?;
            cursor.after_value();
        }
        type_code::BIG_NUMBER => {
            let bn = cursor.read_big_number()?;
            visitor.visit_big_number(bn).map_err(Error::Application)?;
            cursor.after_value();
        }
        type_code::ARRAY => {
            cursor.push_frame(false, max_depth)?;
            visitor.visit_begin_array().map_err(Error::Application)?;
        }
        type_code::OBJECT => {
            cursor.push_frame(true, max_depth)?;
            visitor.visit_begin_object().map_err(Error::Application)?;
        }
        type_code::CONTAINER_END => {
            cursor.pop_frame()?;
            visitor.visit_end_container().map_err(Error::Application)?;
            cursor.after_value();
        }
        type_code::NULL => {
            visitor.visit_null().map_err(Error::Application)?;
            cursor.after_value();
        }
        _ => return Err(Error::invalid_type_code(tc)),
    }
    Ok(())
}
