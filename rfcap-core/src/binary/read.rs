use std::marker::PhantomData;

use byteorder::ByteOrder;
use rfcap_types::{CapError, CapResult};

/// Последовательное чтение полей фиксированной ширины из буфера заголовка.
///
/// Выход за конец буфера — [`CapError::HeaderRead`] с ожидаемой длиной.
pub struct FieldReader<'a, B: ByteOrder> {
    buf: &'a [u8],
    off: usize,
    _order: PhantomData<B>,
}

impl<'a, B: ByteOrder> FieldReader<'a, B> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            off: 0,
            _order: PhantomData,
        }
    }

    /// Текущее смещение от начала буфера.
    pub fn offset(&self) -> usize {
        self.off
    }

    fn take(
        &mut self,
        n: usize,
    ) -> CapResult<&'a [u8]> {
        let end = self.off + n;
        if end > self.buf.len() {
            return Err(CapError::header_read(end, self.buf.len()));
        }
        let b = &self.buf[self.off..end];
        self.off = end;
        Ok(b)
    }

    pub fn u8(&mut self) -> CapResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> CapResult<u32> {
        Ok(B::read_u32(self.take(4)?))
    }

    pub fn u64(&mut self) -> CapResult<u64> {
        Ok(B::read_u64(self.take(8)?))
    }

    pub fn f32(&mut self) -> CapResult<f32> {
        Ok(B::read_f32(self.take(4)?))
    }

    pub fn skip(
        &mut self,
        n: usize,
    ) -> CapResult<()> {
        self.take(n).map(|_| ())
    }
}
