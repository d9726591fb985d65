use std::marker::PhantomData;

use byteorder::ByteOrder;

/// Последовательная запись полей фиксированной ширины.
pub struct FieldWriter<B: ByteOrder> {
    buf: Vec<u8>,
    _order: PhantomData<B>,
}

impl<B: ByteOrder> FieldWriter<B> {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            buf: Vec::with_capacity(n),
            _order: PhantomData,
        }
    }

    pub fn u8(
        &mut self,
        val: u8,
    ) -> &mut Self {
        self.buf.push(val);
        self
    }

    pub fn u32(
        &mut self,
        val: u32,
    ) -> &mut Self {
        let mut b = [0u8; 4];
        B::write_u32(&mut b, val);
        self.buf.extend_from_slice(&b);
        self
    }

    pub fn u64(
        &mut self,
        val: u64,
    ) -> &mut Self {
        let mut b = [0u8; 8];
        B::write_u64(&mut b, val);
        self.buf.extend_from_slice(&b);
        self
    }

    pub fn f32(
        &mut self,
        val: f32,
    ) -> &mut Self {
        let mut b = [0u8; 4];
        B::write_f32(&mut b, val);
        self.buf.extend_from_slice(&b);
        self
    }

    pub fn zeros(
        &mut self,
        n: usize,
    ) -> &mut Self {
        self.buf.resize(self.buf.len() + n, 0);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
