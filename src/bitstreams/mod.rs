use std::io::{self, Read, Seek, SeekFrom, Write};

/// Byte capacity of a bit stream buffer unless configured otherwise.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;
/// Widest request a single `read_some`/`write_some` call accepts.
pub const MAX_REQUEST_BITS: usize = 32;
/// Smallest buffer that still fits a maximal request plus a partial byte.
pub const MIN_BUFFER_SIZE: usize = 8;

const CHAR_SIZE: usize = 8;

#[inline(always)]
fn mask(len: usize) -> u32 {
    ((1u64 << len) - 1) as u32
}

/// A fixed-size byte buffer with a bit-granularity cursor.
///
/// Bits inside each byte are stored MSB-first. `bit_pointer` is always in `0..8`.
#[derive(Clone, Debug)]
pub struct BitStream {
    buffer: Box<[u8]>,
    buffer_pointer: usize,
    bit_pointer: usize,
    buffer_current_size: usize,
}

impl BitStream {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity >= MIN_BUFFER_SIZE,
            "A bit stream buffer needs at least {} bytes, got {}",
            MIN_BUFFER_SIZE,
            capacity
        );

        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            buffer_pointer: 0,
            bit_pointer: 0,
            buffer_current_size: 0,
        }
    }

    /// Bits between the cursor and the end of the valid bytes.
    #[inline(always)]
    fn available_bits(&self) -> usize {
        (self.buffer_current_size - self.buffer_pointer) * CHAR_SIZE - self.bit_pointer
    }

    #[inline(always)]
    fn advance(&mut self, len: usize) {
        self.bit_pointer += len;
        if self.bit_pointer == CHAR_SIZE {
            self.buffer_pointer += 1;
            self.bit_pointer = 0;
        }
    }

    fn reset(&mut self) {
        self.buffer_pointer = 0;
        self.bit_pointer = 0;
        self.buffer_current_size = 0;
    }
}

/// Pulls bits out of a byte source on demand.
pub struct BitReader<R> {
    stream: BitStream,
    input: R,
    read_bits: usize,
}

impl<R: Read> BitReader<R> {
    pub fn new(input: R) -> Self {
        Self::with_capacity(input, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(input: R, capacity: usize) -> Self {
        Self {
            stream: BitStream::with_capacity(capacity),
            input,
            read_bits: 0,
        }
    }

    /// Number of bits handed out since creation or the last [`restore`](BitReader::restore).
    pub fn read_bits(&self) -> usize {
        self.read_bits
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Reads `count` bits and returns them packed big-endian in the low bits of the result.
    ///
    /// Returns `Ok(None)` when the source runs dry before `count` bits are available; in
    /// that case nothing is consumed and the reader stays where it was.
    ///
    /// # Panics
    ///
    /// If `count` is not in `1..=32`.
    pub fn read_some(&mut self, count: usize) -> io::Result<Option<u32>> {
        assert!(
            (1..=MAX_REQUEST_BITS).contains(&count),
            "Cannot read {} bits at once, a request must be 1 to {} bits",
            count,
            MAX_REQUEST_BITS
        );

        if self.stream.available_bits() < count && !self.refill(count)? {
            return Ok(None);
        }

        let mut answer = 0u32;
        let mut read = 0;

        while read < count {
            let current_read = (count - read).min(CHAR_SIZE - self.stream.bit_pointer);
            let byte = self.stream.buffer[self.stream.buffer_pointer] as u32;
            let bits = (byte >> (CHAR_SIZE - self.stream.bit_pointer - current_read)) & mask(current_read);

            answer = (answer << current_read) | bits;
            read += current_read;
            self.stream.advance(current_read);
        }

        self.read_bits += count;
        Ok(Some(answer))
    }

    /// Moves the unread bytes to the front of the buffer and reads from the source until
    /// at least `count` bits are buffered. Returns `false` if the source is exhausted first.
    fn refill(&mut self, count: usize) -> io::Result<bool> {
        let stream = &mut self.stream;

        stream
            .buffer
            .copy_within(stream.buffer_pointer..stream.buffer_current_size, 0);
        stream.buffer_current_size -= stream.buffer_pointer;
        stream.buffer_pointer = 0;

        while stream.available_bits() < count {
            let read = match self.input.read(&mut stream.buffer[stream.buffer_current_size..]) {
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if read == 0 {
                return Ok(false);
            }

            stream.buffer_current_size += read;
        }

        Ok(true)
    }
}

impl<R: Read + Seek> BitReader<R> {
    /// Rewinds to the beginning of the underlying source for another pass.
    pub fn restore(&mut self) -> io::Result<()> {
        self.input.seek(SeekFrom::Start(0))?;
        self.stream.reset();
        self.read_bits = 0;
        Ok(())
    }
}

/// Accumulates bits and pushes whole bytes to a byte sink.
pub struct BitWriter<W: Write> {
    stream: BitStream,
    output: W,
    written_bits: usize,
}

impl<W: Write> BitWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(output, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(output: W, capacity: usize) -> Self {
        let mut stream = BitStream::with_capacity(capacity);
        stream.buffer_current_size = capacity;

        Self {
            stream,
            output,
            written_bits: 0,
        }
    }

    /// Number of bits accepted so far, padding excluded.
    pub fn written_bits(&self) -> usize {
        self.written_bits
    }

    /// Returns the sink. Bits not yet [`flush`](BitWriter::flush)ed are lost.
    pub fn into_inner(self) -> W {
        self.output
    }

    /// Appends the low `size` bits of `target`, most significant first.
    ///
    /// # Panics
    ///
    /// If `size` is not in `1..=32`.
    pub fn write_some(&mut self, target: u32, size: usize) -> io::Result<()> {
        assert!(
            (1..=MAX_REQUEST_BITS).contains(&size),
            "Cannot write {} bits at once, a request must be 1 to {} bits",
            size,
            MAX_REQUEST_BITS
        );

        let mut put = 0;

        while put < size {
            if self.stream.buffer_pointer == self.stream.buffer_current_size {
                self.free_buffer()?;
            }

            let current_put = (size - put).min(CHAR_SIZE - self.stream.bit_pointer);
            let bits = (target >> (size - put - current_put)) & mask(current_put);

            let pointer = self.stream.buffer_pointer;
            if self.stream.bit_pointer == 0 {
                self.stream.buffer[pointer] = 0;
            }
            let byte = self.stream.buffer[pointer] as u32;
            self.stream.buffer[pointer] = ((byte << current_put) | bits) as u8;

            put += current_put;
            self.stream.advance(current_put);
        }

        self.written_bits += size;
        Ok(())
    }

    /// Writes out every buffered bit. A trailing partial byte is left-justified and
    /// zero-padded. Call once, after the last bit of the archive.
    pub fn flush(&mut self) -> io::Result<()> {
        self.free_buffer()?;

        if self.stream.bit_pointer != 0 {
            let last = self.stream.buffer[0] << (CHAR_SIZE - self.stream.bit_pointer);
            self.output.write_all(&[last])?;
            self.stream.buffer[0] = 0;
            self.stream.bit_pointer = 0;
        }

        self.output.flush()
    }

    /// Writes the completed bytes and carries the partial byte over to position 0.
    fn free_buffer(&mut self) -> io::Result<()> {
        let pointer = self.stream.buffer_pointer;
        if pointer == 0 {
            return Ok(());
        }

        self.output.write_all(&self.stream.buffer[..pointer])?;

        if self.stream.bit_pointer != 0 {
            self.stream.buffer[0] = self.stream.buffer[pointer];
        }
        self.stream.buffer_pointer = 0;

        Ok(())
    }
}
