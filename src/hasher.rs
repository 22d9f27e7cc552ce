//! Deterministic, order-sensitive content hashing.
//!
//! The accumulator is a 64-bit FNV-style fold: `state = (state * PRIME) ^ input`
//! applied left to right. It never looks at memory addresses, so two create-infos
//! with the same field values (and the same child hashes, in the same order)
//! always hash identically across processes and platforms.

/// A 64-bit content hash, the canonical identity of a recorded object.
pub type Hash = u64;

const SEED: u64 = 0xcbf2_9ce4_8422_2325;
const PRIME: u64 = 0x0000_0100_0000_01b3;

/// Folded before and after every string so that `""` differs from no string
/// at all, and `("ab", "c")` differs from `("a", "bc")`.
const STRING_SENTINEL: u32 = 0xff;

/// Element types that can be folded by [`Hasher::data`].
pub trait HashWord: Copy {
    /// The value folded into the state.
    fn widen(self) -> u64;
}

macro_rules! impl_hash_word {
    ($($t:ty),*) => {
        $(
            impl HashWord for $t {
                fn widen(self) -> u64 {
                    u64::from(self)
                }
            }
        )*
    };
}

impl_hash_word!(u8, u16, u32, u64);

/// Streaming content hasher.
///
/// ```rust
/// use psocapture::Hasher;
///
/// let mut a = Hasher::new();
/// a.u32(1);
/// a.string("main");
///
/// let mut b = Hasher::new();
/// b.u32(1);
/// b.string("main");
///
/// assert_eq!(a.get(), b.get());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hasher {
    state: u64,
}

impl Hasher {
    /// Creates a hasher seeded with the fixed default constant.
    pub fn new() -> Self {
        Self { state: SEED }
    }

    /// Creates a hasher continuing from a previous hash value.
    pub fn with_seed(seed: Hash) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn fold(&mut self, value: u64) {
        self.state = self.state.wrapping_mul(PRIME) ^ value;
    }

    /// Folds an unsigned 32-bit value.
    #[inline]
    pub fn u32(&mut self, value: u32) {
        self.fold(u64::from(value));
    }

    /// Folds a signed 32-bit value, reinterpreted as unsigned.
    #[inline]
    pub fn s32(&mut self, value: i32) {
        self.u32(value as u32);
    }

    /// Folds a float through its IEEE-754 bit pattern.
    #[inline]
    pub fn f32(&mut self, value: f32) {
        self.u32(value.to_bits());
    }

    /// Folds a boolean as `0` or `1`.
    #[inline]
    pub fn bool(&mut self, value: bool) {
        self.u32(u32::from(value));
    }

    /// Folds a 64-bit value as its low word followed by its high word.
    #[inline]
    pub fn u64(&mut self, value: u64) {
        self.u32((value & 0xffff_ffff) as u32);
        self.u32((value >> 32) as u32);
    }

    /// Folds every element of a typed array, in order.
    ///
    /// The element count is implied by the slice; the length itself is not
    /// folded, callers that need it hash it explicitly.
    pub fn data<T: HashWord>(&mut self, data: &[T]) {
        for &word in data {
            self.fold(word.widen());
        }
    }

    /// Folds a UTF-8 string byte by byte, framed by a sentinel on each side.
    pub fn string(&mut self, value: &str) {
        self.u32(STRING_SENTINEL);
        for byte in value.bytes() {
            self.u32(u32::from(byte));
        }
        self.u32(STRING_SENTINEL);
    }

    /// The current hash value.
    pub fn get(&self) -> Hash {
        self.state
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}
