use std::fmt::Debug;

use num_traits::{Bounded, Num, NumCast, ToPrimitive};

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Every coordinate type names
/// a widened accumulator [`IndexableNum::Acc`] in which squared distances are computed, so that
/// summing squared differences over many axes neither overflows integer coordinates nor loses
/// precision on `f32` coordinates.
pub trait IndexableNum:
    private::Sealed
    + Num
    + NumCast
    + ToPrimitive
    + PartialOrd
    + Debug
    + Send
    + Sync
    + bytemuck::Pod
    + Bounded
{
    /// Widened type for squared distances.
    ///
    /// `i8`, `u8`, `i16` and `u16` widen to `i64`; `i32`, `u32`, `i64` and `u64` widen to
    /// `i128`; `f32` and `f64` widen to `f64`. Integer accumulators are signed, so differences of
    /// unsigned coordinates never underflow.
    ///
    /// For 64-bit coordinates the sum of squared per-axis spans must stay below `i128::MAX`,
    /// which holds while every span is below `2^63 / sqrt(K)`.
    type Acc: Num + PartialOrd + Copy + Default + Debug + Send + Sync;

    /// Convert a coordinate to the accumulator type.
    fn widen(self) -> Self::Acc;

    /// `false` for values that are not comparable to themselves (floating point NaN).
    #[inline]
    fn is_comparable(self) -> bool {
        self.partial_cmp(&self).is_some()
    }
}

macro_rules! impl_indexable_num {
    ($($t:ty => $acc:ty),* $(,)?) => {
        $(
            impl IndexableNum for $t {
                type Acc = $acc;

                #[inline]
                fn widen(self) -> Self::Acc {
                    <$acc as From<$t>>::from(self)
                }
            }
        )*
    };
}

impl_indexable_num!(
    i8 => i64,
    u8 => i64,
    i16 => i64,
    u16 => i64,
    i32 => i128,
    u32 => i128,
    i64 => i128,
    u64 => i128,
    f32 => f64,
    f64 => f64,
);

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for i64 {}
    impl Sealed for u64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
