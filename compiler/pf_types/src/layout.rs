//! Size and alignment arithmetic for class field layout.

/// Size of a reference slot on the host.
pub const POINTER_SIZE: usize = std::mem::size_of::<usize>();

/// Size and alignment of a slot. Alignment is always a power of two.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    pub size: usize,
    pub align: usize,
}

impl Layout {
    pub const fn new(size: usize, align: usize) -> Self {
        Layout { size, align }
    }
}

/// Round `offset` up to the next multiple of `align`.
#[inline]
pub const fn align_up(offset: usize, align: usize) -> usize {
    let mask = align - 1;
    (offset + mask) & !mask
}
