use psocapture::{Result, ScratchArena};

#[test]
fn test_values_survive_block_growth() -> Result<()> {
    let arena = ScratchArena::with_block_size(64);

    let first = arena.alloc(0xdead_beef_u32)?;
    let words = arena.alloc_slice_copy(&[1u64, 2, 3, 4, 5, 6, 7, 8])?;
    let name = arena.alloc_str("main")?;
    let large = arena.alloc_slice_fill_with(100, |i| Ok(i as u32))?;

    assert!(arena.block_count() > 1, "64-byte blocks must have grown");
    assert_eq!(*first, 0xdead_beef);
    assert_eq!(words, &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(name, "main");
    assert_eq!(large.len(), 100);
    assert_eq!(large[99], 99);
    Ok(())
}

#[test]
fn test_alignment_is_honoured() -> Result<()> {
    let arena = ScratchArena::with_block_size(256);
    let _pad = arena.alloc(1u8)?;
    let wide = arena.alloc(7u64)?;
    assert_eq!((wide as *const u64 as usize) % std::mem::align_of::<u64>(), 0);

    let raw = arena.allocate(3, 64)?;
    assert_eq!(raw.as_ptr() as usize % 64, 0);
    assert_eq!(raw.len(), 3);
    Ok(())
}

#[test]
fn test_cleared_allocation_is_zeroed() -> Result<()> {
    let arena = ScratchArena::new();
    let bytes = arena.allocate_cleared(32, 8)?;
    assert!(bytes.iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn test_zero_size_requests_do_not_allocate() -> Result<()> {
    let arena = ScratchArena::new();
    assert!(arena.allocate(0, 8)?.is_empty());
    assert!(arena.alloc_slice_copy::<u32>(&[])?.is_empty());
    assert_eq!(arena.alloc_str("")?, "");
    assert_eq!(arena.block_count(), 0);
    Ok(())
}

#[test]
fn test_nested_fill_may_allocate() -> Result<()> {
    let arena = ScratchArena::with_block_size(32);
    let rows = arena.alloc_slice_fill_with(4, |i| {
        let row: &[u32] = arena.alloc_slice_fill_with(i + 1, |j| Ok((i * 10 + j) as u32))?;
        Ok(row)
    })?;

    assert_eq!(rows[0], &[0]);
    assert_eq!(rows[3], &[30, 31, 32, 33]);
    Ok(())
}

#[test]
fn test_fill_error_is_propagated() {
    let arena = ScratchArena::new();
    let result = arena.alloc_slice_fill_with(3, |i| {
        if i == 2 {
            Err(psocapture::CaptureError::Internal("stop".into()))
        } else {
            Ok(i)
        }
    });
    assert!(matches!(result, Err(psocapture::CaptureError::Internal(_))));
}

#[test]
fn test_reset_releases_every_block() -> Result<()> {
    let mut arena = ScratchArena::with_block_size(16);
    for i in 0..32u64 {
        arena.alloc(i)?;
    }
    assert!(arena.allocated_bytes() >= 32 * 8);
    assert!(arena.capacity() >= arena.allocated_bytes());

    arena.reset();
    assert_eq!(arena.block_count(), 0);
    assert_eq!(arena.allocated_bytes(), 0);

    assert_eq!(*arena.alloc(5u8)?, 5);
    Ok(())
}
