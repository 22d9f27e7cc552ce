use proptest::prelude::*;
use psocapture::hashing::{compute_hash_sampler, compute_hash_shader_module};
use psocapture::{Hasher, SamplerCreateInfo, ShaderModuleCreateInfo};

const SEED: u64 = 0xcbf2_9ce4_8422_2325;
const PRIME: u64 = 0x0000_0100_0000_01b3;

#[test]
fn test_fresh_hasher_reports_seed() {
    assert_eq!(Hasher::new().get(), SEED);
    assert_eq!(Hasher::default().get(), SEED);
    assert_eq!(Hasher::with_seed(42).get(), 42);
}

#[test]
fn test_fold_is_multiply_then_xor() {
    let mut h = Hasher::new();
    h.u32(5);
    assert_eq!(h.get(), SEED.wrapping_mul(PRIME) ^ 5);

    h.u32(7);
    assert_eq!(h.get(), (SEED.wrapping_mul(PRIME) ^ 5).wrapping_mul(PRIME) ^ 7);
}

#[test]
fn test_u64_folds_low_word_first() {
    let mut wide = Hasher::new();
    wide.u64(0x1111_2222_3333_4444);

    let mut split = Hasher::new();
    split.u32(0x3333_4444);
    split.u32(0x1111_2222);

    assert_eq!(wide.get(), split.get());
}

#[test]
fn test_scalars_share_the_u32_path() {
    let mut a = Hasher::new();
    a.s32(-1);
    a.bool(true);
    a.f32(1.0);

    let mut b = Hasher::new();
    b.u32(u32::MAX);
    b.u32(1);
    b.u32(1.0f32.to_bits());

    assert_eq!(a.get(), b.get());
}

#[test]
fn test_signed_zero_hashes_differently() {
    let mut pos = Hasher::new();
    pos.f32(0.0);
    let mut neg = Hasher::new();
    neg.f32(-0.0);
    assert_ne!(pos.get(), neg.get());
}

#[test]
fn test_string_framing() {
    let mut split_ab = Hasher::new();
    split_ab.string("ab");
    split_ab.string("c");

    let mut split_bc = Hasher::new();
    split_bc.string("a");
    split_bc.string("bc");

    assert_ne!(split_ab.get(), split_bc.get());

    let mut empty = Hasher::new();
    empty.string("");
    assert_ne!(empty.get(), Hasher::new().get());

    let mut framed = Hasher::new();
    framed.u32(0xff);
    framed.u32(u32::from(b'x'));
    framed.u32(0xff);
    let mut string = Hasher::new();
    string.string("x");
    assert_eq!(framed.get(), string.get());
}

#[test]
fn test_data_folds_elements_without_length() {
    let mut bytes = Hasher::new();
    bytes.data(&[1u8, 2, 3]);

    let mut words = Hasher::new();
    words.data(&[1u32, 2, 3]);

    assert_eq!(bytes.get(), words.get());
}

#[test]
fn test_identical_infos_hash_identically() {
    let info = SamplerCreateInfo {
        mag_filter: 1,
        max_lod: 4.0,
        ..Default::default()
    };
    let copy = info;
    assert_eq!(compute_hash_sampler(&info), compute_hash_sampler(&copy));
}

#[test]
fn test_shader_module_hash_covers_code_length() {
    let short = ShaderModuleCreateInfo {
        flags: 0,
        code: &[1, 2],
    };
    let long = ShaderModuleCreateInfo {
        flags: 0,
        code: &[1, 2, 0],
    };
    assert_ne!(
        compute_hash_shader_module(&short),
        compute_hash_shader_module(&long)
    );
}

proptest! {
    #[test]
    fn prop_sampler_hash_sees_every_filter_change(a in any::<u32>(), b in any::<u32>()) {
        prop_assume!(a != b);
        let left = SamplerCreateInfo { min_filter: a, ..Default::default() };
        let right = SamplerCreateInfo { min_filter: b, ..Default::default() };
        prop_assert_ne!(compute_hash_sampler(&left), compute_hash_sampler(&right));
    }

    #[test]
    fn prop_hash_is_order_sensitive(words in proptest::collection::vec(any::<u32>(), 2..16)) {
        let mut reversed = words.clone();
        reversed.reverse();
        prop_assume!(reversed != words);

        let mut forward = Hasher::new();
        forward.data(&words);
        let mut backward = Hasher::new();
        backward.data(&reversed);
        prop_assert_ne!(forward.get(), backward.get());
    }
}
