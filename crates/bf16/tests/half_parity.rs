use actlut_bf16::Bf16;
use half::bf16;

#[test]
fn test_encode_matches_half_for_finite_values() {
    // Walk every upper half with a spread of tails, covering ties on both parities
    let tails = [0x0000u16, 0x0001, 0x7FFF, 0x8000, 0x8001, 0xFFFF];
    for upper in (0u32..=0xFFFF).step_by(7) {
        for &tail in &tails {
            let x = f32::from_bits((upper << 16) | tail as u32);
            if !x.is_finite() {
                continue;
            }
            let ours = Bf16::from_f32(x).to_bits();
            let theirs = bf16::from_f32(x).to_bits();
            assert_eq!(ours, theirs, "x bits {:#010x}", x.to_bits());
        }
    }
}

#[test]
fn test_decode_matches_half() {
    for code in (0u16..=0xFFFF).step_by(13) {
        let ours = Bf16::from_bits(code).to_f32();
        let theirs = bf16::from_bits(code).to_f32();
        if ours.is_nan() {
            assert!(theirs.is_nan());
        } else {
            assert_eq!(ours.to_bits(), theirs.to_bits(), "code {:#06x}", code);
        }
    }
}

#[test]
fn test_encode_of_decode_is_identity_for_all_codes() {
    for code in 0u16..=0xFFFF {
        let decoded = Bf16::from_bits(code).to_f32();
        assert_eq!(Bf16::from_f32(decoded).to_bits(), code, "code {:#06x}", code);
    }
}

#[test]
fn test_known_values() {
    assert_eq!(Bf16::from_f32(1.0).to_bits(), 0x3F80);
    assert_eq!(Bf16::from_bits(0x3F80).to_f32(), 1.0);
    assert_eq!(Bf16::from_f32(0.0).to_f32(), 0.0);
    assert_eq!(Bf16::from_f32(-2.0).to_bits(), 0xC000);
}
