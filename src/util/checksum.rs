use crate::model::CharEncoding;

/// Integer units the checksums consume, in input order.
pub fn units(input: &str, encoding: CharEncoding) -> Vec<u32> {
    match encoding {
        CharEncoding::Utf16 => input.encode_utf16().map(u32::from).collect(),
        CharEncoding::Scalar => input.chars().map(u32::from).collect(),
    }
}

/// Rolling `h = h * 31 + unit` over 32-bit two's-complement wrapping
/// arithmetic, written as `(h << 5) - h + unit`.
pub fn rolling_checksum<I>(units: I) -> i32
where
    I: IntoIterator<Item = u32>,
{
    units.into_iter().fold(0i32, |h, unit| {
        // Units never exceed 0x10FFFF, so the cast is lossless.
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32)
    })
}

/// Forward and backward checksums of `input`.
pub fn forward_backward(input: &str, encoding: CharEncoding) -> (i32, i32) {
    let units = units(input, encoding);
    let forward = rolling_checksum(units.iter().copied());
    let backward = rolling_checksum(units.iter().rev().copied());
    (forward, backward)
}

/// Absolute value as 8 lowercase hex digits. `i32::MIN` renders as `80000000`.
pub fn render_checksum(h: i32) -> String {
    format!("{:08x}", h.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(forward_backward("", CharEncoding::Utf16), (0, 0));
    }

    #[test]
    fn single_unit_is_its_code() {
        assert_eq!(rolling_checksum([97]), 97);
    }

    #[test]
    fn multiplies_by_thirty_one() {
        // 'A' * 31 + 'a'
        assert_eq!(rolling_checksum("Aa".encode_utf16().map(u32::from)), 2112);
    }

    #[test]
    fn wraps_instead_of_overflowing() {
        let long = "z".repeat(64);
        let (forward, backward) = forward_backward(&long, CharEncoding::Utf16);
        assert_eq!(forward, backward);
        assert_eq!(forward, rolling_checksum(long.bytes().map(u32::from)));
    }

    #[test]
    fn known_checksums() {
        assert_eq!(
            forward_backward("user_2example1", CharEncoding::Utf16),
            (-968708411, -729995429)
        );
    }

    #[test]
    fn renders_absolute_value_zero_padded() {
        assert_eq!(render_checksum(0), "00000000");
        assert_eq!(render_checksum(97), "00000061");
        assert_eq!(render_checksum(-97), "00000061");
        assert_eq!(render_checksum(i32::MIN), "80000000");
        assert_eq!(render_checksum(i32::MAX), "7fffffff");
    }

    #[test]
    fn encodings_differ_outside_the_bmp() {
        assert_eq!(units("😀", CharEncoding::Utf16), vec![0xd83d, 0xde00]);
        assert_eq!(units("😀", CharEncoding::Scalar), vec![0x1f600]);
        assert_eq!(
            units("Т", CharEncoding::Utf16),
            units("Т", CharEncoding::Scalar)
        );
    }
}
