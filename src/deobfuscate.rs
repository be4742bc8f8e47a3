//! Link de-obfuscation primitive
//!
//! The platform hides outbound link URLs behind a CSS class token: an element
//! carries the marker class `JvCare` plus a second class that is the encoded
//! URL. The encoding is a base-16-like nibble-pair scheme over a fixed
//! 16-symbol alphabet in a non-standard order. For each pair of payload
//! symbols, `index(c1) * 16 + index(c2)` is the character code of one decoded
//! character.
//!
//! The alphabet is a platform constant, not derivable from the scheme itself.
//! Any transcription error silently corrupts every decoded link, so it is
//! pinned here and covered by round-trip tests.
//!
//! # Examples
//!
//! ```rust
//! use jvcode::deobfuscate::decode;
//!
//! // "45" decodes to 'h' (6 * 16 + 8 = 104)
//! assert_eq!(decode("45").unwrap(), "h");
//! ```

use crate::error::DecodeError;

/// The platform's obfuscation alphabet. Digits and hex-like letters in a
/// custom order; NOT standard hexadecimal.
pub const OBFUSCATION_ALPHABET: &str = "0A12B34C56D78E9F";

/// Decode an obfuscated link payload into a URL
///
/// # Arguments
///
/// * `payload` - The encoded class token (e.g. `"45CBCBC02D1F1FC5"`)
///
/// # Errors
///
/// - [`DecodeError::OddLength`] if the payload does not split into pairs
/// - [`DecodeError::UnknownSymbol`] if a character is not in the alphabet
///
/// # Examples
///
/// ```rust
/// use jvcode::deobfuscate::decode;
///
/// assert_eq!(decode("45CBCBC02D1F1FC5").unwrap(), "http://x");
/// assert!(decode("45C").is_err());
/// assert!(decode("zz").is_err());
/// ```
pub fn decode(payload: &str) -> Result<String, DecodeError> {
    let symbols: Vec<char> = payload.chars().collect();
    if symbols.len() % 2 != 0 {
        return Err(DecodeError::OddLength(symbols.len()));
    }

    let mut url = String::with_capacity(symbols.len() / 2);
    for pair in symbols.chunks_exact(2) {
        let high = symbol_index(pair[0])?;
        let low = symbol_index(pair[1])?;
        // Indices are < 16, so the code is always < 256 and maps to a
        // Latin-1 character directly.
        url.push(char::from((high * 16 + low) as u8));
    }
    Ok(url)
}

/// Encode a URL with the inverse of the obfuscation scheme
///
/// The platform performs encoding server-side; this inverse exists to build
/// test vectors for [`decode`]. Characters above U+00FF are not representable
/// by the nibble-pair scheme and yield `None`.
pub fn encode(url: &str) -> Option<String> {
    let alphabet: Vec<char> = OBFUSCATION_ALPHABET.chars().collect();
    let mut payload = String::with_capacity(url.len() * 2);
    for ch in url.chars() {
        let code = u32::from(ch);
        if code > 0xFF {
            return None;
        }
        payload.push(alphabet[(code / 16) as usize]);
        payload.push(alphabet[(code % 16) as usize]);
    }
    Some(payload)
}

fn symbol_index(symbol: char) -> Result<usize, DecodeError> {
    OBFUSCATION_ALPHABET
        .find(symbol)
        .ok_or(DecodeError::UnknownSymbol(symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_single_pair() {
        // 'h' is 104 = 6 * 16 + 8; alphabet[6] = '4', alphabet[8] = '5'
        assert_eq!(decode("45").unwrap(), "h");
    }

    #[test]
    fn test_decode_known_url() {
        assert_eq!(decode("45CBCBC02D1F1FC5").unwrap(), "http://x");
    }

    #[test]
    fn test_decode_empty_payload() {
        assert_eq!(decode("").unwrap(), "");
    }

    #[test]
    fn test_decode_odd_length() {
        assert_eq!(decode("45C"), Err(DecodeError::OddLength(3)));
    }

    #[test]
    fn test_decode_unknown_symbol() {
        assert_eq!(decode("4z"), Err(DecodeError::UnknownSymbol('z')));
    }

    #[test]
    fn test_decode_lowercase_rejected() {
        // The alphabet is uppercase only; lowercase class tokens are not
        // payloads and must not decode silently.
        assert!(decode("ab").is_err());
    }

    #[test]
    fn test_encode_rejects_non_latin1() {
        assert!(encode("héllo").is_some());
        assert!(encode("世界").is_none());
    }

    #[test]
    fn test_alphabet_is_a_permutation_of_16_symbols() {
        let mut symbols: Vec<char> = OBFUSCATION_ALPHABET.chars().collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), 16, "alphabet must have 16 distinct symbols");
    }

    proptest! {
        // decode is the exact inverse of the platform's
        // encoding over the printable ASCII range.
        #[test]
        fn prop_decode_round_trips_printable_ascii(url in "[ -~]{0,64}") {
            let payload = encode(&url).expect("printable ASCII always encodes");
            prop_assert_eq!(decode(&payload).unwrap(), url);
        }

        #[test]
        fn prop_decode_never_panics(payload in "\\PC{0,64}") {
            // Arbitrary class tokens must error cleanly, never panic.
            let _ = decode(&payload);
        }
    }
}
