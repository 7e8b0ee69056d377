use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::flags::flag_models::{Flag, FlagValues};
use crate::flags::registry::PRECOMPUTE_FLAGS;

type HmacSha256 = Hmac<Sha256>;

// Truncated HMAC tag appended to the option indices. Long enough that codes
// cannot be guessed, short enough to keep URLs readable.
const SIGNATURE_LEN: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodeError {
    #[error("flag code is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("flag code carries {actual} values, expected {expected}")]
    Length { expected: usize, actual: usize },
    #[error("flag code signature does not match")]
    Signature,
    #[error("flag {flag} has no option at index {index}")]
    UnknownOption { flag: &'static str, index: u8 },
    #[error("value {value} is not an option of flag {flag}")]
    ValueNotInOptions { flag: &'static str, value: bool },
    #[error("expected {expected} values, got {actual}")]
    ValueCount { expected: usize, actual: usize },
}

/// Turns resolved flag values into short signed path segments and back.
///
/// A code is `base64url(indices || tag)`, one byte per flag holding the
/// position of its value in the flag's options, followed by a truncated
/// HMAC-SHA256 over the indices. The same secret and values always produce
/// the same code.
#[derive(Clone)]
pub struct FlagCodec {
    key: Vec<u8>,
}

impl FlagCodec {
    pub fn new(secret: &str) -> Self {
        FlagCodec {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }

    pub fn serialize(&self, flags: &[Flag], values: &[bool]) -> Result<String, CodeError> {
        if flags.len() != values.len() {
            return Err(CodeError::ValueCount {
                expected: flags.len(),
                actual: values.len(),
            });
        }

        let mut payload = Vec::with_capacity(flags.len() + SIGNATURE_LEN);
        for (flag, value) in flags.iter().zip(values) {
            let index = flag
                .option_index(*value)
                .ok_or(CodeError::ValueNotInOptions {
                    flag: flag.key(),
                    value: *value,
                })?;
            payload.push(u8::try_from(index).map_err(|_| CodeError::UnknownOption {
                flag: flag.key(),
                index: u8::MAX,
            })?);
        }

        let mut mac = self.mac();
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();
        payload.extend_from_slice(&tag[..SIGNATURE_LEN]);

        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    pub fn deserialize(&self, flags: &[Flag], code: &str) -> Result<FlagValues, CodeError> {
        let bytes = URL_SAFE_NO_PAD.decode(code)?;
        if bytes.len() != flags.len() + SIGNATURE_LEN {
            return Err(CodeError::Length {
                expected: flags.len(),
                actual: bytes.len().saturating_sub(SIGNATURE_LEN),
            });
        }

        let (indices, tag) = bytes.split_at(flags.len());
        let mut mac = self.mac();
        mac.update(indices);
        mac.verify_truncated_left(tag)
            .map_err(|_| CodeError::Signature)?;

        let mut values = Vec::with_capacity(flags.len());
        for (flag, index) in flags.iter().zip(indices) {
            let option = flag
                .options()
                .get(usize::from(*index))
                .ok_or(CodeError::UnknownOption {
                    flag: flag.key(),
                    index: *index,
                })?;
            values.push(option.value);
        }

        FlagValues::new(flags, values).ok_or(CodeError::ValueCount {
            expected: flags.len(),
            actual: indices.len(),
        })
    }

    /// Values of the precomputed flags carried by a page's code.
    pub fn decode_code(&self, code: &str) -> Result<FlagValues, CodeError> {
        self.deserialize(&PRECOMPUTE_FLAGS, code)
    }

    /// Every code reachable for `flags`, one per combination of options.
    pub fn generate_permutations(&self, flags: &[Flag]) -> Vec<String> {
        let mut combinations: Vec<Vec<bool>> = vec![Vec::new()];
        for flag in flags {
            combinations = combinations
                .into_iter()
                .flat_map(|prefix| {
                    flag.options().iter().map(move |option| {
                        let mut next = prefix.clone();
                        next.push(option.value);
                        next
                    })
                })
                .collect();
        }

        combinations
            .iter()
            .filter_map(|values| self.serialize(flags, values).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test_case(&[false, true] ; "defaults")]
    #[test_case(&[true, true] ; "new layout with banner")]
    #[test_case(&[true, false] ; "new layout without banner")]
    #[test_case(&[false, false] ; "old layout without banner")]
    fn test_code_decodes_to_the_same_values(values: &[bool]) {
        let codec = FlagCodec::new("secret");
        let code = codec.serialize(&PRECOMPUTE_FLAGS, values).unwrap();
        let decoded = codec.deserialize(&PRECOMPUTE_FLAGS, &code).unwrap();
        assert_eq!(decoded.as_slice(), values);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let codec = FlagCodec::new("secret");
        let first = codec.serialize(&PRECOMPUTE_FLAGS, &[false, true]).unwrap();
        let second = codec.serialize(&PRECOMPUTE_FLAGS, &[false, true]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_code_is_path_safe() {
        let codec = FlagCodec::new("secret");
        for code in codec.generate_permutations(&PRECOMPUTE_FLAGS) {
            assert!(code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_other_secret_rejects_code() {
        let code = FlagCodec::new("secret")
            .serialize(&PRECOMPUTE_FLAGS, &[true, true])
            .unwrap();
        let result = FlagCodec::new("another secret").deserialize(&PRECOMPUTE_FLAGS, &code);
        assert_eq!(result, Err(CodeError::Signature));
    }

    #[test]
    fn test_tampered_code_is_rejected() {
        let codec = FlagCodec::new("secret");
        let code = codec.serialize(&PRECOMPUTE_FLAGS, &[false, true]).unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(&code).unwrap();
        bytes[0] = 0;
        let forged = URL_SAFE_NO_PAD.encode(bytes);
        assert_eq!(
            codec.deserialize(&PRECOMPUTE_FLAGS, &forged),
            Err(CodeError::Signature)
        );
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let codec = FlagCodec::new("secret");
        let code = codec.serialize(&PRECOMPUTE_FLAGS[..1], &[true]).unwrap();
        assert!(matches!(
            codec.deserialize(&PRECOMPUTE_FLAGS, &code),
            Err(CodeError::Length { .. })
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let codec = FlagCodec::new("secret");
        assert!(matches!(
            codec.deserialize(&PRECOMPUTE_FLAGS, "favicon.ico"),
            Err(CodeError::Encoding(_))
        ));
    }

    #[test]
    fn test_value_count_mismatch() {
        let codec = FlagCodec::new("secret");
        assert_eq!(
            codec.serialize(&PRECOMPUTE_FLAGS, &[true]),
            Err(CodeError::ValueCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_decode_code_reads_precomputed_flags() {
        let codec = FlagCodec::new("secret");
        let code = codec.serialize(&PRECOMPUTE_FLAGS, &[true, false]).unwrap();
        let values = codec.decode_code(&code).unwrap();
        assert!(values.get(Flag::ShowNewLayout));
        assert!(!values.get(Flag::EnablePromoBanner));
    }

    #[test]
    fn test_permutations_cover_every_combination() {
        let codec = FlagCodec::new("secret");
        let codes = codec.generate_permutations(&PRECOMPUTE_FLAGS);
        assert_eq!(codes.len(), 4);
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), 4);

        let decoded: HashSet<Vec<bool>> = codes
            .iter()
            .map(|code| {
                codec
                    .deserialize(&PRECOMPUTE_FLAGS, code)
                    .unwrap()
                    .as_slice()
                    .to_vec()
            })
            .collect();
        assert!(decoded.contains(&vec![true, true]));
        assert!(decoded.contains(&vec![false, false]));
    }
}
