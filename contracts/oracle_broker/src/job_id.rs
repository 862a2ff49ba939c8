//! Job identifier codec.
//!
//! Oracle transports address jobs by a fixed 32-byte key. Operators publish
//! job ids as short strings (typically 32 hex characters), so the key is the
//! raw UTF-8 of the string, zero-padded on the right. Ids that do not fit the
//! key are rejected instead of truncated, so two distinct ids never collide.

use soroban_sdk::{BytesN, Env, String};

use crate::error::BrokerError;

/// Width of the transport key in bytes.
pub const JOB_ID_LEN: usize = 32;

/// Encode a job id string into its transport key.
///
/// The empty string maps to the all-zero key, which means "no job".
pub fn encode_job_id(env: &Env, text: &String) -> Result<BytesN<32>, BrokerError> {
    let len = text.len() as usize;
    if len > JOB_ID_LEN {
        return Err(BrokerError::JobIdTooLong);
    }

    let mut key = [0u8; JOB_ID_LEN];
    text.copy_into_slice(&mut key[..len]);

    Ok(BytesN::from_array(env, &key))
}

/// True if the key selects no job.
pub fn is_zero_key(key: &BytesN<32>) -> bool {
    key.to_array() == [0u8; JOB_ID_LEN]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_job_id_is_zero_key() {
        let env = Env::default();
        let key = encode_job_id(&env, &String::from_str(&env, "")).unwrap();
        assert_eq!(key, BytesN::from_array(&env, &[0u8; 32]));
        assert!(is_zero_key(&key));
    }

    #[test]
    fn test_short_job_id_is_zero_padded() {
        let env = Env::default();
        let key = encode_job_id(&env, &String::from_str(&env, "X")).unwrap();

        let mut expected = [0u8; 32];
        expected[0] = b'X';
        assert_eq!(key.to_array(), expected);
        assert!(!is_zero_key(&key));
    }

    #[test]
    fn test_uuid_job_id_fills_key_exactly() {
        let env = Env::default();
        let job = "3b7ca0d48c7a4b2da9268456665d11ae";
        let key = encode_job_id(&env, &String::from_str(&env, job)).unwrap();
        assert_eq!(&key.to_array(), job.as_bytes());
    }

    #[test]
    fn test_job_id_one_byte_too_long_rejected() {
        let env = Env::default();
        let job = "0123456789abcdef0123456789abcdef!";
        let result = encode_job_id(&env, &String::from_str(&env, job));
        assert_eq!(result, Err(BrokerError::JobIdTooLong));
    }

    #[test]
    fn test_distinct_ids_sharing_a_prefix_never_collide() {
        let env = Env::default();
        let long = "0123456789abcdef0123456789abcdefEXTRA";
        let long_key = encode_job_id(&env, &String::from_str(&env, long));
        assert_eq!(long_key, Err(BrokerError::JobIdTooLong));

        let prefix = "0123456789abcdef0123456789abcdef";
        assert!(encode_job_id(&env, &String::from_str(&env, prefix)).is_ok());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let env = Env::default();
        let text = String::from_str(&env, "price-feed");
        assert_eq!(
            encode_job_id(&env, &text).unwrap(),
            encode_job_id(&env, &text).unwrap()
        );
    }
}
