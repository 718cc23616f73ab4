//! DigestInfo pre-encoding for the INTERNAL AUTHENTICATE path.
//!
//! COMPUTE SIGNATURE wraps digests on the card; INTERNAL AUTHENTICATE
//! signs whatever it is given, so the host prepends the ASN.1
//! DigestInfo header matching the negotiated hash. The card applies
//! the PKCS#1 padding itself.

use crate::error::Error;
use crate::types::HashAlgorithm;

/// DigestInfo prefix for SHA-1.
const SHA1_PREFIX: [u8; 15] = [
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2B, 0x0E, 0x03, 0x02, 0x1A, 0x05, 0x00, 0x04, 0x14,
];

/// DigestInfo prefix for MD5.
const MD5_PREFIX: [u8; 18] = [
    0x30, 0x20, 0x30, 0x0C, 0x06, 0x08, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x02, 0x05, 0x05,
    0x00, 0x04, 0x10,
];

/// DigestInfo prefix for RIPEMD-160.
const RIPEMD160_PREFIX: [u8; 15] = [
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2B, 0x24, 0x03, 0x02, 0x01, 0x05, 0x00, 0x04, 0x14,
];

/// Wrap `digest` in the DigestInfo structure for `hash`.
///
/// `None` and `Md5Sha1` pass the data through unchanged: the former
/// signs raw data, the latter is the TLS-style concatenation that
/// PKCS#1 v1.5 transports without a DigestInfo wrapper.
pub fn encode(hash: HashAlgorithm, digest: &[u8]) -> Result<Vec<u8>, Error> {
    let (prefix, digest_len): (&[u8], usize) = match hash {
        HashAlgorithm::None => return Ok(digest.to_vec()),
        HashAlgorithm::Md5Sha1 => {
            if digest.len() != 36 {
                return Err(Error::InvalidArguments(
                    "MD5+SHA-1 signatures take a 36-byte digest",
                ));
            }
            return Ok(digest.to_vec());
        }
        HashAlgorithm::Sha1 => (&SHA1_PREFIX, 20),
        HashAlgorithm::Md5 => (&MD5_PREFIX, 16),
        HashAlgorithm::Ripemd160 => (&RIPEMD160_PREFIX, 20),
    };
    if digest.len() != digest_len {
        return Err(Error::InvalidArguments(
            "digest length does not match the negotiated hash",
        ));
    }
    let mut block = Vec::with_capacity(prefix.len() + digest.len());
    block.extend_from_slice(prefix);
    block.extend_from_slice(digest);
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha1_block_is_35_bytes() {
        let digest = hex!("A9993E364706816ABA3E25717850C26C9CD0D89D");
        let block = encode(HashAlgorithm::Sha1, &digest).unwrap();
        assert_eq!(block.len(), 35);
        assert_eq!(
            block,
            hex!("3021300906052B0E03021A05000414 A9993E364706816ABA3E25717850C26C9CD0D89D")
        );
    }

    #[test]
    fn md5_and_ripemd_prefixes() {
        let md5 = encode(HashAlgorithm::Md5, &[0u8; 16]).unwrap();
        assert_eq!(&md5[..18], &MD5_PREFIX);

        let ripemd = encode(HashAlgorithm::Ripemd160, &[0u8; 20]).unwrap();
        assert_eq!(&ripemd[..15], &RIPEMD160_PREFIX);
    }

    #[test]
    fn no_hash_passes_data_through() {
        let data = hex!("0102030405");
        assert_eq!(encode(HashAlgorithm::None, &data).unwrap(), data.to_vec());
    }

    #[test]
    fn digest_length_is_validated() {
        assert!(encode(HashAlgorithm::Sha1, &[0u8; 16]).is_err());
        assert!(encode(HashAlgorithm::Md5Sha1, &[0u8; 20]).is_err());
        assert!(encode(HashAlgorithm::Md5Sha1, &[0u8; 36]).is_ok());
    }
}
