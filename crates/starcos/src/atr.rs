//! Card matching and the capability profile assigned on a match.

/// ATRs of STARCOS SPK 2.3 cards.
pub const STARCOS_ATRS: [&[u8]; 2] = [
    b"\x3B\xB7\x94\x00\xC0\x24\x31\xFE\x65\x53\x50\x4B\x32\x33\x90\x00\xB4",
    b"\x3B\xB7\x94\x00\x81\x31\xFE\x65\x53\x50\x4B\x32\x33\x90\x00\xD1",
];

/// RSA key sizes the card generates and uses.
pub const RSA_MODULUS_BITS: [u16; 3] = [512, 768, 1024];

/// The card's fixed public exponent.
pub const RSA_EXPONENT: u32 = 0x10001;

/// Advertised capabilities of one RSA key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaCapability {
    /// Modulus length in bits.
    pub modulus_bits: u16,
    /// Public exponent.
    pub exponent: u32,
}

/// What the driver knows about a matched card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardProfile {
    /// Card product name.
    pub name: &'static str,
    /// Class byte for the ISO commands.
    pub cla: u8,
    /// Largest command data field the card accepts.
    pub max_send_size: usize,
    /// Largest response data field the card produces.
    pub max_recv_size: usize,
    /// RSA capabilities, one per supported modulus size. Each size
    /// supports PKCS#1 and ISO 9796 padding, on-board generation and
    /// the none/SHA-1/MD5/RIPEMD-160/MD5+SHA-1 hash modes.
    pub rsa: Vec<RsaCapability>,
    /// Whether the card exposes a random-number generator.
    pub rng: bool,
}

impl CardProfile {
    /// Match an ATR against the known STARCOS SPK 2.3 cards.
    ///
    /// A mismatch is not an error; it means another driver should be
    /// tried.
    pub fn from_atr(atr: &[u8]) -> Option<Self> {
        if STARCOS_ATRS.iter().any(|known| *known == atr) {
            Some(Self::spk23())
        } else {
            None
        }
    }

    /// The profile of a STARCOS SPK 2.3 card.
    pub fn spk23() -> Self {
        Self {
            name: "STARCOS SPK 2.3",
            cla: 0x00,
            max_send_size: crate::constants::MAX_APDU_DATA,
            max_recv_size: crate::constants::MAX_APDU_DATA,
            rsa: RSA_MODULUS_BITS
                .iter()
                .map(|&modulus_bits| RsaCapability {
                    modulus_bits,
                    exponent: RSA_EXPONENT,
                })
                .collect(),
            rng: true,
        }
    }

    /// Clamp an externally reported transport window to what the card
    /// handles per APDU.
    pub fn clamp_window(&self, send: usize, recv: usize) -> (usize, usize) {
        (send.min(self.max_send_size), recv.min(self.max_recv_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn both_documented_atrs_match() {
        for atr in STARCOS_ATRS {
            let profile = CardProfile::from_atr(atr).expect("ATR must match");
            assert_eq!(profile.name, "STARCOS SPK 2.3");
            assert_eq!(profile.cla, 0x00);
            assert_eq!(profile.max_send_size, 128);
            assert_eq!(profile.max_recv_size, 128);
            assert!(profile.rng);
            assert_eq!(
                profile.rsa.iter().map(|c| c.modulus_bits).collect::<Vec<_>>(),
                vec![512, 768, 1024]
            );
            assert!(profile.rsa.iter().all(|c| c.exponent == 0x10001));
        }
    }

    #[test]
    fn other_atrs_do_not_match() {
        assert!(CardProfile::from_atr(&[]).is_none());
        assert!(CardProfile::from_atr(&hex!("3B8F8001804F0CA000000306")).is_none());

        // one byte off the real ATR
        let mut atr = STARCOS_ATRS[0].to_vec();
        atr[4] ^= 0x01;
        assert!(CardProfile::from_atr(&atr).is_none());
    }

    #[test]
    fn windows_clamp_to_128() {
        let profile = CardProfile::spk23();
        assert_eq!(profile.clamp_window(256, 65536), (128, 128));
        assert_eq!(profile.clamp_window(64, 100), (64, 100));
    }
}
