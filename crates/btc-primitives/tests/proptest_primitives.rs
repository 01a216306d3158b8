use proptest::prelude::*;

use btc_primitives::chainhash::Hash;
use btc_primitives::ec::{PrivateKey, Signature};
use btc_primitives::util::{ByteReader, VarInt};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn varint_roundtrip(v in any::<u64>()) {
        let bytes = VarInt(v).to_bytes();
        prop_assert_eq!(bytes.len(), VarInt(v).length());
        let mut reader = ByteReader::new(&bytes);
        let decoded = reader.read_varint().unwrap();
        prop_assert_eq!(decoded.value(), v);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn chainhash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let reparsed = Hash::from_hex(&hash.to_hex()).unwrap();
        prop_assert_eq!(hash, reparsed);
    }

    #[test]
    fn signature_der_roundtrip(key_byte in 1u8..=255, digest in prop::array::uniform32(any::<u8>())) {
        // Build a valid non-zero scalar from a single byte.
        let mut key_bytes = [0u8; 32];
        key_bytes[31] = key_byte;
        let key = PrivateKey::from_bytes(&key_bytes).unwrap();

        let sig = key.sign(&digest).unwrap();
        let decoded = Signature::from_der(&sig.to_der()).unwrap();
        prop_assert!(decoded.verify(&digest, &key.pub_key()));
        prop_assert_eq!(decoded.to_der(), sig.to_der());
    }
}
