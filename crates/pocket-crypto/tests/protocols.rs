//! End-to-end use of the primitives together.

#![allow(clippy::indexing_slicing, clippy::unwrap_used)]

use pocket_crypto::{
    aead::{self, Nonce, XChaCha20Poly1305},
    argon2::{self, Algorithm, Block, Extras, Params},
    blake2b::Blake2b,
    convert, ct, eddsa, elligator,
    csprng::RandCompat,
    hazmat, x25519, Random, Seed,
};
use rand::{rngs::StdRng, SeedableRng};

fn rng() -> RandCompat<StdRng> {
    RandCompat(StdRng::seed_from_u64(0x5eed))
}

/// Two parties agree on a key and exchange a message.
#[test_log::test]
fn test_key_exchange_then_aead() {
    let mut rng = rng();
    let alice = x25519::SecretKey::random(&mut rng);
    let bob = x25519::SecretKey::random(&mut rng);

    let k1 = x25519::key_exchange(&alice, &x25519::public_key(&bob));
    let k2 = x25519::key_exchange(&bob, &x25519::public_key(&alice));
    assert!(bool::from(ct::verify32(k1.as_bytes(), k2.as_bytes())));

    let nonce = Nonce::random(&mut rng);
    let msg = b"attack at dawn";
    let mut sealed = [0u8; 14 + aead::TAG_SIZE];
    XChaCha20Poly1305::new(&k1)
        .seal(&mut sealed, &nonce, msg, b"header")
        .unwrap();

    let mut opened = [0u8; 14];
    XChaCha20Poly1305::new(&k2)
        .open(&mut opened, &nonce, &sealed, b"header")
        .unwrap();
    assert_eq!(&opened, msg);

    let err = XChaCha20Poly1305::new(&k2)
        .open(&mut opened, &nonce, &sealed, b"footer")
        .unwrap_err();
    assert_eq!(err, aead::OpenError::Authentication);
    assert_eq!(opened, [0; 14]);
}

/// One EdDSA key pair signs and also takes part in a key
/// exchange.
#[test_log::test]
fn test_signing_key_exchange() {
    let mut rng = rng();
    let (sk, pk) = eddsa::key_pair(Seed::random(&mut rng));
    let sig = eddsa::sign(&sk, b"hello");
    eddsa::check(&sig, &pk, b"hello").unwrap();

    let peer = x25519::SecretKey::random(&mut rng);
    let a = x25519::x25519(&convert::from_eddsa_private(&sk), &x25519::public_key(&peer));
    let b = x25519::x25519(&peer, &convert::from_eddsa_public(&pk));
    assert_eq!(a.as_bytes(), b.as_bytes());
}

/// Hidden key exchange: the wire carries only a representative.
#[test_log::test]
fn test_hidden_key_exchange() {
    let mut rng = rng();
    for _ in 0..4 {
        let (hidden, sk) = elligator::hidden_key_pair(Seed::random(&mut rng));
        let pk = elligator::hidden_to_curve(&hidden);
        assert_eq!(pk.to_bytes(), hazmat::x25519::dirty_small(sk.as_bytes()));

        let peer = x25519::SecretKey::random(&mut rng);
        let a = x25519::key_exchange(&sk, &x25519::public_key(&peer));
        let b = x25519::key_exchange(&peer, &pk);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}

/// Derives an AEAD key from a password.
#[test_log::test]
fn test_password_to_key() {
    let params = Params::new(Algorithm::Argon2id, 64, 2, 2);
    let mut area = vec![Block::ZERO; params.work_area_len()];

    let derive = |area: &mut [Block], password: &[u8]| {
        let mut key = [0u8; 32];
        argon2::argon2(&mut key, area, &params, password, b"somesalt", &Extras::default()).unwrap();
        aead::Key::from(key)
    };
    let k1 = derive(&mut area, b"correct horse");
    let k2 = derive(&mut area, b"correct horse");
    let k3 = derive(&mut area, b"battery staple");
    assert_eq!(k1.as_bytes(), k2.as_bytes());
    assert_ne!(k1.as_bytes(), k3.as_bytes());
    ct::wipe(&mut area[..]);
    assert!(area.iter().all(|b| *b == Block::ZERO));
}

/// Keyed BLAKE2b as a MAC, compared in constant time.
#[test_log::test]
fn test_blake2b_mac() {
    let mut mac = Blake2b::with_params(64, b"shared key").unwrap();
    mac.update(b"part one, ");
    mac.update(b"part two");
    let tag = mac.finalize();

    let mut whole = Blake2b::with_params(64, b"shared key").unwrap();
    whole.update(b"part one, part two");
    let again = whole.finalize();

    let a: &[u8; 64] = tag.as_bytes().try_into().unwrap();
    let b: &[u8; 64] = again.as_bytes().try_into().unwrap();
    assert!(bool::from(ct::verify64(a, b)));
}

#[test]
fn test_params_serde() {
    let json = serde_json::to_string(&Params::INTERACTIVE).unwrap();
    let back: Params = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Params::INTERACTIVE);
}
