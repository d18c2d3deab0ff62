// ABOUTME: Integration tests for sshcert-ssh against an independent OpenSSH parser.
// ABOUTME: Cross-checks decoded fields and fingerprints with the ssh-key crate.

use sshcert_ssh::{JsonWebKey, RsaPublicKey, SshCertificateAuthParameters, SshError};
use ssh_key::{HashAlg, PublicKey};

/// 2048-bit RSA public key blob (e = 65537).
const TEST_KEY_BLOB: &str = "AAAAB3NzaC1yc2EAAAADAQABAAABAQCvAtoiFV59d8kaHUh82Uy5bso5g6/XWQku6++zfWNon5mpy8SLWT2QKiTUeWuM86wOmBhcFbO/8Powov8bWzZRkgNKnwyPOL3Pp3uyq9maGbYcGeOS757hZgdmJMuly/o7tGnJu0w2Efp8eZdGmz1FZOi4p+s5+EWAL8jOCFwXEuZm+mjsCIrJVlfZ6ArvunQ/NS+2ld4c8xsxH/smAJHw34wXI143dytjOmQLN8AbGhD927CnNLcFdJ2edqTBC5U7Rw/hy5hac9xVt/McK00bqAVOhzxIcxk6JiyaMSaCgaILw1s6IiRiJcF/vCH2FYIhzRFPbOtYFBc1SH73rMz3";

fn key_line(algorithm: &str) -> String {
    format!("{} {} user@host", algorithm, TEST_KEY_BLOB)
}

#[test]
fn test_valid_key_end_to_end() {
    let key = RsaPublicKey::parse(&key_line("ssh-rsa")).expect("should parse");
    assert!(!key.modulus().is_empty());
    assert!(!key.exponent().is_empty());
    assert_eq!(key.algorithm(), "ssh-rsa");

    let params = SshCertificateAuthParameters::from_public_key(&key);
    let json = params.jwk().expect("should serialize");
    let decoded: JsonWebKey = serde_json::from_str(&json).expect("should deserialize");
    assert_eq!(&decoded, params.json_web_key());
    assert_eq!(params.key_id(), key.key_id());
}

#[test]
fn test_modulus_matches_ssh_key_crate() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let line = key_line("ssh-rsa");
    let ours = RsaPublicKey::parse(&line).expect("should parse");
    let theirs = PublicKey::from_openssh(&line).expect("ssh-key should parse");
    let rsa = theirs.key_data().rsa().expect("should be an RSA key");

    assert_eq!(ours.modulus(), STANDARD.encode(rsa.n.as_bytes()));
    assert_eq!(ours.exponent(), STANDARD.encode(rsa.e.as_bytes()));
}

#[test]
fn test_fingerprint_matches_ssh_key_crate() {
    let line = key_line("ssh-rsa");
    let ours = RsaPublicKey::parse(&line).expect("should parse");
    let theirs = PublicKey::from_openssh(&line).expect("ssh-key should parse");

    assert_eq!(
        ours.fingerprint(),
        theirs.fingerprint(HashAlg::Sha256).to_string()
    );
}

#[test]
fn test_dsa_label_is_unsupported() {
    let err = RsaPublicKey::parse(&key_line("ssh-dsa")).unwrap_err();
    assert!(matches!(err, SshError::UnsupportedAlgorithm(_)));
}

#[test]
fn test_label_only_is_invalid_format() {
    let err = RsaPublicKey::parse("ssh-rsa").unwrap_err();
    assert!(matches!(err, SshError::InvalidKeyFormat(_)));
}

#[test]
fn test_decoding_is_deterministic() {
    let blob = sshcert_ssh::KeyBlob::decode(TEST_KEY_BLOB).expect("should decode");
    let first = blob.collect_fields().expect("first pass");
    let second = blob.collect_fields().expect("second pass");
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_every_truncation_fails_cleanly() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let bytes = STANDARD.decode(TEST_KEY_BLOB).expect("fixture should decode");

    // Chopping the blob anywhere inside a field must error, never panic.
    for cut in 1..bytes.len() {
        let line = format!("ssh-rsa {}", STANDARD.encode(&bytes[..cut]));
        match RsaPublicKey::parse(&line) {
            Err(SshError::TruncatedField { .. }) | Err(SshError::InvalidKeyFormat(_)) => {}
            other => panic!("cut at {cut}: unexpected result {other:?}"),
        }
    }
}
