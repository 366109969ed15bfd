use std::time::SystemTime;

use rcgen::{CertificateParams, KeyPair};
use ring::rand::SystemRandom;
use ring::signature::EcdsaKeyPair;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::peer_connection::math_rand_alpha;

/// A certificate fingerprint as advertised in SDP for DTLS peer
/// authentication.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RTCDtlsFingerprint {
    /// The hash function, lower-cased (only "sha-256" is produced here).
    pub algorithm: String,

    /// Colon-separated lowercase hex of the certificate digest.
    pub value: String,
}

/// An x509 certificate plus its private key, used to authenticate WebRTC
/// communications.
///
/// WebRTC uses self-signed rather than PKI certificates (RFC 8826 Section
/// 4.3.2.3), so the expiry check at configuration time is the only
/// certificate validation performed.
#[derive(Debug, Clone)]
pub struct RTCCertificate {
    pub(crate) certificate_der: Vec<u8>,
    pub(crate) private_key_der: Vec<u8>,
    pub(crate) expires: SystemTime,
}

impl PartialEq for RTCCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.certificate_der == other.certificate_der
    }
}

impl RTCCertificate {
    fn from_params(params: CertificateParams, key_pair: KeyPair) -> Result<Self> {
        let not_after = params.not_after;
        let x509_cert = params.self_signed(&key_pair)?;

        let serialized_der = key_pair.serialize_der();
        EcdsaKeyPair::from_pkcs8(
            &ring::signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            &serialized_der,
            &SystemRandom::new(),
        )
        .map_err(|e| Error::Other(e.to_string()))?;

        let expires: SystemTime = not_after.into();

        Ok(RTCCertificate {
            certificate_der: x509_cert.der().as_ref().to_vec(),
            private_key_der: serialized_der,
            expires,
        })
    }

    /// from_key_pair wraps a key pair in a self-signed certificate with a
    /// randomly generated common name. Only ECDSA P-256 keys are supported.
    pub fn from_key_pair(key_pair: KeyPair) -> Result<Self> {
        if !key_pair.is_compatible(&rcgen::PKCS_ECDSA_P256_SHA256) {
            return Err(Error::ErrPrivateKeyType);
        }

        RTCCertificate::from_params(CertificateParams::new(vec![math_rand_alpha(16)])?, key_pair)
    }

    /// generate creates a fresh ECDSA P-256 key pair and wraps it in a
    /// self-signed certificate.
    pub fn generate() -> Result<Self> {
        let key_pair = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256)?;
        RTCCertificate::from_key_pair(key_pair)
    }

    /// from_existing wraps certificate material obtained elsewhere (e.g.
    /// persistent storage) together with its expiry.
    pub fn from_existing(
        certificate_der: Vec<u8>,
        private_key_der: Vec<u8>,
        expires: SystemTime,
    ) -> Self {
        RTCCertificate {
            certificate_der,
            private_key_der,
            expires,
        }
    }

    /// The timestamp after which this certificate is no longer valid.
    pub fn expires(&self) -> SystemTime {
        self.expires
    }

    /// get_fingerprints returns the SHA-256 fingerprint of the certificate.
    pub fn get_fingerprints(&self) -> Vec<RTCDtlsFingerprint> {
        let mut hasher = Sha256::new();
        hasher.update(&self.certificate_der);
        let digest = hasher.finalize();

        let value = digest
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<String>>()
            .join(":");

        vec![RTCDtlsFingerprint {
            algorithm: "sha-256".to_owned(),
            value,
        }]
    }

    /// The DER-encoded x509 certificate, for the DTLS stack.
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    /// The PKCS#8 DER-encoded private key, for the DTLS stack.
    pub fn private_key_der(&self) -> &[u8] {
        &self.private_key_der
    }
}
