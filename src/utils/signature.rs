use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes HMAC-SHA256 of `body` under `secret`, hex-encoded in lower case.
pub fn sign(body: &[u8], secret: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(body);

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Byte-wise equality that does not exit early on the first mismatch.
///
/// Inputs of different length compare unequal; the length itself is not secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Builds a `t=<timestamp>,<sig>,...` header the way the sending service does.
pub fn format_signature_header(timestamp: i64, signatures: &[String]) -> String {
    let mut header = format!("t={timestamp}");
    for signature in signatures {
        header.push(',');
        header.push_str(signature);
    }
    header
}
