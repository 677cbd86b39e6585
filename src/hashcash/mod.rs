//! Hashcash v1 stamps: `version:difficulty:date:resource::salt:counter_hex`.
//!
//! A stamp is solved when the leading 8 bytes of the SHA-256 digest of its
//! canonical string, read as a big-endian `u64`, have at least `difficulty`
//! leading zero bits. Only that 64-bit prefix is examined, so difficulties
//! above 64 can never be met and are rejected at construction.

mod date_format;
mod parse;
mod solve;

use std::fmt::{Display, Formatter};

use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub use date_format::DateFormat;

use crate::error::HashcashError;

/// Only supported stamp version.
pub const VERSION: u32 = 1;

/// Number of `:`-separated fields in a canonical stamp.
pub const PARTS: usize = 7;

/// Largest difficulty that can be expressed by the 64-bit digest prefix.
pub const MAX_DIFFICULTY: u32 = u64::BITS;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hashcash {
    version: u32,
    difficulty: u32,
    issued_at: DateTime<Utc>,
    date_format: DateFormat,
    resource: String,
    salt: String,
    counter: u64,
}

impl Hashcash {
    /// Create a fresh stamp dated now.
    pub fn new(
        difficulty: u32,
        salt_len: usize,
        date_format: DateFormat,
        resource: impl Into<String>,
    ) -> Result<Self, HashcashError> {
        Self::new_at(difficulty, salt_len, date_format, resource, Utc::now())
    }

    /// Create a fresh stamp dated `now`, truncated to the granularity of `date_format`.
    pub fn new_at(
        difficulty: u32,
        salt_len: usize,
        date_format: DateFormat,
        resource: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, HashcashError> {
        validate_difficulty(difficulty)?;
        let resource = resource.into();
        if resource.contains(':') {
            return Err(HashcashError::InvalidResource);
        }
        let salt = new_salt(salt_len)?;
        Ok(Self {
            version: VERSION,
            difficulty,
            issued_at: date_format.truncate(now)?,
            date_format,
            resource,
            salt,
            counter: 0,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn date_format(&self) -> DateFormat {
        self.date_format
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Same stamp with the counter replaced, e.g. to resume an interrupted solve.
    pub fn with_counter(mut self, counter: u64) -> Self {
        self.counter = counter;
        self
    }

    /// Whether `self` is an attempt at `puzzle`: every field but the counter agrees.
    pub fn answers(&self, puzzle: &Hashcash) -> bool {
        self.prefix() == puzzle.prefix()
    }

    /// Canonical wire encoding. Same as the `Display` output.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Whether the stamp is past its validity window, measured from now.
    pub fn has_expired(&self) -> Result<bool, HashcashError> {
        self.has_expired_at(Utc::now())
    }

    /// Whether the stamp is past its validity window at `now`.
    ///
    /// A stamp dated after `now` is never "fresh": it fails with
    /// [`HashcashError::AttemptToUseFutureHashcash`].
    pub fn has_expired_at(&self, now: DateTime<Utc>) -> Result<bool, HashcashError> {
        let elapsed = now.signed_duration_since(self.issued_at);
        if elapsed < chrono::TimeDelta::zero() {
            return Err(HashcashError::AttemptToUseFutureHashcash);
        }
        Ok(match self.date_format.max_age() {
            None => false,
            Some(max_age) => elapsed > max_age,
        })
    }

    /// SHA-256 digest of the canonical encoding.
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.encode().as_bytes()).into()
    }

    /// Lowercase hex of [`Hashcash::digest`], for logs.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }

    /// Leading zero bits of the digest's 64-bit big-endian prefix.
    pub fn leading_zero_bits(&self) -> u32 {
        prefix_leading_zeros(&self.digest())
    }

    pub fn is_solved(&self) -> bool {
        self.leading_zero_bits() >= self.difficulty
    }

    /// Check freshness and solution against the current time.
    pub fn check(&self) -> Result<(), HashcashError> {
        self.check_at(Utc::now())
    }

    /// Check freshness and solution at `now`. Expiry is checked before the digest.
    pub fn check_at(&self, now: DateTime<Utc>) -> Result<(), HashcashError> {
        if self.has_expired_at(now)? {
            return Err(HashcashError::ExpiredHashcash);
        }
        if !self.is_solved() {
            return Err(HashcashError::IncorrectSolution);
        }
        Ok(())
    }

    /// Everything before the counter, including the trailing separator.
    fn prefix(&self) -> String {
        format!(
            "{}:{}:{}:{}::{}:",
            self.version,
            self.difficulty,
            self.date_format.format(&self.issued_at),
            self.resource,
            self.salt,
        )
    }
}

impl Display for Hashcash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:x}", self.prefix(), self.counter)
    }
}

/// Parse a submitted solution and check it at `now`.
pub fn check_solution(stamp: &str, now: DateTime<Utc>) -> Result<Hashcash, HashcashError> {
    let hc: Hashcash = stamp.parse()?;
    hc.check_at(now)?;
    Ok(hc)
}

fn validate_difficulty(difficulty: u32) -> Result<(), HashcashError> {
    if difficulty == 0 || difficulty > MAX_DIFFICULTY {
        return Err(HashcashError::InvalidDifficulty);
    }
    Ok(())
}

#[inline]
fn prefix_leading_zeros(digest: &[u8; 32]) -> u32 {
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix).leading_zeros()
}

fn new_salt(salt_len: usize) -> Result<String, HashcashError> {
    if salt_len == 0 {
        return Err(HashcashError::InvalidSaltLength);
    }
    let mut buf = vec![0u8; salt_len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| HashcashError::Random(e.to_string()))?;
    let mut salt = BASE64_STANDARD.encode(&buf);
    salt.truncate(salt_len);
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 30, 15).unwrap()
    }

    #[test]
    fn new_rejects_zero_difficulty() {
        let err = Hashcash::new(0, 8, DateFormat::Yymmdd, "resource").unwrap_err();
        assert_eq!(err, HashcashError::InvalidDifficulty);
    }

    #[test]
    fn new_rejects_unreachable_difficulty() {
        let err = Hashcash::new(65, 8, DateFormat::Yymmdd, "resource").unwrap_err();
        assert_eq!(err, HashcashError::InvalidDifficulty);
    }

    #[test]
    fn new_rejects_zero_salt_length() {
        let err = Hashcash::new(20, 0, DateFormat::Yymmdd, "resource").unwrap_err();
        assert_eq!(err, HashcashError::InvalidSaltLength);
    }

    #[test]
    fn new_rejects_separator_in_resource() {
        let err = Hashcash::new(20, 8, DateFormat::Yymmdd, "::1").unwrap_err();
        assert_eq!(err, HashcashError::InvalidResource);
    }

    #[test]
    fn new_accepts_empty_resource() {
        assert!(Hashcash::new(20, 8, DateFormat::Yymmdd, "").is_ok());
    }

    #[test]
    fn encode_has_seven_fields_with_empty_extension() {
        let hc = Hashcash::new_at(20, 8, DateFormat::Yymmdd, "resource", fixed_now()).unwrap();
        let s = hc.encode();
        let parts: Vec<&str> = s.split(':').collect();
        assert_eq!(parts.len(), PARTS);
        assert_eq!(parts[0], "1");
        assert_eq!(parts[1], "20");
        assert_eq!(parts[2], "261018");
        assert_eq!(parts[3], "resource");
        assert_eq!(parts[4], "");
        assert_eq!(parts[5].len(), 8);
        assert_eq!(parts[6], "0");
    }

    #[test]
    fn salt_length_is_exact_for_odd_lengths() {
        for len in [1, 3, 7, 13, 32] {
            let hc = Hashcash::new(4, len, DateFormat::Yy, "r").unwrap();
            assert_eq!(hc.salt().len(), len);
            assert!(!hc.salt().contains(':'));
        }
    }

    #[test]
    fn counter_is_lowercase_hex() {
        let mut hc = Hashcash::new_at(8, 8, DateFormat::Yy, "r", fixed_now()).unwrap();
        hc.counter = 0x4c73d;
        assert!(hc.encode().ends_with(":4c73d"));
        hc.counter = 0xABCDEF;
        assert!(hc.encode().ends_with(":abcdef"));
    }

    #[test]
    fn issued_at_is_truncated() {
        let hc = Hashcash::new_at(8, 8, DateFormat::Yymmdd, "r", fixed_now()).unwrap();
        assert_eq!(
            hc.issued_at(),
            Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn future_stamp_is_rejected_for_every_format() {
        let now = fixed_now();
        for f in DateFormat::ALL {
            let hc = Hashcash::new_at(8, 8, f, "r", now + TimeDelta::days(800)).unwrap();
            assert_eq!(
                hc.has_expired_at(now),
                Err(HashcashError::AttemptToUseFutureHashcash)
            );
            assert_eq!(
                hc.check_at(now),
                Err(HashcashError::AttemptToUseFutureHashcash)
            );
        }
    }

    #[test]
    fn year_format_never_expires() {
        let issued = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        let hc = Hashcash::new_at(8, 8, DateFormat::Yy, "r", issued).unwrap();
        assert_eq!(hc.has_expired_at(fixed_now()), Ok(false));
    }

    #[test]
    fn expiry_windows() {
        let now = fixed_now();
        let cases = [
            (DateFormat::Yymm, TimeDelta::days(2 * 365 + 40)),
            (DateFormat::Yymmdd, TimeDelta::days(61)),
            (DateFormat::Yymmddhhmm, TimeDelta::days(2) + TimeDelta::minutes(2)),
            (DateFormat::Yymmddhhmmss, TimeDelta::seconds(121)),
        ];
        for (f, age) in cases {
            let stale = Hashcash::new_at(8, 8, f, "r", now - age).unwrap();
            assert_eq!(stale.has_expired_at(now), Ok(true), "{f:?} should expire");
            let fresh = Hashcash::new_at(8, 8, f, "r", now).unwrap();
            assert_eq!(fresh.has_expired_at(now), Ok(false), "{f:?} should be fresh");
        }
    }

    #[test]
    fn window_edge_is_still_fresh() {
        for f in DateFormat::ALL {
            let Some(max_age) = f.max_age() else {
                continue;
            };
            let hc = Hashcash::new_at(8, 8, f, "r", fixed_now()).unwrap();
            let issued = hc.issued_at();
            assert_eq!(hc.has_expired_at(issued + max_age), Ok(false), "{f:?}");
            assert_eq!(
                hc.has_expired_at(issued + max_age + TimeDelta::seconds(1)),
                Ok(true),
                "{f:?}"
            );
        }
    }

    #[test]
    fn expired_check_reports_expiry_before_digest() {
        let now = fixed_now();
        let hc = Hashcash::new_at(8, 8, DateFormat::Yymmddhhmmss, "r", now - TimeDelta::hours(1))
            .unwrap();
        assert_eq!(hc.check_at(now), Err(HashcashError::ExpiredHashcash));
    }

    #[test]
    fn prefix_is_read_big_endian() {
        let mut digest = [0xffu8; 32];
        digest[0] = 0;
        digest[1] = 0x10;
        assert_eq!(prefix_leading_zeros(&digest), 11);
        // bytes past the 8-byte prefix are ignored
        let mut zeros = [0u8; 32];
        zeros[8] = 0xff;
        assert_eq!(prefix_leading_zeros(&zeros), 64);
    }

    #[test]
    fn equal_fields_give_equal_status() {
        let a = Hashcash::new_at(6, 8, DateFormat::Yymmdd, "r", fixed_now()).unwrap();
        let b = a.clone();
        assert_eq!(a.encode(), b.encode());
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.is_solved(), b.is_solved());
    }

    #[test]
    fn digest_hex_encodes_full_digest() {
        let hc = Hashcash::new_at(6, 8, DateFormat::Yymmdd, "r", fixed_now()).unwrap();
        let hex = hc.digest_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, hex.to_lowercase());
        assert_eq!(&hex[..2], format!("{:02x}", hc.digest()[0]));
    }

    #[test]
    fn answers_ignores_only_the_counter() {
        let puzzle = Hashcash::new_at(6, 8, DateFormat::Yymmdd, "r", fixed_now()).unwrap();
        assert!(puzzle.clone().with_counter(0x4c73d).answers(&puzzle));

        let other_salt = Hashcash::new_at(6, 8, DateFormat::Yymmdd, "r", fixed_now()).unwrap();
        assert!(!other_salt.answers(&puzzle));

        let harder: Hashcash = puzzle.encode().replacen("1:6:", "1:7:", 1).parse().unwrap();
        assert!(!harder.answers(&puzzle));
    }
}
