use std::str::FromStr;

use super::{validate_difficulty, DateFormat, Hashcash, PARTS, VERSION};
use crate::error::HashcashError;

impl FromStr for Hashcash {
    type Err = HashcashError;

    /// Decode `version:difficulty:date:resource:extension:salt:counter_hex`.
    ///
    /// The date format is inferred from the width of the date field. The
    /// extension field is carried on the wire but ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != PARTS {
            return Err(HashcashError::IncorrectPartCount {
                expected: PARTS,
                got: parts.len(),
            });
        }

        let version: u32 = parts[0]
            .parse()
            .map_err(|source| HashcashError::InvalidNumber {
                field: "version",
                source,
            })?;
        if version != VERSION {
            return Err(HashcashError::InvalidVersion {
                expected: VERSION,
                got: version,
            });
        }

        let date_format = DateFormat::from_width(parts[2].len())?;
        let issued_at = date_format.parse(parts[2])?;

        let difficulty: u32 = parts[1]
            .parse()
            .map_err(|source| HashcashError::InvalidNumber {
                field: "difficulty",
                source,
            })?;
        validate_difficulty(difficulty)?;

        let counter = u64::from_str_radix(parts[6], 16).map_err(|source| {
            HashcashError::InvalidNumber {
                field: "counter",
                source,
            }
        })?;

        Ok(Hashcash {
            version,
            difficulty,
            issued_at,
            date_format,
            resource: parts[3].to_owned(),
            salt: parts[5].to_owned(),
            counter,
        })
    }
}
