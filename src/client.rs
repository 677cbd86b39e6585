//! Client side of the exchange: turn the puzzle found in a 428 response into
//! the header value to retry with.

use tracing::debug;

use crate::error::HashcashError;
use crate::hashcash::Hashcash;

/// Solve the puzzle carried in the `X-Hashcash` header of a challenge response.
pub fn solve_challenge(header_value: &str) -> Result<String, HashcashError> {
    solve_challenge_parallel(header_value, 1)
}

/// Like [`solve_challenge`], spreading the search over `threads` workers.
pub fn solve_challenge_parallel(header_value: &str, threads: usize) -> Result<String, HashcashError> {
    let mut puzzle: Hashcash = header_value.trim().parse()?;
    let solution = puzzle.solve_parallel(threads)?;
    debug!(
        difficulty = puzzle.difficulty(),
        counter = puzzle.counter(),
        digest = %puzzle.digest_hex(),
        "solved challenge"
    );
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashcash::DateFormat;
    use chrono::Utc;

    #[test]
    fn solves_issued_puzzle() {
        let puzzle = Hashcash::new(10, 8, DateFormat::Yymmddhhmm, "client-A")
            .unwrap()
            .encode();
        let solution = solve_challenge(&puzzle).unwrap();
        let checked = crate::hashcash::check_solution(&solution, Utc::now()).unwrap();
        assert_eq!(checked.resource(), "client-A");
        assert_eq!(checked.difficulty(), 10);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let puzzle = Hashcash::new(4, 8, DateFormat::Yymmdd, "c").unwrap().encode();
        assert!(solve_challenge(&format!(" {puzzle}\r\n")).is_ok());
    }

    #[test]
    fn parallel_solution_checks() {
        let puzzle = Hashcash::new(12, 8, DateFormat::Yymmdd, "c").unwrap().encode();
        let solution = solve_challenge_parallel(&puzzle, 4).unwrap();
        let hc: Hashcash = solution.parse().unwrap();
        assert!(hc.is_solved());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            solve_challenge("not a puzzle"),
            Err(HashcashError::IncorrectPartCount { .. })
        ));
    }
}
